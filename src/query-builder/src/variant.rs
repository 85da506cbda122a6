//! Grouping variants and the param-changed handlers that move between them
//!
//! Aggregations and grouped range functions exist in three shapes:
//!
//! ```text
//!   Base    --label added-------->  By
//!   By      --last label removed-->  Base
//!   Without --last label removed-->  Base
//! ```
//!
//! There is no direct edge between `By` and `Without`. The variant of an
//! instance is carried by its id (`sum`, `__sum_by`, `__sum_without`); the
//! transitions are guarded by the instance parameter count crossing the
//! definition's declared parameter count.

use std::sync::Arc;

use crate::definition::{OperationDef, ParamChangedFn};
use crate::types::{Operation, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingVariant {
    /// Plain operation without a grouping clause
    Base,
    By,
    Without,
}

impl GroupingVariant {
    /// Keyword used in the rendered grouping clause
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Base => "",
            Self::By => "by",
            Self::Without => "without",
        }
    }

    /// Registry id of this variant of the named operation
    pub fn operation_id(self, name: &str) -> String {
        match self {
            Self::Base => name.to_string(),
            Self::By => format!("__{name}_by"),
            Self::Without => format!("__{name}_without"),
        }
    }

    /// Display name of this variant given the base display name
    pub fn display_name(self, base_name: &str) -> String {
        match self {
            Self::Base => base_name.to_string(),
            grouped => format!("{base_name} {}", grouped.keyword()),
        }
    }
}

/// The optional trailing label parameter has received a value
pub fn has_all_params(operation: &Operation, def: &OperationDef) -> bool {
    operation.params.len() == def.params.len()
}

/// The instance dropped below the declared parameter count
pub fn is_missing_params(operation: &Operation, def: &OperationDef) -> bool {
    operation.params.len() < def.params.len()
}

/// Split instance parameters into the fixed leading values and the grouping labels
pub fn split_grouping<'a>(
    operation: &'a Operation,
    def: &OperationDef,
) -> (&'a [ParamValue], &'a [ParamValue]) {
    let rest_index = def
        .rest_param_index()
        .unwrap_or(operation.params.len())
        .min(operation.params.len());
    operation.params.split_at(rest_index)
}

fn switch_id(operation: &Operation, target_id: &str) -> Operation {
    log::trace!("Switching operation '{}' to '{}'", operation.id, target_id);
    Operation {
        id: target_id.to_string(),
        params: operation.params.clone(),
    }
}

/// Handler for a base definition: once the label slot is filled, become `target_id`
pub fn on_label_added_handler(target_id: impl Into<String>) -> ParamChangedFn {
    let target_id = target_id.into();
    Arc::new(move |_index: usize, operation: &Operation, def: &OperationDef| {
        if has_all_params(operation, def) {
            switch_id(operation, &target_id)
        } else {
            operation.clone()
        }
    })
}

/// Handler for a grouped definition: once the last label is gone, become `target_id`
pub fn last_label_removed_handler(target_id: impl Into<String>) -> ParamChangedFn {
    let target_id = target_id.into();
    Arc::new(move |_index: usize, operation: &Operation, def: &OperationDef| {
        if is_missing_params(operation, def) {
            switch_id(operation, &target_id)
        } else {
            operation.clone()
        }
    })
}

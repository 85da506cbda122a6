//! Operation registry and the query modeller built on it
//!
//! The registry is the static catalogue of definitions. The modeller resolves
//! ids against it and drives the definitions' behaviour over whole queries:
//! rendering, adding operations and parameter edits.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::conflict::is_conflicting_filter;
use crate::definition::OperationDef;
use crate::error::QueryBuilderError;
use crate::operation_id as id;
use crate::operations::operation_definitions;
use crate::types::{
    BinaryQuery, Operation, OperationCategory, ParamValue, SelectorLabel, VisualQuery,
};

/// Resolves operation ids to definitions
pub trait QueryModeller {
    fn get_operation_def(&self, id: &str) -> Option<&OperationDef>;
}

/// Definitions keyed by their unique id, in catalogue order
#[derive(Debug)]
pub struct OperationRegistry {
    defs: Vec<OperationDef>,
    index: HashMap<String, usize>,
}

impl OperationRegistry {
    pub fn new(defs: Vec<OperationDef>) -> Result<Self, QueryBuilderError> {
        let mut index = HashMap::with_capacity(defs.len());
        for (position, def) in defs.iter().enumerate() {
            if index.insert(def.id.clone(), position).is_some() {
                return Err(QueryBuilderError::DuplicateOperation(def.id.clone()));
            }
        }
        Ok(Self { defs, index })
    }

    pub fn get(&self, id: &str) -> Option<&OperationDef> {
        self.index.get(id).map(|&position| &self.defs[position])
    }

    pub fn all(&self) -> &[OperationDef] {
        &self.defs
    }

    /// Definitions offered directly to the user, hidden variants excluded
    pub fn listed(&self) -> impl Iterator<Item = &OperationDef> {
        self.defs.iter().filter(|def| !def.hide_from_list)
    }

    pub fn by_category(&self, category: OperationCategory) -> impl Iterator<Item = &OperationDef> {
        self.defs.iter().filter(move |def| def.category == category)
    }

    /// Definitions sharing an alternatives key, e.g. all plain aggregations
    pub fn alternatives(&self, key: &str) -> impl Iterator<Item = &OperationDef> {
        self.defs
            .iter()
            .filter(move |def| def.alternatives_key.as_deref() == Some(key))
    }
}

impl QueryModeller for OperationRegistry {
    fn get_operation_def(&self, id: &str) -> Option<&OperationDef> {
        self.get(id)
    }
}

static LOKI_REGISTRY: Lazy<OperationRegistry> = Lazy::new(|| {
    OperationRegistry::new(operation_definitions()).expect("built-in operation ids are unique")
});

/// The registry of all LogQL builder operations, built on first use
pub fn loki_registry() -> &'static OperationRegistry {
    &LOKI_REGISTRY
}

/// Explanation of one operation of a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationExplanation {
    pub id: String,
    pub name: String,
    pub text: String,
}

/// Query modeller of the LogQL builder
#[derive(Debug, Clone, Copy)]
pub struct LokiQueryModeller<'a> {
    registry: &'a OperationRegistry,
}

impl LokiQueryModeller<'static> {
    /// Modeller over the built-in LogQL catalogue
    pub fn loki() -> Self {
        Self::new(loki_registry())
    }
}

impl<'a> LokiQueryModeller<'a> {
    pub fn new(registry: &'a OperationRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a OperationRegistry {
        self.registry
    }

    fn require_def(&self, id: &str) -> Result<&'a OperationDef, QueryBuilderError> {
        self.registry
            .get(id)
            .ok_or_else(|| QueryBuilderError::UnknownOperation(id.to_string()))
    }

    /// Render the stream selector, `{}` when there are no labels
    pub fn render_labels(&self, labels: &[SelectorLabel]) -> String {
        let matchers = labels
            .iter()
            .map(|label| format!("{}{}\"{}\"", label.label, label.op, label.value))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{matchers}}}")
    }

    /// Fold the operations over the selector, left to right
    pub fn render_operations(&self, selector: &str, operations: &[Operation]) -> String {
        operations
            .iter()
            .fold(selector.to_string(), |inner_expr, operation| {
                match self.registry.get(&operation.id) {
                    Some(def) => def.render(operation, &inner_expr),
                    None => {
                        log::warn!("Skipping unknown operation '{}' while rendering", operation.id);
                        inner_expr
                    }
                }
            })
    }

    fn render_binary_queries(&self, binary_queries: &[BinaryQuery]) -> String {
        binary_queries
            .iter()
            .map(|binary| format!(" {} {}", binary.operator, self.render_nested(&binary.query, true)))
            .collect()
    }

    fn has_binary_op(&self, query: &VisualQuery) -> bool {
        query.operations.iter().any(|operation| {
            self.registry
                .get(&operation.id)
                .is_some_and(|def| def.category == OperationCategory::BinaryOps)
        })
    }

    fn render_nested(&self, query: &VisualQuery, nested: bool) -> String {
        let selector = self.render_labels(&query.labels);
        let mut expr = self.render_operations(&selector, &query.operations);
        let has_binary_op = self.has_binary_op(query);
        let has_binary_queries = !query.binary_queries.is_empty();

        if !nested && has_binary_op && has_binary_queries {
            expr = format!("({expr})");
        }

        expr.push_str(&self.render_binary_queries(&query.binary_queries));

        if nested && (has_binary_op || has_binary_queries) {
            expr = format!("({expr})");
        }
        expr
    }

    /// The LogQL text of a visual query
    pub fn render_query(&self, query: &VisualQuery) -> String {
        self.render_nested(query, false)
    }

    /// Add a fresh instance of the operation through its add handler
    pub fn add_operation(
        &self,
        query: &VisualQuery,
        operation_id: &str,
    ) -> Result<VisualQuery, QueryBuilderError> {
        let def = self.require_def(operation_id)?;
        Ok(def.add_to(query, self))
    }

    /// Copy of the query without the operation at `index`
    pub fn remove_operation(
        &self,
        query: &VisualQuery,
        index: usize,
    ) -> Result<VisualQuery, QueryBuilderError> {
        let len = query.operations.len();
        if index >= len {
            return Err(QueryBuilderError::OperationIndexOutOfRange { index, len });
        }
        let mut operations = query.operations.clone();
        operations.remove(index);
        Ok(query.with_operations(operations))
    }

    fn edit_operation(
        &self,
        query: &VisualQuery,
        operation_index: usize,
        param_index: usize,
        edit: impl FnOnce(&mut Vec<ParamValue>) -> bool,
    ) -> Result<VisualQuery, QueryBuilderError> {
        let len = query.operations.len();
        let operation = query
            .operations
            .get(operation_index)
            .ok_or(QueryBuilderError::OperationIndexOutOfRange {
                index: operation_index,
                len,
            })?;
        let def = self.require_def(&operation.id)?;

        let mut edited = operation.clone();
        if !edit(&mut edited.params) {
            return Err(QueryBuilderError::ParamIndexOutOfRange {
                id: operation.id.clone(),
                index: param_index,
            });
        }

        let mut operations = query.operations.clone();
        operations[operation_index] = def.on_param_changed(param_index, &edited);
        Ok(query.with_operations(operations))
    }

    /// Set a parameter value, appending when `param_index` is one past the end,
    /// then run the definition's param-changed handler
    pub fn update_operation_param(
        &self,
        query: &VisualQuery,
        operation_index: usize,
        param_index: usize,
        value: ParamValue,
    ) -> Result<VisualQuery, QueryBuilderError> {
        self.edit_operation(query, operation_index, param_index, |params| {
            match param_index.cmp(&params.len()) {
                std::cmp::Ordering::Less => {
                    params[param_index] = value;
                    true
                }
                std::cmp::Ordering::Equal => {
                    params.push(value);
                    true
                }
                std::cmp::Ordering::Greater => false,
            }
        })
    }

    /// Remove a parameter value, then run the definition's param-changed handler
    pub fn remove_operation_param(
        &self,
        query: &VisualQuery,
        operation_index: usize,
        param_index: usize,
    ) -> Result<VisualQuery, QueryBuilderError> {
        self.edit_operation(query, operation_index, param_index, |params| {
            if param_index < params.len() {
                params.remove(param_index);
                true
            } else {
                false
            }
        })
    }

    /// Explanations of every resolvable operation of the query
    pub fn explain_operations(&self, query: &VisualQuery) -> Vec<OperationExplanation> {
        query
            .operations
            .iter()
            .filter_map(|operation| {
                let def = self.registry.get(&operation.id)?;
                Some(OperationExplanation {
                    id: operation.id.clone(),
                    name: def.name.clone(),
                    text: def.explain(operation).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Indices of label filters that contradict an earlier label filter
    pub fn conflicting_filters(&self, query: &VisualQuery) -> Vec<usize> {
        query
            .operations
            .iter()
            .enumerate()
            .filter(|(index, operation)| {
                operation.id == id::LABEL_FILTER
                    && is_conflicting_filter(operation, &query.operations[..*index])
            })
            .map(|(index, _)| index)
            .collect()
    }
}

impl QueryModeller for LokiQueryModeller<'_> {
    fn get_operation_def(&self, id: &str) -> Option<&OperationDef> {
        self.registry.get(id)
    }
}

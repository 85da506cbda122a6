//! Factories building the definitions of each operation family
//!
//! Families with grouping support are produced as a set: the base definition
//! plus hidden `by` and `without` variants, wired together through the
//! param-changed handlers in [`crate::variant`].

use std::sync::Arc;

use crate::definition::{OperationDef, OperationDefOverrides};
use crate::explain::{aggregation_explainer, range_function_explainer};
use crate::operation_id as id;
use crate::placement::add_loki_operation;
use crate::render::{
    aggregation_grouping_renderer, aggregation_with_param_renderer, function_renderer_left,
    operation_with_range_vector_renderer, range_aggregation_with_grouping_renderer,
};
use crate::text::display_name;
use crate::types::{
    AUTO_RANGE, LABEL_PARAM_EDITOR, OperationCategory, OperationOrder, OperationParamDef,
    ParamValue,
};
use crate::variant::{GroupingVariant, last_label_removed_handler, on_label_added_handler};

const GROUPED_VARIANTS: [GroupingVariant; 2] = [GroupingVariant::By, GroupingVariant::Without];

/// Preset ranges offered for range vector functions
pub const RANGE_OPTIONS: [&str; 6] = [AUTO_RANGE, "1m", "5m", "10m", "1h", "24h"];

pub fn range_vector_param_def() -> OperationParamDef {
    OperationParamDef::string("Range").with_options(RANGE_OPTIONS)
}

fn grouping_label_param_def() -> OperationParamDef {
    OperationParamDef::string("Label")
        .rest()
        .optional()
        .with_editor(LABEL_PARAM_EDITOR)
}

fn optional_by_label_param_def() -> OperationParamDef {
    OperationParamDef::string("By label").rest().optional()
}

/// Definition of a range vector function such as `rate` or `count_over_time`
///
/// With `with_grouping` the definition gains an optional trailing label
/// parameter, and filling it switches the instance to the `by` variant.
pub fn create_range_operation(name: &str, with_grouping: bool) -> OperationDef {
    let mut params = vec![range_vector_param_def()];
    let mut default_params: Vec<ParamValue> = vec![AUTO_RANGE.into()];

    if name == id::QUANTILE_OVER_TIME {
        params.push(OperationParamDef::number("Quantile"));
        default_params.push("0.95".into());
    }

    let mut def = OperationDef::new(
        name,
        display_name(name),
        OperationCategory::RangeFunctions,
        Arc::new(operation_with_range_vector_renderer),
    )
    .with_alternatives_key("range function")
    .with_order_rank(OperationOrder::RangeVectorFunction.rank())
    .with_explain_handler(Arc::new(range_function_explainer))
    .with_add_operation_handler(Arc::new(add_loki_operation));

    if with_grouping {
        params.push(optional_by_label_param_def());
        def = def.with_param_changed_handler(on_label_added_handler(
            GroupingVariant::By.operation_id(name),
        ));
    }

    def.with_params(params).with_default_params(default_params)
}

/// Base range function plus its hidden `by` and `without` variants
pub fn create_range_operation_with_grouping(name: &str) -> Vec<OperationDef> {
    let base = create_range_operation(name, true);

    // the variants replace the optional label slot with their own label rest param
    let mut variant_params = base.params[..base.params.len() - 1].to_vec();
    variant_params.push(grouping_label_param_def());

    let mut variant_defaults = base.default_params.clone();
    variant_defaults.push("".into());

    let variants = GROUPED_VARIANTS.map(|variant| {
        OperationDef::new(
            variant.operation_id(name),
            variant.display_name(&display_name(name)),
            OperationCategory::RangeFunctions,
            range_aggregation_with_grouping_renderer(name, variant),
        )
        .with_params(variant_params.clone())
        .with_default_params(variant_defaults.clone())
        .with_alternatives_key("range function with grouping")
        .with_order_rank(OperationOrder::RangeVectorFunction.rank())
        .with_param_changed_handler(last_label_removed_handler(name))
        .with_explain_handler(aggregation_explainer(name, variant))
        .with_add_operation_handler(Arc::new(add_loki_operation))
        .hidden()
    });

    let mut defs = vec![base];
    defs.extend(variants);
    defs
}

/// Plain aggregation such as `sum`, with its hidden `by` and `without` variants
///
/// `overrides` is applied to all three definitions.
pub fn create_aggregation_operation(
    name: &str,
    overrides: OperationDefOverrides,
) -> Vec<OperationDef> {
    let base = OperationDef::new(
        name,
        display_name(name),
        OperationCategory::Aggregations,
        Arc::new(function_renderer_left),
    )
    .with_params(vec![optional_by_label_param_def()])
    .with_alternatives_key("plain aggregations")
    .with_param_changed_handler(on_label_added_handler(GroupingVariant::By.operation_id(name)))
    .with_explain_handler(aggregation_explainer(name, GroupingVariant::Base));

    let variants = GROUPED_VARIANTS.map(|variant| {
        OperationDef::new(
            variant.operation_id(name),
            variant.display_name(&display_name(name)),
            OperationCategory::Aggregations,
            aggregation_grouping_renderer(name, variant),
        )
        .with_params(vec![grouping_label_param_def()])
        .with_default_params(vec!["".into()])
        .with_alternatives_key("aggregations by")
        .with_param_changed_handler(last_label_removed_handler(name))
        .with_explain_handler(aggregation_explainer(name, variant))
        .hidden()
    });

    std::iter::once(base)
        .chain(variants)
        .map(|def| overrides.apply(def))
        .collect()
}

/// Aggregation with leading fixed parameters, such as the K of `topk`
///
/// The leading parameters are prepended to all three definitions and render
/// inside the parentheses, ahead of the inner expression.
pub fn create_aggregation_operation_with_param(
    name: &str,
    leading_params: Vec<OperationParamDef>,
    leading_defaults: Vec<ParamValue>,
    overrides: OperationDefOverrides,
) -> Vec<OperationDef> {
    create_aggregation_operation(name, overrides)
        .into_iter()
        .enumerate()
        .map(|(index, mut def)| {
            let mut params = leading_params.clone();
            params.append(&mut def.params);
            def.params = params;

            let mut defaults = leading_defaults.clone();
            if index > 0 {
                defaults.push("".into());
                let variant = GROUPED_VARIANTS[index - 1];
                def.renderer = aggregation_with_param_renderer(name, variant);
            }
            def.default_params = defaults;
            def
        })
        .collect()
}

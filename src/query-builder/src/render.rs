//! Renderers turning operation instances into LogQL text
//!
//! Every renderer receives the instance, its definition and the already
//! rendered inner expression, and returns the expression wrapped by the
//! operation. Renderers are total: missing trailing parameters render as
//! their defaults or as empty text, never as an error.

use std::sync::Arc;

use crate::definition::{OperationDef, RenderFn};
use crate::operation_id as id;
use crate::types::{AUTO_RANGE, Operation, ParamType, ParamValue};
use crate::variant::{GroupingVariant, split_grouping};

/// Label filter operators that compare numerically and take a bare value
const NUMERIC_OPERATORS: [&str; 4] = ["<", "<=", ">", ">="];

fn param_text(operation: &Operation, index: usize) -> String {
    operation
        .param(index)
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn join_params(params: &[ParamValue]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_truthy<'a>(params: impl IntoIterator<Item = &'a ParamValue>) -> String {
    params
        .into_iter()
        .filter(|param| param.is_truthy())
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_string_param(def: &OperationDef, index: usize) -> bool {
    def.params
        .get(index)
        .or_else(|| def.params.last().filter(|param| param.rest_param))
        .is_some_and(|param| param.param_type == ParamType::String)
}

fn quote_string_params(params: &[ParamValue], def: &OperationDef) -> Vec<String> {
    params
        .iter()
        .enumerate()
        .map(|(index, value)| {
            if is_string_param(def, index) {
                format!("\"{value}\"")
            } else {
                value.to_string()
            }
        })
        .collect()
}

/// `rate({app="api"} [5m])`, or `quantile_over_time(0.95, {..} [5m])`
pub fn operation_with_range_vector_renderer(
    operation: &Operation,
    _def: &OperationDef,
    inner_expr: &str,
) -> String {
    let range = operation
        .param(0)
        .map(ToString::to_string)
        .unwrap_or_else(|| AUTO_RANGE.to_string());

    // quantile_over_time is the only range function with a second parameter
    if operation.id == id::QUANTILE_OVER_TIME {
        if let Some(quantile) = operation.param(1) {
            return format!("{}({quantile}, {inner_expr} [{range}])", operation.id);
        }
    }

    format!("{}({inner_expr} [{range}])", operation.id)
}

/// Range function followed by a `by`/`without` clause over the rest parameters
pub fn range_aggregation_with_grouping_renderer(
    aggregation: &str,
    grouping: GroupingVariant,
) -> RenderFn {
    let aggregation = aggregation.to_string();
    Arc::new(move |operation: &Operation, def: &OperationDef, inner_expr: &str| {
        let (fixed, labels) = split_grouping(operation, def);
        let range = fixed
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| AUTO_RANGE.to_string());
        let keyword = grouping.keyword();
        let labels = join_params(labels);

        if fixed.len() == 2 && aggregation == id::QUANTILE_OVER_TIME {
            return format!(
                "{aggregation}({}, {inner_expr} [{range}]) {keyword} ({labels})",
                fixed[1]
            );
        }

        format!("{aggregation}({inner_expr} [{range}]) {keyword} ({labels})")
    })
}

/// `sum by(job) ({..})` / `sum without(job) ({..})`
pub fn aggregation_grouping_renderer(aggregation: &str, grouping: GroupingVariant) -> RenderFn {
    let aggregation = aggregation.to_string();
    Arc::new(move |operation: &Operation, _def: &OperationDef, inner_expr: &str| {
        format!(
            "{aggregation} {}({}) ({inner_expr})",
            grouping.keyword(),
            join_params(&operation.params)
        )
    })
}

/// `topk by(job) (5, {..})`: leading fixed params sit inside the parens
pub fn aggregation_with_param_renderer(aggregation: &str, grouping: GroupingVariant) -> RenderFn {
    let aggregation = aggregation.to_string();
    Arc::new(move |operation: &Operation, def: &OperationDef, inner_expr: &str| {
        let (fixed, labels) = split_grouping(operation, def);
        let mut args = quote_string_params(fixed, def);
        args.push(inner_expr.to_string());

        format!(
            "{aggregation} {}({}) ({})",
            grouping.keyword(),
            join_params(labels),
            args.join(", ")
        )
    })
}

/// `fn(params…, inner)` with string parameters double quoted
pub fn function_renderer_left(operation: &Operation, def: &OperationDef, inner_expr: &str) -> String {
    let mut args = quote_string_params(&operation.params, def);
    if !inner_expr.is_empty() {
        args.push(inner_expr.to_string());
    }
    format!("{}({})", operation.id, args.join(", "))
}

/// Parser and label-list stages: `| logfmt --strict a, b`, `| json a, b`, `| drop a`
pub fn pipeline_renderer(operation: &Operation, _def: &OperationDef, inner_expr: &str) -> String {
    match operation.id.as_str() {
        id::LOGFMT => {
            // the first two positional params are the flags, the rest are labels
            let flag = |index: usize| operation.param(index).is_some_and(ParamValue::is_truthy);
            let strict = if flag(0) { " --strict" } else { "" };
            let keep_empty = if flag(1) { " --keep-empty" } else { "" };
            let labels = join_truthy(operation.params.iter().skip(2));
            format!("{inner_expr} | logfmt{strict}{keep_empty} {labels}")
                .trim_end()
                .to_string()
        }
        id::JSON | id::DROP | id::KEEP => format!(
            "{inner_expr} | {} {}",
            operation.id,
            join_truthy(&operation.params)
        )
        .trim_end()
        .to_string(),
        _ => format!("{inner_expr} | {}", operation.id),
    }
}

/// Stages taking a single back-tick quoted template: `| regexp `...``
pub fn quoted_stage_renderer(stage: &'static str) -> RenderFn {
    Arc::new(move |operation: &Operation, _def: &OperationDef, inner_expr: &str| {
        format!("{inner_expr} | {stage} `{}`", param_text(operation, 0))
    })
}

/// `| label_format new=old`
pub fn label_format_renderer(operation: &Operation, _def: &OperationDef, inner_expr: &str) -> String {
    format!(
        "{inner_expr} | label_format {}={}",
        param_text(operation, 1),
        param_text(operation, 0)
    )
}

/// `| unwrap latency` or `| unwrap duration(latency)` with a conversion function
pub fn unwrap_renderer(operation: &Operation, _def: &OperationDef, inner_expr: &str) -> String {
    let identifier = param_text(operation, 0);
    match operation.param(1).filter(|conversion| conversion.is_truthy()) {
        Some(conversion) => format!("{inner_expr} | unwrap {conversion}({identifier})"),
        None => format!("{inner_expr} | unwrap {identifier}"),
    }
}

/// `| level = `error``, or a bare value for numeric comparisons
pub fn label_filter_renderer(operation: &Operation, _def: &OperationDef, inner_expr: &str) -> String {
    let label = param_text(operation, 0);
    let operator = param_text(operation, 1);
    let value = param_text(operation, 2);

    if NUMERIC_OPERATORS.contains(&operator.as_str()) {
        return format!("{inner_expr} | {label} {operator} {value}");
    }

    format!("{inner_expr} | {label} {operator} `{value}`")
}

pub fn label_filter_no_errors_renderer(
    _operation: &Operation,
    _def: &OperationDef,
    inner_expr: &str,
) -> String {
    format!("{inner_expr} | __error__=``")
}

/// `| addr = ip(`192.168.0.0/16`)`
pub fn label_filter_ip_matches_renderer(
    operation: &Operation,
    _def: &OperationDef,
    inner_expr: &str,
) -> String {
    format!(
        "{inner_expr} | {} {} ip(`{}`)",
        param_text(operation, 0),
        param_text(operation, 1),
        param_text(operation, 2)
    )
}

/// Line filter with every parameter as an OR-ed alternative
///
/// The pattern is always quoted, so an instance without parameters renders
/// an empty pattern rather than a dangling operator.
pub fn line_filter_renderer(operator: &'static str, case_insensitive: bool) -> RenderFn {
    Arc::new(move |operation: &Operation, _def: &OperationDef, inner_expr: &str| {
        let prefix = if case_insensitive { "(?i)" } else { "" };
        let alternatives = operation
            .params
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(&format!("` or `{prefix}"));
        format!("{inner_expr} {operator} `{prefix}{alternatives}`")
    })
}

/// `|= ip(`10.0.0.1`)`, the operator being the first parameter
pub fn line_filter_ip_matches_renderer(
    operation: &Operation,
    _def: &OperationDef,
    inner_expr: &str,
) -> String {
    format!(
        "{inner_expr} {} ip(`{}`)",
        param_text(operation, 0),
        param_text(operation, 1)
    )
}

/// `{..} > 5`, or `{..} > bool 5` when the bool modifier is set
pub fn binary_scalar_renderer(sign: &'static str) -> RenderFn {
    Arc::new(move |operation: &Operation, _def: &OperationDef, inner_expr: &str| {
        let modifier = if operation.param(1).is_some_and(ParamValue::is_truthy) {
            " bool"
        } else {
            ""
        };
        format!("{inner_expr} {sign}{modifier} {}", param_text(operation, 0))
    })
}

/// Operations that only change the query structure render nothing themselves
pub fn identity_renderer(_operation: &Operation, _def: &OperationDef, inner_expr: &str) -> String {
    inner_expr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::OperationDef;
    use crate::factory::{
        create_aggregation_operation, create_aggregation_operation_with_param,
        create_range_operation, create_range_operation_with_grouping,
    };
    use crate::types::{OperationCategory, OperationParamDef};

    const INNER: &str = "{app=\"api\"}";

    fn stage(operation_id: &str) -> OperationDef {
        OperationDef::new(
            operation_id,
            operation_id,
            OperationCategory::Formats,
            Arc::new(pipeline_renderer),
        )
    }

    #[test]
    fn test_range_vector_renderer() {
        let def = create_range_operation("rate", false);
        let op = Operation::new("rate", vec!["5m".into()]);
        assert_eq!(def.render(&op, INNER), "rate({app=\"api\"} [5m])");
    }

    #[test]
    fn test_range_vector_renderer_quantile() {
        let def = create_range_operation("quantile_over_time", false);
        let op = Operation::new("quantile_over_time", vec!["$__auto".into(), "0.95".into()]);
        assert_eq!(
            def.render(&op, "<inner>"),
            "quantile_over_time(0.95, <inner> [$__auto])"
        );
    }

    #[test]
    fn test_range_vector_renderer_missing_range() {
        let def = create_range_operation("count_over_time", false);
        let op = Operation::new("count_over_time", vec![]);
        assert_eq!(def.render(&op, "<inner>"), "count_over_time(<inner> [$__auto])");
    }

    #[test]
    fn test_grouped_range_renderer() {
        let defs = create_range_operation_with_grouping("avg_over_time");
        let op = Operation::new("__avg_over_time_by", vec!["1m".into(), "job".into(), "app".into()]);
        assert_eq!(
            defs[1].render(&op, "<inner>"),
            "avg_over_time(<inner> [1m]) by (job, app)"
        );

        let op = Operation::new("__avg_over_time_without", vec!["1m".into(), "job".into()]);
        assert_eq!(
            defs[2].render(&op, "<inner>"),
            "avg_over_time(<inner> [1m]) without (job)"
        );
    }

    #[test]
    fn test_grouped_quantile_renderer() {
        let defs = create_range_operation_with_grouping("quantile_over_time");
        let op = Operation::new(
            "__quantile_over_time_by",
            vec!["5m".into(), ParamValue::Number(0.99), "job".into()],
        );
        assert_eq!(
            defs[1].render(&op, "<inner>"),
            "quantile_over_time(0.99, <inner> [5m]) by (job)"
        );
    }

    #[test]
    fn test_aggregation_renderers() {
        let defs = create_aggregation_operation("sum", Default::default());

        let base = Operation::new("sum", vec![]);
        assert_eq!(defs[0].render(&base, "<inner>"), "sum(<inner>)");

        let by = Operation::new("__sum_by", vec!["job".into(), "app".into()]);
        assert_eq!(defs[1].render(&by, "<inner>"), "sum by(job, app) (<inner>)");

        let without = Operation::new("__sum_without", vec!["job".into()]);
        assert_eq!(defs[2].render(&without, "<inner>"), "sum without(job) (<inner>)");
    }

    #[test]
    fn test_aggregation_with_param_renderers() {
        let defs = create_aggregation_operation_with_param(
            "topk",
            vec![OperationParamDef::number("K-value")],
            vec![ParamValue::Number(5.0)],
            Default::default(),
        );

        let base = Operation::new("topk", vec![ParamValue::Number(5.0)]);
        assert_eq!(defs[0].render(&base, "<inner>"), "topk(5, <inner>)");

        let by = Operation::new("__topk_by", vec![ParamValue::Number(5.0), "job".into()]);
        assert_eq!(defs[1].render(&by, "<inner>"), "topk by(job) (5, <inner>)");

        let without = Operation::new("__topk_without", vec![ParamValue::Number(3.0), "job".into()]);
        assert_eq!(defs[2].render(&without, "<inner>"), "topk without(job) (3, <inner>)");
    }

    #[test]
    fn test_aggregation_with_string_param_is_quoted() {
        let defs = create_aggregation_operation_with_param(
            "count_values",
            vec![OperationParamDef::string("Label")],
            vec!["value".into()],
            Default::default(),
        );
        let by = Operation::new("__count_values_by", vec!["value".into(), "job".into()]);
        assert_eq!(
            defs[1].render(&by, "<inner>"),
            "count_values by(job) (\"value\", <inner>)"
        );
    }

    #[test]
    fn test_function_renderer_left_without_inner() {
        let def = OperationDef::new(
            "vector",
            "Vector",
            OperationCategory::Functions,
            Arc::new(function_renderer_left),
        )
        .with_params(vec![OperationParamDef::number("Value")]);
        let op = Operation::new("vector", vec![ParamValue::Number(1.0)]);
        assert_eq!(def.render(&op, ""), "vector(1)");
    }

    #[test]
    fn test_logfmt_renderer() {
        let op = Operation::new(
            "logfmt",
            vec![true.into(), false.into(), "a".into(), "".into(), "b".into()],
        );
        assert_eq!(stage("logfmt").render(&op, "<inner>"), "<inner> | logfmt --strict a, b");
    }

    #[test]
    fn test_logfmt_renderer_defaults() {
        let op = Operation::new("logfmt", vec![]);
        assert_eq!(stage("logfmt").render(&op, "<inner>"), "<inner> | logfmt");

        let op = Operation::new("logfmt", vec![false.into(), true.into()]);
        assert_eq!(
            stage("logfmt").render(&op, "<inner>"),
            "<inner> | logfmt --keep-empty"
        );
    }

    #[test]
    fn test_label_list_stages() {
        let op = Operation::new("json", vec!["a".into(), "".into(), "b".into()]);
        assert_eq!(stage("json").render(&op, "<inner>"), "<inner> | json a, b");

        let op = Operation::new("drop", vec!["".into()]);
        assert_eq!(stage("drop").render(&op, "<inner>"), "<inner> | drop");

        let op = Operation::new("keep", vec!["level".into()]);
        assert_eq!(stage("keep").render(&op, "<inner>"), "<inner> | keep level");
    }

    #[test]
    fn test_pipeline_renderer_fallback_ignores_params() {
        let op = Operation::new("decolorize", vec!["ignored".into()]);
        assert_eq!(stage("decolorize").render(&op, "<inner>"), "<inner> | decolorize");
    }

    #[test]
    fn test_label_filter_renderer() {
        let def = stage(id::LABEL_FILTER);
        let numeric = Operation::new(id::LABEL_FILTER, vec!["status".into(), ">=".into(), "500".into()]);
        assert_eq!(
            label_filter_renderer(&numeric, &def, "<inner>"),
            "<inner> | status >= 500"
        );

        let string = Operation::new(id::LABEL_FILTER, vec!["level".into(), "=~".into(), "err.*".into()]);
        assert_eq!(
            label_filter_renderer(&string, &def, "<inner>"),
            "<inner> | level =~ `err.*`"
        );
    }

    #[test]
    fn test_line_filter_renderer() {
        let def = stage(id::LINE_MATCHES_REGEX);
        let op = Operation::new(id::LINE_MATCHES_REGEX, vec!["foo".into(), "bar".into()]);

        let insensitive = line_filter_renderer("|~", true);
        assert_eq!(
            insensitive(&op, &def, "<inner>"),
            "<inner> |~ `(?i)foo` or `(?i)bar`"
        );

        let sensitive = line_filter_renderer("|=", false);
        assert_eq!(sensitive(&op, &def, "<inner>"), "<inner> |= `foo` or `bar`");
    }

    #[test]
    fn test_line_filter_renderer_without_params() {
        let def = stage(id::LINE_CONTAINS);
        let empty = Operation::new(id::LINE_CONTAINS, vec![]);

        let sensitive = line_filter_renderer("|=", false);
        assert_eq!(sensitive(&empty, &def, "<inner>"), "<inner> |= ``");

        let insensitive = line_filter_renderer("|~", true);
        assert_eq!(insensitive(&empty, &def, "<inner>"), "<inner> |~ `(?i)`");

        let blank = Operation::new(id::LINE_CONTAINS, vec!["".into()]);
        assert_eq!(sensitive(&blank, &def, "<inner>"), "<inner> |= ``");
    }

    #[test]
    fn test_unwrap_and_label_format() {
        let def = stage(id::UNWRAP);
        let plain = Operation::new(id::UNWRAP, vec!["latency".into(), "".into()]);
        assert_eq!(unwrap_renderer(&plain, &def, "<inner>"), "<inner> | unwrap latency");

        let converted = Operation::new(id::UNWRAP, vec!["latency".into(), "duration".into()]);
        assert_eq!(
            unwrap_renderer(&converted, &def, "<inner>"),
            "<inner> | unwrap duration(latency)"
        );

        let rename = Operation::new(id::LABEL_FORMAT, vec!["old".into(), "new".into()]);
        assert_eq!(
            label_format_renderer(&rename, &def, "<inner>"),
            "<inner> | label_format new=old"
        );
    }

    #[test]
    fn test_binary_scalar_renderer() {
        let def = stage(id::GREATER_THAN);
        let render = binary_scalar_renderer(">");

        let op = Operation::new(id::GREATER_THAN, vec![ParamValue::Number(5.0), false.into()]);
        assert_eq!(render(&op, &def, "<inner>"), "<inner> > 5");

        let op = Operation::new(id::GREATER_THAN, vec![ParamValue::Number(5.0), true.into()]);
        assert_eq!(render(&op, &def, "<inner>"), "<inner> > bool 5");
    }
}

//! The catalogue of LogQL operations offered by the builder

use std::sync::Arc;

use crate::definition::{OperationDef, OperationDefOverrides};
use crate::explain::static_explainer;
use crate::factory::{
    create_aggregation_operation, create_aggregation_operation_with_param, create_range_operation,
    create_range_operation_with_grouping,
};
use crate::operation_id as id;
use crate::placement::{add_loki_operation, add_nested_query_handler};
use crate::render::{
    binary_scalar_renderer, function_renderer_left, identity_renderer, label_filter_ip_matches_renderer,
    label_filter_no_errors_renderer, label_filter_renderer, label_format_renderer,
    line_filter_ip_matches_renderer, line_filter_renderer, pipeline_renderer,
    quoted_stage_renderer, unwrap_renderer,
};
use crate::text::display_name;
use crate::types::{OperationCategory, OperationOrder, OperationParamDef, ParamValue};

const LABEL_FILTER_OPERATORS: [&str; 8] = ["=", "!=", "=~", "!~", ">", "<", ">=", "<="];
const UNWRAP_CONVERSIONS: [&str; 3] = ["duration", "duration_seconds", "bytes"];

/// Every definition of the LogQL builder, variants included
pub fn operation_definitions() -> Vec<OperationDef> {
    let mut defs = Vec::new();
    defs.extend(aggregation_definitions());
    defs.extend(range_function_definitions());
    defs.extend(function_definitions());
    defs.extend(format_definitions());
    defs.extend(line_filter_definitions());
    defs.extend(label_filter_definitions());
    defs.extend(binary_operation_definitions());
    defs
}

fn aggregation_definitions() -> Vec<OperationDef> {
    let overrides = OperationDefOverrides {
        add_operation_handler: Some(Arc::new(add_loki_operation)),
        ..Default::default()
    };

    let mut defs = Vec::new();
    for name in [
        id::SUM,
        id::MIN,
        id::MAX,
        id::AVG,
        id::STDDEV,
        id::STDVAR,
        id::COUNT,
    ] {
        defs.extend(create_aggregation_operation(name, overrides.clone()));
    }
    for name in [id::TOPK, id::BOTTOMK] {
        defs.extend(create_aggregation_operation_with_param(
            name,
            vec![OperationParamDef::number("K-value")],
            vec![ParamValue::Number(5.0)],
            overrides.clone(),
        ));
    }
    defs
}

fn range_function_definitions() -> Vec<OperationDef> {
    let mut defs: Vec<OperationDef> = [
        id::RATE,
        id::RATE_COUNTER,
        id::COUNT_OVER_TIME,
        id::SUM_OVER_TIME,
        id::BYTES_RATE,
        id::BYTES_OVER_TIME,
        id::ABSENT_OVER_TIME,
    ]
    .into_iter()
    .map(|name| create_range_operation(name, false))
    .collect();

    for name in [
        id::AVG_OVER_TIME,
        id::MAX_OVER_TIME,
        id::MIN_OVER_TIME,
        id::FIRST_OVER_TIME,
        id::LAST_OVER_TIME,
        id::STDVAR_OVER_TIME,
        id::STDDEV_OVER_TIME,
        id::QUANTILE_OVER_TIME,
    ] {
        defs.extend(create_range_operation_with_grouping(name));
    }
    defs
}

fn function_definitions() -> Vec<OperationDef> {
    [
        (id::SORT, "Sorts vector elements ascending by their sample value."),
        (id::SORT_DESC, "Sorts vector elements descending by their sample value."),
    ]
    .into_iter()
    .map(|(name, explanation)| {
        OperationDef::new(
            name,
            display_name(name),
            OperationCategory::Functions,
            Arc::new(function_renderer_left),
        )
        .with_alternatives_key("sort")
        .with_explain_handler(static_explainer(explanation))
        .with_add_operation_handler(Arc::new(add_loki_operation))
    })
    .collect()
}

fn format_def(name: &str, rank: OperationOrder, explanation: &'static str) -> OperationDef {
    OperationDef::new(
        name,
        display_name(name),
        OperationCategory::Formats,
        Arc::new(pipeline_renderer),
    )
    .with_alternatives_key("format")
    .with_order_rank(rank.rank())
    .with_explain_handler(static_explainer(explanation))
    .with_add_operation_handler(Arc::new(add_loki_operation))
}

fn format_definitions() -> Vec<OperationDef> {
    vec![
        format_def(
            id::JSON,
            OperationOrder::Parsers,
            "Extracts keys and values from a json formatted log line as labels.",
        )
        .with_params(vec![OperationParamDef::string("Expression").rest().optional()]),
        format_def(
            id::LOGFMT,
            OperationOrder::Parsers,
            "Extracts all keys and values from a logfmt formatted log line as labels.",
        )
        .with_params(vec![
            OperationParamDef::boolean("Strict").optional(),
            OperationParamDef::boolean("Keep empty").optional(),
            OperationParamDef::string("Label").rest().optional(),
        ])
        .with_default_params(vec![false.into(), false.into()]),
        format_def(
            id::REGEXP,
            OperationOrder::Parsers,
            "Extracts labels from the log line using named capture groups of a regular expression.",
        )
        .with_params(vec![OperationParamDef::string("String")])
        .with_default_params(vec!["".into()])
        .with_renderer(quoted_stage_renderer("regexp")),
        format_def(
            id::PATTERN,
            OperationOrder::Parsers,
            "Extracts fields from the log line by matching it against a pattern expression.",
        )
        .with_params(vec![OperationParamDef::string("String")])
        .with_default_params(vec!["".into()])
        .with_renderer(quoted_stage_renderer("pattern")),
        format_def(
            id::UNPACK,
            OperationOrder::Parsers,
            "Unpacks all json properties and the packed log line of a pack stage.",
        ),
        format_def(
            id::LINE_FORMAT,
            OperationOrder::PipeOperations,
            "Rewrites the log line content using a text template.",
        )
        .with_params(vec![OperationParamDef::string("String")])
        .with_default_params(vec!["".into()])
        .with_renderer(quoted_stage_renderer("line_format")),
        format_def(
            id::LABEL_FORMAT,
            OperationOrder::PipeOperations,
            "Renames a label.",
        )
        .with_params(vec![
            OperationParamDef::string("Label"),
            OperationParamDef::string("Rename to"),
        ])
        .with_default_params(vec!["".into(), "".into()])
        .with_renderer(Arc::new(label_format_renderer)),
        format_def(
            id::UNWRAP,
            OperationOrder::Unwrap,
            "Uses an extracted label as sample value for unwrapped range aggregations.",
        )
        .with_params(vec![
            OperationParamDef::string("Identifier"),
            OperationParamDef::string("Conversion function")
                .with_options(UNWRAP_CONVERSIONS)
                .optional(),
        ])
        .with_default_params(vec!["".into(), "".into()])
        .with_renderer(Arc::new(unwrap_renderer)),
        format_def(
            id::DECOLORIZE,
            OperationOrder::PipeOperations,
            "Strips ANSI color codes from log lines.",
        ),
        format_def(
            id::DROP,
            OperationOrder::PipeOperations,
            "Removes the listed labels from the label set.",
        )
        .with_params(vec![OperationParamDef::string("Label").rest().optional()])
        .with_default_params(vec!["".into()]),
        format_def(
            id::KEEP,
            OperationOrder::PipeOperations,
            "Keeps only the listed labels in the label set.",
        )
        .with_params(vec![OperationParamDef::string("Label").rest().optional()])
        .with_default_params(vec!["".into()]),
    ]
}

fn line_filter_definitions() -> Vec<OperationDef> {
    let text_filters = [
        (id::LINE_CONTAINS, "Line contains", "|=", false),
        (id::LINE_CONTAINS_NOT, "Line does not contain", "!=", false),
        (
            id::LINE_CONTAINS_CASE_INSENSITIVE,
            "Line contains case insensitive",
            "|~",
            true,
        ),
        (
            id::LINE_CONTAINS_NOT_CASE_INSENSITIVE,
            "Line does not contain case insensitive",
            "!~",
            true,
        ),
        (id::LINE_MATCHES_REGEX, "Line contains regex match", "|~", false),
        (id::LINE_MATCHES_REGEX_NOT, "Line does not match regex", "!~", false),
    ];

    let mut defs: Vec<OperationDef> = text_filters
        .into_iter()
        .map(|(operation_id, name, operator, case_insensitive)| {
            OperationDef::new(
                operation_id,
                name,
                OperationCategory::LineFilters,
                line_filter_renderer(operator, case_insensitive),
            )
            .with_params(vec![OperationParamDef::string("Text").rest()])
            .with_default_params(vec!["".into()])
            .with_alternatives_key("Line filters")
            .with_order_rank(OperationOrder::LineFilters.rank())
            .with_explain_handler(static_explainer(
                "Keeps only the log lines passing the filter expression.",
            ))
            .with_add_operation_handler(Arc::new(add_loki_operation))
        })
        .collect();

    defs.push(
        OperationDef::new(
            id::LINE_FILTER_IP_MATCHES,
            "IP line filter expression",
            OperationCategory::LineFilters,
            Arc::new(line_filter_ip_matches_renderer),
        )
        .with_params(vec![
            OperationParamDef::string("Operator").with_options(["|=", "!="]),
            OperationParamDef::string("Pattern"),
        ])
        .with_default_params(vec!["|=".into(), "".into()])
        .with_alternatives_key("Line filters")
        .with_order_rank(OperationOrder::LineFilters.rank())
        .with_explain_handler(static_explainer(
            "Keeps only the log lines containing an IP address matching the pattern.",
        ))
        .with_add_operation_handler(Arc::new(add_loki_operation)),
    );
    defs
}

fn label_filter_definitions() -> Vec<OperationDef> {
    vec![
        OperationDef::new(
            id::LABEL_FILTER,
            "Label filter expression",
            OperationCategory::LabelFilters,
            Arc::new(label_filter_renderer),
        )
        .with_params(vec![
            OperationParamDef::string("Label"),
            OperationParamDef::string("Operator").with_options(LABEL_FILTER_OPERATORS),
            OperationParamDef::string("Value"),
        ])
        .with_default_params(vec!["".into(), "=".into(), "".into()])
        .with_alternatives_key("Label filters")
        .with_order_rank(OperationOrder::PipeOperations.rank())
        .with_explain_handler(static_explainer(
            "Keeps only the log lines whose extracted label matches the expression.",
        ))
        .with_add_operation_handler(Arc::new(add_loki_operation)),
        OperationDef::new(
            id::LABEL_FILTER_IP_MATCHES,
            "IP label filter expression",
            OperationCategory::LabelFilters,
            Arc::new(label_filter_ip_matches_renderer),
        )
        .with_params(vec![
            OperationParamDef::string("Label"),
            OperationParamDef::string("Operator").with_options(["=", "!="]),
            OperationParamDef::string("Value"),
        ])
        .with_default_params(vec!["".into(), "=".into(), "".into()])
        .with_alternatives_key("Label filters")
        .with_order_rank(OperationOrder::PipeOperations.rank())
        .with_explain_handler(static_explainer(
            "Keeps only the log lines whose label holds an IP address matching the pattern.",
        ))
        .with_add_operation_handler(Arc::new(add_loki_operation)),
        OperationDef::new(
            id::LABEL_FILTER_NO_ERRORS,
            "No pipeline errors",
            OperationCategory::LabelFilters,
            Arc::new(label_filter_no_errors_renderer),
        )
        .with_alternatives_key("Label filters")
        .with_order_rank(OperationOrder::NoErrors.rank())
        .with_explain_handler(static_explainer(
            "Filters out all formatting and parsing errors.",
        ))
        .with_add_operation_handler(Arc::new(add_loki_operation)),
    ]
}

fn binary_operation_definitions() -> Vec<OperationDef> {
    let scalar_operations = [
        (id::ADDITION, "Add scalar", "+", false),
        (id::SUBTRACTION, "Subtract scalar", "-", false),
        (id::MULTIPLY_BY, "Multiply by scalar", "*", false),
        (id::DIVIDE_BY, "Divide by scalar", "/", false),
        (id::MODULO, "Modulo by scalar", "%", false),
        (id::EXPONENT, "Exponent", "^", false),
        (id::EQUAL_TO, "Equal to", "==", true),
        (id::NOT_EQUAL_TO, "Not equal to", "!=", true),
        (id::GREATER_THAN, "Greater than", ">", true),
        (id::LESS_THAN, "Less than", "<", true),
        (id::GREATER_OR_EQUAL, "Greater or equal to", ">=", true),
        (id::LESS_OR_EQUAL, "Less or equal to", "<=", true),
    ];

    let mut defs: Vec<OperationDef> = scalar_operations
        .into_iter()
        .map(|(operation_id, name, sign, comparison)| {
            let mut params = vec![OperationParamDef::number("Value")];
            let mut default_params = vec![ParamValue::Number(2.0)];
            if comparison {
                params.push(OperationParamDef::boolean("Bool"));
                default_params.push(false.into());
            }

            OperationDef::new(
                operation_id,
                name,
                OperationCategory::BinaryOps,
                binary_scalar_renderer(sign),
            )
            .with_params(params)
            .with_default_params(default_params)
            .with_alternatives_key("binary scalar operations")
            .with_explain_handler(static_explainer(
                "Applies the operation to every sample value and the given scalar.",
            ))
        })
        .collect();

    defs.push(
        OperationDef::new(
            id::NESTED_QUERY,
            "Binary operation with query",
            OperationCategory::BinaryOps,
            Arc::new(identity_renderer),
        )
        .with_explain_handler(static_explainer(
            "Combines the query with a second query through a binary operator.",
        ))
        .with_add_operation_handler(Arc::new(add_nested_query_handler)),
    );
    defs
}

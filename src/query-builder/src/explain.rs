//! Prose explanations of operation instances

use std::sync::Arc;

use crate::definition::{ExplainFn, OperationDef};
use crate::syntax::function_documentation;
use crate::text::pluralize;
use crate::types::{AUTO_RANGE, Operation, ParamValue};
use crate::variant::{GroupingVariant, split_grouping};

const AUTO_RANGE_EXPLANATION: &str = "`$__auto` is a variable that will be replaced with the [value of step](https://grafana.com/docs/grafana/next/datasources/loki/query-editor/#options) for range queries and with the value of the selected time range (calculated to - from) for instant queries.";

const RANGE_VECTOR_DOCS_URL: &str =
    "https://grafana.com/docs/loki/latest/logql/metric_queries/#range-vector-aggregation";

/// Explanation of an aggregation in one of its grouping variants
pub fn aggregation_explainer(aggregation: &str, mode: GroupingVariant) -> ExplainFn {
    let aggregation = aggregation.to_string();
    Arc::new(move |operation: &Operation, def: &OperationDef| {
        let (_, labels) = split_grouping(operation, def);
        let label_list = labels
            .iter()
            .map(|label| format!("`{label}`"))
            .collect::<Vec<_>>()
            .join(" and ");
        let label_word = pluralize("label", labels.len());

        match mode {
            GroupingVariant::By => format!(
                "Calculates {aggregation} over dimensions while preserving {label_word} {label_list}."
            ),
            GroupingVariant::Without => format!(
                "Calculates {aggregation} over the dimensions {label_list}. All other labels are preserved."
            ),
            GroupingVariant::Base => format!("Calculates {aggregation} over the dimensions."),
        }
    })
}

/// Function documentation plus a note on the configured range
pub fn range_function_explainer(operation: &Operation, _def: &OperationDef) -> String {
    let docs = function_documentation(&operation.id).unwrap_or_default();

    match operation.param(0) {
        Some(ParamValue::String(range)) if range != AUTO_RANGE => format!(
            "{docs} The [range vector]({RANGE_VECTOR_DOCS_URL}) is set to `{range}`."
        ),
        Some(range @ ParamValue::Number(_)) => format!(
            "{docs} The [range vector]({RANGE_VECTOR_DOCS_URL}) is set to `{range}`."
        ),
        _ => format!("{docs} {AUTO_RANGE_EXPLANATION}"),
    }
}

/// Explanation that does not depend on the instance
pub fn static_explainer(text: &'static str) -> ExplainFn {
    Arc::new(move |_operation: &Operation, _def: &OperationDef| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::{
        create_aggregation_operation, create_aggregation_operation_with_param,
        create_range_operation,
    };
    use crate::types::OperationParamDef;

    #[test]
    fn test_aggregation_explain_modes() {
        let defs = create_aggregation_operation("sum", Default::default());

        let base = Operation::new("sum", vec![]);
        assert_eq!(
            defs[0].explain(&base).unwrap(),
            "Calculates sum over the dimensions."
        );

        let by = Operation::new("__sum_by", vec!["job".into(), "app".into()]);
        assert_eq!(
            defs[1].explain(&by).unwrap(),
            "Calculates sum over dimensions while preserving labels `job` and `app`."
        );

        let by_one = Operation::new("__sum_by", vec!["job".into()]);
        assert_eq!(
            defs[1].explain(&by_one).unwrap(),
            "Calculates sum over dimensions while preserving label `job`."
        );

        let without = Operation::new("__sum_without", vec!["job".into()]);
        assert_eq!(
            defs[2].explain(&without).unwrap(),
            "Calculates sum over the dimensions `job`. All other labels are preserved."
        );
    }

    #[test]
    fn test_parameterized_aggregation_explains_only_labels() {
        let defs = create_aggregation_operation_with_param(
            "topk",
            vec![OperationParamDef::number("K-value")],
            vec![ParamValue::Number(5.0)],
            Default::default(),
        );
        let by = Operation::new("__topk_by", vec![ParamValue::Number(5.0), "job".into()]);
        assert_eq!(
            defs[1].explain(&by).unwrap(),
            "Calculates topk over dimensions while preserving label `job`."
        );
    }

    #[test]
    fn test_range_function_explain() {
        let def = create_range_operation("rate", false);

        let auto = def.explain(&Operation::new("rate", vec!["$__auto".into()])).unwrap();
        assert!(auto.starts_with("Calculates the number of entries per second."));
        assert!(auto.contains("`$__auto` is a variable"));

        let fixed = def.explain(&Operation::new("rate", vec!["5m".into()])).unwrap();
        assert!(fixed.ends_with("is set to `5m`."));
        assert!(!fixed.contains("$__auto"));
    }
}

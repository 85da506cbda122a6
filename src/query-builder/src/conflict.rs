//! Detection of contradicting label filters
//!
//! Two label filters contradict each other when they compare the same label
//! against the same value and exactly one of them is negated, such as
//! `env="prod"` and `env!="prod"`.

use crate::operation_id as id;
use crate::types::Operation;

fn is_negated(operation: &Operation) -> bool {
    operation
        .param(1)
        .is_some_and(|operator| operator.to_string().starts_with('!'))
}

/// Whether `operation` contradicts one of the label filters in `query_operations`
pub fn is_conflicting_filter(operation: &Operation, query_operations: &[Operation]) -> bool {
    let operation_is_negated = is_negated(operation);

    query_operations
        .iter()
        .filter(|candidate| {
            candidate.id == id::LABEL_FILTER
                && candidate.param(0) == operation.param(0)
                && candidate.param(2) == operation.param(2)
        })
        .any(|candidate| is_negated(candidate) != operation_is_negated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label_filter(label: &str, op: &str, value: &str) -> Operation {
        Operation::new(id::LABEL_FILTER, vec![label.into(), op.into(), value.into()])
    }

    #[test]
    fn test_opposite_negation_conflicts() {
        let existing = vec![label_filter("env", "=", "prod")];
        assert!(is_conflicting_filter(&label_filter("env", "!=", "prod"), &existing));

        let existing = vec![label_filter("env", "!~", "prod")];
        assert!(is_conflicting_filter(&label_filter("env", "=~", "prod"), &existing));
    }

    #[test]
    fn test_identical_filter_does_not_conflict() {
        let existing = vec![label_filter("env", "=", "prod")];
        assert!(!is_conflicting_filter(&label_filter("env", "=", "prod"), &existing));
    }

    #[test]
    fn test_different_label_or_value_does_not_conflict() {
        let existing = vec![label_filter("env", "=", "prod")];
        assert!(!is_conflicting_filter(&label_filter("region", "!=", "prod"), &existing));
        assert!(!is_conflicting_filter(&label_filter("env", "!=", "dev"), &existing));
    }

    #[test]
    fn test_only_label_filters_are_candidates() {
        let existing = vec![Operation::new(
            id::LABEL_FILTER_IP_MATCHES,
            vec!["env".into(), "=".into(), "prod".into()],
        )];
        assert!(!is_conflicting_filter(&label_filter("env", "!=", "prod"), &existing));
    }

    #[test]
    fn test_incomplete_filters_are_tolerated() {
        let existing = vec![Operation::new(id::LABEL_FILTER, vec![])];
        assert!(!is_conflicting_filter(&Operation::new(id::LABEL_FILTER, vec![]), &existing));
    }
}

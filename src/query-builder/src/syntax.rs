//! Short documentation of the LogQL range functions, shown by explanations

use crate::operation_id as id;

const FUNCTION_DOCS: &[(&str, &str)] = &[
    (id::RATE, "Calculates the number of entries per second."),
    (
        id::RATE_COUNTER,
        "Calculates per second rate of the values in the interval and treats them as a counter metric.",
    ),
    (id::COUNT_OVER_TIME, "Counts the entries for each log stream within the given range."),
    (id::SUM_OVER_TIME, "The sum of all values in the specified interval."),
    (id::AVG_OVER_TIME, "The average of all values in the specified interval."),
    (id::MAX_OVER_TIME, "The maximum of all values in the specified interval."),
    (id::MIN_OVER_TIME, "The minimum of all values in the specified interval."),
    (id::FIRST_OVER_TIME, "The first of all values in the specified interval."),
    (id::LAST_OVER_TIME, "The last of all values in the specified interval."),
    (
        id::STDVAR_OVER_TIME,
        "The population standard variance of the values in the specified interval.",
    ),
    (
        id::STDDEV_OVER_TIME,
        "The population standard deviation of the values in the specified interval.",
    ),
    (
        id::QUANTILE_OVER_TIME,
        "The φ-quantile (0 ≤ φ ≤ 1) of the values in the specified interval.",
    ),
    (id::BYTES_RATE, "Calculates the number of bytes per second for each stream."),
    (id::BYTES_OVER_TIME, "Counts the amount of bytes used by each log stream for a given range."),
    (
        id::ABSENT_OVER_TIME,
        "Returns an empty vector if the range vector passed to it has any elements and a 1-element vector with the value 1 if the range vector passed to it has no elements.",
    ),
];

/// Documentation string of a function id
pub fn function_documentation(function_id: &str) -> Option<&'static str> {
    FUNCTION_DOCS
        .iter()
        .find(|(name, _)| *name == function_id)
        .map(|(_, doc)| *doc)
}

//! Ids of the LogQL operations in the registry
//!
//! Function and stage ids are the language-level names. Ids starting with
//! `__` are builder-internal and never appear verbatim in rendered queries.

pub const JSON: &str = "json";
pub const LOGFMT: &str = "logfmt";
pub const REGEXP: &str = "regexp";
pub const PATTERN: &str = "pattern";
pub const UNPACK: &str = "unpack";
pub const LINE_FORMAT: &str = "line_format";
pub const LABEL_FORMAT: &str = "label_format";
pub const DECOLORIZE: &str = "decolorize";
pub const DROP: &str = "drop";
pub const KEEP: &str = "keep";
pub const UNWRAP: &str = "unwrap";

pub const RATE: &str = "rate";
pub const RATE_COUNTER: &str = "rate_counter";
pub const COUNT_OVER_TIME: &str = "count_over_time";
pub const SUM_OVER_TIME: &str = "sum_over_time";
pub const AVG_OVER_TIME: &str = "avg_over_time";
pub const MAX_OVER_TIME: &str = "max_over_time";
pub const MIN_OVER_TIME: &str = "min_over_time";
pub const FIRST_OVER_TIME: &str = "first_over_time";
pub const LAST_OVER_TIME: &str = "last_over_time";
pub const STDVAR_OVER_TIME: &str = "stdvar_over_time";
pub const STDDEV_OVER_TIME: &str = "stddev_over_time";
pub const QUANTILE_OVER_TIME: &str = "quantile_over_time";
pub const BYTES_RATE: &str = "bytes_rate";
pub const BYTES_OVER_TIME: &str = "bytes_over_time";
pub const ABSENT_OVER_TIME: &str = "absent_over_time";

pub const SUM: &str = "sum";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const AVG: &str = "avg";
pub const STDDEV: &str = "stddev";
pub const STDVAR: &str = "stdvar";
pub const COUNT: &str = "count";
pub const TOPK: &str = "topk";
pub const BOTTOMK: &str = "bottomk";

pub const SORT: &str = "sort";
pub const SORT_DESC: &str = "sort_desc";

pub const LINE_CONTAINS: &str = "__line_contains";
pub const LINE_CONTAINS_NOT: &str = "__line_contains_not";
pub const LINE_CONTAINS_CASE_INSENSITIVE: &str = "__line_contains_case_insensitive";
pub const LINE_CONTAINS_NOT_CASE_INSENSITIVE: &str = "__line_contains_not_case_insensitive";
pub const LINE_MATCHES_REGEX: &str = "__line_matches_regex";
pub const LINE_MATCHES_REGEX_NOT: &str = "__line_matches_regex_not";
pub const LINE_FILTER_IP_MATCHES: &str = "__line_filter_ip_matches";

pub const LABEL_FILTER: &str = "__label_filter";
pub const LABEL_FILTER_NO_ERRORS: &str = "__label_filter_no_errors";
pub const LABEL_FILTER_IP_MATCHES: &str = "__label_filter_ip_matches";

pub const ADDITION: &str = "__addition";
pub const SUBTRACTION: &str = "__subtraction";
pub const MULTIPLY_BY: &str = "__multiply_by";
pub const DIVIDE_BY: &str = "__divide_by";
pub const MODULO: &str = "__modulo";
pub const EXPONENT: &str = "__exponent";
pub const EQUAL_TO: &str = "__equal_to";
pub const NOT_EQUAL_TO: &str = "__not_equal_to";
pub const GREATER_THAN: &str = "__greater_than";
pub const LESS_THAN: &str = "__less_than";
pub const GREATER_OR_EQUAL: &str = "__greater_or_equal";
pub const LESS_OR_EQUAL: &str = "__less_or_equal";
pub const NESTED_QUERY: &str = "__nested_query";

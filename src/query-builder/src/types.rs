//! Visual query model
//!
//! The structured representation a user assembles: a label selector, an
//! ordered list of operations and optional binary sub-queries. Everything
//! here is plain data and serializes to the JSON shape the editor exchanges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::QueryBuilderError;

/// Placeholder range resolved to the query step or time range at execution time
pub const AUTO_RANGE: &str = "$__auto";

/// Rank used for definitions that do not declare one
pub const DEFAULT_ORDER_RANK: i32 = 100;

/// A single parameter value of an operation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl ParamValue {
    /// Whether the value counts as present when empty parameters are filtered out
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Value type of a parameter slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

/// Editor component used for label-name parameters
pub const LABEL_PARAM_EDITOR: &str = "LabelParamEditor";

/// Static description of one parameter slot
#[derive(Debug, Clone, PartialEq)]
pub struct OperationParamDef {
    /// Display label
    pub name: String,
    pub param_type: ParamType,
    /// Finite list of allowed values, if the slot is constrained
    pub options: Vec<ParamValue>,
    /// Marks a variable-length trailing group of same-typed values
    pub rest_param: bool,
    pub optional: bool,
    /// Opaque reference to a custom input editor, never invoked by this crate
    pub editor: Option<&'static str>,
}

impl OperationParamDef {
    fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            options: Vec::new(),
            rest_param: false,
            optional: false,
            editor: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn number(name: &str) -> Self {
        Self::new(name, ParamType::Number)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    pub fn with_options<I, V>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest_param = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_editor(mut self, editor: &'static str) -> Self {
        self.editor = Some(editor);
        self
    }
}

/// Grouping of operations, drives placement and listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    Aggregations,
    RangeFunctions,
    Functions,
    Formats,
    LineFilters,
    LabelFilters,
    BinaryOps,
}

impl OperationCategory {
    pub const ALL: [OperationCategory; 7] = [
        Self::Aggregations,
        Self::RangeFunctions,
        Self::Functions,
        Self::Formats,
        Self::LineFilters,
        Self::LabelFilters,
        Self::BinaryOps,
    ];
}

impl fmt::Display for OperationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregations => write!(f, "Aggregations"),
            Self::RangeFunctions => write!(f, "Range functions"),
            Self::Functions => write!(f, "Functions"),
            Self::Formats => write!(f, "Formats"),
            Self::LineFilters => write!(f, "Line filters"),
            Self::LabelFilters => write!(f, "Label filters"),
            Self::BinaryOps => write!(f, "Binary operations"),
        }
    }
}

impl FromStr for OperationCategory {
    type Err = String;

    /// Accepts the display name in any case, with spaces, dashes or underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        Self::ALL
            .into_iter()
            .find(|category| {
                let name: String = category
                    .to_string()
                    .chars()
                    .filter(|c| *c != ' ')
                    .flat_map(char::to_lowercase)
                    .collect();
                name == wanted
            })
            .ok_or_else(|| format!("unknown operation category '{s}'"))
    }
}

/// Order ranks of the pipeline stages; lower sorts earlier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationOrder {
    LineFilters = 1,
    Parsers = 2,
    PipeOperations = 3,
    Unwrap = 5,
    NoErrors = 6,
    RangeVectorFunction = 7,
}

impl OperationOrder {
    pub fn rank(self) -> i32 {
        self as i32
    }
}

/// An operation instance inside a visual query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Id of the definition this instance belongs to
    pub id: String,
    #[serde(default, deserialize_with = "deserialize_params")]
    pub params: Vec<ParamValue>,
}

/// Parameter list tolerant of `null`: trailing nulls are dropped like missing
/// parameters, nulls in between become empty strings to keep positions
fn deserialize_params<'de, D>(deserializer: D) -> Result<Vec<ParamValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut params =
        Option::<Vec<Option<ParamValue>>>::deserialize(deserializer)?.unwrap_or_default();
    while matches!(params.last(), Some(None)) {
        params.pop();
    }

    Ok(params
        .into_iter()
        .map(|param| param.unwrap_or_else(|| ParamValue::String(String::new())))
        .collect())
}

impl Operation {
    pub fn new(id: impl Into<String>, params: Vec<ParamValue>) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }

    pub fn param(&self, index: usize) -> Option<&ParamValue> {
        self.params.get(index)
    }
}

/// A label matcher of the stream selector, e.g. `app="api"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorLabel {
    pub label: String,
    pub op: String,
    pub value: String,
}

impl SelectorLabel {
    pub fn new(label: &str, op: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            op: op.to_string(),
            value: value.to_string(),
        }
    }
}

/// A second query combined with the owning one through a binary operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryQuery {
    pub operator: String,
    pub query: VisualQuery,
}

/// The aggregate root assembled by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualQuery {
    #[serde(default)]
    pub labels: Vec<SelectorLabel>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub binary_queries: Vec<BinaryQuery>,
}

impl VisualQuery {
    pub fn new(labels: Vec<SelectorLabel>, operations: Vec<Operation>) -> Self {
        Self {
            labels,
            operations,
            binary_queries: Vec::new(),
        }
    }

    /// Copy of this query with a different operation list
    pub fn with_operations(&self, operations: Vec<Operation>) -> Self {
        Self {
            labels: self.labels.clone(),
            operations,
            binary_queries: self.binary_queries.clone(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, QueryBuilderError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, QueryBuilderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Form-field id of an operation parameter in the editor
pub fn operation_param_id(operation_id: &str, param_index: usize) -> String {
    format!("operations.{operation_id}.param.{param_index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_value_truthiness() {
        assert!(!ParamValue::from("").is_truthy());
        assert!(ParamValue::from("a").is_truthy());
        assert!(!ParamValue::from(false).is_truthy());
        assert!(ParamValue::from(true).is_truthy());
        assert!(!ParamValue::from(0.0).is_truthy());
        assert!(ParamValue::from(5.0).is_truthy());
    }

    #[test]
    fn test_param_value_display() {
        assert_eq!(ParamValue::from(5.0).to_string(), "5");
        assert_eq!(ParamValue::from(0.95).to_string(), "0.95");
        assert_eq!(ParamValue::from("5m").to_string(), "5m");
        assert_eq!(ParamValue::from(true).to_string(), "true");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!(
            "range functions".parse::<OperationCategory>(),
            Ok(OperationCategory::RangeFunctions)
        );
        assert_eq!(
            "label-filters".parse::<OperationCategory>(),
            Ok(OperationCategory::LabelFilters)
        );
        assert_eq!(
            "BinaryOperations".parse::<OperationCategory>(),
            Ok(OperationCategory::BinaryOps)
        );
        assert!("nope".parse::<OperationCategory>().is_err());
    }

    #[test]
    fn test_visual_query_json_shape() {
        let json = r#"{
            "labels": [{"label": "app", "op": "=", "value": "api"}],
            "operations": [
                {"id": "logfmt", "params": [true, false, "level"]},
                {"id": "rate", "params": ["5m"]},
                {"id": "topk", "params": [5]}
            ],
            "binaryQueries": [
                {"operator": "/", "query": {"labels": [], "operations": []}}
            ]
        }"#;

        let query = VisualQuery::from_json(json).unwrap();
        assert_eq!(query.labels[0], SelectorLabel::new("app", "=", "api"));
        assert_eq!(
            query.operations[0].params,
            vec![
                ParamValue::Bool(true),
                ParamValue::Bool(false),
                ParamValue::from("level")
            ]
        );
        assert_eq!(query.operations[2].params, vec![ParamValue::Number(5.0)]);
        assert_eq!(query.binary_queries.len(), 1);
        assert_eq!(query.binary_queries[0].operator, "/");
    }

    #[test]
    fn test_order_ranks() {
        let ranks = [
            OperationOrder::LineFilters,
            OperationOrder::Parsers,
            OperationOrder::PipeOperations,
            OperationOrder::Unwrap,
            OperationOrder::NoErrors,
            OperationOrder::RangeVectorFunction,
        ]
        .map(OperationOrder::rank);
        assert_eq!(ranks, [1, 2, 3, 5, 6, 7]);
        assert!(ranks.iter().all(|rank| *rank < DEFAULT_ORDER_RANK));
    }

    #[test]
    fn test_null_params_are_tolerated() {
        let json = r#"{
            "operations": [
                {"id": "logfmt", "params": [true, null, "level", null, null]},
                {"id": "rate", "params": null},
                {"id": "json", "params": [null]}
            ]
        }"#;

        let query = VisualQuery::from_json(json).unwrap();
        assert_eq!(
            query.operations[0].params,
            vec![ParamValue::Bool(true), ParamValue::from(""), ParamValue::from("level")]
        );
        assert!(query.operations[1].params.is_empty());
        assert!(query.operations[2].params.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = VisualQuery::from_json("{\"operations\": 5}");
        assert!(matches!(result, Err(QueryBuilderError::Serialization(_))));
    }

    #[test]
    fn test_operation_param_id() {
        assert_eq!(operation_param_id("rate", 0), "operations.rate.param.0");
    }
}

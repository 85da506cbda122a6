//! Visual query builder core for LogQL
//!
//! This crate models a LogQL query as structured data, a label selector plus
//! an ordered list of operations, and turns that model back into query text.
//! Each operation is described by an [`OperationDef`] that carries its own
//! rendering, placement and parameter-edit behaviour.
//!
//! # Architecture
//!
//! ```text
//! VisualQuery → LokiQueryModeller → OperationRegistry → OperationDef handlers → LogQL string
//! ```
//!
//! # Modules
//!
//! - [`types`] - the visual query model and parameter definitions
//! - [`definition`] - operation definitions and their handler signatures
//! - [`factory`] - builders for aggregation and range function families
//! - [`render`] - renderers turning instances into LogQL fragments
//! - [`placement`] - where newly added operations land in the pipeline
//! - [`variant`] - switching between plain, `by` and `without` variants
//! - [`modeller`] - the registry and the modeller driving it
//!
//! # Example
//!
//! ```
//! use query_builder::{LokiQueryModeller, SelectorLabel, VisualQuery};
//!
//! let modeller = LokiQueryModeller::loki();
//! let query = VisualQuery::new(vec![SelectorLabel::new("app", "=", "api")], vec![]);
//! let query = modeller.add_operation(&query, "sum")?;
//!
//! assert_eq!(modeller.render_query(&query), "sum(rate({app=\"api\"} [$__auto]))");
//! # Ok::<(), query_builder::QueryBuilderError>(())
//! ```

pub mod conflict;
pub mod definition;
pub mod error;
pub mod explain;
pub mod factory;
pub mod modeller;
pub mod operation_id;
pub mod operations;
pub mod placement;
pub mod render;
pub mod syntax;
pub mod text;
pub mod types;
pub mod variant;

pub use definition::{OperationDef, OperationDefOverrides};
pub use error::QueryBuilderError;
pub use modeller::{
    LokiQueryModeller, OperationExplanation, OperationRegistry, QueryModeller, loki_registry,
};
pub use types::{
    BinaryQuery, Operation, OperationCategory, OperationParamDef, ParamValue, SelectorLabel,
    VisualQuery,
};
pub use variant::GroupingVariant;

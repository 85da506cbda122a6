//! Error types for the query builder
//!
//! The builder operations themselves are total: renderers, handlers, the
//! insertion engine and the conflict detector never fail. These errors cover
//! the edges around them, such as registry construction and id-driven edits.

use thiserror::Error;

/// Errors that can occur around visual query building
#[derive(Error, Debug)]
pub enum QueryBuilderError {
    /// Two definitions in one registry share an id
    #[error("Duplicate operation definition '{0}'")]
    DuplicateOperation(String),
    /// The registry holds no definition for the id
    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),
    /// An edit addressed an operation the query does not have
    #[error("Operation index {index} out of range for query with {len} operations")]
    OperationIndexOutOfRange { index: usize, len: usize },
    /// An edit addressed a parameter slot the operation does not have
    #[error("Parameter index {index} out of range for operation '{id}'")]
    ParamIndexOutOfRange { id: String, index: usize },
    /// A visual query could not be encoded or decoded
    #[error("Visual query serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

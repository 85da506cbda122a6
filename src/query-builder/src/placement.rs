//! Placement of newly added operations
//!
//! Decides where a fresh instance lands in the pipeline:
//!
//! - aggregations and functions go last, and pull in a `rate` beneath them
//!   when the pipeline has no range function yet
//! - a range function replaces the existing one in place
//! - everything else is inserted before the first operation of strictly
//!   greater order rank, keeping equal-rank operations in insertion order

use crate::definition::OperationDef;
use crate::modeller::QueryModeller;
use crate::operation_id as id;
use crate::types::{AUTO_RANGE, BinaryQuery, Operation, OperationCategory, VisualQuery};

/// Operator used when a nested query is added
pub const NESTED_QUERY_OPERATOR: &str = "/";

fn is_range_vector_function(def: &OperationDef) -> bool {
    def.category == OperationCategory::RangeFunctions
}

/// Index of the first operation whose definition satisfies `condition`, or the end
///
/// Operations whose id the modeller cannot resolve never match.
fn index_of_or_last(
    operations: &[Operation],
    modeller: &dyn QueryModeller,
    condition: impl Fn(&OperationDef) -> bool,
) -> usize {
    operations
        .iter()
        .position(|operation| {
            modeller
                .get_operation_def(&operation.id)
                .is_some_and(&condition)
        })
        .unwrap_or(operations.len())
}

/// Add handler of the LogQL metric and pipeline operations
pub fn add_loki_operation(
    def: &OperationDef,
    query: &VisualQuery,
    modeller: &dyn QueryModeller,
) -> VisualQuery {
    let new_operation = def.new_operation();
    let mut operations = query.operations.clone();

    let existing_range_function = operations.iter().position(|operation| {
        modeller
            .get_operation_def(&operation.id)
            .is_some_and(is_range_vector_function)
    });

    match (def.category, existing_range_function) {
        (OperationCategory::Aggregations | OperationCategory::Functions, existing) => {
            if existing.is_none() {
                let place_to_insert = index_of_or_last(&operations, modeller, |existing| {
                    existing.category == OperationCategory::Functions
                });
                log::debug!(
                    "No range function before '{}', inserting {} at {}",
                    def.id,
                    id::RATE,
                    place_to_insert
                );
                operations.insert(
                    place_to_insert,
                    Operation::new(id::RATE, vec![AUTO_RANGE.into()]),
                );
            }
            operations.push(new_operation);
        }
        (OperationCategory::RangeFunctions, Some(index)) => {
            log::debug!(
                "Replacing range function '{}' at {} with '{}'",
                operations[index].id,
                index,
                def.id
            );
            operations[index] = new_operation;
        }
        _ => {
            let rank = def.rank();
            let place_to_insert =
                index_of_or_last(&operations, modeller, |existing| rank < existing.rank());
            operations.insert(place_to_insert, new_operation);
        }
    }

    query.with_operations(operations)
}

/// Append a fresh instance at the end of the pipeline
pub fn default_add_operation_handler(
    def: &OperationDef,
    query: &VisualQuery,
    _modeller: &dyn QueryModeller,
) -> VisualQuery {
    let mut operations = query.operations.clone();
    operations.push(def.new_operation());
    query.with_operations(operations)
}

/// Combine the query with a copy of itself through a division
pub fn add_nested_query_handler(
    _def: &OperationDef,
    query: &VisualQuery,
    _modeller: &dyn QueryModeller,
) -> VisualQuery {
    let mut nested = query.clone();
    nested.binary_queries.push(BinaryQuery {
        operator: NESTED_QUERY_OPERATOR.to_string(),
        query: query.clone(),
    });
    nested
}

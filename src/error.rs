use thiserror::Error;

/// Errors that can occur in trellis-kge.
///
/// Every variant is a programmer or data-mapping error: nothing here is
/// retried, and callers are expected to fix the input rather than recover.
#[derive(Error, Debug)]
pub enum Error {
    /// Parallel triple columns have mismatched lengths.
    #[error("triple column length mismatch: heads={heads}, relations={relations}, tails={tails}")]
    Shape {
        heads: usize,
        relations: usize,
        tails: usize,
    },
    /// A per-example sequence (loss, distances) does not match the batch size.
    #[error("batch length mismatch: expected {expected}, got {actual}")]
    BatchLength { expected: usize, actual: usize },
    /// Entity ID beyond the table (entity_count real rows + 1 padding row).
    #[error("entity id {id} out of range for {count} entities")]
    EntityOutOfRange { id: usize, count: usize },
    /// Relation ID beyond the table (relation_count real rows + 1 padding row).
    #[error("relation id {id} out of range for {count} relations")]
    RelationOutOfRange { id: usize, count: usize },
    /// Ranking metrics are undefined over an empty evaluation set.
    #[error("evaluation set is empty; ranking metrics are undefined")]
    EmptyEvaluationSet,
    /// A non-padding embedding row has zero norm and cannot be normalized.
    #[error("degenerate zero-norm row {index} in {table} table")]
    DegenerateEmbedding { table: &'static str, index: usize },
    /// Restored embedding table does not match the model configuration.
    #[error("{table} table shape {actual:?} does not match configuration {expected:?}")]
    TableShape {
        table: &'static str,
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

/// Result type alias for trellis-kge.
pub type Result<T> = std::result::Result<T, Error>;

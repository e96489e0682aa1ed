use serde::Serialize;

// ---------------------------------------------------------------------------
/// Error Handling
// ---------------------------------------------------------------------------

/// Errors surfaced by the periodization engine.
///
/// Configuration problems are rejected before any row is written; database
/// failures roll the enclosing transaction back. Missing or zero maxes are
/// NOT errors - the affected exercise falls back to a qualitative
/// prescription so one absent lift never blocks a whole program.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Program template not found: {0}")]
    TemplateNotFound(String),

    #[error("Invalid customization: {0}")]
    InvalidCustomization(String),

    #[error("Training block not found: {0}")]
    BlockNotFound(i64),

    #[error("Planned workout not found: {0}")]
    WorkoutNotFound(i64),

    #[error("Concurrent update detected: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Serialize for EngineError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

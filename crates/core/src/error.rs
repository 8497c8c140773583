/// Reasons a plugin payload cannot become a record.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp: '{value}'")]
    InvalidTimestamp { value: String },
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("Invalid input: {field} {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ScoreError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ScoreError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinSimError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Simulation already finished after {total_years} year(s)")]
    SimulationFinished { total_years: u32 },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinSimError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        FinSimError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FinSimError {
    fn from(e: serde_json::Error) -> Self {
        FinSimError::SerializationError(e.to_string())
    }
}

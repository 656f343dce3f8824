use thiserror::Error;

/// Failures surfaced by the portrait pipeline. None of them are retried.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("{0}")]
    Input(String),
    #[error("API error {status}: {body}")]
    Transport { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    Payload(String),
    #[error("Storage error: {0}")]
    Persistence(String),
}

impl ForgeError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ForgeError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for ForgeError {
    fn from(err: sqlx::Error) -> Self {
        ForgeError::Persistence(err.to_string())
    }
}

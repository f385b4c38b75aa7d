use thiserror::Error;

#[derive(Debug, Error)]
pub enum DissectError {
    #[error("Invalid {role} rectangle: {reason}")]
    InvalidRect { role: String, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Coordinate {value} does not fit the dissection grid")]
    GridOverflow { value: f64 },
    #[error("Unknown notifier id: {0}")]
    UnknownNotifier(u64),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DissectError>;

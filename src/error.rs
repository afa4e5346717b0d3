use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("invalid grid spacing: dx={dx}, dy={dy} (both must be > 0)")]
    InvalidGridSpacing { dx: f64, dy: f64 },
    #[error("point index {index} out of range for profile with {len} points")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("profile '{name}' already exists for sample '{sample_id}'")]
    DuplicateName { sample_id: String, name: String },
    #[error("profile '{name}' not found for sample '{sample_id}'")]
    NotFound { sample_id: String, name: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProfileError>;

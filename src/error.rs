use thiserror::Error;

use crate::pipeline::TaskType;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Invalid task type: {0}")]
    InvalidTaskType(String),

    #[error("Pipeline discovery failed with status {status}: {body}")]
    ResolverUnavailable { status: u16, body: String },

    #[error("Inference endpoint not initialized; resolve a task type first")]
    BundleNotInitialized,

    #[error("Pipeline not configured for task type '{0}'")]
    PipelineNotConfigured(TaskType),

    #[error("Inference call failed with status {status}: {body}")]
    InferenceFailed { status: u16, body: String },

    #[error("Invalid pipeline input: {0}")]
    InvalidInput(String),

    #[error("Malformed pipeline response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Audio encoding error: {0}")]
    Audio(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, KioskError>;

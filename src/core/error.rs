use thiserror::Error;


#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("{0}")]
    NotFound(String),

    #[error("Division undefined: {0}")]
    DivisionUndefined(String),

    #[error("Model not loaded. Provide a trained model artifact first.")]
    ModelUnavailable,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model artifact error: {0}")]
    Model(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlannerError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// True for lookup misses, which callers surface as a 404-equivalent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}


pub type Result<T> = std::result::Result<T, PlannerError>;

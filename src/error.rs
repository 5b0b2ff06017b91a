use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

/// Failure kinds surfaced by corpus construction, metric computation and table lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Inconsistent input or a conflicting field registration.
    #[error("configuration error: {0}")]
    Config(String),
    /// Unknown field, system, query or metric.
    #[error("lookup error: {0}")]
    Lookup(String),
    /// Argument or value of the wrong shape.
    #[error("type error: {0}")]
    Type(String),
    /// Well-formed but semantically invalid argument.
    #[error("value error: {0}")]
    Value(String),
    /// Operation not allowed for the current corpus.
    #[error("state error: {0}")]
    State(String),
}

impl EvalError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::Type(message.into())
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::Value(message.into())
    }

    pub fn state(message: impl Into<String>) -> Self {
        Self::State(message.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Lookup(_) => "lookup",
            Self::Type(_) => "type",
            Self::Value(_) => "value",
            Self::State(_) => "state",
        }
    }
}

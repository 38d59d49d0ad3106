use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("error parsing optimization configuration")]
    ConfigurationParse(#[source] Arc<serde_json::Error>),
    #[error("optimization configuration has neither schema nor rules")]
    EmptyConfiguration,
    #[error("unknown schema function {0:?}")]
    UnknownSchemaFunction(String),
    #[error("unknown result function {0:?}")]
    UnknownResultFunction(String),
    #[error("invalid arguments for function {function:?}: {reason}")]
    InvalidFunctionArgs { function: String, reason: String },
    #[error("rule #{rule} has {actual} conditions, but schema defines {expected} levels")]
    ConditionCountMismatch {
        rule: usize,
        expected: usize,
        actual: usize,
    },
    #[error("rule #{rule} has no result function")]
    MissingResult { rule: usize },
    #[error("function {function:?} failed: {reason}")]
    FunctionCall { function: String, reason: String },
    // std::io::Error is not clonable, so we're wrapping it in an Arc.
    #[error(transparent)]
    Io(Arc<std::io::Error>),
}

impl Error {
    pub(crate) fn invalid_args(function: &str, reason: impl ToString) -> Self {
        Error::InvalidFunctionArgs {
            function: function.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(Arc::new(value))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::ConfigurationParse(Arc::new(value))
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoesisError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Value out of range: {value} is not within [0, 1]")]
    Range { value: f32 },
    #[error("Parse error: {message}")]
    Parse { message: String, line: Option<usize>, col: Option<usize> },
    #[error("Invalid term: {0}")]
    Term(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NoesisError>;

// Helper conversions
impl From<config::ConfigError> for NoesisError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl NoesisError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into(), line: None, col: None }
    }
}


use thiserror::Error;

#[derive(Error, Debug)]
pub enum SylvaError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Too many clauses: {count} exceeds the configured limit of {max}")]
    TooManyClauses { count: usize, max: usize },
    #[error("Invalid call: {0}")]
    InvalidCall(&'static str),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, SylvaError>;

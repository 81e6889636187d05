use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnipError {
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),

    #[error(transparent)]
    Variable(#[from] crate::variables::VariableError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error(transparent)]
    Usage(#[from] crate::usage::UsageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type SnipResult<T> = Result<T, SnipError>;

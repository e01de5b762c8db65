//! Custom error types

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

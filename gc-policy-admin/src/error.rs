//! Admin error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

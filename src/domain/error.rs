//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent violated preconditions of the pure bundling logic.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("nothing to bundle: module list is empty")]
    EmptyProject,

    #[error("module has no content: {path}")]
    MissingContent { path: PathBuf },
}

//! Top-level error type for harness operations.

use thiserror::Error;

use callcheck_core::RegistryError;

use crate::fixtures::FixtureError;

/// Anything that can stop a harness operation before or outside a run.
/// Per-case outcomes are verdicts and never show up here.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

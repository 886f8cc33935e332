//! Orchestration layer for the callcheck conformance harness.
//!
//! Everything above the dispatch boundary lives here:
//!
//! - [`runner`]: the sequential run lifecycle, pending to finalized.
//! - [`report`]: verdict accumulation, console output, shareable reports.
//! - [`fixtures`]: the JSON case format and its hand-rolled parser.
//! - [`capture`]: snapshotting observed behavior into a fixture set.
//! - [`structured_log`]: JSONL logging, validation, artifact digests.
//! - [`error`]: the top-level error type the CLI reports.
//!
//! The crate never dereferences a pointer; dispatch is delegated to the
//! binding layer and this code only sees values and verdicts.

pub mod capture;
pub mod error;
pub mod fixtures;
pub mod report;
pub mod runner;
pub mod structured_log;

pub use capture::capture_fixture;
pub use error::HarnessError;
pub use fixtures::{FixtureCase, FixtureError, FixtureSet};
pub use report::{ConformanceReport, ReportEmitter, RunSummary};
pub use runner::Runner;
pub use structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, SharedBuffer, sha256_hex, validate_log_file,
    validate_log_line,
};

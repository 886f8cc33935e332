//! Dispatch layer for the callcheck conformance harness.
//!
//! This is the crate that actually calls routines. It keeps all unsafe
//! code in one place behind a safe surface:
//!
//! - [`binding`]: the concrete `C-unwind` function-pointer shapes and the
//!   rules for which signatures fit them.
//! - [`table`]: the symbol table a run resolves cases against.
//! - [`invoke`]: marshalling, the single guarded call, and side-effect
//!   capture.
//!
//! Callers never see a raw pointer: arguments go in as values, results
//! come back as values, and a routine that unwinds costs exactly one
//! `Fault` verdict.

pub mod binding;
pub mod invoke;
pub mod table;

pub use binding::{IntFn1, IntFn2, IntFn8, PtrPairFn, RoutineBinding};
pub use invoke::invoke;
pub use table::RoutineTable;

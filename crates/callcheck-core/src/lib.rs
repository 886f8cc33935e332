//! Core contracts for the callcheck conformance harness.
//!
//! This crate is the pure half of the harness: data types and judgement
//! logic with no unsafe code and no knowledge of how routines are actually
//! dispatched.
//!
//! - [`value`]: scalar argument/return types and slot widening rules.
//! - [`signature`]: call shapes derived from supplied arguments.
//! - [`case`]: named cases with arguments and expectations.
//! - [`registry`]: validated, ordered case collection and its errors.
//! - [`invocation`]: raw observations from a single call.
//! - [`expect`]: pure evaluation of observations against expectations.
//! - [`diff`]: one-line mismatch renderings.
//! - [`verdict`]: per-case pass/fail outcomes.
//!
//! The intended flow is `Registry` -> invoke (elsewhere) ->
//! [`expect::evaluate`] -> [`verdict::Verdict`], with every step a plain
//! value transformation.

pub mod case;
pub mod diff;
pub mod expect;
pub mod invocation;
pub mod registry;
pub mod signature;
pub mod value;
pub mod verdict;

pub use case::{ArgValue, Expectation, TestCase};
pub use expect::evaluate;
pub use invocation::{FaultInfo, InvocationOutcome, InvocationResult};
pub use registry::{Registry, RegistryError};
pub use signature::Signature;
pub use value::{ArgType, RetType, Value};
pub use verdict::{Verdict, VerdictKind};

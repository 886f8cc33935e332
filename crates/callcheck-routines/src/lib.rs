//! Specimen routines for the callcheck conformance harness.
//!
//! Everything here models hand-written low-level code as a caller sees
//! it: exported symbols with fixed C prototypes, hidden static state, and
//! a couple of specimens that misbehave on purpose. The harness crates
//! treat these exactly like foreign routines; nothing in here is reached
//! except through the symbol table.
//!
//! - [`arith`]: integer specimens, including the divide-trap one.
//! - [`buffer`]: pointer specimens working on caller-owned bytes.
//! - [`journal`]: callee-side record of which specimens ran.
//! - [`catalog`]: the stock symbol table and conformance corpus.

pub mod arith;
pub mod buffer;
pub mod catalog;
pub mod journal;

pub use catalog::{corpus_cases, routine_table};
pub use journal::{CallJournal, journal};

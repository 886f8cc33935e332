//! Expectation engine: pure comparison of observed results against
//! declared expectations.
//!
//! [`evaluate`] is a function of its two arguments and nothing else. It
//! never re-invokes a routine, so judging a result twice is harmless and
//! yields the same verdict both times.

use crate::case::TestCase;
use crate::diff::{render_buffer_diff, render_value_diff};
use crate::invocation::{InvocationOutcome, InvocationResult};
use crate::verdict::Verdict;

/// Judge one observed result against its case's expectation.
///
/// A faulted call fails regardless of the expectation. A completed call is
/// checked against the expected return value and every expected buffer
/// state; all disagreements are reported in one verdict, joined by `"; "`.
/// A case with an empty expectation passes on any completed call.
#[must_use]
pub fn evaluate(case: &TestCase, result: &InvocationResult) -> Verdict {
    match &result.outcome {
        InvocationOutcome::Fault(info) => Verdict::fault(
            &case.name,
            format!("fault in {}: {}", info.symbol, info.message),
        ),
        InvocationOutcome::Completed { ret, side_effects } => {
            let mut diffs = Vec::new();

            if let Some(expected) = case.expect.ret {
                if *ret != expected {
                    diffs.push(render_value_diff(expected, *ret));
                }
            }

            for (&arg, expected) in &case.expect.side_effects {
                match side_effects.get(&arg) {
                    Some(actual) if actual == expected => {}
                    Some(actual) => diffs.push(render_buffer_diff(arg, expected, actual)),
                    None => diffs.push(format!("buf[{arg}]: no bytes captured")),
                }
            }

            if diffs.is_empty() {
                Verdict::pass(&case.name)
            } else {
                Verdict::mismatch(&case.name, diffs.join("; "))
            }
        }
    }
}

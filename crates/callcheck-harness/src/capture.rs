//! Fixture capture: run the corpus once and write down what it did.
//!
//! Capture inverts the usual flow. Instead of judging observations
//! against expectations, it invokes each case and records the observed
//! behavior *as* the expectation, producing a fixture set that pins the
//! current routines byte for byte. That includes return values historical
//! callers ignored; a captured fixture is a snapshot, not a judgement.
//!
//! A case that faults during capture is kept, but with an empty
//! expectation and a note saying why: there is no observed behavior worth
//! pinning, and the note stops a reader from mistaking it for a
//! deliberately exploratory case.

use callcheck_abi::{RoutineTable, invoke};
use callcheck_core::{InvocationOutcome, Registry, TestCase};

use crate::error::HarnessError;
use crate::fixtures::FixtureSet;

/// Invoke every case in `registry` once and return the captured fixture
/// set. Configuration errors abort with nothing invoked, exactly as a
/// conformance run would.
pub fn capture_fixture(
    suite: impl Into<String>,
    registry: &Registry,
    table: &RoutineTable,
) -> Result<FixtureSet, HarnessError> {
    let mut resolved = Vec::with_capacity(registry.len());
    for case in registry.all_cases() {
        resolved.push(table.resolve(case)?);
    }

    let mut set = FixtureSet::new(suite);
    set.registry_fingerprint = Some(registry.fingerprint());

    for (case, binding) in registry.all_cases().zip(resolved) {
        let result = invoke(binding, case);
        let fresh = TestCase::new(
            case.name.clone(),
            case.symbol.clone(),
            case.args.clone(),
            case.ret,
        );
        match result.outcome {
            InvocationOutcome::Completed { ret, side_effects } => {
                let mut captured = fresh;
                captured.expect.ret = Some(ret);
                captured.expect.side_effects = side_effects;
                set.push(captured, None);
            }
            InvocationOutcome::Fault(info) => {
                set.push(fresh, Some(format!("faulted during capture: {}", info.message)));
            }
        }
    }
    Ok(set)
}

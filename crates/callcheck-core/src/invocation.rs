//! Raw observations from invoking a routine, before any judgement.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Diagnostic payload for a call that did not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultInfo {
    /// Symbol that was being invoked when the fault fired.
    pub symbol: String,
    /// Human-readable description recovered from the fault.
    pub message: String,
}

/// What one invocation produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// The call returned. `ret` is the typed return value; `side_effects`
    /// holds the post-call bytes of every buffer argument, keyed by
    /// argument index.
    Completed {
        ret: Value,
        side_effects: BTreeMap<usize, Vec<u8>>,
    },
    /// The call aborted. The harness itself survived; only this case is
    /// affected.
    Fault(FaultInfo),
}

/// Everything observed from exactly one invocation of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    pub case_name: String,
    pub outcome: InvocationOutcome,
    /// Wall-clock duration of the call itself, absent for faulted calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl InvocationResult {
    #[must_use]
    pub fn completed(
        case_name: impl Into<String>,
        ret: Value,
        side_effects: BTreeMap<usize, Vec<u8>>,
        duration: Duration,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            outcome: InvocationOutcome::Completed { ret, side_effects },
            duration: Some(duration),
        }
    }

    #[must_use]
    pub fn fault(
        case_name: impl Into<String>,
        symbol: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            case_name: case_name.into(),
            outcome: InvocationOutcome::Fault(FaultInfo {
                symbol: symbol.into(),
                message: message.into(),
            }),
            duration: None,
        }
    }

    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self.outcome, InvocationOutcome::Fault(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_results_carry_typed_return_and_duration() {
        let res = InvocationResult::completed(
            "pair_sum",
            Value::I64(3),
            BTreeMap::new(),
            Duration::from_micros(5),
        );
        assert!(!res.is_fault());
        assert!(res.duration.is_some());
    }

    #[test]
    fn faults_have_no_duration() {
        let res = InvocationResult::fault("div_zero", "div_100_by_arg", "attempt to divide by zero");
        assert!(res.is_fault());
        assert_eq!(res.duration, None);
    }

    #[test]
    fn outcome_serializes_with_snake_case_tags() {
        let res = InvocationResult::fault("x", "s", "m");
        let json = serde_json::to_value(&res).unwrap();
        assert!(json["outcome"]["fault"].is_object());
    }
}

//! Per-case verdicts and their console rendering.

use serde::{Deserialize, Serialize};

/// How a case resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictKind {
    /// Observed behavior matched the expectation.
    Pass,
    /// The call completed but some observation disagreed.
    Mismatch,
    /// The call aborted before producing a result.
    Fault,
}

/// Judgement for exactly one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub case_name: String,
    pub kind: VerdictKind,
    /// One-line explanation for failing verdicts, `None` on a pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

impl Verdict {
    #[must_use]
    pub fn pass(case_name: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            kind: VerdictKind::Pass,
            diff: None,
        }
    }

    #[must_use]
    pub fn mismatch(case_name: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            kind: VerdictKind::Mismatch,
            diff: Some(diff.into()),
        }
    }

    #[must_use]
    pub fn fault(case_name: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            case_name: case_name.into(),
            kind: VerdictKind::Fault,
            diff: Some(diff.into()),
        }
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.kind == VerdictKind::Pass
    }

    /// Canonical one-line console form: `PASS <name>` or `FAIL <name>: <diff>`.
    #[must_use]
    pub fn console_line(&self) -> String {
        if self.passed() {
            format!("PASS {}", self.case_name)
        } else {
            let diff = self.diff.as_deref().unwrap_or("unexplained failure");
            format!("FAIL {}: {diff}", self.case_name)
        }
    }
}

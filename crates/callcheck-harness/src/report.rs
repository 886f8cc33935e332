//! Verdict accumulation and run reporting.
//!
//! The emitter is deliberately move-structured: verdicts are recorded
//! through `&mut self`, and `finalize` consumes the emitter to produce an
//! immutable [`RunSummary`]. Once a summary exists there is no emitter
//! left to record into, so "no verdicts after finalize" holds by
//! construction rather than by a runtime flag.

use serde::{Deserialize, Serialize};

use callcheck_core::{Verdict, VerdictKind};

use crate::structured_log::now_utc;

/// Accumulates verdicts for one run, in completion order.
#[derive(Debug, Default)]
pub struct ReportEmitter {
    verdicts: Vec<Verdict>,
}

impl ReportEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, verdict: Verdict) {
        self.verdicts.push(verdict);
    }

    #[must_use]
    pub fn recorded(&self) -> usize {
        self.verdicts.len()
    }

    /// Close the run and produce its summary.
    #[must_use]
    pub fn finalize(self) -> RunSummary {
        let total = self.verdicts.len();
        let passed = self.verdicts.iter().filter(|v| v.passed()).count();
        RunSummary {
            total,
            passed,
            failed: total - passed,
            verdicts: self.verdicts,
        }
    }
}

/// Immutable outcome of a finalized run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub verdicts: Vec<Verdict>,
}

impl RunSummary {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failing(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| !v.passed())
    }

    /// The fixed console rendering: one `PASS`/`FAIL` line per case in
    /// completion order, then a `X/Y passed` tally.
    #[must_use]
    pub fn render_console(&self) -> String {
        let mut out = String::new();
        for verdict in &self.verdicts {
            out.push_str(&verdict.console_line());
            out.push('\n');
        }
        out.push_str(&format!("{}/{} passed\n", self.passed, self.total));
        out
    }
}

/// A summary dressed up for sharing: title, provenance, and the verdict
/// table, renderable as markdown or JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConformanceReport {
    pub title: String,
    pub run_id: String,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_fingerprint: Option<String>,
    pub summary: RunSummary,
}

impl ConformanceReport {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        run_id: impl Into<String>,
        registry_fingerprint: Option<String>,
        summary: RunSummary,
    ) -> Self {
        Self {
            title: title.into(),
            run_id: run_id.into(),
            generated_at: now_utc(),
            registry_fingerprint,
            summary,
        }
    }

    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- run: {}\n", self.run_id));
        out.push_str(&format!("- generated: {}\n", self.generated_at));
        if let Some(fp) = &self.registry_fingerprint {
            out.push_str(&format!("- corpus fingerprint: `{fp}`\n"));
        }
        out.push_str(&format!(
            "- result: {}/{} passed\n\n",
            self.summary.passed, self.summary.total
        ));
        out.push_str("| case | verdict | detail |\n");
        out.push_str("| --- | --- | --- |\n");
        for v in &self.summary.verdicts {
            let detail = v.diff.as_deref().unwrap_or("").replace('|', "\\|");
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                v.case_name,
                kind_name(v.kind),
                detail
            ));
        }
        out
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn kind_name(kind: VerdictKind) -> &'static str {
    match kind {
        VerdictKind::Pass => "pass",
        VerdictKind::Mismatch => "mismatch",
        VerdictKind::Fault => "fault",
    }
}

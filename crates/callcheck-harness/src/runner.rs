//! Run orchestration: registry in, summary out.
//!
//! A run moves through three states. It is *pending* while bindings are
//! resolved; any configuration error aborts here, with zero routines
//! invoked. It is *running case i* while the i-th case executes; cases run
//! sequentially in registration order and each is invoked exactly once,
//! whatever its verdict. It is *finalized* once the summary exists, and a
//! finalized run cannot accept more results because the accumulator has
//! been consumed. The states are carried by control flow and ownership
//! rather than a status field, and the logged variant emits one event per
//! transition so the lifecycle is visible from the outside.

use serde_json::json;

use callcheck_abi::{RoutineTable, invoke};
use callcheck_core::{Registry, evaluate};

use crate::error::HarnessError;
use crate::report::{ReportEmitter, RunSummary};
use crate::structured_log::{LogEmitter, LogLevel};

/// Sequential executor for one registry against one symbol table.
#[derive(Debug, Clone)]
pub struct Runner {
    run_id: String,
}

impl Runner {
    #[must_use]
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Execute every case and return the summary.
    pub fn run(
        &self,
        registry: &Registry,
        table: &RoutineTable,
    ) -> Result<RunSummary, HarnessError> {
        self.execute(registry, table, None)
    }

    /// Like [`Runner::run`], emitting one structured log event per
    /// lifecycle transition.
    pub fn run_logged(
        &self,
        registry: &Registry,
        table: &RoutineTable,
        emitter: &mut LogEmitter,
    ) -> Result<RunSummary, HarnessError> {
        self.execute(registry, table, Some(emitter))
    }

    fn execute(
        &self,
        registry: &Registry,
        table: &RoutineTable,
        mut log: Option<&mut LogEmitter>,
    ) -> Result<RunSummary, HarnessError> {
        // Pending: resolve every binding up front, so a misconfigured
        // case aborts the run before any routine has been called.
        let mut resolved = Vec::with_capacity(registry.len());
        for case in registry.all_cases() {
            match table.resolve(case) {
                Ok(binding) => resolved.push(binding),
                Err(err) => {
                    if let Some(em) = log.as_deref_mut() {
                        let entry = em
                            .entry(LogLevel::Error, "config_error")
                            .with_case(case.name.clone())
                            .with_symbol(case.symbol.clone())
                            .with_details(json!({ "error": err.to_string() }));
                        em.emit(&entry)?;
                    }
                    return Err(err.into());
                }
            }
        }

        if let Some(em) = log.as_deref_mut() {
            let entry = em.entry(LogLevel::Info, "run_started").with_details(json!({
                "run_id": self.run_id,
                "cases": registry.len(),
                "registry_fingerprint": registry.fingerprint(),
            }));
            em.emit(&entry)?;
        }

        // Running: one invocation per case, in order, faults included.
        let mut report = ReportEmitter::new();
        for (index, (case, binding)) in registry.all_cases().zip(resolved).enumerate() {
            if let Some(em) = log.as_deref_mut() {
                let entry = em
                    .entry(LogLevel::Debug, "case_started")
                    .with_case(case.name.clone())
                    .with_symbol(case.symbol.clone())
                    .with_details(json!({ "index": index }));
                em.emit(&entry)?;
            }

            let result = invoke(binding, case);
            let verdict = evaluate(case, &result);

            if let Some(em) = log.as_deref_mut() {
                let level = if verdict.passed() {
                    LogLevel::Info
                } else {
                    LogLevel::Warn
                };
                let mut entry = em
                    .entry(level, "case_finished")
                    .with_case(case.name.clone())
                    .with_symbol(case.symbol.clone())
                    .with_verdict(verdict.kind);
                if let Some(duration) = result.duration {
                    entry = entry.with_latency_ns(duration.as_nanos());
                }
                if let Some(diff) = &verdict.diff {
                    entry = entry.with_details(json!({ "diff": diff }));
                }
                em.emit(&entry)?;
            }

            report.record(verdict);
        }

        // Finalized: the accumulator is consumed, nothing can be added.
        let summary = report.finalize();
        if let Some(em) = log.as_deref_mut() {
            let entry = em.entry(LogLevel::Info, "run_finalized").with_details(json!({
                "total": summary.total,
                "passed": summary.passed,
                "failed": summary.failed,
            }));
            em.emit(&entry)?;
        }
        Ok(summary)
    }
}

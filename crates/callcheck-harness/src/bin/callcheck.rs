//! Command-line entry point for the conformance harness.
//!
//! `run` executes cases and exits nonzero when any fail, `capture` turns
//! observed behavior into a fixture file, `list` shows what would run
//! without calling anything.

use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use callcheck_core::Registry;
use callcheck_harness::{
    ArtifactIndex, ConformanceReport, FixtureSet, LogEmitter, LogLevel, Runner, capture_fixture,
};
use callcheck_routines::{corpus_cases, routine_table};

#[derive(Parser)]
#[command(name = "callcheck", version, about = "Conformance harness for hand-written routines")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run conformance cases and print one verdict line per case.
    Run(RunArgs),
    /// Invoke the corpus once and write observed behavior as a fixture.
    Capture {
        /// Output fixture path.
        #[arg(long)]
        output: PathBuf,
        /// Suite name recorded in the fixture.
        #[arg(long, default_value = "specimen-corpus")]
        suite: String,
    },
    /// List the cases that would run, without invoking anything.
    List {
        /// JSON fixture file with cases to include.
        #[arg(long)]
        fixture: Option<PathBuf>,
        /// Skip the built-in corpus.
        #[arg(long)]
        no_builtin: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// JSON fixture file with cases to run.
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Skip the built-in corpus.
    #[arg(long)]
    no_builtin: bool,
    /// Write a markdown report to this path.
    #[arg(long)]
    report_md: Option<PathBuf>,
    /// Write a JSON report to this path.
    #[arg(long)]
    report_json: Option<PathBuf>,
    /// Write JSONL structured logs to this path.
    #[arg(long)]
    log: Option<PathBuf>,
    /// Write a digest index of all emitted files to this path.
    #[arg(long)]
    artifact_index: Option<PathBuf>,
    /// Silence the default panic printout from faulting routines.
    #[arg(long)]
    quiet_panics: bool,
    /// Identifier stamped on logs and reports.
    #[arg(long, default_value = "local")]
    run_id: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Capture { output, suite } => capture(&output, suite),
        Command::List { fixture, no_builtin } => list(fixture, no_builtin),
    }
}

fn build_registry(
    fixture: Option<PathBuf>,
    no_builtin: bool,
) -> Result<(Registry, String), Box<dyn Error>> {
    let mut registry = Registry::new();
    let mut suite = String::from("specimen-corpus");
    if !no_builtin {
        registry.register_all(corpus_cases())?;
    }
    if let Some(path) = fixture {
        let set = FixtureSet::from_file(&path)?;
        if no_builtin {
            suite = set.suite.clone();
        }
        registry.register_all(set.into_cases())?;
    }
    Ok((registry, suite))
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    if args.quiet_panics {
        // Faulting routines unwind through a catch; without this the
        // default hook still prints a backtrace banner per fault.
        std::panic::set_hook(Box::new(|_| {}));
    }

    let (registry, suite) = build_registry(args.fixture, args.no_builtin)?;
    let table = routine_table();
    let runner = Runner::new(&args.run_id);

    let mut log_emitter = match &args.log {
        Some(path) => Some(LogEmitter::to_file(path, &suite, &args.run_id)?),
        None => None,
    };
    let summary = match log_emitter.as_mut() {
        Some(em) => runner.run_logged(&registry, &table, em)?,
        None => runner.run(&registry, &table)?,
    };

    print!("{}", summary.render_console());

    let fingerprint = Some(registry.fingerprint());
    if let Some(path) = &args.report_md {
        let report = ConformanceReport::new(
            "routine conformance report",
            &args.run_id,
            fingerprint.clone(),
            summary.clone(),
        );
        std::fs::write(path, report.to_markdown())?;
    }
    if let Some(path) = &args.report_json {
        let report = ConformanceReport::new(
            "routine conformance report",
            &args.run_id,
            fingerprint.clone(),
            summary.clone(),
        );
        std::fs::write(path, report.to_json()?)?;
    }

    let exit_code = i32::from(!summary.all_passed());
    if let Some(em) = log_emitter.as_mut() {
        let entry = em
            .entry(LogLevel::Info, "process_exit")
            .with_exit_code(exit_code);
        em.emit(&entry)?;
    }
    drop(log_emitter);

    if let Some(path) = &args.artifact_index {
        let mut index = ArtifactIndex::new();
        if let Some(p) = &args.log {
            index.record_file("log", p)?;
        }
        if let Some(p) = &args.report_md {
            index.record_file("report_md", p)?;
        }
        if let Some(p) = &args.report_json {
            index.record_file("report_json", p)?;
        }
        index.write_to(path)?;
    }

    if summary.all_passed() {
        Ok(())
    } else {
        Err(format!("{} case(s) failed", summary.failed).into())
    }
}

fn capture(output: &Path, suite: String) -> Result<(), Box<dyn Error>> {
    let mut registry = Registry::new();
    registry.register_all(corpus_cases())?;
    let table = routine_table();
    let set = capture_fixture(suite, &registry, &table)?;
    let count = set.cases.len();
    set.write_to(output)?;
    println!("captured {count} case(s) to {}", output.display());
    Ok(())
}

fn list(fixture: Option<PathBuf>, no_builtin: bool) -> Result<(), Box<dyn Error>> {
    let (registry, _) = build_registry(fixture, no_builtin)?;
    for case in registry.all_cases() {
        println!("{:<24} {:<20} {}", case.name, case.symbol, case.signature());
    }
    println!("{} case(s)", registry.len());
    Ok(())
}

//! Structured JSONL logging and artifact bookkeeping for harness runs.
//!
//! Every log line is one JSON object with a `timestamp`, a `trace_id`, a
//! `level`, and an `event`, plus whatever optional context the event
//! carries. Trace ids are `<suite>::<run>::<seq>` with a zero-padded
//! three-digit sequence, so a grep for one run id returns its lines in
//! order. The validator below is the contract: anything the emitter
//! writes, the validator accepts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use callcheck_core::VerdictKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ---------- entries ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// One structured log line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub trace_id: String,
    pub level: LogLevel,
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<VerdictKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ns: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_refs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl LogEntry {
    #[must_use]
    pub fn new(trace_id: impl Into<String>, level: LogLevel, event: impl Into<String>) -> Self {
        Self {
            timestamp: now_utc(),
            trace_id: trace_id.into(),
            level,
            event: event.into(),
            suite: None,
            case: None,
            symbol: None,
            verdict: None,
            latency_ns: None,
            exit_code: None,
            artifact_refs: None,
            details: None,
        }
    }

    #[must_use]
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = Some(suite.into());
        self
    }

    #[must_use]
    pub fn with_case(mut self, case: impl Into<String>) -> Self {
        self.case = Some(case.into());
        self
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    #[must_use]
    pub fn with_verdict(mut self, verdict: VerdictKind) -> Self {
        self.verdict = Some(verdict);
        self
    }

    #[must_use]
    pub fn with_latency_ns(mut self, latency_ns: u128) -> Self {
        self.latency_ns = Some(latency_ns);
        self
    }

    #[must_use]
    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = Some(exit_code);
        self
    }

    #[must_use]
    pub fn with_artifact_refs(mut self, refs: Vec<String>) -> Self {
        self.artifact_refs = Some(refs);
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

// ---------- emitter ----------

/// Serializes entries to a sink, one JSON object per line, assigning
/// sequential trace ids as it goes.
pub struct LogEmitter {
    sink: Box<dyn Write + Send>,
    suite: String,
    run_id: String,
    seq: u64,
}

impl LogEmitter {
    pub fn to_file(
        path: impl AsRef<Path>,
        suite: impl Into<String>,
        run_id: impl Into<String>,
    ) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::to_sink(Box::new(BufWriter::new(file)), suite, run_id))
    }

    #[must_use]
    pub fn to_sink(
        sink: Box<dyn Write + Send>,
        suite: impl Into<String>,
        run_id: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            suite: suite.into(),
            run_id: run_id.into(),
            seq: 0,
        }
    }

    /// Next `<suite>::<run>::<seq>` id. Sequence numbers start at 001.
    fn next_trace_id(&mut self) -> String {
        self.seq += 1;
        format!("{}::{}::{:03}", self.suite, self.run_id, self.seq)
    }

    /// Build an entry pre-populated with a fresh trace id and this
    /// emitter's suite name.
    #[must_use]
    pub fn entry(&mut self, level: LogLevel, event: impl Into<String>) -> LogEntry {
        let trace_id = self.next_trace_id();
        LogEntry::new(trace_id, level, event).with_suite(self.suite.clone())
    }

    pub fn emit(&mut self, entry: &LogEntry) -> io::Result<()> {
        let line = serde_json::to_string(entry).map_err(io::Error::other)?;
        self.sink.write_all(line.as_bytes())?;
        self.sink.write_all(b"\n")?;
        self.sink.flush()
    }
}

/// In-memory sink usable from tests and from code that wants to read the
/// lines back after the emitter is gone.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------- validation ----------

/// Parse one log line and check the fields every line must carry.
pub fn validate_log_line(line: &str) -> Result<LogEntry, String> {
    let entry: LogEntry =
        serde_json::from_str(line).map_err(|e| format!("not a log object: {e}"))?;
    if entry.timestamp.is_empty() {
        return Err("empty timestamp".into());
    }
    if entry.event.is_empty() {
        return Err("empty event".into());
    }
    let parts: Vec<&str> = entry.trace_id.split("::").collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(format!("malformed trace id: {}", entry.trace_id));
    }
    if parts[2].parse::<u64>().is_err() {
        return Err(format!("non-numeric trace sequence: {}", parts[2]));
    }
    Ok(entry)
}

/// Validate a whole JSONL document, reporting the first bad line.
pub fn validate_log_file(text: &str) -> Result<Vec<LogEntry>, String> {
    let mut entries = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = validate_log_line(line).map_err(|e| format!("line {}: {e}", idx + 1))?;
        entries.push(entry);
    }
    Ok(entries)
}

// ---------- artifacts ----------

/// Digest record for one emitted artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
}

/// Index of every artifact a run wrote, keyed by logical name. Written as
/// the run's final artifact so a consumer can verify the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactIndex {
    pub artifacts: BTreeMap<String, ArtifactRecord>,
}

impl ArtifactIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `path` under `name`, hashing the file's current contents.
    pub fn record_file(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        self.artifacts.insert(
            name.into(),
            ArtifactRecord {
                path: path.display().to_string(),
                sha256: sha256_hex(&bytes),
                bytes: bytes.len() as u64,
            },
        );
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let text = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, text)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }
}

// ---------- digests and timestamps ----------

#[must_use]
pub fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_lower(&hasher.finalize())
}

/// Current wall clock as `YYYY-MM-DDTHH:MM:SSZ`.
#[must_use]
pub fn now_utc() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format_epoch(secs)
}

fn format_epoch(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (y, m, d) = civil_from_days(days);
    format!(
        "{y:04}-{m:02}-{d:02}T{:02}:{:02}:{:02}Z",
        rem / 3600,
        (rem % 3600) / 60,
        rem % 60
    )
}

/// Proleptic Gregorian date for a day count since 1970-01-01.
fn civil_from_days(z: i64) -> (i64, i64, i64) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted_when_unset() {
        let entry = LogEntry::new("suite::run::001", LogLevel::Info, "run_started");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("\"case\""));
        assert!(!json.contains("\"latency_ns\""));
        assert!(json.contains("\"event\":\"run_started\""));
    }

    #[test]
    fn emitter_assigns_sequential_trace_ids() {
        let buffer = SharedBuffer::new();
        let mut emitter = LogEmitter::to_sink(Box::new(buffer.clone()), "corpus", "run7");

        let first = emitter.entry(LogLevel::Info, "run_started");
        emitter.emit(&first).unwrap();
        let second = emitter.entry(LogLevel::Info, "case_started");
        emitter.emit(&second).unwrap();

        assert_eq!(first.trace_id, "corpus::run7::001");
        assert_eq!(second.trace_id, "corpus::run7::002");
        assert_eq!(buffer.contents().lines().count(), 2);
    }

    #[test]
    fn emitted_lines_satisfy_the_validator() {
        let buffer = SharedBuffer::new();
        let mut emitter = LogEmitter::to_sink(Box::new(buffer.clone()), "corpus", "run7");
        let entry = emitter
            .entry(LogLevel::Info, "case_finished")
            .with_case("pair_sum")
            .with_verdict(VerdictKind::Pass)
            .with_latency_ns(1_200);
        emitter.emit(&entry).unwrap();

        let entries = validate_log_file(&buffer.contents()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].case.as_deref(), Some("pair_sum"));
        assert_eq!(entries[0].verdict, Some(VerdictKind::Pass));
    }

    #[test]
    fn validator_rejects_malformed_trace_ids() {
        let entry = LogEntry::new("no-separators", LogLevel::Info, "x");
        let line = serde_json::to_string(&entry).unwrap();
        assert!(validate_log_line(&line).unwrap_err().contains("malformed trace id"));

        let entry = LogEntry::new("a::b::notanumber", LogLevel::Info, "x");
        let line = serde_json::to_string(&entry).unwrap();
        assert!(validate_log_line(&line).unwrap_err().contains("non-numeric"));
    }

    #[test]
    fn validator_points_at_the_offending_line() {
        let good = serde_json::to_string(&LogEntry::new("a::b::001", LogLevel::Info, "x")).unwrap();
        let text = format!("{good}\nnot json\n");
        let err = validate_log_file(&text).unwrap_err();
        assert!(err.starts_with("line 2:"));
    }

    #[test]
    fn sha256_matches_the_reference_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hex_lower(&[0x00, 0xff]), "00ff");
    }

    #[test]
    fn epoch_formatting_handles_leap_days() {
        assert_eq!(format_epoch(0), "1970-01-01T00:00:00Z");
        // 2000-02-29 was a leap day of a leap century.
        assert_eq!(format_epoch(951_782_400), "2000-02-29T00:00:00Z");
        assert_eq!(format_epoch(951_868_799), "2000-02-29T23:59:59Z");
        assert_eq!(format_epoch(951_868_800), "2000-03-01T00:00:00Z");
    }

    #[test]
    fn artifact_index_digests_files() {
        let dir = std::env::temp_dir().join("callcheck_artifact_index_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.txt");
        std::fs::write(&path, b"abc").unwrap();

        let mut index = ArtifactIndex::new();
        index.record_file("sample", &path).unwrap();
        let record = &index.artifacts["sample"];
        assert_eq!(record.bytes, 3);
        assert_eq!(
            record.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(index.names().collect::<Vec<_>>(), ["sample"]);
    }
}

//! JSON fixture sets: cases as data, loadable without recompiling.
//!
//! The on-disk schema is deliberately parsed by hand rather than derived.
//! A fixture written for a newer harness may declare argument or return
//! types this build does not marshal; that must surface as a typed
//! configuration error naming the case and the offending type, not as a
//! generic deserialization failure, and it must abort the run before any
//! routine is invoked.
//!
//! Schema, one object per file:
//!
//! ```json
//! {
//!   "version": 1,
//!   "suite": "specimen-corpus",
//!   "cases": [
//!     {
//!       "name": "reverse_five_bytes",
//!       "symbol": "reverse_char_array",
//!       "ret": "i64",
//!       "args": [
//!         {"type": "buf", "text": "abcde\u0000"},
//!         {"type": "buf_at", "buf": 0, "offset": 4}
//!       ],
//!       "expect": {"buffers": {"0": "edcba\u0000"}}
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde_json::Value as Json;
use thiserror::Error;

use callcheck_core::{ArgValue, RegistryError, RetType, TestCase, Value};

use crate::structured_log::now_utc;

/// Why a fixture document could not be turned into cases.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported fixture version {0}")]
    Version(u64),

    #[error("fixture {context}: missing field {field}")]
    MissingField { context: String, field: &'static str },

    #[error("fixture {context}: field {field} has the wrong form")]
    InvalidField { context: String, field: &'static str },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// One fixture case: the runnable case plus a free-form annotation that
/// survives capture and reload but never affects judgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    pub case: TestCase,
    pub note: Option<String>,
}

/// A parsed fixture document.
#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub suite: String,
    pub captured_at: Option<String>,
    pub registry_fingerprint: Option<String>,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    pub const VERSION: u64 = 1;

    #[must_use]
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            captured_at: Some(now_utc()),
            registry_fingerprint: None,
            cases: Vec::new(),
        }
    }

    pub fn push(&mut self, case: TestCase, note: Option<String>) {
        self.cases.push(FixtureCase { case, note });
    }

    #[must_use]
    pub fn into_cases(self) -> Vec<TestCase> {
        self.cases.into_iter().map(|fc| fc.case).collect()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, FixtureError> {
        let root: Json = serde_json::from_str(text)?;
        let version = root
            .get("version")
            .and_then(Json::as_u64)
            .ok_or_else(|| FixtureError::MissingField {
                context: "document".into(),
                field: "version",
            })?;
        if version != Self::VERSION {
            return Err(FixtureError::Version(version));
        }
        let suite = str_field(&root, "document", "suite")?;
        let captured_at = opt_str(&root, "captured_at");
        let registry_fingerprint = opt_str(&root, "registry_fingerprint");

        let raw_cases = root
            .get("cases")
            .and_then(Json::as_array)
            .ok_or_else(|| FixtureError::MissingField {
                context: "document".into(),
                field: "cases",
            })?;
        let mut cases = Vec::with_capacity(raw_cases.len());
        for (idx, raw) in raw_cases.iter().enumerate() {
            cases.push(parse_case(raw, idx)?);
        }

        Ok(Self {
            suite,
            captured_at,
            registry_fingerprint,
            cases,
        })
    }

    pub fn to_json(&self) -> Result<String, FixtureError> {
        let mut root = serde_json::Map::new();
        root.insert("version".into(), Json::from(Self::VERSION));
        root.insert("suite".into(), Json::from(self.suite.clone()));
        if let Some(at) = &self.captured_at {
            root.insert("captured_at".into(), Json::from(at.clone()));
        }
        if let Some(fp) = &self.registry_fingerprint {
            root.insert("registry_fingerprint".into(), Json::from(fp.clone()));
        }
        let cases: Vec<Json> = self.cases.iter().map(render_case).collect();
        root.insert("cases".into(), Json::Array(cases));
        Ok(serde_json::to_string_pretty(&Json::Object(root))?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FixtureError> {
        let text = self.to_json()?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

// ---------- reading ----------

fn parse_case(raw: &Json, idx: usize) -> Result<FixtureCase, FixtureError> {
    let fallback = format!("case {idx}");
    let name = str_field(raw, &fallback, "name")?;
    let symbol = str_field(raw, &name, "symbol")?;
    let ret = parse_ret_type(&name, &str_field(raw, &name, "ret")?)?;

    let raw_args = raw
        .get("args")
        .and_then(Json::as_array)
        .ok_or_else(|| FixtureError::MissingField {
            context: name.clone(),
            field: "args",
        })?;
    let mut args = Vec::with_capacity(raw_args.len());
    for raw_arg in raw_args {
        args.push(parse_arg(&name, raw_arg)?);
    }

    let mut case = TestCase::new(name.clone(), symbol, args, ret);
    if let Some(expect) = raw.get("expect") {
        if let Some(ret_value) = expect.get("ret").filter(|v| !v.is_null()) {
            case.expect.ret = Some(parse_typed_number(&name, ret, ret_value)?);
        }
        if let Some(buffers) = expect.get("buffers") {
            let map = buffers
                .as_object()
                .ok_or_else(|| FixtureError::InvalidField {
                    context: name.clone(),
                    field: "expect.buffers",
                })?;
            for (key, value) in map {
                let arg: usize = key.parse().map_err(|_| FixtureError::InvalidField {
                    context: name.clone(),
                    field: "expect.buffers",
                })?;
                let bytes = parse_bytes(&name, "expect.buffers", value)?;
                case.expect.side_effects.insert(arg, bytes);
            }
        }
    }

    Ok(FixtureCase {
        case,
        note: opt_str(raw, "note"),
    })
}

fn parse_ret_type(case: &str, text: &str) -> Result<RetType, FixtureError> {
    match text {
        "i32" => Ok(RetType::I32),
        "u32" => Ok(RetType::U32),
        "i64" => Ok(RetType::I64),
        "u64" => Ok(RetType::U64),
        other => Err(RegistryError::UnsupportedType {
            case: case.to_string(),
            type_name: other.to_string(),
        }
        .into()),
    }
}

fn parse_arg(case: &str, raw: &Json) -> Result<ArgValue, FixtureError> {
    let tag = raw
        .get("type")
        .and_then(Json::as_str)
        .ok_or_else(|| FixtureError::MissingField {
            context: case.to_string(),
            field: "args[].type",
        })?;
    match tag {
        "i32" | "u32" | "i64" | "u64" => {
            let ty = match tag {
                "i32" => RetType::I32,
                "u32" => RetType::U32,
                "i64" => RetType::I64,
                _ => RetType::U64,
            };
            let value = parse_typed_number(case, ty, field(raw, case, "value")?)?;
            Ok(match value {
                Value::I32(v) => ArgValue::I32(v),
                Value::U32(v) => ArgValue::U32(v),
                Value::I64(v) => ArgValue::I64(v),
                Value::U64(v) => ArgValue::U64(v),
            })
        }
        "buf" => Ok(ArgValue::Buf(parse_bytes(case, "args[]", raw)?)),
        "cstr" => Ok(ArgValue::CStr(parse_bytes(case, "args[]", raw)?)),
        "buf_at" => {
            let buf = raw
                .get("buf")
                .and_then(Json::as_u64)
                .ok_or_else(|| FixtureError::MissingField {
                    context: case.to_string(),
                    field: "args[].buf",
                })?;
            let offset = raw
                .get("offset")
                .and_then(Json::as_u64)
                .ok_or_else(|| FixtureError::MissingField {
                    context: case.to_string(),
                    field: "args[].offset",
                })?;
            Ok(ArgValue::BufAt {
                buf: buf as usize,
                offset: offset as usize,
            })
        }
        other => Err(RegistryError::UnsupportedType {
            case: case.to_string(),
            type_name: other.to_string(),
        }
        .into()),
    }
}

/// A JSON number interpreted under a declared scalar type, with range
/// checks for the 32-bit widths.
fn parse_typed_number(case: &str, ty: RetType, raw: &Json) -> Result<Value, FixtureError> {
    let invalid = || FixtureError::InvalidField {
        context: case.to_string(),
        field: "value",
    };
    match ty {
        RetType::I32 => {
            let v = raw.as_i64().ok_or_else(invalid)?;
            let v = i32::try_from(v).map_err(|_| invalid())?;
            Ok(Value::I32(v))
        }
        RetType::U32 => {
            let v = raw.as_u64().ok_or_else(invalid)?;
            let v = u32::try_from(v).map_err(|_| invalid())?;
            Ok(Value::U32(v))
        }
        RetType::I64 => Ok(Value::I64(raw.as_i64().ok_or_else(invalid)?)),
        RetType::U64 => Ok(Value::U64(raw.as_u64().ok_or_else(invalid)?)),
    }
}

/// Bytes given either as `"bytes": [..]` or as `"text": "..."` on the
/// surrounding object, or directly as an array or string.
fn parse_bytes(case: &str, field_name: &'static str, raw: &Json) -> Result<Vec<u8>, FixtureError> {
    let source = raw.get("bytes").or_else(|| raw.get("text")).unwrap_or(raw);
    if let Some(text) = source.as_str() {
        return Ok(text.as_bytes().to_vec());
    }
    if let Some(items) = source.as_array() {
        let mut bytes = Vec::with_capacity(items.len());
        for item in items {
            let v = item
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .ok_or_else(|| FixtureError::InvalidField {
                    context: case.to_string(),
                    field: field_name,
                })?;
            bytes.push(v);
        }
        return Ok(bytes);
    }
    Err(FixtureError::InvalidField {
        context: case.to_string(),
        field: field_name,
    })
}

fn field<'a>(raw: &'a Json, case: &str, name: &'static str) -> Result<&'a Json, FixtureError> {
    raw.get(name).ok_or_else(|| FixtureError::MissingField {
        context: case.to_string(),
        field: name,
    })
}

fn str_field(raw: &Json, context: &str, name: &'static str) -> Result<String, FixtureError> {
    raw.get(name)
        .and_then(Json::as_str)
        .map(str::to_owned)
        .ok_or_else(|| FixtureError::MissingField {
            context: context.to_string(),
            field: name,
        })
}

fn opt_str(raw: &Json, name: &str) -> Option<String> {
    raw.get(name).and_then(Json::as_str).map(str::to_owned)
}

// ---------- writing ----------

fn render_case(fc: &FixtureCase) -> Json {
    let case = &fc.case;
    let mut obj = serde_json::Map::new();
    obj.insert("name".into(), Json::from(case.name.clone()));
    obj.insert("symbol".into(), Json::from(case.symbol.clone()));
    obj.insert("ret".into(), Json::from(ret_name(case.ret)));
    obj.insert(
        "args".into(),
        Json::Array(case.args.iter().map(render_arg).collect()),
    );

    if !case.expect.is_exploratory() {
        let mut expect = serde_json::Map::new();
        if let Some(ret) = case.expect.ret {
            expect.insert("ret".into(), render_scalar(ret));
        }
        if !case.expect.side_effects.is_empty() {
            let mut buffers = serde_json::Map::new();
            for (arg, bytes) in &case.expect.side_effects {
                buffers.insert(arg.to_string(), render_bytes(bytes));
            }
            expect.insert("buffers".into(), Json::Object(buffers));
        }
        obj.insert("expect".into(), Json::Object(expect));
    }
    if let Some(note) = &fc.note {
        obj.insert("note".into(), Json::from(note.clone()));
    }
    Json::Object(obj)
}

fn render_arg(arg: &ArgValue) -> Json {
    match arg {
        ArgValue::I32(v) => serde_json::json!({"type": "i32", "value": v}),
        ArgValue::U32(v) => serde_json::json!({"type": "u32", "value": v}),
        ArgValue::I64(v) => serde_json::json!({"type": "i64", "value": v}),
        ArgValue::U64(v) => serde_json::json!({"type": "u64", "value": v}),
        ArgValue::Buf(bytes) => {
            let mut obj = serde_json::Map::new();
            obj.insert("type".into(), Json::from("buf"));
            merge_bytes(&mut obj, bytes);
            Json::Object(obj)
        }
        ArgValue::BufAt { buf, offset } => {
            serde_json::json!({"type": "buf_at", "buf": buf, "offset": offset})
        }
        ArgValue::CStr(bytes) => {
            let mut obj = serde_json::Map::new();
            obj.insert("type".into(), Json::from("cstr"));
            merge_bytes(&mut obj, bytes);
            Json::Object(obj)
        }
    }
}

/// Prefer the readable `text` form when the bytes are printable UTF-8.
fn merge_bytes(obj: &mut serde_json::Map<String, Json>, bytes: &[u8]) {
    match render_bytes(bytes) {
        Json::String(text) => obj.insert("text".into(), Json::from(text)),
        other => obj.insert("bytes".into(), other),
    };
}

fn render_bytes(bytes: &[u8]) -> Json {
    match std::str::from_utf8(bytes) {
        Ok(text) if bytes.iter().all(|b| *b == 0 || (0x20..0x7f).contains(b)) => {
            Json::from(text.to_string())
        }
        _ => Json::Array(bytes.iter().map(|b| Json::from(u64::from(*b))).collect()),
    }
}

fn render_scalar(value: Value) -> Json {
    match value {
        Value::I32(v) => Json::from(v),
        Value::U32(v) => Json::from(v),
        Value::I64(v) => Json::from(v),
        Value::U64(v) => Json::from(v),
    }
}

fn ret_name(ret: RetType) -> &'static str {
    match ret {
        RetType::I32 => "i32",
        RetType::U32 => "u32",
        RetType::I64 => "i64",
        RetType::U64 => "u64",
    }
}

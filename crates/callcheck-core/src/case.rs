//! Test case descriptions: a named call against a symbol, with supplied
//! arguments and the expected observable outcome.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::signature::Signature;
use crate::value::{ArgType, RetType, Value};

// ---------- supplied arguments ----------

/// A concrete argument supplied to one invocation.
///
/// Scalars are passed by value. `Buf` hands the routine a pointer to a
/// private, mutable copy of the bytes; `BufAt` hands it a pointer *into* an
/// earlier `Buf` argument of the same case, which is how end-pointer style
/// interfaces (`reverse(begin, end)`) are described. `CStr` passes a
/// read-only NUL-terminated copy of the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgValue {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    /// Mutable scratch buffer owned by the harness for this call.
    Buf(Vec<u8>),
    /// Pointer `offset` bytes into the `Buf` argument at index `buf`.
    BufAt { buf: usize, offset: usize },
    /// NUL-terminated string; the terminator is appended by the harness.
    CStr(Vec<u8>),
}

impl ArgValue {
    /// Declared parameter type this argument inhabits.
    #[must_use]
    pub fn arg_type(&self) -> ArgType {
        match self {
            Self::I32(_) => ArgType::I32,
            Self::U32(_) => ArgType::U32,
            Self::I64(_) => ArgType::I64,
            Self::U64(_) => ArgType::U64,
            Self::Buf(_) | Self::BufAt { .. } => ArgType::MutBuf,
            Self::CStr(_) => ArgType::CStr,
        }
    }

    /// Typed scalar payload, or `None` for pointer arguments.
    #[must_use]
    pub fn scalar(&self) -> Option<Value> {
        match *self {
            Self::I32(v) => Some(Value::I32(v)),
            Self::U32(v) => Some(Value::U32(v)),
            Self::I64(v) => Some(Value::I64(v)),
            Self::U64(v) => Some(Value::U64(v)),
            _ => None,
        }
    }
}

// ---------- expectations ----------

/// Expected observable outcome of one invocation.
///
/// `ret` compares against the typed return value; `side_effects` maps a
/// `Buf` argument index to the full byte contents that buffer must hold
/// after the call. An empty expectation marks the case exploratory: it is
/// still invoked, and anything short of a fault passes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expectation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ret: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub side_effects: BTreeMap<usize, Vec<u8>>,
}

impl Expectation {
    #[must_use]
    pub fn is_exploratory(&self) -> bool {
        self.ret.is_none() && self.side_effects.is_empty()
    }
}

// ---------- the case itself ----------

/// One registered conformance case.
///
/// The signature is not stored; it is derived from the supplied arguments
/// and declared return type, so a case can never disagree with itself about
/// the shape of the call it makes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Unique human-readable case name, used in reports and logs.
    pub name: String,
    /// Symbol the case invokes.
    pub symbol: String,
    pub args: Vec<ArgValue>,
    pub ret: RetType,
    #[serde(default)]
    pub expect: Expectation,
}

impl TestCase {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        args: Vec<ArgValue>,
        ret: RetType,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            args,
            ret,
            expect: Expectation::default(),
        }
    }

    /// Expect the routine to return exactly `value`.
    #[must_use]
    pub fn with_expected_ret(mut self, value: Value) -> Self {
        self.expect.ret = Some(value);
        self
    }

    /// Expect the `Buf` argument at `arg_index` to hold exactly `bytes`
    /// after the call returns.
    #[must_use]
    pub fn with_expected_buffer(mut self, arg_index: usize, bytes: Vec<u8>) -> Self {
        self.expect.side_effects.insert(arg_index, bytes);
        self
    }

    /// Call shape implied by the supplied arguments and return type.
    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::new(self.args.iter().map(ArgValue::arg_type).collect(), self.ret)
    }
}

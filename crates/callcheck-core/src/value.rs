//! Scalar type model for routine parameters and return values.
//!
//! Routines under test are called through a fixed low-level convention in
//! which every integer argument travels in a 64-bit slot and the return
//! value comes back as a raw 64-bit word. This module provides:
//!
//! - [`ArgType`] / [`RetType`]: the declared types a signature is built from.
//! - [`Value`]: a typed scalar, used both as a supplied argument and as the
//!   typed interpretation of a returned word.
//! - Widening rules into slots (sign-extend signed, zero-extend unsigned)
//!   and truncating interpretation of raw results back into declared types.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------- declared types ----------

/// Type of a single routine parameter as declared in a signature.
///
/// Scalar variants are passed by value in an integer slot. Pointer variants
/// receive the address of harness-owned scratch memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    I32,
    U32,
    I64,
    U64,
    /// Mutable byte buffer. The routine may read and write through the
    /// pointer; the harness snapshots the bytes after the call returns.
    MutBuf,
    /// NUL-terminated read-only string.
    CStr,
}

impl ArgType {
    /// True for types passed by value in an integer slot.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::I32 | Self::U32 | Self::I64 | Self::U64)
    }

    /// True for types passed as an address into harness-owned memory.
    #[must_use]
    pub fn is_pointer(self) -> bool {
        !self.is_scalar()
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::MutBuf => "*mut c_char",
            Self::CStr => "*const c_char",
        };
        f.write_str(name)
    }
}

/// Declared return type of a routine.
///
/// The raw return word is reinterpreted under this type before comparison,
/// so a routine that only defines the low 32 bits of its result is judged
/// on those bits alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetType {
    I32,
    U32,
    I64,
    U64,
}

impl RetType {
    /// Interpret a raw 64-bit return word under this declared type.
    ///
    /// 32-bit types truncate to the low word, matching what a caller
    /// compiled against the declared prototype would observe.
    #[must_use]
    pub fn interpret(self, raw: i64) -> Value {
        match self {
            Self::I32 => Value::I32(raw as i32),
            Self::U32 => Value::U32(raw as u32),
            Self::I64 => Value::I64(raw),
            Self::U64 => Value::U64(raw as u64),
        }
    }
}

impl fmt::Display for RetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
        };
        f.write_str(name)
    }
}

// ---------- typed scalars ----------

/// A typed scalar value.
///
/// Used for supplied scalar arguments and for the typed view of a return
/// word. Equality is typed: `I32(1)` and `I64(1)` are distinct values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
}

impl Value {
    /// Declared type this value inhabits, as a return type.
    #[must_use]
    pub fn ret_type(self) -> RetType {
        match self {
            Self::I32(_) => RetType::I32,
            Self::U32(_) => RetType::U32,
            Self::I64(_) => RetType::I64,
            Self::U64(_) => RetType::U64,
        }
    }

    /// Widen into a 64-bit argument slot.
    ///
    /// Signed values sign-extend, unsigned values zero-extend, and `u64`
    /// reinterprets bit-for-bit. This is the integer-class argument rule of
    /// the System V convention the routines are written against.
    #[must_use]
    pub fn as_slot(self) -> i64 {
        match self {
            Self::I32(v) => i64::from(v),
            Self::U32(v) => i64::from(v),
            Self::I64(v) => v,
            Self::U64(v) => v as i64,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{v}i32"),
            Self::U32(v) => write!(f, "{v}u32"),
            Self::I64(v) => write!(f, "{v}i64"),
            Self::U64(v) => write!(f, "{v}u64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_arguments_sign_extend_into_slots() {
        assert_eq!(Value::I32(-1).as_slot(), -1i64);
        assert_eq!(Value::I32(i32::MIN).as_slot(), i64::from(i32::MIN));
    }

    #[test]
    fn unsigned_arguments_zero_extend_into_slots() {
        assert_eq!(Value::U32(u32::MAX).as_slot(), 0xFFFF_FFFFi64);
        assert_eq!(Value::U64(u64::MAX).as_slot(), -1i64);
    }

    #[test]
    fn narrow_returns_truncate_to_declared_width() {
        // A routine leaving garbage in the high word is judged on the low
        // 32 bits when its prototype declares a 32-bit result.
        let raw = 0x1234_5678_0000_002Ai64;
        assert_eq!(RetType::I32.interpret(raw), Value::I32(42));
        assert_eq!(RetType::U32.interpret(raw), Value::U32(42));
        assert_eq!(RetType::I64.interpret(raw), Value::I64(raw));
    }

    #[test]
    fn negative_return_survives_interpretation() {
        assert_eq!(RetType::I64.interpret(-100), Value::I64(-100));
        assert_eq!(RetType::I32.interpret(-100), Value::I32(-100));
        assert_eq!(RetType::U64.interpret(-1), Value::U64(u64::MAX));
    }

    #[test]
    fn typed_equality_distinguishes_widths() {
        assert_ne!(Value::I32(1).ret_type(), Value::I64(1).ret_type());
        assert_eq!(RetType::I64.interpret(3), Value::I64(3));
    }

    #[test]
    fn display_carries_type_suffix() {
        assert_eq!(Value::I32(-7).to_string(), "-7i32");
        assert_eq!(Value::U64(9).to_string(), "9u64");
        assert_eq!(ArgType::MutBuf.to_string(), "*mut c_char");
        assert_eq!(RetType::U32.to_string(), "u32");
    }

    #[test]
    fn arg_types_split_into_scalar_and_pointer_classes() {
        assert!(ArgType::I64.is_scalar());
        assert!(!ArgType::I64.is_pointer());
        assert!(ArgType::MutBuf.is_pointer());
        assert!(ArgType::CStr.is_pointer());
    }
}

//! Routine signatures: ordered parameter types plus a return type.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{ArgType, RetType};

/// Declared shape of a routine: parameter types in call order and the
/// return type. Two cases naming the same symbol must agree on this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ArgType>,
    pub ret: RetType,
}

impl Signature {
    #[must_use]
    pub fn new(params: Vec<ArgType>, ret: RetType) -> Self {
        Self { params, ret }
    }

    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// True when every parameter is passed by value in an integer slot.
    #[must_use]
    pub fn is_all_scalar(&self) -> bool {
        self.params.iter().all(|p| p.is_scalar())
    }

    /// Stable byte encoding for fingerprinting. The rendered form is
    /// unambiguous, so hashing the display string is sufficient.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

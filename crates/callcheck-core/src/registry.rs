//! Case registry: validated, ordered collection of conformance cases.
//!
//! The registry is a value, not a process-wide singleton; a harness builds
//! one per run (or several side by side) and hands it to the runner.
//! Registration is where malformed cases are rejected, so everything the
//! runner later pulls out of a registry is structurally sound:
//!
//! - case names are unique,
//! - pointer arguments reference real buffer arguments within bounds,
//! - expectations are typed consistently with the declared signature.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::case::{ArgValue, TestCase};
use crate::signature::Signature;
use crate::value::RetType;

/// Configuration-level failure: a case or fixture set that must not run.
///
/// Everything here is detected before any routine is invoked. The per-case
/// runtime failure modes (mismatch, fault) are verdicts, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate case name: {name}")]
    DuplicateName { name: String },

    #[error("case {case}: unsupported type: {type_name}")]
    UnsupportedType { case: String, type_name: String },

    #[error("case {case}: symbol {symbol} bound as {shape}, cannot call as {declared}")]
    SignatureMismatch {
        case: String,
        symbol: String,
        declared: Signature,
        shape: &'static str,
    },

    #[error("case {case}: unknown symbol: {symbol}")]
    UnknownSymbol { case: String, symbol: String },

    #[error("case {case}: arg {arg} points into arg {target}, which is not a buffer")]
    InvalidBufferRef {
        case: String,
        arg: usize,
        target: usize,
    },

    #[error("case {case}: arg {arg} offset {offset} exceeds buffer length {len}")]
    OffsetOutOfBounds {
        case: String,
        arg: usize,
        offset: usize,
        len: usize,
    },

    #[error("case {case}: declared return {declared} but expected value is typed {expected}")]
    ReturnTypeMismatch {
        case: String,
        declared: RetType,
        expected: RetType,
    },

    #[error("case {case}: side effect targets arg {arg}, which is not a buffer")]
    SideEffectTarget { case: String, arg: usize },

    #[error("case {case}: side effect for arg {arg} expects {expected} bytes, buffer holds {actual}")]
    SideEffectLength {
        case: String,
        arg: usize,
        expected: usize,
        actual: usize,
    },
}

/// Ordered collection of validated cases.
///
/// Cases run in registration order. A rejected registration leaves the
/// registry exactly as it was.
#[derive(Debug, Default)]
pub struct Registry {
    cases: Vec<TestCase>,
    names: BTreeSet<String>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append one case.
    pub fn register(&mut self, case: TestCase) -> Result<(), RegistryError> {
        if self.names.contains(&case.name) {
            return Err(RegistryError::DuplicateName {
                name: case.name.clone(),
            });
        }
        validate_case(&case)?;
        self.names.insert(case.name.clone());
        self.cases.push(case);
        Ok(())
    }

    /// Register every case in `cases`, stopping at the first rejection.
    pub fn register_all(
        &mut self,
        cases: impl IntoIterator<Item = TestCase>,
    ) -> Result<(), RegistryError> {
        for case in cases {
            self.register(case)?;
        }
        Ok(())
    }

    /// Cases in registration order. Each call yields a fresh iterator, so
    /// enumeration can restart any number of times.
    pub fn all_cases(&self) -> impl Iterator<Item = &TestCase> + '_ {
        self.cases.iter()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Content fingerprint over `(name, symbol, signature)` of every case
    /// in registration order. Two registries with the same fingerprint make
    /// the same sequence of calls.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for case in &self.cases {
            hasher.update(case.name.as_bytes());
            hasher.update(&[0]);
            hasher.update(case.symbol.as_bytes());
            hasher.update(&[0]);
            hasher.update(&case.signature().canonical_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Structural checks that do not need the symbol table.
fn validate_case(case: &TestCase) -> Result<(), RegistryError> {
    // Pointer arguments must land inside a buffer argument of this case.
    for (i, arg) in case.args.iter().enumerate() {
        if let ArgValue::BufAt { buf, offset } = *arg {
            let Some(ArgValue::Buf(bytes)) = case.args.get(buf) else {
                return Err(RegistryError::InvalidBufferRef {
                    case: case.name.clone(),
                    arg: i,
                    target: buf,
                });
            };
            // One-past-the-end is a legal pointer to form.
            if offset > bytes.len() {
                return Err(RegistryError::OffsetOutOfBounds {
                    case: case.name.clone(),
                    arg: i,
                    offset,
                    len: bytes.len(),
                });
            }
        }
    }

    if let Some(expected) = case.expect.ret {
        if expected.ret_type() != case.ret {
            return Err(RegistryError::ReturnTypeMismatch {
                case: case.name.clone(),
                declared: case.ret,
                expected: expected.ret_type(),
            });
        }
    }

    for (&arg, bytes) in &case.expect.side_effects {
        let Some(ArgValue::Buf(supplied)) = case.args.get(arg) else {
            return Err(RegistryError::SideEffectTarget {
                case: case.name.clone(),
                arg,
            });
        };
        if supplied.len() != bytes.len() {
            return Err(RegistryError::SideEffectLength {
                case: case.name.clone(),
                arg,
                expected: bytes.len(),
                actual: supplied.len(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn pair_sum() -> TestCase {
        TestCase::new(
            "pair_sum",
            "add_2_ints",
            vec![ArgValue::I64(1), ArgValue::I64(2)],
            RetType::I64,
        )
        .with_expected_ret(Value::I64(3))
    }

    #[test]
    fn duplicate_name_is_rejected_and_registry_unchanged() {
        let mut reg = Registry::new();
        reg.register(pair_sum()).unwrap();

        let err = reg.register(pair_sum()).unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateName {
                name: "pair_sum".into()
            }
        );
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn rejected_case_does_not_poison_later_registrations() {
        let mut reg = Registry::new();
        reg.register(pair_sum()).unwrap();
        assert!(reg.register(pair_sum()).is_err());

        let other = TestCase::new("inc", "simple_inc", vec![ArgValue::I64(1)], RetType::I64);
        reg.register(other).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn iteration_preserves_registration_order_and_restarts() {
        let mut reg = Registry::new();
        reg.register(TestCase::new("b", "simple_inc", vec![ArgValue::I64(1)], RetType::I64))
            .unwrap();
        reg.register(TestCase::new("a", "simple_inc", vec![ArgValue::I64(2)], RetType::I64))
            .unwrap();

        let first: Vec<_> = reg.all_cases().map(|c| c.name.as_str()).collect();
        let second: Vec<_> = reg.all_cases().map(|c| c.name.as_str()).collect();
        assert_eq!(first, ["b", "a"]);
        assert_eq!(first, second);
    }

    #[test]
    fn buf_at_must_target_a_buffer_argument() {
        let case = TestCase::new(
            "bad_ref",
            "reverse_char_array",
            vec![ArgValue::I64(0), ArgValue::BufAt { buf: 0, offset: 0 }],
            RetType::I64,
        );
        let err = Registry::new().register(case).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidBufferRef { arg: 1, target: 0, .. }
        ));
    }

    #[test]
    fn buf_at_offset_may_reach_one_past_the_end() {
        let mut reg = Registry::new();
        let case = TestCase::new(
            "end_ptr",
            "reverse_char_array",
            vec![
                ArgValue::Buf(b"abcd".to_vec()),
                ArgValue::BufAt { buf: 0, offset: 4 },
            ],
            RetType::I64,
        );
        reg.register(case).unwrap();

        let case = TestCase::new(
            "past_end",
            "reverse_char_array",
            vec![
                ArgValue::Buf(b"abcd".to_vec()),
                ArgValue::BufAt { buf: 0, offset: 5 },
            ],
            RetType::I64,
        );
        let err = reg.register(case).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::OffsetOutOfBounds {
                offset: 5,
                len: 4,
                ..
            }
        ));
    }

    #[test]
    fn expected_return_must_match_declared_type() {
        let case = TestCase::new(
            "typed_wrong",
            "add_2_ints",
            vec![ArgValue::I64(1), ArgValue::I64(2)],
            RetType::I64,
        )
        .with_expected_ret(Value::I32(3));
        let err = Registry::new().register(case).unwrap_err();
        assert_eq!(
            err,
            RegistryError::ReturnTypeMismatch {
                case: "typed_wrong".into(),
                declared: RetType::I64,
                expected: RetType::I32,
            }
        );
    }

    #[test]
    fn side_effects_must_target_buffers_of_equal_length() {
        let case = TestCase::new(
            "wrong_target",
            "swap_chars",
            vec![ArgValue::I64(7)],
            RetType::I64,
        )
        .with_expected_buffer(0, vec![b'x']);
        let err = Registry::new().register(case).unwrap_err();
        assert!(matches!(err, RegistryError::SideEffectTarget { arg: 0, .. }));

        let case = TestCase::new(
            "wrong_len",
            "swap_chars",
            vec![ArgValue::Buf(vec![b'a', b'b'])],
            RetType::I64,
        )
        .with_expected_buffer(0, vec![b'x']);
        let err = Registry::new().register(case).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::SideEffectLength {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn fingerprint_is_stable_and_shape_sensitive() {
        let mut a = Registry::new();
        a.register(pair_sum()).unwrap();
        let mut b = Registry::new();
        b.register(pair_sum()).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = Registry::new();
        c.register(
            TestCase::new(
                "pair_sum",
                "add_2_ints",
                vec![ArgValue::I32(1), ArgValue::I32(2)],
                RetType::I64,
            ),
        )
        .unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_of_empty_registry_is_defined() {
        assert_eq!(Registry::new().fingerprint().len(), 64);
    }
}

//! Typed bindings for the call shapes the harness knows how to dispatch.
//!
//! Every routine under test is reached through one of a small set of
//! concrete function-pointer shapes rather than a variadic or erased call
//! path. A shape says how many slots the call consumes and whether each
//! slot carries an integer or an address; the declared signature of a case
//! must fit the shape its symbol was bound with.
//!
//! All shapes use the `C-unwind` ABI so that a routine which aborts by
//! unwinding can be confined to its own case instead of tearing down the
//! harness.

use callcheck_core::Signature;
use libc::c_char;

/// One integer argument in, raw word out.
pub type IntFn1 = unsafe extern "C-unwind" fn(i64) -> i64;
/// Two integer arguments in, raw word out.
pub type IntFn2 = unsafe extern "C-unwind" fn(i64, i64) -> i64;
/// Eight integer arguments in, raw word out. On x86-64 this exercises both
/// the register file and the stacked tail of the argument list.
pub type IntFn8 =
    unsafe extern "C-unwind" fn(i64, i64, i64, i64, i64, i64, i64, i64) -> i64;
/// Two pointer arguments in, raw word out.
pub type PtrPairFn = unsafe extern "C-unwind" fn(*mut c_char, *mut c_char) -> i64;

/// A symbol bound to a concrete dispatchable shape.
#[derive(Debug, Clone, Copy)]
pub enum RoutineBinding {
    Int1(IntFn1),
    Int2(IntFn2),
    Int8(IntFn8),
    PtrPair(PtrPairFn),
}

impl RoutineBinding {
    /// Number of argument slots the shape consumes.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Int1(_) => 1,
            Self::Int2(_) => 2,
            Self::Int8(_) => 8,
            Self::PtrPair(_) => 2,
        }
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn shape_name(self) -> &'static str {
        match self {
            Self::Int1(_) => "int1",
            Self::Int2(_) => "int2",
            Self::Int8(_) => "int8",
            Self::PtrPair(_) => "ptr_pair",
        }
    }

    /// Whether a declared signature can be dispatched through this shape.
    ///
    /// Integer shapes accept any all-scalar parameter list of the right
    /// arity; widening into the 64-bit slots happens at call time. The
    /// declared return type never matters here, because every shape
    /// returns a raw word that is reinterpreted afterwards.
    #[must_use]
    pub fn accepts(self, sig: &Signature) -> bool {
        match self {
            Self::Int1(_) | Self::Int2(_) | Self::Int8(_) => {
                sig.arity() == self.arity() && sig.is_all_scalar()
            }
            Self::PtrPair(_) => {
                sig.arity() == 2 && sig.params.iter().all(|p| p.is_pointer())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use callcheck_core::{ArgType, RetType};

    extern "C-unwind" fn one(a: i64) -> i64 {
        a
    }
    extern "C-unwind" fn two(a: i64, b: i64) -> i64 {
        a + b
    }

    #[test]
    fn integer_shapes_accept_any_scalar_widths() {
        let b = RoutineBinding::Int2(two);
        assert!(b.accepts(&Signature::new(vec![ArgType::I64, ArgType::I64], RetType::I64)));
        assert!(b.accepts(&Signature::new(vec![ArgType::I32, ArgType::U32], RetType::I32)));
        assert!(!b.accepts(&Signature::new(vec![ArgType::I64], RetType::I64)));
        assert!(!b.accepts(&Signature::new(
            vec![ArgType::MutBuf, ArgType::I64],
            RetType::I64
        )));
    }

    #[test]
    fn pointer_shape_requires_two_pointer_params() {
        unsafe extern "C-unwind" fn pp(_: *mut c_char, _: *mut c_char) -> i64 {
            0
        }
        let b = RoutineBinding::PtrPair(pp);
        assert!(b.accepts(&Signature::new(
            vec![ArgType::MutBuf, ArgType::MutBuf],
            RetType::I64
        )));
        assert!(b.accepts(&Signature::new(
            vec![ArgType::CStr, ArgType::MutBuf],
            RetType::I64
        )));
        assert!(!b.accepts(&Signature::new(
            vec![ArgType::MutBuf, ArgType::I64],
            RetType::I64
        )));
    }

    #[test]
    fn return_type_does_not_constrain_the_shape() {
        let b = RoutineBinding::Int1(one);
        for ret in [RetType::I32, RetType::U32, RetType::I64, RetType::U64] {
            assert!(b.accepts(&Signature::new(vec![ArgType::I64], ret)));
        }
    }

    #[test]
    fn shape_names_are_stable() {
        extern "C-unwind" fn eight(
            a: i64,
            b: i64,
            c: i64,
            d: i64,
            e: i64,
            f: i64,
            g: i64,
            h: i64,
        ) -> i64 {
            a + b + c + d + e + f + g + h
        }
        assert_eq!(RoutineBinding::Int1(one).shape_name(), "int1");
        assert_eq!(RoutineBinding::Int8(eight).shape_name(), "int8");
    }
}

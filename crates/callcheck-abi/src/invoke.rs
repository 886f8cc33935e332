//! Fault-isolated dispatch of one case through its resolved binding.
//!
//! The adapter owns all memory a routine can touch: scalar arguments are
//! widened into 64-bit slots, buffer arguments are copied into scratch
//! allocations private to the call, and string arguments get a NUL
//! terminator appended. After the call returns, the scratch bytes of every
//! buffer argument are snapshotted so the expectation engine can judge
//! side effects without ever seeing a pointer.
//!
//! Routines abort by unwinding (the `C-unwind` ABI carries the unwind
//! across the boundary), and the dispatch runs under
//! [`std::panic::catch_unwind`], so a misbehaving routine produces a
//! `Fault` outcome for its own case and nothing else. [`invoke`] is total:
//! it returns an [`InvocationResult`] for any input, never panicking in
//! the harness itself.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::ptr;
use std::time::Instant;

use callcheck_core::{ArgValue, InvocationResult, TestCase, Value};
use libc::c_char;

use crate::binding::{IntFn1, IntFn2, IntFn8, PtrPairFn, RoutineBinding};

/// One argument slot as the routine will see it.
#[derive(Clone, Copy)]
enum RawSlot {
    Int(i64),
    Ptr(*mut c_char),
}

/// A fully-extracted call, ready to dispatch. Everything here is `Copy` so
/// the closure handed to `catch_unwind` owns its inputs outright.
#[derive(Clone, Copy)]
enum Prepared {
    Int1(IntFn1, i64),
    Int2(IntFn2, i64, i64),
    Int8(IntFn8, [i64; 8]),
    PtrPair(PtrPairFn, *mut c_char, *mut c_char),
}

/// Invoke `case` exactly once through `binding`.
///
/// Completion yields the typed return value and a snapshot of every buffer
/// argument; an abort yields a `Fault` outcome carrying whatever message
/// could be recovered. Malformed input that slipped past registration
/// (a pointer argument referencing a non-buffer, a slot count that does
/// not fit the shape) is reported as a fault rather than a panic.
#[must_use]
pub fn invoke(binding: RoutineBinding, case: &TestCase) -> InvocationResult {
    // Scratch allocations live for the whole call; buffer and string
    // arguments point into them, never into the case itself.
    let mut scratch: Vec<Option<Box<[u8]>>> = Vec::with_capacity(case.args.len());
    for arg in &case.args {
        scratch.push(match arg {
            ArgValue::Buf(bytes) => Some(bytes.clone().into_boxed_slice()),
            ArgValue::CStr(bytes) => {
                let mut owned = Vec::with_capacity(bytes.len() + 1);
                owned.extend_from_slice(bytes);
                owned.push(0);
                Some(owned.into_boxed_slice())
            }
            _ => None,
        });
    }
    let bases: Vec<*mut c_char> = scratch
        .iter_mut()
        .map(|slot| {
            slot.as_mut()
                .map_or(ptr::null_mut(), |b| b.as_mut_ptr().cast::<c_char>())
        })
        .collect();

    let mut slots = Vec::with_capacity(case.args.len());
    for (i, arg) in case.args.iter().enumerate() {
        let slot = match arg {
            ArgValue::I32(v) => RawSlot::Int(Value::I32(*v).as_slot()),
            ArgValue::U32(v) => RawSlot::Int(Value::U32(*v).as_slot()),
            ArgValue::I64(v) => RawSlot::Int(Value::I64(*v).as_slot()),
            ArgValue::U64(v) => RawSlot::Int(Value::U64(*v).as_slot()),
            ArgValue::Buf(_) | ArgValue::CStr(_) => RawSlot::Ptr(bases[i]),
            ArgValue::BufAt { buf, offset } => match case.args.get(*buf) {
                Some(ArgValue::Buf(bytes)) if *offset <= bytes.len() => {
                    // SAFETY: `bases[buf]` is the live scratch allocation
                    // for a buffer of `bytes.len()` bytes, and the offset
                    // is at most one past its end.
                    RawSlot::Ptr(unsafe { bases[*buf].add(*offset) })
                }
                _ => {
                    return harness_fault(case, format!("argument {i}: invalid buffer reference"));
                }
            },
        };
        slots.push(slot);
    }

    let Some(prepared) = prepare(binding, &slots) else {
        return harness_fault(
            case,
            format!(
                "call shape mismatch: {} slots against shape {}",
                slots.len(),
                binding.shape_name()
            ),
        );
    };

    let started = Instant::now();
    let raw = catch_unwind(AssertUnwindSafe(|| {
        // SAFETY: integer slots carry values widened per the declared
        // types, and every pointer targets a scratch allocation that
        // outlives this call.
        unsafe {
            match prepared {
                Prepared::Int1(f, a) => f(a),
                Prepared::Int2(f, a, b) => f(a, b),
                Prepared::Int8(f, a) => f(a[0], a[1], a[2], a[3], a[4], a[5], a[6], a[7]),
                Prepared::PtrPair(f, p, q) => f(p, q),
            }
        }
    }));
    let elapsed = started.elapsed();

    match raw {
        Ok(word) => {
            let mut side_effects = BTreeMap::new();
            for (i, arg) in case.args.iter().enumerate() {
                if matches!(arg, ArgValue::Buf(_)) {
                    if let Some(bytes) = &scratch[i] {
                        side_effects.insert(i, bytes.to_vec());
                    }
                }
            }
            InvocationResult::completed(
                &case.name,
                case.ret.interpret(word),
                side_effects,
                elapsed,
            )
        }
        Err(payload) => {
            InvocationResult::fault(&case.name, &case.symbol, panic_message(payload.as_ref()))
        }
    }
}

fn prepare(binding: RoutineBinding, slots: &[RawSlot]) -> Option<Prepared> {
    if slots.len() != binding.arity() {
        return None;
    }
    match binding {
        RoutineBinding::Int1(f) => Some(Prepared::Int1(f, int(slots, 0)?)),
        RoutineBinding::Int2(f) => Some(Prepared::Int2(f, int(slots, 0)?, int(slots, 1)?)),
        RoutineBinding::Int8(f) => {
            let mut words = [0i64; 8];
            for (i, word) in words.iter_mut().enumerate() {
                *word = int(slots, i)?;
            }
            Some(Prepared::Int8(f, words))
        }
        RoutineBinding::PtrPair(f) => Some(Prepared::PtrPair(f, ptr(slots, 0)?, ptr(slots, 1)?)),
    }
}

fn int(slots: &[RawSlot], i: usize) -> Option<i64> {
    match slots.get(i)? {
        RawSlot::Int(v) => Some(*v),
        RawSlot::Ptr(_) => None,
    }
}

fn ptr(slots: &[RawSlot], i: usize) -> Option<*mut c_char> {
    match slots.get(i)? {
        RawSlot::Ptr(p) => Some(*p),
        RawSlot::Int(_) => None,
    }
}

fn harness_fault(case: &TestCase, message: String) -> InvocationResult {
    InvocationResult::fault(&case.name, &case.symbol, message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unrecoverable fault".to_string()
    }
}

//! Stock symbol table and the conformance corpus run against it.
//!
//! The corpus mirrors the historical smoke batch for these routines: one
//! case per exported symbol, small fixed inputs, expectations written
//! down as data. Deliberately misbehaving specimens are bound in the
//! table but kept out of the stock corpus; suites that want them opt in.

use callcheck_abi::{RoutineBinding, RoutineTable};
use callcheck_core::{ArgValue, RetType, TestCase, Value};

use crate::arith::{
    add_2_ints, div_100_by_arg, simple_inc, simple_inc_test, sum_internal_ar, sum_lots_of_args,
};
use crate::buffer::{reverse_char_array, stuck_swap, swap_chars};

/// Bindings for every exported specimen, misbehaving ones included.
#[must_use]
pub fn routine_table() -> RoutineTable {
    let mut table = RoutineTable::new();
    table.bind("add_2_ints", RoutineBinding::Int2(add_2_ints));
    table.bind("simple_inc", RoutineBinding::Int1(simple_inc));
    table.bind("simple_inc_test", RoutineBinding::Int1(simple_inc_test));
    table.bind("sum_lots_of_args", RoutineBinding::Int8(sum_lots_of_args));
    table.bind("sum_internal_ar", RoutineBinding::Int1(sum_internal_ar));
    table.bind("div_100_by_arg", RoutineBinding::Int1(div_100_by_arg));
    table.bind("swap_chars", RoutineBinding::PtrPair(swap_chars));
    table.bind("reverse_char_array", RoutineBinding::PtrPair(reverse_char_array));
    table.bind("stuck_swap", RoutineBinding::PtrPair(stuck_swap));
    table
}

/// The stock corpus: six cases covering every well-behaved specimen.
#[must_use]
pub fn corpus_cases() -> Vec<TestCase> {
    vec![
        TestCase::new(
            "add_2_ints_small",
            "add_2_ints",
            vec![ArgValue::I64(1), ArgValue::I64(2)],
            RetType::I64,
        )
        .with_expected_ret(Value::I64(3)),
        TestCase::new(
            "simple_inc_forwarded",
            "simple_inc_test",
            vec![ArgValue::I64(1)],
            RetType::I64,
        )
        .with_expected_ret(Value::I64(2)),
        TestCase::new(
            "sum_eight_args",
            "sum_lots_of_args",
            (1..=8).map(ArgValue::I64).collect(),
            RetType::I64,
        )
        .with_expected_ret(Value::I64(36)),
        // The return of the two swap-family routines is ignored, exactly
        // as their historical callers ignored it.
        TestCase::new(
            "swap_chars_pair",
            "swap_chars",
            vec![ArgValue::Buf(vec![b'a']), ArgValue::Buf(vec![b'b'])],
            RetType::I64,
        )
        .with_expected_buffer(0, vec![b'b'])
        .with_expected_buffer(1, vec![b'a']),
        TestCase::new(
            "reverse_five_bytes",
            "reverse_char_array",
            vec![
                ArgValue::Buf(b"abcde\0".to_vec()),
                ArgValue::BufAt { buf: 0, offset: 4 },
            ],
            RetType::I64,
        )
        .with_expected_buffer(0, b"edcba\0".to_vec()),
        TestCase::new(
            "sum_internal_table",
            "sum_internal_ar",
            vec![ArgValue::I64(0)],
            RetType::I64,
        )
        .with_expected_ret(Value::I64(6)),
    ]
}

//! Integer specimens, exported under fixed symbol names.
//!
//! These stand in for hand-written assembly routines: fixed C prototypes,
//! no Rust niceties at the boundary, and in two cases deliberately hostile
//! behavior. `sum_lots_of_args` is the interesting one on x86-64, where
//! arguments seven and eight travel on the stack rather than in registers.

use crate::journal::journal;

#[unsafe(no_mangle)]
pub extern "C-unwind" fn add_2_ints(a: i64, b: i64) -> i64 {
    journal().record("add_2_ints");
    a.wrapping_add(b)
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn simple_inc(a: i64) -> i64 {
    journal().record("simple_inc");
    a.wrapping_add(1)
}

/// Forwards to [`simple_inc`], so one external call exercises an internal
/// call edge as well. Both symbols land in the journal.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn simple_inc_test(a: i64) -> i64 {
    journal().record("simple_inc_test");
    simple_inc(a)
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn sum_lots_of_args(
    a: i64,
    b: i64,
    c: i64,
    d: i64,
    e: i64,
    f: i64,
    g: i64,
    h: i64,
) -> i64 {
    journal().record("sum_lots_of_args");
    a.wrapping_add(b)
        .wrapping_add(c)
        .wrapping_add(d)
        .wrapping_add(e)
        .wrapping_add(f)
        .wrapping_add(g)
        .wrapping_add(h)
}

/// Hidden state read by [`sum_internal_ar`]; the caller cannot reach it.
static INTERNAL_TABLE: [i64; 3] = [1, 2, 3];

/// Sums a private static table. The argument is ignored; it exists so the
/// symbol keeps its historical one-slot prototype.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn sum_internal_ar(_blank: i64) -> i64 {
    journal().record("sum_internal_ar");
    INTERNAL_TABLE.iter().sum()
}

/// Divides 100 by its argument. A zero argument unwinds, standing in for
/// a hardware divide trap.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn div_100_by_arg(a: i64) -> i64 {
    journal().record("div_100_by_arg");
    100 / a
}

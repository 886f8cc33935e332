//! Pointer specimens operating on caller-owned byte ranges.

use std::ptr;

use libc::c_char;

use crate::journal::journal;

/// Exchanges the bytes behind the two pointers.
///
/// # Safety
///
/// Both pointers must reference live, writable bytes. They may alias.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn swap_chars(a: *mut c_char, b: *mut c_char) -> i64 {
    journal().record("swap_chars");
    // SAFETY: caller guarantees both bytes are live and writable, and
    // ptr::swap tolerates aliasing.
    unsafe { ptr::swap(a, b) };
    0
}

/// Reverses the inclusive byte range `[lo, hi]` in place. The historical
/// interface takes a last-element pointer, not one past the end.
///
/// # Safety
///
/// `lo` and `hi` must point into the same live, writable allocation with
/// `lo <= hi`.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn reverse_char_array(lo: *mut c_char, hi: *mut c_char) -> i64 {
    journal().record("reverse_char_array");
    let mut lo = lo;
    let mut hi = hi;
    while lo < hi {
        // SAFETY: lo and hi remain inside the caller's range and only
        // meet or cross after the final swap.
        unsafe {
            ptr::swap(lo, hi);
            lo = lo.add(1);
            hi = hi.sub(1);
        }
    }
    0
}

/// A swap that never swaps: it unwinds on entry, every time. Kept in the
/// corpus so fault isolation is exercised by a stock symbol.
///
/// # Safety
///
/// No pointer is ever dereferenced; any values are accepted.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn stuck_swap(_a: *mut c_char, _b: *mut c_char) -> i64 {
    journal().record("stuck_swap");
    panic!("stuck_swap refuses to run");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_exchanges_two_bytes() {
        let mut a = b'a' as c_char;
        let mut b = b'b' as c_char;
        unsafe { swap_chars(&mut a, &mut b) };
        assert_eq!(a, b'b' as c_char);
        assert_eq!(b, b'a' as c_char);
    }

    #[test]
    fn swap_tolerates_aliasing() {
        let mut a = b'z' as c_char;
        let p: *mut c_char = &mut a;
        unsafe { swap_chars(p, p) };
        assert_eq!(a, b'z' as c_char);
    }

    #[test]
    fn reverse_flips_an_inclusive_range() {
        let mut ar = *b"abcde\0";
        let base = ar.as_mut_ptr().cast::<c_char>();
        // SAFETY: base..base+4 covers the five bytes before the NUL.
        unsafe { reverse_char_array(base, base.add(4)) };
        assert_eq!(&ar, b"edcba\0");
    }

    #[test]
    fn reverse_of_a_single_byte_is_a_no_op() {
        let mut ar = *b"q";
        let base = ar.as_mut_ptr().cast::<c_char>();
        unsafe { reverse_char_array(base, base) };
        assert_eq!(&ar, b"q");
    }

    #[test]
    fn reverse_handles_even_lengths() {
        let mut ar = *b"abcd";
        let base = ar.as_mut_ptr().cast::<c_char>();
        unsafe { reverse_char_array(base, base.add(3)) };
        assert_eq!(&ar, b"dcba");
    }

    #[test]
    #[should_panic(expected = "refuses to run")]
    fn stuck_swap_always_unwinds() {
        let mut a = 0 as c_char;
        let mut b = 0 as c_char;
        unsafe { stuck_swap(&mut a, &mut b) };
    }
}

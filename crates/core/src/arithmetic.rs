//! Integer arithmetic helpers
//!
//! # Overflow Behavior
//!
//! Operations use **wrapping semantics**, matching the stack operators:
//! `i64::MIN ÷ -1` wraps to `i64::MIN`. Division and remainder by zero
//! return `None` so callers can treat them as no-ops.

/// Division rounding toward negative infinity
///
/// `7 ÷ 2 = 3`, `-7 ÷ 2 = -4`, `7 ÷ -2 = -4`.
pub fn floor_div(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let quotient = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Some(quotient.wrapping_sub(1))
    } else {
        Some(quotient)
    }
}

/// Truncated remainder: the sign follows the dividend (`-7 % 2 = -1`)
pub fn remainder(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    Some(a.wrapping_rem(b))
}

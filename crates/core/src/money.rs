//! Monetary amounts as integer cents.
//!
//! Every monetary value in the workspace is an `i64` number of the smallest
//! currency unit (cents). Fractional results from discount and tax
//! apportioning are rounded half-up to a cent; the helpers here centralize
//! that rule so all consumers agree.

/// Format cents as a decimal string with two places, e.g. `1234` -> `"12.34"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Integer division rounding half away from zero (half-up for the
/// non-negative amounts the domain works with).
///
/// The denominator must be positive. Intermediate math is `i128` so callers
/// can pass products of two cent amounts without overflow.
pub fn div_round_half_up(numerator: i128, denominator: i128) -> i64 {
    debug_assert!(denominator > 0, "denominator must be positive");
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    let rounded = if 2 * remainder.abs() >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    };
    rounded as i64
}

//! Monetary rounding and ordering helpers

use bigdecimal::{BigDecimal, RoundingMode};
use std::cmp::Ordering;

/// Number of decimal places used for every monetary aggregate
pub const MONEY_SCALE: i64 = 2;

/// Round a monetary amount to two decimals, half away from zero
pub fn round_money(amount: &BigDecimal) -> BigDecimal {
    amount.with_scale_round(MONEY_SCALE, RoundingMode::HalfUp)
}

/// Sum a sequence of amounts and round the result once
pub fn sum_money<'a, I>(amounts: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    let total: BigDecimal = amounts.into_iter().sum();
    round_money(&total)
}

/// Check whether two amounts agree within the given tolerance
pub fn within_tolerance(a: &BigDecimal, b: &BigDecimal, tolerance: &BigDecimal) -> bool {
    (a - b).abs() <= *tolerance
}

/// Format an amount with exactly two decimals, for CSV and display
pub fn format_money(amount: &BigDecimal) -> String {
    round_money(amount).to_string()
}

/// Order HSN codes as numeric strings.
///
/// HSN codes are hierarchical, so "10" (chapter) precedes "1006" (heading)
/// which precedes "2". Digit-only codes are compared as right-zero-padded
/// values of equal width, with the shorter code first on a tie. Codes that
/// contain anything but ASCII digits sort after every digit code.
pub fn compare_hsn_codes(a: &str, b: &str) -> Ordering {
    let a = a.trim();
    let b = b.trim();
    let a_numeric = !a.is_empty() && a.bytes().all(|c| c.is_ascii_digit());
    let b_numeric = !b.is_empty() && b.bytes().all(|c| c.is_ascii_digit());

    match (a_numeric, b_numeric) {
        (true, true) => {
            let width = a.len().max(b.len());
            let padded_a = format!("{:0<width$}", a, width = width);
            let padded_b = format!("{:0<width$}", b, width = width);
            padded_a
                .cmp(&padded_b)
                .then_with(|| a.len().cmp(&b.len()))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

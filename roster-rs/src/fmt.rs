//! Provides formatting helpers for monetary amounts.
//!
//! Salaries are rendered using the Indian numbering system, which groups the last three digits
//! and then every two digits (e.g. "12,34,567").
use std::fmt::Write;

/// Contains the currency symbol which is prepended to rendered amounts.
pub const RUPEE: &str = "₹";

/// Formats an amount using Indian digit grouping.
///
/// At most three fraction digits are emitted and trailing zeros are dropped. Non-finite values
/// are written as they are.
///
/// Note that a helper function [format_rupees](format_rupees) is also provided which directly
/// returns a String including the currency symbol.
pub fn format_inr(amount: f64, f: &mut dyn Write) -> std::fmt::Result {
    if !amount.is_finite() {
        return write!(f, "{}", amount);
    }

    let text = format!("{:.3}", amount.abs());
    let (digits, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let is_zero = digits.bytes().all(|digit| digit == b'0') && fraction.is_empty();
    if amount < 0. && !is_zero {
        f.write_char('-')?;
    }

    let split = digits.len().saturating_sub(3);
    let (head, tail) = digits.split_at(split);
    let leading = head.len() % 2;
    if leading > 0 {
        write!(f, "{},", &head[..leading])?;
    }
    for pair in head.as_bytes()[leading..].chunks(2) {
        write!(f, "{}{},", pair[0] as char, pair[1] as char)?;
    }
    f.write_str(tail)?;

    if !fraction.is_empty() {
        write!(f, ".{}", fraction)?;
    }

    Ok(())
}

/// Formats an amount in rupees and returns a String representation.
///
/// # Examples
///
/// ```
/// assert_eq!(roster::fmt::format_rupees(0.), "₹0");
/// assert_eq!(roster::fmt::format_rupees(999.), "₹999");
/// assert_eq!(roster::fmt::format_rupees(50_000.), "₹50,000");
/// assert_eq!(roster::fmt::format_rupees(1_234_567.), "₹12,34,567");
/// assert_eq!(roster::fmt::format_rupees(12_345_678.5), "₹1,23,45,678.5");
/// assert_eq!(roster::fmt::format_rupees(-1500.125), "₹-1,500.125");
/// ```
pub fn format_rupees(amount: f64) -> String {
    let mut result = RUPEE.to_owned();
    let _ = format_inr(amount, &mut result);
    result
}

/// Formats an amount in thousands of rupees as used by chart axis labels.
///
/// # Examples
///
/// ```
/// assert_eq!(roster::fmt::format_thousands(50_000.), "₹50k");
/// assert_eq!(roster::fmt::format_thousands(1_234_567.), "₹1235k");
/// assert_eq!(roster::fmt::format_thousands(0.), "₹0k");
/// ```
pub fn format_thousands(amount: f64) -> String {
    format!("{}{:.0}k", RUPEE, amount / 1000.)
}

#[cfg(test)]
mod tests {
    use crate::fmt::{format_inr, format_rupees};

    fn inr(amount: f64) -> String {
        let mut result = String::new();
        let _ = format_inr(amount, &mut result);
        result
    }

    #[test]
    fn digits_are_grouped_the_indian_way() {
        assert_eq!(inr(1.), "1");
        assert_eq!(inr(1_000.), "1,000");
        assert_eq!(inr(10_000.), "10,000");
        assert_eq!(inr(100_000.), "1,00,000");
        assert_eq!(inr(10_000_000.), "1,00,00,000");
    }

    #[test]
    fn fractions_are_rounded_and_trimmed() {
        assert_eq!(inr(0.1), "0.1");
        assert_eq!(inr(1_000.2500), "1,000.25");
        assert_eq!(inr(99.9999), "100");
        assert_eq!(inr(-0.0001), "0");
    }

    #[test]
    fn non_finite_values_are_kept() {
        assert_eq!(format_rupees(f64::NAN), "₹NaN");
        assert_eq!(format_rupees(f64::INFINITY), "₹inf");
    }
}

//! Text formatting shared by the status, alert and report messages

use rust_decimal::{Decimal, RoundingStrategy};

/// Marker for holdings that have neither a live nor a fallback price
pub const WARNING_MARK: &str = "⚠️";

/// Currency amount with thousands grouping and no decimals: `$1,234,568`
///
/// The sign goes after the dollar mark (`$-12,345`) and follows the
/// unrounded amount, so `-0.4` renders as `$-0`.
pub fn currency(amount: Decimal) -> String {
    let rounded = amount.abs().round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.trunc().to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    out.push('$');
    if amount.is_sign_negative() && !amount.is_zero() {
        out.push('-');
    }
    out.push_str(&group_thousands(&digits));
    out
}

/// Percentage with one decimal: `-20.0%`
///
/// Like the currency sign, a small negative value keeps its sign: `-0.0%`.
pub fn percent(value: Decimal) -> String {
    let rounded = value.abs().round_dp_with_strategy(1, RoundingStrategy::MidpointNearestEven);
    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}{rounded:.1}%")
}

/// Unit price as given, without trailing zeros: `4156.75`, `585`
pub fn price(value: Decimal) -> String {
    value.normalize().to_string()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_grouping() {
        assert_eq!(currency(dec!(0)), "$0");
        assert_eq!(currency(dec!(999)), "$999");
        assert_eq!(currency(dec!(8000)), "$8,000");
        assert_eq!(currency(dec!(1234567.4)), "$1,234,567");
        assert_eq!(currency(dec!(-12345.4)), "$-12,345");
    }

    #[test]
    fn test_currency_rounds_half_to_even() {
        assert_eq!(currency(dec!(36450.5)), "$36,450");
        assert_eq!(currency(dec!(36451.5)), "$36,452");
        assert_eq!(currency(dec!(999.6)), "$1,000");
    }

    #[test]
    fn test_negative_sign_follows_dollar_mark() {
        assert_eq!(currency(dec!(-1234567)), "$-1,234,567");
        assert_eq!(currency(dec!(-0.4)), "$-0");
        assert_eq!(currency(dec!(0.4)), "$0");
    }

    #[test]
    fn test_percent_one_decimal() {
        assert_eq!(percent(dec!(-20)), "-20.0%");
        assert_eq!(percent(dec!(12.345)), "12.3%");
        assert_eq!(percent(dec!(0)), "0.0%");
        assert_eq!(percent(dec!(-0.04)), "-0.0%");
        assert_eq!(percent(dec!(0.04)), "0.0%");
        assert_eq!(percent(dec!(33.3333333)), "33.3%");
    }

    #[test]
    fn test_price_normalized() {
        assert_eq!(price(dec!(585.0000)), "585");
        assert_eq!(price(dec!(4156.75)), "4156.75");
        assert_eq!(price(dec!(36.450)), "36.45");
    }
}

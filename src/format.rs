use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::DisplayConfig;

/// Format a quote-currency value as a plain numeric string.
///
/// - When `currency_decimals` is set, the value is rounded (half away from
///   zero) to that many decimal places before formatting.
/// - Trailing zeros are stripped (`Decimal::normalize()`).
pub fn format_currency_value(value: Decimal, currency_decimals: Option<u32>) -> String {
    let rounded = match currency_decimals {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    };
    rounded.normalize().to_string()
}

fn group_int_digits(int_part: &str) -> String {
    // Insert commas every 3 digits, preserving any leading zeros.
    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3);
    let len = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        out.push(ch);
        let remaining = len.saturating_sub(i + 1);
        if remaining > 0 && remaining % 3 == 0 {
            out.push(',');
        }
    }
    out
}

fn pad_fraction_to_dp(s: &str, dp: u32) -> String {
    if dp == 0 {
        return s
            .split_once('.')
            .map(|(i, _)| i.to_string())
            .unwrap_or_else(|| s.to_string());
    }

    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, f),
        None => (s, ""),
    };

    let mut out = String::with_capacity(int_part.len() + 1 + dp as usize);
    out.push_str(int_part);
    out.push('.');

    let mut written = 0usize;
    for ch in frac_part.chars().take(dp as usize) {
        out.push(ch);
        written += 1;
    }
    while written < dp as usize {
        out.push('0');
        written += 1;
    }

    out
}

fn group_number_string(s: &str) -> String {
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    let grouped = group_int_digits(int_part);
    match frac_part {
        Some(f) if !f.is_empty() => format!("{grouped}.{f}"),
        _ => grouped,
    }
}

/// Format a quote-currency value for human display, per the display config:
/// rounding, thousands grouping, currency symbol, and fixed decimal padding.
///
/// The canonical numeric strings in JSON output are not affected.
pub fn format_currency_display(value: Decimal, display: &DisplayConfig) -> String {
    let rounded = match display.currency_decimals {
        Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        None => value,
    };

    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let mut s = abs.normalize().to_string();
    if display.currency_fixed_decimals {
        if let Some(dp) = display.currency_decimals {
            s = pad_fraction_to_dp(&s, dp);
        }
    }
    if display.currency_grouping {
        s = group_number_string(&s);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if let Some(sym) = &display.currency_symbol {
        out.push_str(sym);
    }
    out.push_str(&s);
    out
}

/// Format a percentage with two decimal places and an explicit sign for
/// positive values, e.g. `+36.36%` / `-2.50%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded > Decimal::ZERO { "+" } else { "" };
    format!("{sign}{}%", pad_fraction_to_dp(&rounded.normalize().to_string(), 2))
}

/// Format a share-of-total percentage with two decimal places and no sign,
/// e.g. `42.50%`.
pub fn format_share_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}%", pad_fraction_to_dp(&rounded.normalize().to_string(), 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn display(
        currency_decimals: Option<u32>,
        currency_grouping: bool,
        currency_symbol: Option<&str>,
        currency_fixed_decimals: bool,
    ) -> DisplayConfig {
        DisplayConfig {
            currency_decimals,
            currency_grouping,
            currency_symbol: currency_symbol.map(str::to_string),
            currency_fixed_decimals,
        }
    }

    #[test]
    fn display_defaults_match_numeric_format() {
        let d = Decimal::from_str("1234.500").unwrap();
        assert_eq!(
            format_currency_display(d, &display(None, false, None, false)),
            format_currency_value(d, None)
        );
    }

    #[test]
    fn display_groups_and_symbols() {
        let d = Decimal::from_str("1234567.5").unwrap();
        assert_eq!(
            format_currency_display(d, &display(Some(2), true, Some("$"), true)),
            "$1,234,567.50"
        );
    }

    #[test]
    fn negative_sign_precedes_symbol() {
        let d = Decimal::from_str("-1234.5").unwrap();
        assert_eq!(
            format_currency_display(d, &display(Some(2), true, Some("$"), true)),
            "-$1,234.50"
        );
    }

    #[test]
    fn percent_gets_explicit_sign_and_two_decimals() {
        assert_eq!(format_percent(Decimal::from_str("36.3636").unwrap()), "+36.36%");
        assert_eq!(format_percent(Decimal::from_str("-2.5").unwrap()), "-2.50%");
        assert_eq!(format_percent(Decimal::ZERO), "0.00%");
    }

    #[test]
    fn share_percent_is_signless() {
        assert_eq!(
            format_share_percent(Decimal::from_str("42.5").unwrap()),
            "42.50%"
        );
        assert_eq!(
            format_share_percent(Decimal::from_str("18.305").unwrap()),
            "18.31%"
        );
    }
}

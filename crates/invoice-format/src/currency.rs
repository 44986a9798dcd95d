//! Currency formatting

use serde::{Deserialize, Serialize};

/// Round an amount to whole cents, half away from zero
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Most digits written after the decimal separator
pub const MAX_PRECISION: u8 = 9;

/// How monetary amounts are written on an invoice
///
/// The default follows Dutch conventions: `€ 1.234,56`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct CurrencyFormat {
    /// Currency symbol placed before the amount
    pub symbol: String,
    /// Separator between the symbol and the amount
    pub symbol_separator: String,
    pub decimal_separator: char,
    /// Thousands grouping separator, `None` disables grouping
    pub thousands_separator: Option<char>,
    /// Digits after the decimal separator, capped at [`MAX_PRECISION`]
    pub precision: u8,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        Self {
            symbol: "€".to_string(),
            symbol_separator: " ".to_string(),
            decimal_separator: ',',
            thousands_separator: Some('.'),
            precision: 2,
        }
    }
}

impl CurrencyFormat {
    /// Same format with a different symbol
    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = symbol.to_string();
        self
    }

    /// Format an amount, e.g. `€ 1.234,56`
    ///
    /// Non-finite amounts are written without a symbol.
    pub fn format(&self, amount: f64) -> String {
        if amount.is_nan() {
            return "NaN".to_string();
        }
        if amount.is_infinite() {
            return if amount > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
        }

        let number = self.format_number(amount);
        if self.symbol.is_empty() {
            number
        } else {
            format!("{}{}{}", self.symbol, self.symbol_separator, number)
        }
    }

    /// Format the number part only, e.g. `1.234,56`
    pub fn format_number(&self, amount: f64) -> String {
        let precision = self.precision.min(MAX_PRECISION);
        let multiplier = 10_i64.pow(u32::from(precision));
        let scaled = (amount.abs() * multiplier as f64).round() as i64;

        let int_part = scaled / multiplier;
        let frac_part = scaled % multiplier;

        let int_str = group_thousands(int_part, self.thousands_separator);
        let sign = if scaled != 0 && amount < 0.0 { "-" } else { "" };

        if precision > 0 {
            format!(
                "{sign}{int_str}{}{:0>width$}",
                self.decimal_separator,
                frac_part,
                width = usize::from(precision)
            )
        } else {
            format!("{sign}{int_str}")
        }
    }
}

fn group_thousands(n: i64, separator: Option<char>) -> String {
    let digits = n.to_string();
    let Some(sep) = separator else {
        return digits;
    };

    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_euro_format() {
        let euro = CurrencyFormat::default();
        assert_eq!(euro.format(0.0), "€ 0,00");
        assert_eq!(euro.format(21.0), "€ 21,00");
        assert_eq!(euro.format(125.5), "€ 125,50");
        assert_eq!(euro.format(1234.567), "€ 1.234,57");
        assert_eq!(euro.format(1_000_000.0), "€ 1.000.000,00");
    }

    #[test]
    fn test_negative_amounts() {
        let euro = CurrencyFormat::default();
        assert_eq!(euro.format(-12.5), "€ -12,50");
        // rounds to zero, no sign
        assert_eq!(euro.format(-0.001), "€ 0,00");
    }

    #[test]
    fn test_custom_format() {
        let format = CurrencyFormat {
            symbol: "$".to_string(),
            symbol_separator: String::new(),
            decimal_separator: '.',
            thousands_separator: Some(','),
            precision: 2,
        };
        assert_eq!(format.format(9876.5), "$9,876.50");
    }

    #[test]
    fn test_without_grouping_or_symbol() {
        let format = CurrencyFormat {
            symbol: String::new(),
            thousands_separator: None,
            ..CurrencyFormat::default()
        };
        assert_eq!(format.format(12345.0), "12345,00");
    }

    #[test]
    fn test_zero_precision() {
        let format = CurrencyFormat {
            precision: 0,
            ..CurrencyFormat::default()
        };
        assert_eq!(format.format(1499.5), "€ 1.500");
    }

    #[test]
    fn test_precision_is_capped() {
        let format: CurrencyFormat =
            serde_json::from_str(r#"{ "symbol": "", "precision": 40 }"#).unwrap();
        assert_eq!(format.format(1.5), "1,500000000");
    }

    #[test]
    fn test_non_finite() {
        let euro = CurrencyFormat::default();
        assert_eq!(euro.format(f64::NAN), "NaN");
        assert_eq!(euro.format(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(100.004), 100.0);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.13);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0, Some('.')), "0");
        assert_eq!(group_thousands(999, Some('.')), "999");
        assert_eq!(group_thousands(1000, Some('.')), "1.000");
        assert_eq!(group_thousands(123456, Some(' ')), "123 456");
    }

    #[test]
    fn test_with_symbol() {
        let format = CurrencyFormat::default().with_symbol("EUR");
        assert_eq!(format.format(5.0), "EUR 5,00");
    }
}

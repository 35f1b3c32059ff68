//! Exact conversion between human-readable decimal amounts and chain base units.
//!
//! Amounts arrive as strings ("1.5", "0.000000001") and are converted with
//! integer arithmetic only, so `1.5 SUI` is always `1_500_000_000 MIST`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub const SUI_DECIMALS: u32 = 9;
pub const NEAR_DECIMALS: u32 = 24;
pub const ETH_DECIMALS: u32 = 18;

pub const MIST_PER_SUI: u128 = 1_000_000_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,
    #[error("'{0}' is not a plain decimal number")]
    Invalid(String),
    #[error("amount overflow")]
    Overflow,
}

/// Direction applied when an amount has more fractional digits than the
/// target unit can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

/// A non-negative decimal number kept as its digit strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecimalAmount {
    whole: String,
    frac: String,
}

impl FromStr for DecimalAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        let unsigned = s.strip_prefix('+').unwrap_or(s);
        let (whole, frac) = match unsigned.split_once('.') {
            Some((w, f)) => (w, f),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !all_digits(whole) || !all_digits(frac) {
            return Err(AmountError::Invalid(s.to_string()));
        }

        let whole = whole.trim_start_matches('0');
        let frac = frac.trim_end_matches('0');
        Ok(Self {
            whole: if whole.is_empty() { "0".to_string() } else { whole.to_string() },
            frac: frac.to_string(),
        })
    }
}

impl fmt::Display for DecimalAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frac.is_empty() {
            write!(f, "{}", self.whole)
        } else {
            write!(f, "{}.{}", self.whole, self.frac)
        }
    }
}

impl DecimalAmount {
    pub fn is_zero(&self) -> bool {
        self.whole == "0" && self.frac.is_empty()
    }

    /// Converts to an integer count of base units (`10^decimals` per whole unit).
    pub fn to_base_units(&self, decimals: u32, rounding: Rounding) -> Result<u128, AmountError> {
        let decimals = decimals as usize;
        let (kept, dropped) = if self.frac.len() > decimals {
            self.frac.split_at(decimals)
        } else {
            (self.frac.as_str(), "")
        };

        let mut digits = String::with_capacity(self.whole.len() + decimals);
        digits.push_str(&self.whole);
        digits.push_str(kept);
        for _ in kept.len()..decimals {
            digits.push('0');
        }

        let base: u128 = digits.parse().map_err(|_| AmountError::Overflow)?;
        match rounding {
            Rounding::Ceil if dropped.bytes().any(|b| b != b'0') => {
                base.checked_add(1).ok_or(AmountError::Overflow)
            }
            _ => Ok(base),
        }
    }

    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or_default()
    }

    /// True when the amount is strictly below `other`.
    pub fn less_than(&self, other: &DecimalAmount) -> bool {
        let scale = self.frac.len().max(other.frac.len()) as u32;
        match (
            self.to_base_units(scale, Rounding::Floor),
            other.to_base_units(scale, Rounding::Floor),
        ) {
            (Ok(a), Ok(b)) => a < b,
            _ => self.to_f64() < other.to_f64(),
        }
    }
}

/// Rewrites a JSON number such as `1e-7` or `2.5E3` in plain decimal form.
/// Text without an exponent is returned unchanged.
pub fn expand_exponent(number: &str) -> String {
    let Some((mantissa, exponent)) = number.split_once(['e', 'E']) else {
        return number.to_string();
    };
    let exponent = match exponent.parse::<i64>() {
        Ok(e) if e.abs() <= 400 => e,
        _ => return number.to_string(),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let (whole, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let digits = format!("{whole}{frac}");
    let point = whole.len() as i64 + exponent;

    let plain = if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point as usize >= digits.len() {
        format!("{}{}", digits, "0".repeat(point as usize - digits.len()))
    } else {
        let (w, f) = digits.split_at(point as usize);
        format!("{w}.{f}")
    };
    format!("{sign}{plain}")
}

/// Formats a base-unit integer as a decimal string with trailing zeros removed.
///
/// Examples:
/// - base=1500000000, decimals=9 => "1.5"
/// - base=1, decimals=9 => "0.000000001"
pub fn format_base_units(base: u128, decimals: u32) -> String {
    if decimals == 0 {
        return base.to_string();
    }
    let scale = 10_u128.pow(decimals);
    let whole = base / scale;
    let frac = base % scale;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_s = format!("{frac:0width$}", width = decimals as usize);
    format!("{whole}.{}", frac_s.trim_end_matches('0'))
}

/// Formats a base-unit integer with exactly `places` fractional digits,
/// rounding half up.
pub fn format_base_units_fixed(base: u128, decimals: u32, places: u32) -> String {
    let scale = 10_u128.pow(decimals);
    let place_scale = 10_u128.pow(places);
    let scaled = base.saturating_mul(place_scale);
    let mut quotient = scaled / scale;
    if (scaled % scale).saturating_mul(2) >= scale {
        quotient += 1;
    }
    if places == 0 {
        return quotient.to_string();
    }
    format!(
        "{}.{:0width$}",
        quotient / place_scale,
        quotient % place_scale,
        width = places as usize
    )
}

pub fn base_units_to_f64(base: u128, decimals: u32) -> f64 {
    format_base_units(base, decimals).parse().unwrap_or_default()
}

pub fn mist_to_sui(mist: u128) -> f64 {
    base_units_to_f64(mist, SUI_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> DecimalAmount {
        s.parse().unwrap()
    }

    #[test]
    fn expands_json_exponents() {
        assert_eq!(expand_exponent("1e-7"), "0.0000001");
        assert_eq!(expand_exponent("1.5e-7"), "0.00000015");
        assert_eq!(expand_exponent("2.5E3"), "2500");
        assert_eq!(expand_exponent("1.25e1"), "12.5");
        assert_eq!(expand_exponent("1e21"), "1000000000000000000000");
        assert_eq!(expand_exponent("0.5"), "0.5");
        assert_eq!(
            parse(&expand_exponent("1e-7")).to_base_units(SUI_DECIMALS, Rounding::Floor),
            Ok(100)
        );
    }

    #[test]
    fn converts_whole_and_fractional_sui_exactly() {
        assert_eq!(
            parse("1.5").to_base_units(SUI_DECIMALS, Rounding::Floor),
            Ok(1_500_000_000)
        );
        assert_eq!(
            parse("0.000000001").to_base_units(SUI_DECIMALS, Rounding::Floor),
            Ok(1)
        );
        assert_eq!(
            parse("42").to_base_units(SUI_DECIMALS, Rounding::Ceil),
            Ok(42 * MIST_PER_SUI)
        );
    }

    #[test]
    fn rounding_only_matters_past_the_unit_precision() {
        let amount = parse("0.0000000015");
        assert_eq!(amount.to_base_units(SUI_DECIMALS, Rounding::Floor), Ok(1));
        assert_eq!(amount.to_base_units(SUI_DECIMALS, Rounding::Ceil), Ok(2));

        let exact = parse("0.100000000000");
        assert_eq!(exact.to_base_units(SUI_DECIMALS, Rounding::Ceil), Ok(100_000_000));
    }

    #[test]
    fn converts_near_and_eth_units() {
        assert_eq!(
            parse("1").to_base_units(NEAR_DECIMALS, Rounding::Floor),
            Ok(1_000_000_000_000_000_000_000_000)
        );
        assert_eq!(
            parse("0.01").to_base_units(ETH_DECIMALS, Rounding::Floor),
            Ok(10_000_000_000_000_000)
        );
    }

    #[test]
    fn rejects_non_decimal_input() {
        for bad in ["abc", "1,5", "1e3", "-1", "1.2.3", ".", "0x10", " 1 2"] {
            assert!(bad.parse::<DecimalAmount>().is_err(), "accepted {bad:?}");
        }
        assert_eq!("".parse::<DecimalAmount>(), Err(AmountError::Empty));
    }

    #[test]
    fn normalises_and_detects_zero() {
        assert!(parse("0.000").is_zero());
        assert!(parse("+0").is_zero());
        assert!(!parse(".5").is_zero());
        assert_eq!(parse("007.2500").to_string(), "7.25");
        assert_eq!(parse(".5").to_string(), "0.5");
    }

    #[test]
    fn reports_overflow() {
        let huge = "9".repeat(40);
        assert_eq!(
            parse(&huge).to_base_units(SUI_DECIMALS, Rounding::Floor),
            Err(AmountError::Overflow)
        );
    }

    #[test]
    fn compares_amounts() {
        assert!(parse("0.0009").less_than(&parse("0.001")));
        assert!(!parse("0.001").less_than(&parse("0.001")));
        assert!(!parse("2").less_than(&parse("1.999")));
    }

    #[test]
    fn formats_base_units() {
        assert_eq!(format_base_units(1_500_000_000, 9), "1.5");
        assert_eq!(format_base_units(1, 9), "0.000000001");
        assert_eq!(format_base_units(10 * MIST_PER_SUI, 9), "10");
        assert_eq!(format_base_units_fixed(500_000_000, 9, 4), "0.5000");
        assert_eq!(format_base_units_fixed(1_010_000_000, 9, 4), "1.0100");
        assert_eq!(format_base_units_fixed(123_456_789, 9, 6), "0.123457");
        assert_eq!(format_base_units_fixed(0, 9, 6), "0.000000");
        assert_eq!(mist_to_sui(2_500_000_000), 2.5);
    }
}

//! Amount-to-words conversion (Indian numbering)
//!
//! Integer rupees are grouped crore (10^7), lakh (10^5), thousand, hundred,
//! then a 0-99 remainder. Paise are appended as a separate phrase.
//!
//! ```
//! use oppa_server::receipt::words::amount_to_words;
//! use rust_decimal::Decimal;
//!
//! let words = amount_to_words(Decimal::new(15000050, 2)).unwrap();
//! assert_eq!(words, "One lakh fifty thousand and fifty paise only.");
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Monetary precision: rupees and paise
pub const DECIMAL_PLACES: u32 = 2;

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;
const HUNDRED: u64 = 100;

const UNITS: [&str; 10] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
];
const TEENS: [&str; 10] = [
    "ten",
    "eleven",
    "twelve",
    "thirteen",
    "fourteen",
    "fifteen",
    "sixteen",
    "seventeen",
    "eighteen",
    "nineteen",
];
const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Amount rejected before conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidAmount {
    #[error("amount is not a number: {0}")]
    NotANumber(String),

    #[error("amount must not be negative: {0}")]
    Negative(Decimal),

    #[error("amount exceeds supported range: {0}")]
    OutOfRange(Decimal),
}

/// Non-negative rupee amount rounded to paise
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted amount (10^15 rupees)
    pub fn max_value() -> Decimal {
        Decimal::from(1_000_000_000_000_000_u64)
    }

    pub fn new(value: Decimal) -> Result<Self, InvalidAmount> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(InvalidAmount::Negative(value));
        }
        let rounded =
            value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
        if rounded > Self::max_value() {
            return Err(InvalidAmount::OutOfRange(value));
        }
        // -0.00 normalizes to 0.00
        Ok(Self(rounded.abs()))
    }

    /// Parse textual input such as `"150000.50"`
    pub fn parse(input: &str) -> Result<Self, InvalidAmount> {
        let value = Decimal::from_str(input.trim())
            .map_err(|_| InvalidAmount::NotANumber(input.to_string()))?;
        Self::new(value)
    }

    /// Convert a float; NaN and infinities are rejected
    pub fn from_f64(value: f64) -> Result<Self, InvalidAmount> {
        if !value.is_finite() {
            return Err(InvalidAmount::NotANumber(value.to_string()));
        }
        let decimal =
            Decimal::from_f64(value).ok_or_else(|| InvalidAmount::NotANumber(value.to_string()))?;
        Self::new(decimal)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn rupees(&self) -> u64 {
        self.0.trunc().to_u64().unwrap_or_default()
    }

    fn paise(&self) -> u64 {
        (self.0.fract() * Decimal::ONE_HUNDRED)
            .round()
            .to_u64()
            .unwrap_or_default()
    }

    /// Spell the amount out, e.g. `"Twenty one only."`
    ///
    /// Exactly zero yields the bare word `"zero"` without the suffix.
    pub fn to_words(&self) -> String {
        if self.is_zero() {
            return "zero".to_string();
        }

        let rupees = self.rupees();
        let paise = self.paise();

        let mut phrase = integer_words(rupees);
        if paise > 0 {
            let paise_words = format!("{} paise", below_hundred(paise));
            if phrase.is_empty() {
                phrase = paise_words;
            } else {
                phrase.push_str(" and ");
                phrase.push_str(&paise_words);
            }
        }

        format!("{} only.", capitalize(&phrase))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Convert an amount in rupees to words
pub fn amount_to_words(amount: Decimal) -> Result<String, InvalidAmount> {
    Amount::new(amount).map(|a| a.to_words())
}

/// 0-99; zero is the empty string
fn below_hundred(n: u64) -> String {
    debug_assert!(n < 100);
    match n {
        0..=9 => UNITS[n as usize].to_string(),
        10..=19 => TEENS[(n - 10) as usize].to_string(),
        _ => {
            let tens = TENS[(n / 10) as usize];
            match n % 10 {
                0 => tens.to_string(),
                unit => format!("{tens} {}", UNITS[unit as usize]),
            }
        }
    }
}

/// Whole rupees in Indian grouping; zero is the empty string
fn integer_words(mut n: u64) -> String {
    let mut words: Vec<String> = Vec::new();

    if n >= CRORE {
        let crores = n / CRORE;
        // Beyond 99 crore the multiplier is itself grouped
        let multiplier = if crores >= HUNDRED {
            integer_words(crores)
        } else {
            below_hundred(crores)
        };
        words.push(format!("{multiplier} crore"));
        n %= CRORE;
    }
    for (size, name) in [(LAKH, "lakh"), (THOUSAND, "thousand"), (HUNDRED, "hundred")] {
        if n >= size {
            words.push(format!("{} {name}", below_hundred(n / size)));
            n %= size;
        }
    }
    if n > 0 {
        if !words.is_empty() {
            words.push("and".to_string());
        }
        words.push(below_hundred(n));
    }

    words.join(" ")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(input: &str) -> String {
        Amount::parse(input).unwrap().to_words()
    }

    #[test]
    fn test_zero_is_bare_word() {
        assert_eq!(words("0"), "zero");
        assert_eq!(words("0.00"), "zero");
        assert_eq!(words("0.001"), "zero");
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(words("100"), "One hundred only.");
        assert_eq!(words("21"), "Twenty one only.");
        assert_eq!(words("20"), "Twenty only.");
        assert_eq!(words("7"), "Seven only.");
        assert_eq!(words("13"), "Thirteen only.");
    }

    #[test]
    fn test_and_before_remainder() {
        assert_eq!(words("105"), "One hundred and five only.");
        assert_eq!(words("1001"), "One thousand and one only.");
        assert_eq!(words("1100"), "One thousand one hundred only.");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(
            words("1234567.89"),
            "Twelve lakh thirty four thousand five hundred and sixty seven and eighty nine paise only."
        );
        assert_eq!(words("150000.50"), "One lakh fifty thousand and fifty paise only.");
        assert_eq!(words("10000000"), "One crore only.");
        assert_eq!(
            words("99999999.99"),
            "Nine crore ninety nine lakh ninety nine thousand nine hundred and ninety nine and ninety nine paise only."
        );
    }

    #[test]
    fn test_large_crore_multiplier() {
        assert_eq!(
            words("12345678900"),
            "One thousand two hundred and thirty four crore fifty six lakh seventy eight thousand nine hundred only."
        );
    }

    #[test]
    fn test_paise_only() {
        assert_eq!(words("0.5"), "Fifty paise only.");
        assert_eq!(words("0.05"), "Five paise only.");
    }

    #[test]
    fn test_paise_rounding() {
        assert_eq!(words("1.005"), "One and one paise only.");
        assert_eq!(words("1.994"), "One and ninety nine paise only.");
        assert_eq!(words("1.999"), "Two only.");
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            Amount::parse("abc"),
            Err(InvalidAmount::NotANumber(_))
        ));
        assert!(matches!(
            Amount::parse("-5"),
            Err(InvalidAmount::Negative(_))
        ));
        assert!(matches!(
            Amount::from_f64(f64::NAN),
            Err(InvalidAmount::NotANumber(_))
        ));
        assert!(matches!(
            Amount::from_f64(f64::INFINITY),
            Err(InvalidAmount::NotANumber(_))
        ));
        assert!(matches!(
            Amount::parse("1000000000000000.01"),
            Err(InvalidAmount::OutOfRange(_))
        ));
        assert!(amount_to_words(Decimal::new(-1, 2)).is_err());
    }

    #[test]
    fn test_from_f64() {
        assert_eq!(Amount::from_f64(21.0).unwrap().to_words(), "Twenty one only.");
        assert_eq!(Amount::from_f64(0.1 + 0.2).unwrap().to_string(), "0.30");
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Amount::parse("150000.5").unwrap().to_string(), "150000.50");
        assert_eq!(Amount::ZERO.to_string(), "0.00");
        assert_eq!(Amount::parse("-0").unwrap().to_string(), "0.00");
    }

    #[test]
    fn test_deterministic_and_non_empty() {
        for cents in (0..=9_999_999_999_u64).step_by(7_654_321) {
            let amount = Amount::new(Decimal::new(cents as i64, 2)).unwrap();
            let first = amount.to_words();
            assert!(!first.is_empty());
            assert_eq!(first, amount.to_words());
            if !amount.is_zero() {
                assert!(first.ends_with(" only."), "{amount}: {first}");
            }
        }
    }
}

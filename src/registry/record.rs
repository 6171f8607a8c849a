use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

// ─── Constants ───────────────────────────────────────────────────

const MAX_INTEGER_DIGITS: usize = 12;
const MAX_FRACTION_DIGITS: usize = 2;
const CENTS_PER_UNIT: u64 = 100;

/// Identifier assigned by the registry. Always ≥ 1.
pub type RecordId = u64;

// ─── Domain type ─────────────────────────────────────────────────

/// The managed entity. The registry owns the authoritative copy;
/// everything handed to callers is a clone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "currentPrice")]
    pub price: Price,
    /// Milliseconds since the Unix epoch of the last create/update.
    pub last_update: i64,
}

// ─── Price ───────────────────────────────────────────────────────

/// Non-negative decimal with at most 12 integer and 2 fraction digits,
/// stored exactly as hundredths (e.g. 1245 = 12.45).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price must not be negative")]
    Negative,
    #[error("price must have at most 12 integer digits")]
    TooManyIntegerDigits,
    #[error("price must have at most 2 fraction digits")]
    TooManyFractionDigits,
    #[error("price is not a decimal number: {0:?}")]
    Malformed(String),
}

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / CENTS_PER_UNIT as f64
    }

    /// Whole units, rejecting anything above 12 digits.
    pub fn from_units(units: u64) -> Result<Self, PriceError> {
        if digit_count(units) > MAX_INTEGER_DIGITS {
            return Err(PriceError::TooManyIntegerDigits);
        }
        Ok(Self(units * CENTS_PER_UNIT))
    }

    /// Parse a float via its shortest round-trip representation, so
    /// `12.45_f64` becomes exactly 1245 hundredths.
    pub fn from_f64(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() {
            return Err(PriceError::Malformed(value.to_string()));
        }
        if value < 0.0 {
            return Err(PriceError::Negative);
        }
        format!("{value}").parse()
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.starts_with('-') {
            return Err(PriceError::Negative);
        }

        let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw, ""));
        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(PriceError::Malformed(raw.to_owned()));
        }

        let int_part = int_part.trim_start_matches('0');
        let frac_part = frac_part.trim_end_matches('0');
        if int_part.len() > MAX_INTEGER_DIGITS {
            return Err(PriceError::TooManyIntegerDigits);
        }
        if frac_part.len() > MAX_FRACTION_DIGITS {
            return Err(PriceError::TooManyFractionDigits);
        }

        // Both parts are bounded above, so neither parse can overflow.
        let units: u64 = if int_part.is_empty() {
            0
        } else {
            int_part
                .parse()
                .map_err(|_| PriceError::Malformed(raw.to_owned()))?
        };
        let cents: u64 = match frac_part.len() {
            0 => 0,
            1 => u64::from(frac_part.as_bytes()[0] - b'0') * 10,
            _ => frac_part
                .parse()
                .map_err(|_| PriceError::Malformed(raw.to_owned()))?,
        };

        Ok(Self(units * CENTS_PER_UNIT + cents))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / CENTS_PER_UNIT, self.0 % CENTS_PER_UNIT)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl<'de> Visitor<'de> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative decimal number or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Price::from_units(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        match u64::try_from(v) {
            Ok(units) => self.visit_u64(units),
            Err(_) => Err(E::custom(PriceError::Negative)),
        }
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Price::from_f64(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}

fn digit_count(mut n: u64) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_strings_exactly() {
        assert_eq!("12.45".parse::<Price>().unwrap().cents(), 1245);
        assert_eq!("666.6".parse::<Price>().unwrap().cents(), 66660);
        assert_eq!("7".parse::<Price>().unwrap().cents(), 700);
        assert_eq!("0.05".parse::<Price>().unwrap().cents(), 5);
        assert_eq!(".5".parse::<Price>().unwrap().cents(), 50);
        assert_eq!("12.450".parse::<Price>().unwrap().cents(), 1245);
    }

    #[test]
    fn rejects_out_of_range_prices() {
        assert_eq!("-1".parse::<Price>(), Err(PriceError::Negative));
        assert_eq!("1.234".parse::<Price>(), Err(PriceError::TooManyFractionDigits));
        assert_eq!(
            "1234567890123".parse::<Price>(),
            Err(PriceError::TooManyIntegerDigits)
        );
        assert!(matches!("12a".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!("".parse::<Price>(), Err(PriceError::Malformed(_))));
        assert!(matches!(".".parse::<Price>(), Err(PriceError::Malformed(_))));
    }

    #[test]
    fn accepts_twelve_integer_digits() {
        let p: Price = "999999999999.99".parse().unwrap();
        assert_eq!(p.cents(), 99_999_999_999_999);
        assert_eq!(p.to_string(), "999999999999.99");
    }

    #[test]
    fn float_input_keeps_two_decimals() {
        assert_eq!(Price::from_f64(12.45).unwrap().cents(), 1245);
        assert_eq!(Price::from_f64(100001.66).unwrap().cents(), 10_000_166);
        assert_eq!(Price::from_f64(-0.5), Err(PriceError::Negative));
        assert_eq!(Price::from_f64(0.125), Err(PriceError::TooManyFractionDigits));
    }

    #[test]
    fn record_uses_wire_field_names() {
        let record = Record {
            id: 11,
            name: "test".into(),
            price: Price::from_cents(1245),
            last_update: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 11,
                "name": "test",
                "currentPrice": 12.45,
                "lastUpdate": 1_700_000_000_000_i64,
            })
        );

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn deserializes_numbers_and_strings() {
        let from_int: Price = serde_json::from_str("3").unwrap();
        let from_float: Price = serde_json::from_str("3.5").unwrap();
        let from_str: Price = serde_json::from_str("\"3.50\"").unwrap();
        assert_eq!(from_int.cents(), 300);
        assert_eq!(from_float, from_str);
        assert!(serde_json::from_str::<Price>("-3").is_err());
        assert!(serde_json::from_str::<Price>("true").is_err());
    }
}

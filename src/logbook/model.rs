//! Core data types shared by every collection.
//!
//! A [`Record`] is any serializable value with exactly one identity. The store
//! never looks inside a record beyond [`Record::key`]; everything else is the
//! embedding domain's business.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single domain entity kept in a collection.
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug {
    /// Identity used for lookup, update and delete.
    type Key: Clone + Eq + fmt::Display + fmt::Debug;

    /// Collection name. Also names the persisted file (`<collection>.json`).
    const COLLECTION: &'static str;

    fn key(&self) -> Self::Key;

    /// Position in an integer id sequence, for collections with generated ids.
    fn sequence(&self) -> Option<u64> {
        None
    }
}

/// Identity built from one or more text fields (e.g. title + author).
///
/// Parts compare trimmed and case-insensitively, so `"Dune"` and `"dune "`
/// name the same record. The original spelling is kept for display.
#[derive(Debug, Clone)]
pub struct NaturalKey {
    display: Vec<String>,
    normalized: Vec<String>,
}

impl NaturalKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let display: Vec<String> = parts
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .collect();
        let normalized = display.iter().map(|p| p.to_lowercase()).collect();
        Self {
            display,
            normalized,
        }
    }
}

impl PartialEq for NaturalKey {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for NaturalKey {}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.display.join(" / "))
    }
}

/// Fixed-point decimal amount with two fractional digits.
///
/// Persisted as a string (`"12.50"`) so files never carry float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const ZERO: Money = Money { cents: 0 };

    /// Largest amount accepted from input or a file: ten billion.
    pub const MAX: Money = Money {
        cents: 1_000_000_000_000,
    };

    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub fn cents(&self) -> i64 {
        self.cents
    }

    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money::from_cents(self.cents.saturating_add(rhs.cents))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('$');
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(format!("'{}' is not an amount", s));
        }
        if frac.len() > 2 {
            return Err("at most two decimal places are allowed".to_string());
        }
        let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) {
            return Err(format!("'{}' is not an amount", s));
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| format!("'{}' is too large", s))?
        };
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().unwrap_or(0) * 10,
            _ => frac.parse::<i64>().unwrap_or(0),
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac))
            .filter(|c| *c <= Money::MAX.cents)
            .ok_or_else(|| format!("'{}' is too large (at most {})", s, Money::MAX))?;

        Ok(Money::from_cents(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//! Numeric coercion for loosely-typed sheet cells and request values.

use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Parse the leading base-10 integer of a cell.
///
/// Leading whitespace and one sign are accepted, parsing stops at the first
/// non-digit. A cell with no leading digits counts as 0, so `"12abc"` is 12,
/// `"3.9"` is 3 and `"n/a"` is 0. Out-of-range values saturate.
pub fn parse_leading_int(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let magnitude = rest
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0i64, |acc, digit| {
            acc.saturating_mul(10).saturating_add(i64::from(digit))
        });

    if negative {
        magnitude.saturating_neg()
    } else {
        magnitude
    }
}

/// A client-supplied increment for the Points column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreDelta(i64);

impl ScoreDelta {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    /// Coerce a JSON request field into a delta.
    ///
    /// Integers, integral floats and strings holding an integer are accepted.
    /// Everything else, including an absent field, is an [`Error::InvalidDelta`].
    pub fn from_json(value: Option<&JsonValue>) -> Result<Self> {
        match value {
            None | Some(JsonValue::Null) => {
                Err(Error::InvalidDelta("missing score delta".to_string()))
            }
            Some(JsonValue::Number(n)) => {
                if let Some(v) = n.as_i64() {
                    return Ok(Self(v));
                }
                match n.as_f64() {
                    Some(f)
                        if f.is_finite()
                            && f.fract() == 0.0
                            && f >= i64::MIN as f64
                            && f < i64::MAX as f64 =>
                    {
                        Ok(Self(f as i64))
                    }
                    _ => Err(Error::InvalidDelta(format!(
                        "score delta must be an integer, got {}",
                        n
                    ))),
                }
            }
            Some(JsonValue::String(s)) => s.parse(),
            Some(other) => Err(Error::InvalidDelta(format!(
                "score delta must be a number, got {}",
                other
            ))),
        }
    }
}

impl FromStr for ScoreDelta {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| Error::InvalidDelta(format!("score delta '{}' is not a number", s)))
    }
}

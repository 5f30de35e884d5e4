//! Broker-native fixed-point numbers.
//!
//! # Encoding
//!
//! The broker transmits every price, quantity and yield as a pair:
//! - `units`: signed 64-bit whole part;
//! - `nano`:  signed 32-bit fractional part in billionths (1e-9).
//!
//! Both halves carry the same sign, so `-1.5` is `(units=-1, nano=-500_000_000)`.
//!
//! # Conversion
//!
//! [`Quotation::to_f64`] is the only way out of the fixed-point domain.  It
//! adds the two halves in `f64` without an intermediate integer rescale, so
//! the result is exactly as precise as the nearest `f64` allows and never
//! truncated further.
//!
//! `units` is an int64 and the JSON mapping of int64 is a *string*; the
//! deserializer accepts both `"42"` and `42`. Zero-valued halves may be
//! omitted altogether.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of `nano` steps per whole unit.
pub const NANO_SCALE: i64 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Quotation
// ---------------------------------------------------------------------------

/// A dimensionless fixed-point value (quantity, price, yield).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quotation {
    #[serde(default, deserialize_with = "de_units")]
    pub units: i64,
    #[serde(default)]
    pub nano: i32,
}

impl Quotation {
    pub const ZERO: Quotation = Quotation { units: 0, nano: 0 };

    #[inline]
    pub const fn new(units: i64, nano: i32) -> Self {
        Quotation { units, nano }
    }

    /// Convert to `f64` for publication.
    #[inline]
    pub fn to_f64(self) -> f64 {
        self.units as f64 + self.nano as f64 / NANO_SCALE as f64
    }

    /// `true` when `units` and `nano` do not disagree in sign and `nano`
    /// stays below one whole unit.
    pub fn is_well_formed(self) -> bool {
        let nano_in_range = (self.nano as i64).abs() < NANO_SCALE;
        let signs_agree =
            self.units == 0 || self.nano == 0 || self.units.signum() == (self.nano as i64).signum();
        nano_in_range && signs_agree
    }
}

// ---------------------------------------------------------------------------
// MoneyValue
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount tagged with its ISO currency code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyValue {
    #[serde(default)]
    pub currency: String,
    #[serde(default, deserialize_with = "de_units")]
    pub units: i64,
    #[serde(default)]
    pub nano: i32,
}

impl MoneyValue {
    pub fn new(currency: impl Into<String>, units: i64, nano: i32) -> Self {
        Self {
            currency: currency.into(),
            units,
            nano,
        }
    }

    /// The amount without its currency tag.
    #[inline]
    pub fn amount(&self) -> Quotation {
        Quotation::new(self.units, self.nano)
    }

    #[inline]
    pub fn to_f64(&self) -> f64 {
        self.amount().to_f64()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

fn de_units<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid units '{s}': {e}"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

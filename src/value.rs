//! Fixed-point unit values and the two combinators every budget and truth
//! function is built from.
//!
//! A [`ShortFloat`] keeps four decimal digits, stored as an integer in
//! `0..=10000`, which makes equality exact and printing stable. Values outside
//! `[0, 1]` are refused at construction; see [`ShortFloat::new`].

use std::fmt;

use crate::error::{NoesisError, Result};

/// Number of steps in the unit interval.
pub const SCALE: u16 = 10_000;

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug, Default)]
pub struct ShortFloat {
    value: u16,
}

impl ShortFloat {
    pub const ZERO: ShortFloat = ShortFloat { value: 0 };
    pub const ONE: ShortFloat = ShortFloat { value: SCALE };

    /// Quantizes `v` to four digits. Fails with [`NoesisError::Range`] when the
    /// rounded value falls outside the unit interval.
    pub fn new(v: f32) -> Result<Self> {
        let scaled = (v * SCALE as f32).round();
        if !(0.0..=SCALE as f32).contains(&scaled) || scaled.is_nan() {
            return Err(NoesisError::Range { value: v });
        }
        Ok(Self { value: scaled as u16 })
    }
    /// Used by the algebra, whose results stay in range for in-range inputs.
    /// Rounding absorbs float noise; anything else is reported and saturated.
    pub(crate) fn unit(v: f32) -> Self {
        match Self::new(v) {
            Ok(s) => s,
            Err(_) => {
                tracing::warn!(value = v, "value algebra left the unit interval");
                if v > 1.0 { Self::ONE } else { Self::ZERO }
            }
        }
    }
    pub fn from_raw(raw: u16) -> Result<Self> {
        if raw > SCALE {
            return Err(NoesisError::Range { value: raw as f32 / SCALE as f32 });
        }
        Ok(Self { value: raw })
    }
    pub fn raw(&self) -> u16 {
        self.value
    }
    pub fn value(&self) -> f32 {
        self.value as f32 / SCALE as f32
    }
    pub fn set(&mut self, v: f32) -> Result<()> {
        *self = Self::new(v)?;
        Ok(())
    }
}

impl fmt::Display for ShortFloat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:04}", self.value / SCALE, self.value % SCALE)
    }
}
impl From<ShortFloat> for f32 {
    fn from(s: ShortFloat) -> f32 {
        s.value()
    }
}
impl TryFrom<f32> for ShortFloat {
    type Error = NoesisError;
    fn try_from(v: f32) -> Result<Self> {
        Self::new(v)
    }
}

// ------------- Combinators -------------

/// Probabilistic OR, `1 - Π(1 - x)`. Used to raise a value.
pub fn or(values: &[f32]) -> f32 {
    1.0 - values.iter().fold(1.0, |product, x| product * (1.0 - x))
}

/// Probabilistic AND, `Π x`. Used to lower a value.
pub fn and(values: &[f32]) -> f32 {
    values.iter().product()
}

pub fn ave_ari(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

pub fn ave_geo(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    and(values).powf(1.0 / values.len() as f32)
}

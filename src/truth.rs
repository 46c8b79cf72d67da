//! Truth values `(frequency, confidence)` and the truth functions over them.
//!
//! Confidence is kept strictly below 1 ([`MAX_CONFIDENCE`]); a confidence of
//! one would stand for an infinite amount of evidence. Truth values are
//! immutable, every function returns a fresh value.

use std::fmt;

use crate::error::{NoesisError, Result};
use crate::value::{and, or, ShortFloat};

/// Highest representable confidence.
pub const MAX_CONFIDENCE: f32 = 0.9999;
/// Evidential horizon, the amount of future evidence assumed by `w2c`.
pub const HORIZON: f32 = 1.0;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct TruthValue {
    frequency: ShortFloat,
    confidence: ShortFloat,
}

impl TruthValue {
    /// Confidence above [`MAX_CONFIDENCE`] is capped there; anything outside the
    /// unit interval is an error.
    pub fn new(frequency: f32, confidence: f32) -> Result<Self> {
        let frequency = ShortFloat::new(frequency)?;
        let confidence = ShortFloat::new(confidence)?;
        Ok(Self::capped(frequency, confidence))
    }
    fn capped(frequency: ShortFloat, confidence: ShortFloat) -> Self {
        let cap = ShortFloat::unit(MAX_CONFIDENCE);
        Self { frequency, confidence: confidence.min(cap) }
    }
    pub(crate) fn from_unit(frequency: f32, confidence: f32) -> Self {
        Self::capped(ShortFloat::unit(frequency), ShortFloat::unit(confidence.min(MAX_CONFIDENCE)))
    }
    pub fn frequency(&self) -> f32 {
        self.frequency.value()
    }
    pub fn confidence(&self) -> f32 {
        self.confidence.value()
    }
    pub fn expectation(&self) -> f32 {
        self.confidence() * (self.frequency() - 0.5) + 0.5
    }
    pub fn exp_dif_abs(&self, other: &TruthValue) -> f32 {
        (self.expectation() - other.expectation()).abs()
    }
    pub fn is_negative(&self) -> bool {
        self.frequency() < 0.5
    }
    /// Amount of evidence behind this value.
    pub fn weight(&self) -> f32 {
        c2w(self.confidence())
    }
}

impl fmt::Display for TruthValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "%{};{}%", self.frequency, self.confidence)
    }
}

impl TryFrom<(f32, f32)> for TruthValue {
    type Error = NoesisError;
    fn try_from((f, c): (f32, f32)) -> Result<Self> {
        Self::new(f, c)
    }
}

// ------------- Evidence conversions -------------

/// Confidence to weight of evidence, `c / (1 - c)`.
pub fn c2w(c: f32) -> f32 {
    HORIZON * c / (1.0 - c)
}

/// Weight of evidence to confidence, `w / (w + k)`.
pub fn w2c(w: f32) -> f32 {
    w / (w + HORIZON)
}

// ------------- Revision -------------

/// Pools two bodies of independent evidence about the same content.
///
/// The result is symmetric in its arguments and its confidence is never below
/// either input's. The caller is responsible for checking that the two
/// premises do not share evidence (see [`crate::stamp::Stamp::overlaps`]).
pub fn revision(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let w1 = v1.weight();
    let w2 = v2.weight();
    let w = w1 + w2;
    if w == 0.0 {
        return TruthValue::from_unit((v1.frequency() + v2.frequency()) / 2.0, 0.0);
    }
    let f = (w1 * v1.frequency() + w2 * v2.frequency()) / w;
    TruthValue::from_unit(f, w2c(w))
}

// ------------- Single premise -------------

pub fn negation(v: &TruthValue) -> TruthValue {
    TruthValue::from_unit(1.0 - v.frequency(), v.confidence())
}

/// `{<A --> B>} |- <B --> A>`
pub fn conversion(v: &TruthValue) -> TruthValue {
    let w = and(&[v.frequency(), v.confidence()]);
    TruthValue::from_unit(1.0, w2c(w))
}

// ------------- Double premise -------------

/// `{<S --> M>, <M --> P>} |- <S --> P>`
pub fn deduction(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = and(&[v1.frequency(), v2.frequency()]);
    let c = and(&[f, v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

/// `{<S --> M>, <M <-> P>} |- <S --> P>`
pub fn analogy(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = and(&[v1.frequency(), v2.frequency()]);
    let c = and(&[v2.frequency(), v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

/// `{<S <-> M>, <M <-> P>} |- <S <-> P>`
pub fn resemblance(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = and(&[v1.frequency(), v2.frequency()]);
    let c = and(&[or(&[v1.frequency(), v2.frequency()]), v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

/// `{<P --> M>, <S --> M>} |- <S --> P>`
pub fn abduction(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let w = and(&[v2.frequency(), v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(v1.frequency(), w2c(w))
}

/// `{<M --> P>, <M --> S>} |- <S --> P>`
pub fn induction(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    abduction(v2, v1)
}

/// `{<M --> S>, <P --> M>} |- <S --> P>`
pub fn exemplification(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let w = and(&[v1.frequency(), v2.frequency(), v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(1.0, w2c(w))
}

/// `{<M --> S>, <M --> P>} |- <S <-> P>`
pub fn comparison(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f0 = or(&[v1.frequency(), v2.frequency()]);
    let f = if f0 == 0.0 { 0.0 } else { and(&[v1.frequency(), v2.frequency()]) / f0 };
    let w = and(&[f0, v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, w2c(w))
}

pub fn intersection(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = and(&[v1.frequency(), v2.frequency()]);
    let c = and(&[v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

pub fn union(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = or(&[v1.frequency(), v2.frequency()]);
    let c = and(&[v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

pub fn difference(v1: &TruthValue, v2: &TruthValue) -> TruthValue {
    let f = and(&[v1.frequency(), 1.0 - v2.frequency()]);
    let c = and(&[v1.confidence(), v2.confidence()]);
    TruthValue::from_unit(f, c)
}

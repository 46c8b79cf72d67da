//! Evidential stamps.
//!
//! Every input sentence gets one fresh serial number. A derived sentence
//! carries the interleaved bases of its two premises, truncated to a fixed
//! length. Two stamps overlap when their bases intersect, which means the two
//! premises are not independent evidence and must not be combined.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

pub type Serial = u64;

pub const GENESIS: Serial = 0;

// ------------- Serials -------------
#[derive(Debug, Default)]
pub struct SerialGenerator {
    lower_bound: Serial,
}

impl SerialGenerator {
    pub fn new() -> Self {
        Self { lower_bound: GENESIS }
    }
    pub fn generate(&mut self) -> Serial {
        self.lower_bound += 1;
        self.lower_bound
    }
    pub fn current(&self) -> Serial {
        self.lower_bound
    }
}

// ------------- Tense -------------
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Tense {
    Past,
    Present,
    Future,
}

impl Tense {
    pub fn marker(&self) -> &'static str {
        match self {
            Tense::Past => ":\\:",
            Tense::Present => ":|:",
            Tense::Future => ":/:",
        }
    }
    pub fn from_marker(s: &str) -> Option<Self> {
        match s {
            ":\\:" => Some(Tense::Past),
            ":|:" => Some(Tense::Present),
            ":/:" => Some(Tense::Future),
            _ => None,
        }
    }
    /// Occurrence time of an event stated with this tense in cycle `now`.
    pub fn occurrence(&self, now: u64, duration: u64) -> u64 {
        match self {
            Tense::Past => now.saturating_sub(duration),
            Tense::Present => now,
            Tense::Future => now + duration,
        }
    }
}

// ------------- Stamp -------------
#[derive(Clone, Debug)]
pub struct Stamp {
    base: Vec<Serial>,
    creation_time: u64,
    // None stands for an eternal sentence
    occurrence_time: Option<u64>,
    tense: Option<Tense>,
}

impl Stamp {
    /// Stamp of an input sentence, carrying one fresh serial.
    pub fn input(serial: Serial, now: u64, tense: Option<Tense>, duration: u64) -> Self {
        Self {
            base: vec![serial],
            creation_time: now,
            occurrence_time: tense.map(|t| t.occurrence(now, duration)),
            tense,
        }
    }
    /// Stamp of a single-premise derivation: same evidence, new creation time.
    pub fn derived_from(parent: &Stamp, now: u64) -> Self {
        Self { creation_time: now, ..parent.clone() }
    }
    /// Stamp of a double-premise derivation, or `None` when the premises share
    /// evidence. The first stamp decides the occurrence time.
    pub fn merge(first: &Stamp, second: &Stamp, now: u64, max_length: usize) -> Option<Self> {
        if first.overlaps(second) {
            return None;
        }
        let mut base = Vec::with_capacity(max_length.min(first.base.len() + second.base.len()));
        let mut a = first.base.iter();
        let mut b = second.base.iter();
        loop {
            let (x, y) = (a.next(), b.next());
            if x.is_none() && y.is_none() {
                break;
            }
            for serial in [x, y].into_iter().flatten() {
                if base.len() < max_length {
                    base.push(*serial);
                }
            }
            if base.len() >= max_length {
                break;
            }
        }
        Some(Self {
            base,
            creation_time: now,
            occurrence_time: first.occurrence_time,
            tense: first.tense,
        })
    }
    pub fn overlaps(&self, other: &Stamp) -> bool {
        let mine: HashSet<&Serial> = self.base.iter().collect();
        other.base.iter().any(|s| mine.contains(s))
    }
    pub fn base(&self) -> &[Serial] {
        &self.base
    }
    pub fn len(&self) -> usize {
        self.base.len()
    }
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }
    pub fn creation_time(&self) -> u64 {
        self.creation_time
    }
    pub fn occurrence_time(&self) -> Option<u64> {
        self.occurrence_time
    }
    pub fn is_eternal(&self) -> bool {
        self.occurrence_time.is_none()
    }
    pub fn tense(&self) -> Option<Tense> {
        self.tense
    }
    fn sorted_base(&self) -> Vec<Serial> {
        let mut sorted = self.base.clone();
        sorted.sort_unstable();
        sorted
    }
}

// Two stamps are equal when they carry the same evidence about the same moment.
impl PartialEq for Stamp {
    fn eq(&self, other: &Self) -> bool {
        self.occurrence_time == other.occurrence_time && self.sorted_base() == other.sorted_base()
    }
}
impl Eq for Stamp {}
impl Hash for Stamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.occurrence_time.hash(state);
        self.sorted_base().hash(state);
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let serials = self.base.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(";");
        write!(f, "{{{}}}", serials)
    }
}

//! Budget values `(priority, durability, quality)`: the live resource
//! allocation attached to every item that competes for processing.
//!
//! Unlike truth values a budget is mutated in place. Priority is raised on
//! activation, lowered by forgetting, and merged when two items collide on the
//! same key.

use std::fmt;

use crate::error::Result;
use crate::truth::TruthValue;
use crate::value::{and, ave_ari, or, ShortFloat, SCALE};

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct BudgetValue {
    priority: ShortFloat,
    durability: ShortFloat,
    quality: ShortFloat,
    // cycle in which the owning item last went through a bag
    last_visit: Option<u64>,
}

impl BudgetValue {
    pub fn new(priority: f32, durability: f32, quality: f32) -> Result<Self> {
        Ok(Self {
            priority: ShortFloat::new(priority)?,
            durability: ShortFloat::new(durability)?,
            quality: ShortFloat::new(quality)?,
            last_visit: None,
        })
    }
    pub(crate) fn from_unit(priority: f32, durability: f32, quality: f32) -> Self {
        Self {
            priority: ShortFloat::unit(priority),
            durability: ShortFloat::unit(durability),
            quality: ShortFloat::unit(quality),
            last_visit: None,
        }
    }
    pub fn priority(&self) -> f32 {
        self.priority.value()
    }
    pub fn durability(&self) -> f32 {
        self.durability.value()
    }
    pub fn quality(&self) -> f32 {
        self.quality.value()
    }
    pub fn set_priority(&mut self, v: f32) -> Result<()> {
        self.priority.set(v)
    }
    pub fn set_durability(&mut self, v: f32) -> Result<()> {
        self.durability.set(v)
    }
    pub fn set_quality(&mut self, v: f32) -> Result<()> {
        self.quality.set(v)
    }
    pub fn inc_priority(&mut self, v: f32) {
        self.priority = ShortFloat::unit(or(&[self.priority(), v]));
    }
    pub fn dec_priority(&mut self, v: f32) {
        self.priority = ShortFloat::unit(and(&[self.priority(), v]));
    }
    pub fn inc_durability(&mut self, v: f32) {
        self.durability = ShortFloat::unit(or(&[self.durability(), v]));
    }
    pub fn dec_durability(&mut self, v: f32) {
        self.durability = ShortFloat::unit(and(&[self.durability(), v]));
    }
    pub(crate) fn lower_priority_to(&mut self, v: f32) {
        if v < self.priority() {
            self.priority = ShortFloat::unit(v);
        }
    }
    pub fn last_visit(&self) -> Option<u64> {
        self.last_visit
    }
    /// Marks the item as visited in cycle `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_visit = Some(now);
    }
    pub fn with_visit(mut self, now: u64) -> Self {
        self.touch(now);
        self
    }

    /// Arithmetic mean of the three components, used for reporting.
    pub fn summary(&self) -> f32 {
        ave_ari(&[self.priority(), self.durability(), self.quality()])
    }
    /// Whether the item is still worth spending resources on.
    pub fn above_threshold(&self, threshold: f32) -> bool {
        self.durability() * (self.priority() + self.quality()) / 2.0 >= threshold
    }

    /// Absorbs a colliding budget: priorities are or-ed, the longer durability
    /// wins, and the receiver keeps its quality.
    pub fn merge(&mut self, other: &BudgetValue) {
        self.priority = ShortFloat::unit(or(&[self.priority(), other.priority()]));
        self.durability = self.durability.max(other.durability);
        self.last_visit = match (self.last_visit, other.last_visit) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
    /// Boosts a concept with the budget of a task that reached it.
    pub fn activate(&mut self, by: &BudgetValue) {
        self.priority = ShortFloat::unit(or(&[self.priority(), by.priority()]));
        self.durability = ShortFloat::unit(ave_ari(&[self.durability(), by.durability()]));
    }
    /// Exponential decay of priority, scaled by the cycles elapsed since the
    /// last visit.
    ///
    /// Priority above `quality * relative_threshold` decays quickly toward
    /// that level; the part under it decays `relative_threshold` times as fast,
    /// toward zero. Any elapsed time costs a nonzero priority at least one
    /// quantum.
    pub fn forget(&mut self, forget_rate: f32, relative_threshold: f32, now: u64) {
        let elapsed = self.last_visit.map_or(now, |last| now.saturating_sub(last));
        self.last_visit = Some(now);
        if elapsed == 0 || forget_rate <= 0.0 || self.priority == ShortFloat::ZERO {
            return;
        }
        let elapsed = elapsed as f32;
        let durability = self.durability();
        let floor = self.quality() * relative_threshold;
        let below = self.priority().min(floor);
        let above = self.priority() - below;
        let mut decayed = below * durability.powf(elapsed * relative_threshold / forget_rate);
        if above > 0.0 {
            decayed += above * durability.powf(elapsed / (forget_rate * above));
        }
        let decayed = ShortFloat::unit(decayed);
        self.priority = if decayed < self.priority {
            decayed
        } else {
            ShortFloat::unit(self.priority() - 1.0 / SCALE as f32)
        };
    }
}

impl fmt::Display for BudgetValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${};{};{}$", self.priority, self.durability, self.quality)
    }
}

// ------------- Budget functions -------------

/// Quality a judgment earns from its truth: strongly positive or strongly
/// negative evidence are both worth keeping.
pub fn truth_to_quality(truth: &TruthValue) -> f32 {
    let exp = truth.expectation();
    exp.max((1.0 - exp) * 0.75)
}

/// Rank of a belief in its table: confident, first-hand beliefs first.
///
/// Creation time plays no part. The length of the evidential base stands in
/// for recency: a belief derived over many steps ranks below a fresh input of
/// the same confidence, however recently it was derived.
pub fn rank_belief(truth: &TruthValue, base_length: usize) -> f32 {
    let originality = 1.0 / (base_length as f32 + 1.0);
    or(&[truth.confidence(), originality])
}

/// Budget handed to each of `n` links built from one source budget.
pub fn distribute_among_links(budget: &BudgetValue, n: usize) -> BudgetValue {
    let share = budget.priority() / (n.max(1) as f32).sqrt();
    BudgetValue::from_unit(share, budget.durability(), budget.quality())
        .with_last_visit(budget.last_visit)
}

/// Budget of a revision, which also spends part of the task's budget and, when
/// present, rewards the belief link that made it possible.
pub fn revise(
    task_budget: &mut BudgetValue,
    task_truth: &TruthValue,
    belief_truth: &TruthValue,
    revised: &TruthValue,
    belief_link: Option<&mut BudgetValue>,
) -> BudgetValue {
    let dif_task = revised.exp_dif_abs(task_truth);
    task_budget.dec_priority(1.0 - dif_task);
    task_budget.dec_durability(1.0 - dif_task);
    if let Some(link) = belief_link {
        let dif_belief = revised.exp_dif_abs(belief_truth);
        link.dec_priority(1.0 - dif_belief);
        link.dec_durability(1.0 - dif_belief);
    }
    let gain = (revised.confidence() - task_truth.confidence().max(belief_truth.confidence())).max(0.0);
    let priority = or(&[gain, task_budget.priority()]);
    let durability = ave_ari(&[gain, task_budget.durability()]);
    BudgetValue::from_unit(priority, durability, truth_to_quality(revised))
}

impl BudgetValue {
    fn with_last_visit(mut self, last_visit: Option<u64>) -> Self {
        self.last_visit = last_visit;
        self
    }
}

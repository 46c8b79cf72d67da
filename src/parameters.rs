//! Tunable parameters.
//!
//! Everything has a default, so an empty configuration is a valid one. Values
//! are layered: defaults, then an optional file, then `NOESIS_*` environment
//! variables (nested keys joined by `__`, as in `NOESIS_BAG__LEVELS=50`).

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{NoesisError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Parameters {
    /// Seed of the random source behind every bag selection.
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub bag: BagParameters,
    /// Lowest budget an item may have and still be processed.
    #[serde(default = "default_budget_threshold")]
    pub budget_threshold: f32,
    #[serde(default = "default_belief_capacity")]
    pub belief_capacity: usize,
    #[serde(default = "default_question_capacity")]
    pub question_capacity: usize,
    /// Maximum number of serials in an evidential base.
    #[serde(default = "default_stamp_max_length")]
    pub stamp_max_length: usize,
    /// Term links a task link remembers having been fired with.
    #[serde(default = "default_term_link_record_length")]
    pub term_link_record_length: usize,
    /// Cycles after which a remembered term link counts as novel again.
    #[serde(default = "default_novelty_horizon")]
    pub novelty_horizon: u64,
    #[serde(default = "default_max_matched_term_links")]
    pub max_matched_term_links: usize,
    #[serde(default = "default_max_reasoned_term_links")]
    pub max_reasoned_term_links: usize,
    /// Expectation a derived judgment about an unseen term needs to be buffered.
    #[serde(default = "default_creation_expectation")]
    pub creation_expectation: f32,
    /// Desire quality above which a goal leads to a decision.
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f32,
    /// Cycles that a tense marker shifts the occurrence time by.
    #[serde(default = "default_duration")]
    pub duration: u64,
    #[serde(default)]
    pub defaults: DefaultBudgets,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            bag: BagParameters::default(),
            budget_threshold: default_budget_threshold(),
            belief_capacity: default_belief_capacity(),
            question_capacity: default_question_capacity(),
            stamp_max_length: default_stamp_max_length(),
            term_link_record_length: default_term_link_record_length(),
            novelty_horizon: default_novelty_horizon(),
            max_matched_term_links: default_max_matched_term_links(),
            max_reasoned_term_links: default_max_reasoned_term_links(),
            creation_expectation: default_creation_expectation(),
            decision_threshold: default_decision_threshold(),
            duration: default_duration(),
            defaults: DefaultBudgets::default(),
        }
    }
}

fn default_seed() -> u64 {
    42
}
fn default_budget_threshold() -> f32 {
    0.001
}
fn default_belief_capacity() -> usize {
    7
}
fn default_question_capacity() -> usize {
    5
}
fn default_stamp_max_length() -> usize {
    8
}
fn default_term_link_record_length() -> usize {
    10
}
fn default_novelty_horizon() -> u64 {
    100_000
}
fn default_max_matched_term_links() -> usize {
    10
}
fn default_max_reasoned_term_links() -> usize {
    3
}
fn default_creation_expectation() -> f32 {
    0.66
}
fn default_decision_threshold() -> f32 {
    0.51
}
fn default_duration() -> u64 {
    5
}

/// Sizes and forgetting rates of the four kinds of bag. Forget rates are in
/// cycles; a larger rate means slower decay. Concepts outlast the task links
/// that feed them.
#[derive(Debug, Clone, Deserialize)]
pub struct BagParameters {
    #[serde(default = "default_levels")]
    pub levels: usize,
    #[serde(default = "default_concept_capacity")]
    pub concept_capacity: usize,
    #[serde(default = "default_task_link_capacity")]
    pub task_link_capacity: usize,
    #[serde(default = "default_term_link_capacity")]
    pub term_link_capacity: usize,
    #[serde(default = "default_novel_task_capacity")]
    pub novel_task_capacity: usize,
    #[serde(default = "default_concept_forget_rate")]
    pub concept_forget_rate: f32,
    #[serde(default = "default_task_link_forget_rate")]
    pub task_link_forget_rate: f32,
    #[serde(default = "default_term_link_forget_rate")]
    pub term_link_forget_rate: f32,
    #[serde(default = "default_novel_task_forget_rate")]
    pub novel_task_forget_rate: f32,
    /// Fraction of quality under which forgetting slows down.
    #[serde(default = "default_relative_threshold")]
    pub relative_threshold: f32,
}

impl Default for BagParameters {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            concept_capacity: default_concept_capacity(),
            task_link_capacity: default_task_link_capacity(),
            term_link_capacity: default_term_link_capacity(),
            novel_task_capacity: default_novel_task_capacity(),
            concept_forget_rate: default_concept_forget_rate(),
            task_link_forget_rate: default_task_link_forget_rate(),
            term_link_forget_rate: default_term_link_forget_rate(),
            novel_task_forget_rate: default_novel_task_forget_rate(),
            relative_threshold: default_relative_threshold(),
        }
    }
}

fn default_levels() -> usize {
    100
}
fn default_concept_capacity() -> usize {
    1000
}
fn default_task_link_capacity() -> usize {
    20
}
fn default_term_link_capacity() -> usize {
    100
}
fn default_novel_task_capacity() -> usize {
    10
}
fn default_concept_forget_rate() -> f32 {
    60.0
}
fn default_task_link_forget_rate() -> f32 {
    20.0
}
fn default_term_link_forget_rate() -> f32 {
    50.0
}
fn default_novel_task_forget_rate() -> f32 {
    5.0
}
fn default_relative_threshold() -> f32 {
    0.3
}

/// Budgets and truth given to input that does not state its own.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultBudgets {
    #[serde(default = "default_judgment_priority")]
    pub judgment_priority: f32,
    #[serde(default = "default_judgment_durability")]
    pub judgment_durability: f32,
    #[serde(default = "default_question_priority")]
    pub question_priority: f32,
    #[serde(default = "default_question_durability")]
    pub question_durability: f32,
    #[serde(default = "default_goal_priority")]
    pub goal_priority: f32,
    #[serde(default = "default_goal_durability")]
    pub goal_durability: f32,
    #[serde(default = "default_quest_priority")]
    pub quest_priority: f32,
    #[serde(default = "default_quest_durability")]
    pub quest_durability: f32,
    #[serde(default = "default_frequency")]
    pub frequency: f32,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Priority, durability and quality of a freshly created concept.
    #[serde(default = "default_concept_budget")]
    pub concept_budget: f32,
}

impl Default for DefaultBudgets {
    fn default() -> Self {
        Self {
            judgment_priority: default_judgment_priority(),
            judgment_durability: default_judgment_durability(),
            question_priority: default_question_priority(),
            question_durability: default_question_durability(),
            goal_priority: default_goal_priority(),
            goal_durability: default_goal_durability(),
            quest_priority: default_quest_priority(),
            quest_durability: default_quest_durability(),
            frequency: default_frequency(),
            confidence: default_confidence(),
            concept_budget: default_concept_budget(),
        }
    }
}

fn default_judgment_priority() -> f32 {
    0.8
}
fn default_judgment_durability() -> f32 {
    0.8
}
fn default_question_priority() -> f32 {
    0.9
}
fn default_question_durability() -> f32 {
    0.9
}
fn default_goal_priority() -> f32 {
    0.9
}
fn default_goal_durability() -> f32 {
    0.9
}
fn default_quest_priority() -> f32 {
    0.9
}
fn default_quest_durability() -> f32 {
    0.9
}
fn default_frequency() -> f32 {
    1.0
}
fn default_confidence() -> f32 {
    0.9
}
fn default_concept_budget() -> f32 {
    0.01
}

impl Parameters {
    /// Defaults, overlaid by `path` when given, overlaid by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("NOESIS").separator("__").try_parsing(true))
            .build()?;
        let parameters: Parameters = settings.try_deserialize()?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// Rejects settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let unit = [
            ("budget_threshold", self.budget_threshold),
            ("creation_expectation", self.creation_expectation),
            ("decision_threshold", self.decision_threshold),
            ("bag.relative_threshold", self.bag.relative_threshold),
            ("defaults.judgment_priority", self.defaults.judgment_priority),
            ("defaults.judgment_durability", self.defaults.judgment_durability),
            ("defaults.question_priority", self.defaults.question_priority),
            ("defaults.question_durability", self.defaults.question_durability),
            ("defaults.goal_priority", self.defaults.goal_priority),
            ("defaults.goal_durability", self.defaults.goal_durability),
            ("defaults.quest_priority", self.defaults.quest_priority),
            ("defaults.quest_durability", self.defaults.quest_durability),
            ("defaults.frequency", self.defaults.frequency),
            ("defaults.confidence", self.defaults.confidence),
            ("defaults.concept_budget", self.defaults.concept_budget),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(NoesisError::Config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if self.bag.levels == 0 {
            return Err(NoesisError::Config("bag.levels must be at least 1".into()));
        }
        let positive = [
            ("bag.concept_capacity", self.bag.concept_capacity),
            ("bag.task_link_capacity", self.bag.task_link_capacity),
            ("bag.term_link_capacity", self.bag.term_link_capacity),
            ("belief_capacity", self.belief_capacity),
            ("question_capacity", self.question_capacity),
            ("stamp_max_length", self.stamp_max_length),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(NoesisError::Config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }
}

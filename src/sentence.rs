//! Sentences and tasks.
//!
//! A [`Sentence`] is a value: content, punctuation, optional truth and stamp.
//! A [`Task`] wraps a sentence with the budget that lets it compete for
//! processing, plus back-links to what it was derived from.

use std::fmt;
use std::sync::Arc;

use crate::bag::Item;
use crate::budget::BudgetValue;
use crate::error::{NoesisError, Result};
use crate::stamp::Stamp;
use crate::term::{Connector, Term, VarKind};
use crate::truth::TruthValue;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum Punctuation {
    Judgment,
    Question,
    Goal,
    Quest,
}

impl Punctuation {
    pub fn symbol(&self) -> char {
        match self {
            Punctuation::Judgment => '.',
            Punctuation::Question => '?',
            Punctuation::Goal => '!',
            Punctuation::Quest => '@',
        }
    }
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' => Some(Punctuation::Judgment),
            '?' => Some(Punctuation::Question),
            '!' => Some(Punctuation::Goal),
            '@' => Some(Punctuation::Quest),
            _ => None,
        }
    }
    /// Judgments and goals carry truth, questions and quests do not.
    pub fn has_truth(&self) -> bool {
        matches!(self, Punctuation::Judgment | Punctuation::Goal)
    }
}

// ------------- Sentence -------------
#[derive(Clone, Debug)]
pub struct Sentence {
    content: Term,
    punctuation: Punctuation,
    truth: Option<TruthValue>,
    stamp: Stamp,
    revisible: bool,
}

impl Sentence {
    pub fn new(content: Term, punctuation: Punctuation, truth: Option<TruthValue>, stamp: Stamp) -> Result<Self> {
        if punctuation.has_truth() != truth.is_some() {
            return Err(NoesisError::Term(format!(
                "'{}' sentence {} truth value",
                punctuation.symbol(),
                if truth.is_some() { "cannot carry a" } else { "needs a" }
            )));
        }
        if content.is_variable() {
            return Err(NoesisError::Term(format!("a lone variable ({}) cannot be stated", content)));
        }
        let content = content.renamed_variables();
        let revisible = !(content.connector() == Some(Connector::Conjunction) && content.has_var(VarKind::Dependent));
        Ok(Self { content, punctuation, truth, stamp, revisible })
    }
    pub fn content(&self) -> &Term {
        &self.content
    }
    pub fn punctuation(&self) -> Punctuation {
        self.punctuation
    }
    pub fn truth(&self) -> Option<&TruthValue> {
        self.truth.as_ref()
    }
    pub fn stamp(&self) -> &Stamp {
        &self.stamp
    }
    pub fn is_judgment(&self) -> bool {
        self.punctuation == Punctuation::Judgment
    }
    pub fn is_question(&self) -> bool {
        self.punctuation == Punctuation::Question
    }
    pub fn is_goal(&self) -> bool {
        self.punctuation == Punctuation::Goal
    }
    pub fn is_quest(&self) -> bool {
        self.punctuation == Punctuation::Quest
    }
    pub fn revisible(&self) -> bool {
        self.revisible
    }
    /// Key shared by every occurrence of the same statement with the same truth.
    pub fn key(&self) -> String {
        match &self.truth {
            Some(truth) => format!("{}{} {}", self.content, self.punctuation.symbol(), truth),
            None => format!("{}{}", self.content, self.punctuation.symbol()),
        }
    }
    /// Same content, truth and evidence: storing both would add nothing.
    pub fn equivalent_to(&self, other: &Sentence) -> bool {
        self.content == other.content
            && self.punctuation == other.punctuation
            && self.truth == other.truth
            && self.stamp == other.stamp
    }
    /// How well `solution` answers this sentence taken as a problem.
    pub fn solution_quality(&self, solution: &Sentence) -> f32 {
        let Some(truth) = solution.truth() else {
            return 0.0;
        };
        if self.content.has_var(VarKind::Query) {
            truth.expectation() / solution.content.complexity().max(1) as f32
        } else {
            truth.confidence()
        }
    }
    pub fn display_with_stamp(&self) -> String {
        format!("{} {}", self, self.stamp)
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.content, self.punctuation.symbol())?;
        if let Some(tense) = self.stamp.tense() {
            write!(f, " {}", tense.marker())?;
        }
        if let Some(truth) = &self.truth {
            write!(f, " {}", truth)?;
        }
        Ok(())
    }
}

// ------------- Task -------------
#[derive(Clone, Debug)]
pub struct Task {
    key: String,
    sentence: Sentence,
    budget: BudgetValue,
    parent_task: Option<Arc<Sentence>>,
    parent_belief: Option<Arc<Sentence>>,
    best_solution: Option<Sentence>,
}

impl Task {
    /// A task entered from outside the system.
    pub fn input(sentence: Sentence, budget: BudgetValue) -> Self {
        Self::derived(sentence, budget, None, None)
    }
    pub fn derived(
        sentence: Sentence,
        budget: BudgetValue,
        parent_task: Option<Arc<Sentence>>,
        parent_belief: Option<Arc<Sentence>>,
    ) -> Self {
        Self { key: sentence.key(), sentence, budget, parent_task, parent_belief, best_solution: None }
    }
    pub fn sentence(&self) -> &Sentence {
        &self.sentence
    }
    pub fn content(&self) -> &Term {
        self.sentence.content()
    }
    pub fn budget(&self) -> &BudgetValue {
        &self.budget
    }
    pub fn budget_mut(&mut self) -> &mut BudgetValue {
        &mut self.budget
    }
    pub fn is_input(&self) -> bool {
        self.parent_task.is_none()
    }
    pub fn parent_task(&self) -> Option<&Arc<Sentence>> {
        self.parent_task.as_ref()
    }
    pub fn parent_belief(&self) -> Option<&Arc<Sentence>> {
        self.parent_belief.as_ref()
    }
    pub fn best_solution(&self) -> Option<&Sentence> {
        self.best_solution.as_ref()
    }
    pub fn set_best_solution(&mut self, solution: Sentence) {
        self.best_solution = Some(solution);
    }
}

impl Item for Task {
    fn key(&self) -> &str {
        &self.key
    }
    fn budget(&self) -> &BudgetValue {
        &self.budget
    }
    fn budget_mut(&mut self) -> &mut BudgetValue {
        &mut self.budget
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.budget, self.sentence)
    }
}

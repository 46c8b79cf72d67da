//! Per-cycle scratch state and the task-creation API.
//!
//! A [`CycleContext`] lives for one cycle. The memory fills in what is being
//! worked on (the current task, the term link and belief it is paired with),
//! concepts and rules read it, and every new task they produce is collected
//! here and handed back to the memory, which processes it no earlier than the
//! next cycle.

use std::sync::Arc;

use tracing::debug;

use crate::bag::Item;
use crate::budget::{revise, truth_to_quality, BudgetValue};
use crate::event::Event;
use crate::link::TermLink;
use crate::parameters::Parameters;
use crate::sentence::{Sentence, Task};
use crate::stamp::Stamp;
use crate::term::Term;
use crate::truth::{w2c, TruthValue};
use crate::value::{and, or};

#[derive(Debug)]
pub struct CycleContext {
    params: Arc<Parameters>,
    time: u64,
    task: Option<Arc<Task>>,
    task_link_budget: Option<BudgetValue>,
    term_link: Option<TermLink>,
    belief: Option<Sentence>,
    // priority of the concept the current term link points to
    belief_activation: f32,
    derived: Vec<Task>,
    events: Vec<Event>,
}

impl CycleContext {
    pub fn new(params: Arc<Parameters>, time: u64) -> Self {
        Self {
            params,
            time,
            task: None,
            task_link_budget: None,
            term_link: None,
            belief: None,
            belief_activation: 0.0,
            derived: Vec::new(),
            events: Vec::new(),
        }
    }
    pub fn params(&self) -> &Parameters {
        &self.params
    }
    pub fn time(&self) -> u64 {
        self.time
    }
    /// The task being processed or fired.
    pub fn task(&self) -> Option<&Arc<Task>> {
        self.task.as_ref()
    }
    /// The belief the current task is paired with, if one was found.
    pub fn belief(&self) -> Option<&Sentence> {
        self.belief.as_ref()
    }
    pub fn term_link(&self) -> Option<&TermLink> {
        self.term_link.as_ref()
    }
    pub fn task_link_budget(&self) -> Option<&BudgetValue> {
        self.task_link_budget.as_ref()
    }
    /// Tasks derived so far in this cycle.
    pub fn derived(&self) -> &[Task] {
        &self.derived
    }
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub(crate) fn set_task(&mut self, task: Option<Arc<Task>>, task_link_budget: Option<BudgetValue>) {
        self.task = task;
        self.task_link_budget = task_link_budget;
        self.term_link = None;
        self.belief = None;
        self.belief_activation = 0.0;
    }
    pub(crate) fn set_premise(&mut self, term_link: TermLink, belief: Option<Sentence>, activation: f32) {
        self.term_link = Some(term_link);
        self.belief = belief;
        self.belief_activation = activation;
    }
    pub(crate) fn take_term_link(&mut self) -> Option<TermLink> {
        self.belief = None;
        self.term_link.take()
    }
    pub(crate) fn take_derived(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.derived)
    }
    pub(crate) fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    // ------------- Task creation -------------

    /// Derives a task from the current task alone, or from the current task
    /// and belief when the task is not a judgment. A content equal to the
    /// parent of the current task would undo a structural step and is refused.
    pub fn single_premise_task(&mut self, content: Term, truth: Option<TruthValue>, budget: BudgetValue) -> bool {
        let Some(task) = self.task.clone() else {
            return false;
        };
        if task.parent_task().is_some_and(|parent| parent.content() == &content) {
            debug!(%content, "circular structural derivation refused");
            return false;
        }
        let premise = task.sentence();
        let stamp = match &self.belief {
            Some(belief) if !premise.is_judgment() => Stamp::derived_from(belief.stamp(), self.time),
            _ => Stamp::derived_from(premise.stamp(), self.time),
        };
        let truth = if premise.punctuation().has_truth() { truth } else { None };
        match Sentence::new(content, premise.punctuation(), truth, stamp) {
            Ok(sentence) => {
                let parent_belief = self.belief.clone().map(Arc::new);
                self.derive(sentence, budget, Some(Arc::new(premise.clone())), parent_belief)
            }
            Err(e) => {
                debug!(error = %e, "derivation refused");
                false
            }
        }
    }

    /// Derives a task from two premises. The conclusion takes the punctuation
    /// of `first`; premises with overlapping evidence yield nothing.
    pub fn double_premise_task(
        &mut self,
        content: Term,
        truth: Option<TruthValue>,
        budget: BudgetValue,
        first: &Sentence,
        second: &Sentence,
    ) -> bool {
        let Some(stamp) = Stamp::merge(first.stamp(), second.stamp(), self.time, self.params.stamp_max_length)
        else {
            debug!(%content, "premises share evidence");
            return false;
        };
        let truth = if first.punctuation().has_truth() { truth } else { None };
        match Sentence::new(content, first.punctuation(), truth, stamp) {
            Ok(sentence) => self.derive(
                sentence,
                budget,
                Some(Arc::new(first.clone())),
                Some(Arc::new(second.clone())),
            ),
            Err(e) => {
                debug!(error = %e, "derivation refused");
                false
            }
        }
    }

    /// Queues a solution to be reconsidered as a task of its own.
    pub(crate) fn activated_task(&mut self, budget: BudgetValue, solution: &Sentence, parent_belief: Option<Arc<Sentence>>) {
        let parent = match &self.task {
            Some(task) => Arc::new(task.sentence().clone()),
            None => Arc::new(solution.clone()),
        };
        let task = Task::derived(solution.clone(), budget, Some(parent), parent_belief);
        self.events.push(Event::Derived { task: task.to_string() });
        self.derived.push(task);
    }

    fn derive(
        &mut self,
        sentence: Sentence,
        budget: BudgetValue,
        parent_task: Option<Arc<Sentence>>,
        parent_belief: Option<Arc<Sentence>>,
    ) -> bool {
        if !budget.above_threshold(self.params.budget_threshold) {
            debug!(sentence = %sentence, budget = %budget, "derivation below threshold");
            return false;
        }
        let task = Task::derived(sentence, budget, parent_task, parent_belief);
        self.events.push(Event::Derived { task: task.to_string() });
        self.derived.push(task);
        true
    }

    // ------------- Budget inference -------------

    pub fn forward(&mut self, truth: &TruthValue) -> BudgetValue {
        self.budget_inference(truth_to_quality(truth), 1)
    }
    pub fn backward(&mut self, truth: &TruthValue) -> BudgetValue {
        self.budget_inference(truth_to_quality(truth), 1)
    }
    pub fn backward_weak(&mut self, truth: &TruthValue) -> BudgetValue {
        self.budget_inference(w2c(1.0) * truth_to_quality(truth), 1)
    }
    pub fn compound_forward(&mut self, truth: &TruthValue, content: &Term) -> BudgetValue {
        self.budget_inference(truth_to_quality(truth), content.complexity())
    }
    pub fn compound_backward(&mut self, content: &Term) -> BudgetValue {
        self.budget_inference(1.0, content.complexity())
    }
    pub fn compound_backward_weak(&mut self, content: &Term) -> BudgetValue {
        self.budget_inference(w2c(1.0), content.complexity())
    }

    // Budget of a conclusion of the given quality, drawn from the current
    // links. The term link that led to it is rewarded.
    fn budget_inference(&mut self, quality: f32, complexity: usize) -> BudgetValue {
        let source = self.task_link_budget.or_else(|| self.task.as_ref().map(|t| *t.budget()));
        let Some(source) = source else {
            return BudgetValue::from_unit(0.0, 0.0, quality);
        };
        let complexity = complexity.max(1) as f32;
        let mut priority = source.priority();
        let mut durability = source.durability() / complexity;
        let quality = quality / complexity;
        if let Some(link) = self.term_link.as_mut() {
            priority = or(&[priority, link.budget().priority()]);
            durability = and(&[durability, link.budget().durability()]);
            let reward = or(&[quality, self.belief_activation]);
            link.budget_mut().inc_priority(reward);
            link.budget_mut().inc_durability(quality);
        }
        BudgetValue::from_unit(priority, durability, quality)
    }

    /// Budget of a revision found while firing. Both links pay for it in
    /// proportion to how little the revision changed their premise.
    pub(crate) fn revision_budget(&mut self, task_truth: &TruthValue, belief_truth: &TruthValue, revised: &TruthValue) -> BudgetValue {
        let mut spent = match (self.task_link_budget, self.task.as_ref()) {
            (Some(budget), _) => budget,
            (None, Some(task)) => *task.budget(),
            (None, None) => return BudgetValue::from_unit(0.0, 0.0, truth_to_quality(revised)),
        };
        let belief_link = self.term_link.as_mut().map(|link| link.budget_mut());
        let budget = revise(&mut spent, task_truth, belief_truth, revised, belief_link);
        if self.task_link_budget.is_some() {
            self.task_link_budget = Some(spent);
        }
        budget
    }

    /// A solution found while firing: the task link has less left to do and
    /// the term link proved useful.
    pub(crate) fn solution_feedback(&mut self, quality: f32) {
        if let Some(budget) = self.task_link_budget.as_mut() {
            budget.lower_priority_to(1.0 - quality);
        }
        if let Some(link) = self.term_link.as_mut() {
            link.budget_mut().inc_priority(quality);
        }
    }
}

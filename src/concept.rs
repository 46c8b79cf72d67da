//! Concepts: everything the system knows and asks about one term.
//!
//! A concept keeps rank-ordered tables of beliefs and desires, the open
//! questions and quests about its term, and two bags of links into the rest of
//! the term graph. Tasks reach a concept through [`Concept::direct_process`],
//! which revises, stores and answers locally; inference across concepts
//! happens when the memory fires the concept's links.

use std::fmt;

use rand::Rng;

use crate::bag::{Bag, Item, PutIn};
use crate::budget::{rank_belief, revise, truth_to_quality, BudgetValue};
use crate::context::CycleContext;
use crate::event::Event;
use crate::link::{TaskLink, TermLink, TermLinkTemplate};
use crate::parameters::Parameters;
use crate::sentence::{Punctuation, Sentence, Task};
use crate::term::Term;
use crate::truth::{revision, TruthValue};
use crate::value::or;

#[derive(Debug)]
pub struct Concept {
    key: String,
    term: Term,
    budget: BudgetValue,
    beliefs: Vec<Sentence>,
    desires: Vec<Sentence>,
    questions: Vec<Task>,
    quests: Vec<Task>,
    task_links: Bag<TaskLink>,
    term_links: Bag<TermLink>,
    templates: Vec<TermLinkTemplate>,
}

impl Concept {
    pub fn new(term: Term, budget: BudgetValue, params: &Parameters) -> Self {
        let bags = &params.bag;
        Self {
            key: term.name(),
            templates: TermLinkTemplate::prepare(&term),
            term,
            budget,
            beliefs: Vec::new(),
            desires: Vec::new(),
            questions: Vec::new(),
            quests: Vec::new(),
            task_links: Bag::new(bags.task_link_capacity, bags.levels, bags.task_link_forget_rate)
                .with_relative_threshold(bags.relative_threshold),
            term_links: Bag::new(bags.term_link_capacity, bags.levels, bags.term_link_forget_rate)
                .with_relative_threshold(bags.relative_threshold),
        }
    }
    pub fn term(&self) -> &Term {
        &self.term
    }
    pub fn beliefs(&self) -> &[Sentence] {
        &self.beliefs
    }
    pub fn desires(&self) -> &[Sentence] {
        &self.desires
    }
    pub fn questions(&self) -> &[Task] {
        &self.questions
    }
    pub fn quests(&self) -> &[Task] {
        &self.quests
    }
    pub fn templates(&self) -> &[TermLinkTemplate] {
        &self.templates
    }
    pub fn task_links(&self) -> &Bag<TaskLink> {
        &self.task_links
    }
    pub fn term_links(&self) -> &Bag<TermLink> {
        &self.term_links
    }
    pub fn task_links_mut(&mut self) -> &mut Bag<TaskLink> {
        &mut self.task_links
    }
    pub fn term_links_mut(&mut self) -> &mut Bag<TermLink> {
        &mut self.term_links
    }
    /// Highest-ranked belief, if any.
    pub fn top_belief(&self) -> Option<&Sentence> {
        self.beliefs.first()
    }

    pub fn insert_task_link(&mut self, link: TaskLink) -> PutIn<TaskLink> {
        self.task_links.put_in(link)
    }
    pub fn insert_term_link(&mut self, link: TermLink) -> PutIn<TermLink> {
        self.term_links.put_in(link)
    }

    /// Local processing of a task about this concept's term.
    pub fn direct_process(&mut self, task: &mut Task, ctx: &mut CycleContext) {
        match task.sentence().punctuation() {
            Punctuation::Judgment => self.process_judgment(task, ctx),
            Punctuation::Goal => self.process_goal(task, ctx),
            Punctuation::Question => self.process_question(task, ctx),
            Punctuation::Quest => self.process_quest(task, ctx),
        }
    }

    fn process_judgment(&mut self, task: &mut Task, ctx: &mut CycleContext) {
        let capacity = ctx.params().belief_capacity;
        revise_or_store(&mut self.beliefs, &mut self.questions, capacity, task, ctx);
    }

    fn process_goal(&mut self, task: &mut Task, ctx: &mut CycleContext) {
        let capacity = ctx.params().belief_capacity;
        if !revise_or_store(&mut self.desires, &mut self.quests, capacity, task, ctx) {
            return;
        }
        if let Some(belief) = evaluation(task.sentence(), &self.beliefs).cloned() {
            try_solution(task, &belief, ctx);
        }
        if let Some(truth) = task.sentence().truth() {
            let expectation = truth.expectation();
            if desire_quality(truth) > ctx.params().decision_threshold {
                ctx.emit(Event::Decision { goal: task.content().name(), expectation });
            }
        }
    }

    fn process_question(&mut self, task: &mut Task, ctx: &mut CycleContext) {
        let capacity = ctx.params().question_capacity;
        pose(&mut self.questions, &self.beliefs, capacity, task, ctx);
    }

    fn process_quest(&mut self, task: &mut Task, ctx: &mut CycleContext) {
        let capacity = ctx.params().question_capacity;
        pose(&mut self.quests, &self.desires, capacity, task, ctx);
    }

    /// First belief that can be combined with `task` without reusing evidence.
    pub fn get_belief(&self, task: &Sentence) -> Option<&Sentence> {
        self.beliefs.iter().find(|belief| !task.stamp().overlaps(belief.stamp()))
    }

    /// Offers `solution` to the question or quest stored under `key`, as found
    /// while firing a link. Returns whether it became the best solution.
    pub fn answer(&mut self, key: &str, solution: &Sentence, ctx: &mut CycleContext) -> bool {
        let Some(problem) = self.questions.iter_mut().chain(self.quests.iter_mut()).find(|q| q.key() == key) else {
            return false;
        };
        let quality = problem.sentence().solution_quality(solution);
        let solved = try_solution(problem, solution, ctx);
        if solved {
            ctx.solution_feedback(quality);
        }
        solved
    }

    /// Picks a term link that is novel for `task_link`, trying at most
    /// `max_matched_term_links` of them.
    pub fn select_term_link<R: Rng + ?Sized>(
        &mut self,
        task_link: &mut TaskLink,
        now: u64,
        rng: &mut R,
        params: &Parameters,
    ) -> Option<TermLink> {
        for _ in 0..params.max_matched_term_links {
            let link = self.term_links.take_out(rng)?;
            if task_link.novel(&link, now, params.term_link_record_length, params.novelty_horizon) {
                return Some(link);
            }
            self.term_links.put_back(link, now);
        }
        None
    }
}

impl Item for Concept {
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

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.budget, self.key)
    }
}

// ------------- Tables -------------

fn rank(sentence: &Sentence) -> f32 {
    sentence.truth().map_or(0.0, |t| rank_belief(t, sentence.stamp().len()))
}

/// Inserts `sentence` at its rank, highest first, and truncates the table to
/// `capacity`. An equivalent sentence already ranked at or below the new one
/// makes the insertion redundant.
pub fn add_to_table(table: &mut Vec<Sentence>, sentence: Sentence, capacity: usize) {
    let new_rank = rank(&sentence);
    match table.iter().position(|old| new_rank >= rank(old)) {
        Some(i) if sentence.equivalent_to(&table[i]) => return,
        Some(i) => table.insert(i, sentence),
        None => table.push(sentence),
    }
    table.truncate(capacity);
}

/// Best entry of `table` as a solution to `problem`.
fn evaluation<'a>(problem: &Sentence, table: &'a [Sentence]) -> Option<&'a Sentence> {
    table
        .iter()
        .map(|s| (problem.solution_quality(s), s))
        .fold(None, |best: Option<(f32, &Sentence)>, (q, s)| match best {
            Some((b, _)) if b >= q => best,
            _ => Some((q, s)),
        })
        .map(|(_, s)| s)
}

/// Usable strength of a desire: expectation rescaled so that anything not
/// better than even is worth nothing.
pub fn desire_quality(truth: &TruthValue) -> f32 {
    (2.0 * (truth.expectation() - 0.5)).max(0.0)
}

fn revisable(new: &Sentence, old: &Sentence) -> bool {
    new.content() == old.content()
        && new.revisible()
        && new.stamp().occurrence_time() == old.stamp().occurrence_time()
}

// Shared by judgments and goals. Returns false when the task turned out to be
// a duplicate and was dropped.
fn revise_or_store(
    table: &mut Vec<Sentence>,
    problems: &mut [Task],
    capacity: usize,
    task: &mut Task,
    ctx: &mut CycleContext,
) -> bool {
    let sentence = task.sentence().clone();
    if evaluation(&sentence, table).is_some_and(|old| old.stamp() == sentence.stamp()) {
        if task.parent_task().is_some_and(|parent| parent.is_judgment()) {
            task.budget_mut().dec_priority(0.0);
        }
        return false;
    }
    // the best entry that shares no evidence with the new one
    let independent: Vec<Sentence> = table
        .iter()
        .filter(|old| revisable(&sentence, old) && !old.stamp().overlaps(sentence.stamp()))
        .cloned()
        .collect();
    if let Some(old) = evaluation(&sentence, &independent) {
        if let (Some(new_truth), Some(old_truth)) = (sentence.truth(), old.truth()) {
            let revised = revision(new_truth, old_truth);
            let budget = revise(task.budget_mut(), new_truth, old_truth, &revised, None);
            ctx.double_premise_task(sentence.content().clone(), Some(revised), budget, &sentence, old);
        }
    }
    if task.budget().above_threshold(ctx.params().budget_threshold) {
        for problem in problems.iter_mut() {
            if problem.content() == sentence.content() {
                try_solution(problem, &sentence, ctx);
            }
        }
        add_to_table(table, sentence, capacity);
    }
    true
}

// Shared by questions and quests: at most one open problem per content.
fn pose(problems: &mut Vec<Task>, answers: &[Sentence], capacity: usize, task: &mut Task, ctx: &mut CycleContext) {
    let index = match problems.iter().position(|q| q.content() == task.content()) {
        Some(i) => i,
        None => {
            problems.push(task.clone());
            if problems.len() > capacity {
                problems.remove(0);
            }
            problems.len() - 1
        }
    };
    if let Some(answer) = evaluation(task.sentence(), answers).cloned() {
        let problem = &mut problems[index];
        try_solution(problem, &answer, ctx);
        let priority = problem.budget().priority();
        task.budget_mut().lower_priority_to(priority);
    }
}

/// Keeps `solution` when it beats the problem's best so far. An answer to an
/// input question is reported; a question that got a good answer loses
/// priority, and the answer is queued to be reconsidered.
fn try_solution(problem: &mut Task, solution: &Sentence, ctx: &mut CycleContext) -> bool {
    let quality = problem.sentence().solution_quality(solution);
    if let Some(best) = problem.best_solution() {
        if problem.sentence().solution_quality(best) >= quality {
            return false;
        }
    }
    problem.set_best_solution(solution.clone());
    if problem.is_input() {
        ctx.emit(Event::Answer { question: problem.sentence().to_string(), answer: solution.to_string() });
    }
    if problem.sentence().punctuation().has_truth() {
        problem.budget_mut().inc_priority(quality);
        return true;
    }
    let Some(truth) = solution.truth() else {
        return true;
    };
    let priority = problem.budget().priority();
    let budget = BudgetValue::from_unit(
        or(&[priority, quality]),
        problem.budget().durability(),
        truth_to_quality(truth),
    );
    problem.budget_mut().lower_priority_to(1.0 - quality);
    if budget.above_threshold(ctx.params().budget_threshold) {
        let parent_belief = problem.parent_belief().cloned();
        ctx.activated_task(budget, solution, parent_belief);
    }
    true
}

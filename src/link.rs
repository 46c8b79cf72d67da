//! Term links and task links.
//!
//! A term link joins a concept to one of its components or to a compound it
//! is a component of. A task link routes a concept's attention to a task. Both
//! are bag items with budgets of their own, so spending attention on a link
//! does not drain the task or the linked concept.
//!
//! Links name their targets by term; the target concept is looked up by name
//! when it is needed, and a lookup that misses is simply skipped.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::bag::Item;
use crate::budget::BudgetValue;
use crate::sentence::Task;
use crate::term::{Connector, Copula, Term};

/// Relation between the concept holding a link and the link's target. Types
/// come in pairs: the even member is seen from the compound, the odd one from
/// the component.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub enum LinkType {
    /// Task link from a concept to a task about that same term.
    SelfLink,
    /// At a component, pointing to a compound holding it.
    Component,
    /// At a compound, pointing to one of its components.
    Compound,
    ComponentStatement,
    CompoundStatement,
    ComponentCondition,
    CompoundCondition,
    /// Component of a product or image inside a statement: only structural
    /// transformation applies, no term link is needed.
    Transform,
}

impl LinkType {
    pub fn code(&self) -> u8 {
        match self {
            LinkType::SelfLink => 0,
            LinkType::Component => 1,
            LinkType::Compound => 2,
            LinkType::ComponentStatement => 3,
            LinkType::CompoundStatement => 4,
            LinkType::ComponentCondition => 5,
            LinkType::CompoundCondition => 6,
            LinkType::Transform => 8,
        }
    }
    /// The same relation seen from the other end.
    pub fn reverse(&self) -> LinkType {
        match self {
            LinkType::Compound => LinkType::Component,
            LinkType::Component => LinkType::Compound,
            LinkType::CompoundStatement => LinkType::ComponentStatement,
            LinkType::ComponentStatement => LinkType::CompoundStatement,
            LinkType::CompoundCondition => LinkType::ComponentCondition,
            LinkType::ComponentCondition => LinkType::CompoundCondition,
            other => *other,
        }
    }
}

fn link_key(link_type: LinkType, index: &[usize], target: &str) -> String {
    let index = index.iter().map(|i| i.to_string()).collect::<Vec<_>>().join("-");
    format!("@{}({}){}", link_type.code(), index, target)
}

// ------------- Templates -------------

/// A component a compound term links to, precomputed once per concept.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct TermLinkTemplate {
    target: Term,
    link_type: LinkType,
    index: Vec<usize>,
}

impl TermLinkTemplate {
    pub fn new(target: Term, link_type: LinkType, index: Vec<usize>) -> Self {
        Self { target, link_type, index }
    }
    pub fn target(&self) -> &Term {
        &self.target
    }
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Templates of `term`: its constant components, the components of its
    /// compound components, and conjunction conditions of implications and
    /// equivalences. Atomic terms have none.
    pub fn prepare(term: &Term) -> Vec<TermLinkTemplate> {
        let mut templates = Vec::new();
        let statement = term.copula();
        let link_type = if statement.is_some() { LinkType::CompoundStatement } else { LinkType::Compound };
        for (i, first) in term.components().into_iter().enumerate() {
            if linkable(first) {
                templates.push(Self::new(first.clone(), link_type, vec![i]));
            }
            let conditional = match statement {
                Some(Copula::Equivalence) => true,
                Some(Copula::Implication) => i == 0,
                _ => false,
            };
            if conditional && first.connector() == Some(Connector::Conjunction) {
                for (j, second) in first.components().into_iter().enumerate() {
                    if linkable(second) {
                        templates.push(Self::new(second.clone(), LinkType::CompoundCondition, vec![i, j]));
                    }
                }
            } else if first.is_compound() {
                let transform = statement.is_some()
                    && matches!(
                        first.connector(),
                        Some(Connector::Product | Connector::ExtImage | Connector::IntImage)
                    );
                for (j, second) in first.components().into_iter().enumerate() {
                    if linkable(second) {
                        let kind = if transform { LinkType::Transform } else { link_type };
                        templates.push(Self::new(second.clone(), kind, vec![i, j]));
                    }
                }
            }
        }
        templates
    }
}

fn linkable(term: &Term) -> bool {
    term.is_constant() && !term.is_placeholder()
}

// ------------- TermLink -------------
#[derive(Clone, Debug)]
pub struct TermLink {
    key: String,
    target: Term,
    link_type: LinkType,
    index: Vec<usize>,
    budget: BudgetValue,
}

impl TermLink {
    /// Link built from `template` toward `target`, which is either the
    /// template's own component or the compound the template belongs to.
    pub fn new(target: Term, template: &TermLinkTemplate, budget: BudgetValue, now: u64) -> Self {
        let link_type = if target == template.target {
            template.link_type
        } else {
            template.link_type.reverse()
        };
        let key = link_key(link_type, &template.index, &target.name());
        Self { key, target, link_type, index: template.index.clone(), budget: budget.with_visit(now) }
    }
    pub fn target(&self) -> &Term {
        &self.target
    }
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
    pub fn index(&self) -> &[usize] {
        &self.index
    }
}

impl Item for TermLink {
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

impl fmt::Display for TermLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.budget, self.key)
    }
}

// ------------- TaskLink -------------
#[derive(Clone, Debug)]
pub struct TaskLink {
    key: String,
    task: Arc<Task>,
    link_type: LinkType,
    index: Vec<usize>,
    budget: BudgetValue,
    // term links recently fired with this task, with the cycle they were used
    records: VecDeque<(String, u64)>,
}

impl TaskLink {
    /// With a template the link lives at the template's component and points
    /// to a task about the compound; without one it is the task's link into
    /// its own concept.
    pub fn new(task: Arc<Task>, template: Option<&TermLinkTemplate>, budget: BudgetValue, now: u64) -> Self {
        let (link_type, index) = match template {
            Some(t) => (t.link_type.reverse(), t.index.clone()),
            None => (LinkType::SelfLink, Vec::new()),
        };
        let key = link_key(link_type, &index, task.key());
        Self { key, task, link_type, index, budget: budget.with_visit(now), records: VecDeque::new() }
    }
    pub fn task(&self) -> &Arc<Task> {
        &self.task
    }
    pub fn link_type(&self) -> LinkType {
        self.link_type
    }
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Whether pairing this task with `term_link` would be new work. A term
    /// link about the task's own content never is, nor is one fired within
    /// the last `horizon` cycles. A novel link is recorded, dropping the
    /// oldest record beyond `record_length`.
    pub fn novel(&mut self, term_link: &TermLink, now: u64, record_length: usize, horizon: u64) -> bool {
        if term_link.target() == self.task.content() {
            return false;
        }
        let key = term_link.key();
        if let Some(record) = self.records.iter_mut().find(|(k, _)| k == key) {
            if now < record.1.saturating_add(horizon) {
                return false;
            }
            record.1 = now;
            return true;
        }
        self.records.push_back((key.to_owned(), now));
        while self.records.len() > record_length {
            self.records.pop_front();
        }
        true
    }
}

impl Item for TaskLink {
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

impl fmt::Display for TaskLink {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.budget, self.key)
    }
}

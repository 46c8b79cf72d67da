//! The memory and its working cycle.
//!
//! Each call to [`Memory::cycle`] does a bounded amount of work:
//!
//! 1. Tasks input or derived since the last cycle are sorted. Input tasks and
//!    tasks about terms that already have a concept are processed right away;
//!    derived tasks about unseen terms go to the novel-task bag instead, from
//!    which one is drawn in a cycle that has nothing else to process.
//! 2. Each task is processed by its concept, which is activated (or created)
//!    first. A task that keeps enough budget is linked into the term graph.
//! 3. One concept fires: one of its task links is paired with up to a few
//!    novel term links, and each pair is handed to the inference rules.
//!
//! Tasks derived during a cycle are only looked at in the next one. Every
//! random choice comes from one generator seeded from the parameters, so a
//! given seed and input reproduce the same run.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, trace};

use crate::bag::{Bag, Item, PutIn};
use crate::budget::{distribute_among_links, truth_to_quality, BudgetValue};
use crate::concept::Concept;
use crate::context::CycleContext;
use crate::error::Result;
use crate::event::{BagKind, Event, EventSink, TracingSink};
use crate::link::{LinkType, TaskLink, TermLink, TermLinkTemplate};
use crate::narsese::{parse_task, Narsese};
use crate::parameters::Parameters;
use crate::rules::{InferenceRules, NoRules};
use crate::sentence::{Punctuation, Sentence, Task};
use crate::stamp::{SerialGenerator, Stamp};
use crate::term::Term;
use crate::truth::{revision, TruthValue};

pub struct Memory {
    params: Arc<Parameters>,
    concepts: Bag<Concept>,
    novel_tasks: Bag<Task>,
    pending: Vec<Task>,
    clock: u64,
    rng: StdRng,
    serials: SerialGenerator,
    rules: Box<dyn InferenceRules>,
    sink: Box<dyn EventSink>,
}

impl Memory {
    /// Empty memory without inference rules, reporting to `tracing`.
    pub fn new(params: Parameters) -> Result<Self> {
        params.validate()?;
        let bags = &params.bag;
        let concepts = Bag::new(bags.concept_capacity, bags.levels, bags.concept_forget_rate)
            .with_relative_threshold(bags.relative_threshold);
        let novel_tasks = Bag::new(bags.novel_task_capacity, bags.levels, bags.novel_task_forget_rate)
            .with_relative_threshold(bags.relative_threshold);
        Ok(Self {
            rng: StdRng::seed_from_u64(params.seed),
            params: Arc::new(params),
            concepts,
            novel_tasks,
            pending: Vec::new(),
            clock: 0,
            serials: SerialGenerator::new(),
            rules: Box::new(NoRules),
            sink: Box::new(TracingSink),
        })
    }
    pub fn with_rules(mut self, rules: impl InferenceRules + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }
    /// Number of cycles run so far.
    pub fn time(&self) -> u64 {
        self.clock
    }
    pub fn concepts(&self) -> &Bag<Concept> {
        &self.concepts
    }
    pub fn concept(&self, term: &Term) -> Option<&Concept> {
        self.concepts.get(&term.name())
    }
    pub fn novel_tasks(&self) -> &Bag<Task> {
        &self.novel_tasks
    }
    /// Tasks waiting for the next cycle.
    pub fn pending(&self) -> &[Task] {
        &self.pending
    }

    // ------------- Input -------------

    /// Parses one line of Narsese and queues it for the next cycle. A line
    /// that does not parse leaves the memory untouched.
    pub fn input(&mut self, text: &str) -> Result<()> {
        let parsed = parse_task(text)?;
        self.input_narsese(parsed)
    }

    pub fn input_narsese(&mut self, parsed: Narsese) -> Result<()> {
        let defaults = &self.params.defaults;
        let punctuation = parsed.punctuation;
        let truth = match (punctuation.has_truth(), parsed.truth.as_slice()) {
            (true, []) => Some(TruthValue::new(defaults.frequency, defaults.confidence)?),
            (_, [f]) => Some(TruthValue::new(*f, defaults.confidence)?),
            (_, [f, c, ..]) => Some(TruthValue::new(*f, *c)?),
            (false, []) => None,
        };
        let (priority, durability) = match punctuation {
            Punctuation::Judgment => (defaults.judgment_priority, defaults.judgment_durability),
            Punctuation::Question => (defaults.question_priority, defaults.question_durability),
            Punctuation::Goal => (defaults.goal_priority, defaults.goal_durability),
            Punctuation::Quest => (defaults.quest_priority, defaults.quest_durability),
        };
        let quality = truth.as_ref().map_or(1.0, truth_to_quality);
        let budget = BudgetValue::new(
            parsed.budget.first().copied().unwrap_or(priority),
            parsed.budget.get(1).copied().unwrap_or(durability),
            parsed.budget.get(2).copied().unwrap_or(quality),
        )?;
        // validate before spending a serial
        Sentence::new(parsed.content.clone(), punctuation, truth, Stamp::input(0, self.clock, parsed.tense, 0))?;
        let stamp = Stamp::input(self.serials.generate(), self.clock, parsed.tense, self.params.duration);
        let sentence = Sentence::new(parsed.content, punctuation, truth, stamp)?;
        let task = Task::input(sentence, budget);
        debug!(task = %task, "input");
        self.pending.push(task);
        Ok(())
    }

    /// Queues an already built task for the next cycle.
    pub fn input_task(&mut self, task: Task) {
        self.pending.push(task);
    }

    // ------------- Cycle -------------

    pub fn run(&mut self, cycles: usize) {
        for _ in 0..cycles {
            self.cycle();
        }
    }

    pub fn cycle(&mut self) {
        self.clock += 1;
        let mut ctx = CycleContext::new(Arc::clone(&self.params), self.clock);
        trace!(cycle = self.clock, pending = self.pending.len(), concepts = self.concepts.len(), "cycle");

        let (mut eligible, novel): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|task| task.is_input() || self.concepts.contains(&task.content().name()));
        if eligible.is_empty() {
            if let Some(task) = self.novel_tasks.take_out(&mut self.rng) {
                eligible.push(task);
            }
        }
        for task in novel {
            self.buffer_novel(task, &mut ctx);
        }
        for task in eligible {
            self.immediate_process(task, &mut ctx);
        }

        self.fire_concept(&mut ctx);

        self.pending.extend(ctx.take_derived());
        for event in ctx.take_events() {
            self.sink.on_event(&event);
        }
    }

    fn buffer_novel(&mut self, task: Task, ctx: &mut CycleContext) {
        let promising = task
            .sentence()
            .truth()
            .is_some_and(|t| task.sentence().is_judgment() && t.expectation() > self.params.creation_expectation);
        if promising {
            let put = self.novel_tasks.put_in(task);
            note(ctx, BagKind::NovelTask, put);
        } else {
            debug!(task = %task, "neglected");
            ctx.emit(Event::Neglected { task: task.to_string() });
        }
    }

    fn immediate_process(&mut self, mut task: Task, ctx: &mut CycleContext) {
        let now = self.clock;
        let key = task.content().name();
        let mut concept = match self.concepts.pick_out(&key) {
            Some(concept) => concept,
            None => {
                ctx.emit(Event::ConceptCreated { term: key.clone() });
                self.new_concept(task.content().clone())
            }
        };
        concept.budget_mut().activate(task.budget());
        ctx.set_task(Some(Arc::new(task.clone())), None);
        concept.direct_process(&mut task, ctx);
        if task.budget().above_threshold(self.params.budget_threshold) {
            self.link_to_task(&mut concept, Arc::new(task), ctx);
        }
        ctx.set_task(None, None);
        let put = self.concepts.put_back(concept, now);
        note(ctx, BagKind::Concept, put);
    }

    fn new_concept(&self, term: Term) -> Concept {
        let initial = self.params.defaults.concept_budget;
        let budget = BudgetValue::from_unit(initial, initial, initial).with_visit(self.clock);
        Concept::new(term, budget, &self.params)
    }

    // Whether `term` has a concept, creating one when it has not.
    fn ensure_concept(&mut self, term: &Term, ctx: &mut CycleContext) -> bool {
        let key = term.name();
        if self.concepts.contains(&key) {
            return true;
        }
        let concept = self.new_concept(term.clone());
        let put = self.concepts.put_in(concept);
        if put.inserted() {
            ctx.emit(Event::ConceptCreated { term: key.clone() });
        }
        note(ctx, BagKind::Concept, put);
        self.concepts.contains(&key)
    }

    // ------------- Linking -------------

    fn link_to_task(&mut self, concept: &mut Concept, task: Arc<Task>, ctx: &mut CycleContext) {
        let now = self.clock;
        let budget = *task.budget();
        let put = concept.insert_task_link(TaskLink::new(Arc::clone(&task), None, budget, now));
        note(ctx, BagKind::TaskLink, put);

        let templates = concept.templates().to_vec();
        if templates.is_empty() {
            return;
        }
        let share = distribute_among_links(&budget, templates.len());
        if !share.above_threshold(self.params.budget_threshold) {
            return;
        }
        for template in &templates {
            let component = template.target();
            if !self.ensure_concept(component, ctx) {
                continue;
            }
            // a task link activates the concept it lands in
            let Some(mut target) = self.concepts.pick_out(&component.name()) else {
                continue;
            };
            let put = target.insert_task_link(TaskLink::new(Arc::clone(&task), Some(template), share, now));
            note(ctx, BagKind::TaskLink, put);
            target.budget_mut().activate(&share);
            let put = self.concepts.put_in(target);
            note(ctx, BagKind::Concept, put);
        }
        self.build_term_links(concept, &budget, ctx);
    }

    /// Links `root` with its components and, recursively, each compound
    /// component with its own, for as long as the shared budget stays above
    /// threshold.
    fn build_term_links(&mut self, root: &mut Concept, budget: &BudgetValue, ctx: &mut CycleContext) {
        let mut work = Vec::new();
        let own = self.spread_term_links(root.term(), root.templates(), budget, &mut work, ctx);
        for link in own {
            let put = root.insert_term_link(link);
            note(ctx, BagKind::TermLink, put);
        }
        while let Some((term, budget)) = work.pop() {
            let key = term.name();
            let Some(templates) = self.concepts.get(&key).map(|c| c.templates().to_vec()) else {
                continue;
            };
            let own = self.spread_term_links(&term, &templates, &budget, &mut work, ctx);
            if let Some(concept) = self.concepts.get_mut(&key) {
                for link in own {
                    let put = concept.insert_term_link(link);
                    note(ctx, BagKind::TermLink, put);
                }
            }
        }
    }

    // Inserts the component-side links of `term` and returns the links that
    // belong to `term`'s own concept. Compound components are queued on `work`.
    fn spread_term_links(
        &mut self,
        term: &Term,
        templates: &[TermLinkTemplate],
        budget: &BudgetValue,
        work: &mut Vec<(Term, BudgetValue)>,
        ctx: &mut CycleContext,
    ) -> Vec<TermLink> {
        if templates.is_empty() {
            return Vec::new();
        }
        let now = self.clock;
        let share = distribute_among_links(budget, templates.len());
        if !share.above_threshold(self.params.budget_threshold) {
            return Vec::new();
        }
        let mut own = Vec::new();
        for template in templates.iter().filter(|t| t.link_type() != LinkType::Transform) {
            let component = template.target();
            if !self.ensure_concept(component, ctx) {
                continue;
            }
            own.push(TermLink::new(component.clone(), template, share, now));
            if let Some(target) = self.concepts.get_mut(&component.name()) {
                let put = target.insert_term_link(TermLink::new(term.clone(), template, share, now));
                note(ctx, BagKind::TermLink, put);
            }
            if component.is_compound() {
                work.push((component.clone(), share));
            }
        }
        own
    }

    // ------------- Firing -------------

    fn fire_concept(&mut self, ctx: &mut CycleContext) {
        let now = self.clock;
        let Some(mut concept) = self.concepts.take_out(&mut self.rng) else {
            return;
        };
        if let Some(mut task_link) = concept.task_links_mut().take_out(&mut self.rng) {
            trace!(concept = %concept, task_link = %task_link, "fire");
            ctx.emit(Event::Fired { concept: concept.key().to_owned(), task: task_link.task().to_string() });
            ctx.set_task(Some(Arc::clone(task_link.task())), Some(*task_link.budget()));
            if task_link.link_type() == LinkType::Transform {
                self.rules.transform(ctx);
            } else {
                let before = ctx.derived().len();
                let mut remaining = self.params.max_reasoned_term_links;
                while remaining > 0 && ctx.derived().len() == before {
                    let Some(term_link) = concept.select_term_link(&mut task_link, now, &mut self.rng, &self.params)
                    else {
                        break;
                    };
                    self.reason(term_link, ctx);
                    if let Some(term_link) = ctx.take_term_link() {
                        let put = concept.term_links_mut().put_back(term_link, now);
                        note(ctx, BagKind::TermLink, put);
                    }
                    remaining -= 1;
                }
            }
            if let Some(spent) = ctx.task_link_budget() {
                *task_link.budget_mut() = *spent;
            }
            ctx.set_task(None, None);
            let put = concept.task_links_mut().put_back(task_link, now);
            note(ctx, BagKind::TaskLink, put);
        }
        let put = self.concepts.put_back(concept, now);
        note(ctx, BagKind::Concept, put);
    }

    // Pairs the current task with the belief the term link leads to. A belief
    // about the task's own content is matched locally; anything else goes to
    // the rules.
    fn reason(&mut self, term_link: TermLink, ctx: &mut CycleContext) {
        let Some(task) = ctx.task().cloned() else {
            return;
        };
        let target = term_link.target().name();
        let (belief, activation) = match self.concepts.get(&target) {
            Some(concept) => (concept.get_belief(task.sentence()).cloned(), concept.priority()),
            None => (None, 0.0),
        };
        ctx.set_premise(term_link, belief.clone(), activation);
        if let Some(belief) = belief.filter(|b| b.content() == task.content()) {
            let before = ctx.derived().len();
            let sentence = task.sentence();
            if sentence.is_judgment() {
                if let (Some(task_truth), Some(belief_truth)) = (sentence.truth(), belief.truth()) {
                    if sentence.revisible() && sentence.stamp().occurrence_time() == belief.stamp().occurrence_time() {
                        let revised = revision(task_truth, belief_truth);
                        let budget = ctx.revision_budget(task_truth, belief_truth, &revised);
                        ctx.double_premise_task(task.content().clone(), Some(revised), budget, sentence, &belief);
                    }
                }
            } else if let Some(concept) = self.concepts.get_mut(&target) {
                concept.answer(task.key(), &belief, ctx);
            }
            if ctx.derived().len() > before {
                return;
            }
        }
        self.rules.reason(ctx);
    }

    // ------------- Report -------------

    /// Snapshot of the memory, listing at most `limit` concepts from the
    /// highest priority level down.
    pub fn report(&self, limit: usize) -> MemoryReport {
        MemoryReport {
            time: self.clock,
            concepts: self.concepts.len(),
            pending: self.pending.len(),
            novel_tasks: self.novel_tasks.len(),
            top: self
                .concepts
                .iter()
                .take(limit)
                .map(|c| ConceptReport {
                    term: c.key().to_owned(),
                    budget: c.budget().to_string(),
                    beliefs: c.beliefs().iter().map(|b| b.display_with_stamp()).collect(),
                    desires: c.desires().iter().map(|d| d.display_with_stamp()).collect(),
                    questions: c.questions().iter().chain(c.quests()).map(|q| q.sentence().to_string()).collect(),
                })
                .collect(),
        }
    }
}

fn note<E: Item>(ctx: &mut CycleContext, bag: BagKind, put: PutIn<E>) {
    if let Some(gone) = put.displaced() {
        ctx.emit(Event::Evicted { bag, key: gone.key().to_owned() });
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryReport {
    pub time: u64,
    pub concepts: usize,
    pub pending: usize,
    pub novel_tasks: usize,
    pub top: Vec<ConceptReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConceptReport {
    pub term: String,
    pub budget: String,
    pub beliefs: Vec<String>,
    pub desires: Vec<String>,
    pub questions: Vec<String>,
}

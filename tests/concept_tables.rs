use std::sync::Arc;

use noesis::budget::BudgetValue;
use noesis::concept::{add_to_table, desire_quality, Concept};
use noesis::context::CycleContext;
use noesis::narsese::parse_term;
use noesis::parameters::Parameters;
use noesis::sentence::{Punctuation, Sentence, Task};
use noesis::stamp::Stamp;
use noesis::term::Term;
use noesis::truth::TruthValue;

fn bird() -> Term {
    parse_term("<bird --> animal>").unwrap()
}

fn judgment(serial: u64, f: f32, c: f32) -> Sentence {
    let truth = TruthValue::new(f, c).unwrap();
    Sentence::new(bird(), Punctuation::Judgment, Some(truth), Stamp::input(serial, 0, None, 5)).unwrap()
}

fn input(sentence: Sentence) -> Task {
    let budget = BudgetValue::new(0.8, 0.8, 0.9).unwrap();
    Task::input(sentence, budget)
}

fn setup() -> (Concept, CycleContext) {
    let params = Parameters::default();
    let concept = Concept::new(bird(), BudgetValue::new(0.5, 0.5, 0.5).unwrap(), &params);
    (concept, CycleContext::new(Arc::new(params), 1))
}

#[test]
fn table_drops_the_lowest_rank() {
    let capacity = 3;
    let mut table = Vec::new();
    for (serial, c) in [(1, 0.5), (2, 0.6), (3, 0.7), (4, 0.8)] {
        add_to_table(&mut table, judgment(serial, 1.0, c), capacity);
    }
    assert_eq!(table.len(), capacity);
    let confidences: Vec<f32> = table.iter().map(|s| s.truth().unwrap().confidence()).collect();
    assert_eq!(confidences, vec![0.8, 0.7, 0.6]);
}

#[test]
fn table_ignores_an_equivalent_sentence() {
    let mut table = Vec::new();
    add_to_table(&mut table, judgment(1, 1.0, 0.9), 3);
    add_to_table(&mut table, judgment(1, 1.0, 0.9), 3);
    assert_eq!(table.len(), 1);
}

#[test]
fn second_judgment_is_revised() {
    let (mut concept, mut ctx) = setup();
    let mut first = input(judgment(1, 1.0, 0.9));
    concept.direct_process(&mut first, &mut ctx);
    assert_eq!(concept.beliefs().len(), 1);
    assert!(ctx.derived().is_empty());

    let mut second = input(judgment(2, 0.8, 0.8));
    concept.direct_process(&mut second, &mut ctx);
    assert_eq!(concept.beliefs().len(), 2);
    let revised = ctx.derived().first().expect("revision derived");
    let truth = revised.sentence().truth().unwrap();
    assert!(truth.confidence() > 0.9);
    assert_eq!(revised.sentence().stamp().len(), 2);
    // revising spent part of the second task's budget
    assert!(second.budget().priority() < 0.8);
}

// A judgment resting on the evidence of several inputs.
fn pooled(serials: &[u64], f: f32, c: f32) -> Sentence {
    let mut stamp = Stamp::input(serials[0], 0, None, 5);
    for serial in &serials[1..] {
        stamp = Stamp::merge(&stamp, &Stamp::input(*serial, 0, None, 5), 0, 8).unwrap();
    }
    Sentence::new(bird(), Punctuation::Judgment, Some(TruthValue::new(f, c).unwrap()), stamp).unwrap()
}

#[test]
fn revision_skips_beliefs_sharing_evidence() {
    let (mut concept, mut ctx) = setup();
    concept.direct_process(&mut input(pooled(&[1, 2], 1.0, 0.95)), &mut ctx);
    concept.direct_process(&mut input(pooled(&[4], 1.0, 0.8)), &mut ctx);
    assert_eq!(concept.beliefs().len(), 2);
    let before = ctx.derived().len();

    // overlaps the strongest belief on serial 2, independent of the other
    concept.direct_process(&mut input(pooled(&[2, 5], 1.0, 0.9)), &mut ctx);
    assert_eq!(ctx.derived().len(), before + 1);
    let revised = ctx.derived().last().unwrap().sentence();
    let mut base = revised.stamp().base().to_vec();
    base.sort_unstable();
    assert_eq!(base, vec![2, 4, 5]);
    assert!(revised.truth().unwrap().confidence() > 0.9);
}

#[test]
fn duplicate_judgment_is_not_stored() {
    let (mut concept, mut ctx) = setup();
    let sentence = judgment(1, 1.0, 0.9);
    concept.direct_process(&mut input(sentence.clone()), &mut ctx);
    let mut again = input(sentence);
    concept.direct_process(&mut again, &mut ctx);
    assert_eq!(concept.beliefs().len(), 1);
    assert!(ctx.derived().is_empty());
    // an input duplicate keeps its budget
    assert_eq!(again.budget().priority(), 0.8);
}

#[test]
fn question_is_answered_from_beliefs() {
    let (mut concept, mut ctx) = setup();
    concept.direct_process(&mut input(judgment(1, 1.0, 0.9)), &mut ctx);

    let question = Sentence::new(bird(), Punctuation::Question, None, Stamp::input(2, 0, None, 5)).unwrap();
    let mut task = Task::input(question, BudgetValue::new(0.9, 0.9, 1.0).unwrap());
    concept.direct_process(&mut task, &mut ctx);

    assert_eq!(concept.questions().len(), 1);
    let answer = concept.questions()[0].best_solution().expect("answered");
    assert_eq!(answer.truth().unwrap().confidence(), 0.9);
    // the asking task gave up priority and the answer was queued again
    assert!(task.budget().priority() < 0.9);
    assert_eq!(ctx.derived().len(), 1);
}

#[test]
fn later_belief_answers_an_open_question() {
    let (mut concept, mut ctx) = setup();
    let question = Sentence::new(bird(), Punctuation::Question, None, Stamp::input(1, 0, None, 5)).unwrap();
    concept.direct_process(&mut Task::input(question, BudgetValue::new(0.9, 0.9, 1.0).unwrap()), &mut ctx);
    assert!(concept.questions()[0].best_solution().is_none());

    concept.direct_process(&mut input(judgment(2, 1.0, 0.9)), &mut ctx);
    assert!(concept.questions()[0].best_solution().is_some());
}

#[test]
fn questions_are_bounded() {
    let params = Parameters::default();
    let capacity = params.question_capacity;
    let mut contents = Vec::new();
    let mut ctx = CycleContext::new(Arc::new(params.clone()), 1);
    let mut concept = Concept::new(Term::atom("bird"), BudgetValue::new(0.5, 0.5, 0.5).unwrap(), &params);
    for i in 0..capacity + 2 {
        let content = parse_term(&format!("<bird --> kind{i}>")).unwrap();
        contents.push(content.clone());
        let question = Sentence::new(content, Punctuation::Question, None, Stamp::input(i as u64 + 1, 0, None, 5)).unwrap();
        concept.direct_process(&mut Task::input(question, BudgetValue::new(0.9, 0.9, 1.0).unwrap()), &mut ctx);
    }
    assert_eq!(concept.questions().len(), capacity);
    // the oldest went first
    assert_eq!(concept.questions()[0].content(), &contents[2]);
}

#[test]
fn desire_quality_ignores_unwanted_goals() {
    assert!((desire_quality(&TruthValue::new(1.0, 0.9).unwrap()) - 0.9).abs() < 1e-4);
    assert_eq!(desire_quality(&TruthValue::new(0.2, 0.9).unwrap()), 0.0);
    assert_eq!(desire_quality(&TruthValue::new(0.5, 0.9).unwrap()), 0.0);
}

#[test]
fn templates_cover_statement_components() {
    let (concept, _) = setup();
    let targets: Vec<String> = concept.templates().iter().map(|t| t.target().name()).collect();
    assert_eq!(targets, vec!["bird", "animal"]);
}

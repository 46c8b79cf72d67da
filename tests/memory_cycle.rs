use std::sync::Arc;

use noesis::bag::Item;
use noesis::budget::BudgetValue;
use noesis::event::{Event, EventLog};
use noesis::link::LinkType;
use noesis::narsese::parse_term;
use noesis::rules::Syllogism;
use noesis::sentence::{Punctuation, Sentence, Task};
use noesis::stamp::Stamp;
use noesis::truth::TruthValue;
use noesis::{Memory, NoesisError, Parameters};

fn setup() -> (Memory, EventLog) {
    let log = EventLog::new();
    let memory = Memory::new(Parameters::default()).unwrap().with_sink(log.clone());
    (memory, log)
}

fn answers(log: &EventLog) -> Vec<(String, String)> {
    log.events()
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            Event::Answer { question, answer } => Some((question, answer)),
            _ => None,
        })
        .collect()
}

// A task derived from some earlier sentence, as a rule would produce it.
fn derived(text: &str, punctuation: Punctuation, truth: Option<TruthValue>) -> Task {
    let content = parse_term(text).unwrap();
    let parent = parse_term("<parent --> premise>").unwrap();
    let parent = Sentence::new(parent, Punctuation::Judgment, TruthValue::new(1.0, 0.9).ok(), Stamp::input(900, 0, None, 5))
        .unwrap();
    let sentence = Sentence::new(content, punctuation, truth, Stamp::input(901, 0, None, 5)).unwrap();
    Task::derived(sentence, BudgetValue::new(0.8, 0.8, 0.9).unwrap(), Some(Arc::new(parent)), None)
}

#[test]
fn two_judgments_are_revised() {
    let (mut memory, _) = setup();
    memory.input("<bird --> animal>. %1.0;0.9%").unwrap();
    memory.input("<bird --> animal>. %0.8;0.8%").unwrap();
    memory.run(2);
    let concept = memory.concept(&parse_term("<bird --> animal>").unwrap()).expect("concept created");
    let best = concept.top_belief().and_then(|b| b.truth()).unwrap();
    assert!(best.confidence() > 0.9);
    assert!(best.confidence() > 0.8);
    assert_eq!(concept.top_belief().unwrap().stamp().len(), 2);
}

#[test]
fn unseen_term_waits_in_the_novel_bag() {
    let (mut memory, _) = setup();
    let term = parse_term("<robin --> bird>").unwrap();
    memory.input_task(derived("<robin --> bird>", Punctuation::Judgment, TruthValue::new(1.0, 0.9).ok()));

    memory.cycle();
    assert!(memory.concept(&term).is_none());
    assert_eq!(memory.novel_tasks().len(), 1);

    memory.cycle();
    assert!(memory.novel_tasks().is_empty());
    let concept = memory.concept(&term).expect("processed from the novel bag");
    assert_eq!(concept.beliefs().len(), 1);
}

#[test]
fn weak_novel_task_is_neglected() {
    let (mut memory, log) = setup();
    memory.input_task(derived("<robin --> bird>", Punctuation::Question, None));
    memory.input_task(derived("<robin --> fish>", Punctuation::Judgment, TruthValue::new(0.1, 0.9).ok()));
    memory.cycle();
    assert!(memory.novel_tasks().is_empty());
    let neglected = log.events().unwrap().iter().filter(|e| matches!(e, Event::Neglected { .. })).count();
    assert_eq!(neglected, 2);
}

#[test]
fn input_is_processed_immediately() {
    let (mut memory, log) = setup();
    memory.input("<swan --> bird>.").unwrap();
    assert_eq!(memory.pending().len(), 1);
    memory.cycle();
    assert!(memory.pending().is_empty());
    assert_eq!(memory.time(), 1);
    assert!(memory.concept(&parse_term("<swan --> bird>").unwrap()).is_some());
    // components get concepts of their own
    assert!(memory.concept(&parse_term("swan").unwrap()).is_some());
    assert!(memory.concept(&parse_term("bird").unwrap()).is_some());
    let created = log.events().unwrap().iter().filter(|e| matches!(e, Event::ConceptCreated { .. })).count();
    assert_eq!(created, 3);
}

#[test]
fn question_is_answered() {
    let (mut memory, log) = setup();
    memory.input("<bird --> animal>. %1.0;0.9%").unwrap();
    memory.input("<bird --> animal>?").unwrap();
    memory.cycle();
    let answers = answers(&log);
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].0, "<bird --> animal>?");
    assert_eq!(answers[0].1, "<bird --> animal>. %1.0000;0.9000%");
}

#[test]
fn desired_goal_leads_to_decision() {
    let (mut memory, log) = setup();
    memory.input("<door --> open>! %1.0;0.9%").unwrap();
    memory.input("<door --> locked>! %0.1;0.9%").unwrap();
    memory.cycle();
    let decisions: Vec<String> = log
        .events()
        .unwrap()
        .into_iter()
        .filter_map(|e| match e {
            Event::Decision { goal, .. } => Some(goal),
            _ => None,
        })
        .collect();
    assert_eq!(decisions, vec!["<door --> open>"]);
}

#[test]
fn malformed_input_changes_nothing() {
    let (mut memory, _) = setup();
    let err = memory.input("<bird --> animal").unwrap_err();
    assert!(matches!(err, NoesisError::Parse { .. }));
    assert!(matches!(memory.input("<a --> b>. %1.5;0.9%"), Err(NoesisError::Range { .. })));
    assert!(memory.pending().is_empty());

    memory.input("<bird --> animal>.").unwrap();
    memory.cycle();
    let concept = memory.concept(&parse_term("<bird --> animal>").unwrap()).unwrap();
    // the failed lines did not use up serials
    assert_eq!(concept.top_belief().unwrap().stamp().base(), &[1]);
}

#[test]
fn defaults_fill_in_budget_and_truth() {
    let (mut memory, _) = setup();
    memory.input("<bird --> animal>.").unwrap();
    memory.input("$0.3$ <bird --> animal>?").unwrap();
    let judgment = &memory.pending()[0];
    assert_eq!(judgment.sentence().truth(), Some(&TruthValue::new(1.0, 0.9).unwrap()));
    assert_eq!(judgment.budget().priority(), 0.8);
    let question = &memory.pending()[1];
    assert!(question.sentence().truth().is_none());
    assert_eq!(question.budget().priority(), 0.3);
    assert_eq!(question.budget().durability(), 0.9);
    assert_eq!(question.budget().quality(), 1.0);
}

#[test]
fn deduction_answers_a_question() {
    let (memory, log) = setup();
    let mut memory = memory.with_rules(Syllogism);
    memory.input("<a --> b>.").unwrap();
    memory.input("<b --> c>.").unwrap();
    memory.input("<a --> c>?").unwrap();
    memory.run(300);
    let answers = answers(&log);
    assert!(!answers.is_empty(), "no answer after 300 cycles");
    assert!(answers[0].1.starts_with("<a --> c>."));
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut memory = Memory::new(Parameters::default()).unwrap().with_rules(Syllogism);
        for line in ["<a --> b>.", "<b --> c>.", "<c --> d>.", "<a --> d>?", "<(*, a, d) --> r>."] {
            memory.input(line).unwrap();
        }
        memory.run(100);
        serde_json::to_string(&memory.report(50)).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn concept_bag_stays_bounded() {
    let mut params = Parameters::default();
    params.bag.concept_capacity = 5;
    let mut memory = Memory::new(params).unwrap();
    for i in 0..10 {
        memory.input(&format!("<thing{i} --> kind{i}>.")).unwrap();
        memory.cycle();
        assert!(memory.concepts().len() <= 5);
    }
}

#[test]
fn report_lists_concepts() {
    let (mut memory, _) = setup();
    memory.input("<bird --> animal>.").unwrap();
    memory.cycle();
    let report = memory.report(10);
    assert_eq!(report.time, 1);
    assert_eq!(report.concepts, 3);
    let statement = report.top.iter().find(|c| c.term == "<bird --> animal>").expect("reported");
    assert_eq!(statement.beliefs.len(), 1);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["time"], 1);
}

#[test]
fn invalid_parameters_are_refused() {
    let mut params = Parameters::default();
    params.budget_threshold = 2.0;
    assert!(matches!(Memory::new(params), Err(NoesisError::Config(_))));
    let mut params = Parameters::default();
    params.bag.levels = 0;
    assert!(matches!(Memory::new(params), Err(NoesisError::Config(_))));
}

// Term links of a concept as (type, target, priority), highest level first.
fn term_links(memory: &Memory, text: &str) -> Vec<(LinkType, String, f32)> {
    let concept = memory.concept(&parse_term(text).unwrap()).expect("concept exists");
    concept
        .term_links()
        .iter()
        .map(|l| (l.link_type(), l.target().name(), l.budget().priority()))
        .collect()
}

fn link_to<'a>(links: &'a [(LinkType, String, f32)], target: &str) -> &'a (LinkType, String, f32) {
    links.iter().find(|(_, t, _)| t == target).unwrap_or_else(|| panic!("no link to {target} in {links:?}"))
}

#[test]
fn term_links_pair_compound_and_components() {
    let (mut memory, _) = setup();
    memory.input("<(*, a, b) --> r>.").unwrap();
    memory.cycle();

    // four templates split the task's 0.8 evenly: 0.8 / sqrt(4)
    let statement = term_links(&memory, "<(*,a,b) --> r>");
    assert_eq!(statement.len(), 2);
    let (kind, _, priority) = link_to(&statement, "(*,a,b)");
    assert_eq!(*kind, LinkType::CompoundStatement);
    assert!((priority - 0.4).abs() < 1e-4);
    assert_eq!(link_to(&statement, "r").0, LinkType::CompoundStatement);

    // the product links back up and, one level down, to its own components
    let product = term_links(&memory, "(*,a,b)");
    assert_eq!(product.len(), 3);
    let (kind, _, priority) = link_to(&product, "<(*,a,b) --> r>");
    assert_eq!(*kind, LinkType::ComponentStatement);
    assert!((priority - 0.4).abs() < 1e-4);
    let (kind, _, priority) = link_to(&product, "a");
    assert_eq!(*kind, LinkType::Compound);
    assert!((priority - 0.4 / 2f32.sqrt()).abs() < 1e-3);

    let r = term_links(&memory, "r");
    assert_eq!(r.len(), 1);
    assert_eq!(link_to(&r, "<(*,a,b) --> r>").0, LinkType::ComponentStatement);

    // product members reach the statement through a transform task link only
    let a = term_links(&memory, "a");
    assert_eq!(a.len(), 1);
    assert_eq!(link_to(&a, "(*,a,b)").0, LinkType::Component);
    let concept = memory.concept(&parse_term("a").unwrap()).unwrap();
    assert!(concept.task_links().iter().any(|l| l.link_type() == LinkType::Transform));
}

#[test]
fn term_links_stop_below_threshold() {
    let params = Parameters { budget_threshold: 0.52, ..Parameters::default() };
    let mut memory = Memory::new(params).unwrap().with_sink(EventLog::new());
    memory.input("<(*, a, b) --> r>.").unwrap();
    memory.cycle();

    // the statement's share is worth linking, the product's share is not
    assert_eq!(term_links(&memory, "<(*,a,b) --> r>").len(), 2);
    let product = term_links(&memory, "(*,a,b)");
    assert_eq!(product.len(), 1);
    assert_eq!(link_to(&product, "<(*,a,b) --> r>").0, LinkType::ComponentStatement);
    assert!(term_links(&memory, "a").is_empty());
}

#[test]
fn product_is_transformed_into_an_image() {
    let log = EventLog::new();
    let mut memory = Memory::new(Parameters::default()).unwrap().with_rules(Syllogism).with_sink(log.clone());
    memory.input("<(*, a, b) --> r>.").unwrap();
    let mut found = false;
    for _ in 0..200 {
        memory.cycle();
        found = log.events().unwrap().iter().any(|e| match e {
            Event::Derived { task } => task.contains("<a --> (/,r,_,b)>"),
            _ => false,
        });
        if found {
            break;
        }
    }
    assert!(found, "no image derived");
}

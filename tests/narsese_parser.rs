use noesis::narsese::{parse_task, parse_term};
use noesis::sentence::{Punctuation, Sentence};
use noesis::stamp::{Stamp, Tense};
use noesis::term::{Connector, Copula, Term, VarKind};
use noesis::NoesisError;

fn error_message(text: &str) -> String {
    match parse_task(text) {
        Err(NoesisError::Parse { message, .. }) => message,
        Err(other) => panic!("unexpected error for {text}: {other}"),
        Ok(parsed) => panic!("{text} parsed as {:?}", parsed),
    }
}

#[test]
fn full_task() {
    let parsed = parse_task("$0.5;0.6$ <bird --> animal>. :|: %1.0;0.9%").expect("parses");
    assert_eq!(parsed.budget, vec![0.5, 0.6]);
    assert_eq!(parsed.content, Term::inheritance(Term::atom("bird"), Term::atom("animal")).unwrap());
    assert_eq!(parsed.punctuation, Punctuation::Judgment);
    assert_eq!(parsed.tense, Some(Tense::Present));
    assert_eq!(parsed.truth, vec![1.0, 0.9]);
}

#[test]
fn bare_task() {
    let parsed = parse_task("<bird --> animal>?").expect("parses");
    assert!(parsed.budget.is_empty());
    assert!(parsed.truth.is_empty());
    assert_eq!(parsed.tense, None);
    assert_eq!(parsed.punctuation, Punctuation::Question);
    assert_eq!(parse_task("<a --> b>!").unwrap().punctuation, Punctuation::Goal);
    assert_eq!(parse_task("<a --> b>@").unwrap().punctuation, Punctuation::Quest);
    assert_eq!(parse_task("<a --> b>. %0.7%").unwrap().truth, vec![0.7]);
}

#[test]
fn compound_terms() {
    let term = parse_term("<(*, a, b) --> like>").unwrap();
    assert_eq!(term.to_string(), "<(*,a,b) --> like>");
    assert_eq!(term.subject().and_then(|s| s.connector()), Some(Connector::Product));
    assert_eq!(parse_term("(&&, <a --> b>, <c --> d>)").unwrap().connector(), Some(Connector::Conjunction));
    assert_eq!(parse_term("(--, a)").unwrap().connector(), Some(Connector::Negation));
    assert_eq!(parse_term("(/, like, _, b)").unwrap().to_string(), "(/,like,_,b)");
    let implication = parse_term("<<a --> b> ==> <c --> d>>").unwrap();
    assert_eq!(implication.copula(), Some(Copula::Implication));
    assert_eq!(implication.complexity(), 7);
}

#[test]
fn canonical_forms() {
    assert_eq!(parse_term("{b, a, b}").unwrap().to_string(), "{a,b}");
    assert_eq!(parse_term("[x,y]").unwrap(), parse_term("[y, x]").unwrap());
    assert_eq!(parse_term("<b <-> a>").unwrap().to_string(), "<a <-> b>");
    assert_eq!(parse_term("(&, b, a)").unwrap(), parse_term("(&, a, b)").unwrap());
    // order matters for a product
    assert_ne!(parse_term("(*, b, a)").unwrap(), parse_term("(*, a, b)").unwrap());
}

#[test]
fn variables_are_renamed_in_sentences() {
    let term = parse_term("<$x --> (&, #y, $x)>").unwrap();
    assert!(term.has_var(VarKind::Independent));
    assert!(term.has_var(VarKind::Dependent));
    assert!(!term.is_constant());
    let sentence = Sentence::new(term, Punctuation::Question, None, Stamp::input(1, 0, None, 5)).unwrap();
    let other = parse_term("<$a --> (&, #b, $a)>").unwrap();
    let other = Sentence::new(other, Punctuation::Question, None, Stamp::input(2, 0, None, 5)).unwrap();
    assert_eq!(sentence.content(), other.content());
    assert_eq!(sentence.key(), other.key());
}

#[test]
fn missing_closers() {
    assert_eq!(error_message("<bird --> animal."), "missing closer '>'");
    assert_eq!(error_message("(*, a, b --> c>."), "missing closer ')'");
    assert_eq!(error_message("<{a, b --> c>."), "missing closer '}'");
    assert_eq!(error_message("<[a, b --> c>."), "missing closer ']'");
    assert_eq!(error_message("$0.5;0.5 <a --> b>."), "missing closer '$'");
    assert_eq!(error_message("<a --> b>. %1.0;0.9"), "missing closer '%'");
}

#[test]
fn empty_fields() {
    assert_eq!(error_message("$;0.5$ <a --> b>."), "empty budget field");
    assert_eq!(error_message("<a --> b>. %;0.9%"), "empty truth field");
}

#[test]
fn punctuation_errors() {
    assert_eq!(error_message("<a --> b>;"), "unknown punctuation ';'");
    assert_eq!(error_message("<a --> b>"), "missing punctuation");
}

#[test]
fn bad_statements() {
    assert!(error_message("<a b>.").contains("copula"));
    assert!(error_message("(a, b).").contains("connector"));
    assert!(matches!(parse_task("<a --> a>."), Err(NoesisError::Term(_))));
    assert!(matches!(parse_task("(--, a, b)."), Err(NoesisError::Term(_))));
}

#[test]
fn errors_carry_position() {
    match parse_task("<bird --> animal.") {
        Err(NoesisError::Parse { line, col, .. }) => {
            assert_eq!(line, Some(1));
            assert_eq!(col, Some(17));
        }
        other => panic!("unexpected {:?}", other.map(|p| p.content)),
    }
}

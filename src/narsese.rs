//! Parser for the textual task format.
//!
//! ```text
//! $0.8;0.8;0.95$ <bird --> animal>. :|: %1.0;0.9%
//! ```
//!
//! Budget, tense and truth are optional. The parser only recognizes syntax;
//! turning a [`Narsese`] into a task (serials, defaults, time) is the
//! memory's business. Failures carry a precise reason and the position.

use pest::error::{ErrorVariant, InputLocation, LineColLocation};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::{NoesisError, Result};
use crate::sentence::Punctuation;
use crate::stamp::Tense;
use crate::term::{Connector, Copula, Term, VarKind};

#[derive(Parser)]
#[grammar = "narsese.pest"]
struct NarseseParser;

/// One parsed line of input.
#[derive(PartialEq, Clone, Debug)]
pub struct Narsese {
    /// Between one and three budget fields, or none.
    pub budget: Vec<f32>,
    pub content: Term,
    pub punctuation: Punctuation,
    pub tense: Option<Tense>,
    /// Frequency and optionally confidence, or none.
    pub truth: Vec<f32>,
}

pub fn parse_task(text: &str) -> Result<Narsese> {
    let mut pairs = NarseseParser::parse(Rule::task, text.trim()).map_err(|e| parse_error(text.trim(), e))?;
    let task = pairs.next().ok_or_else(|| NoesisError::parse("empty input"))?;
    let mut parsed = Narsese {
        budget: Vec::new(),
        content: Term::atom(""),
        punctuation: Punctuation::Judgment,
        tense: None,
        truth: Vec::new(),
    };
    let mut content = None;
    for pair in task.into_inner() {
        match pair.as_rule() {
            Rule::budget => parsed.budget = fields(pair, "budget")?,
            Rule::truth => parsed.truth = fields(pair, "truth")?,
            Rule::punctuation => {
                let c = pair.as_str().chars().next().unwrap_or('.');
                parsed.punctuation = Punctuation::from_symbol(c)
                    .ok_or_else(|| NoesisError::parse(format!("unknown punctuation '{}'", c)))?;
            }
            Rule::tense => parsed.tense = Tense::from_marker(pair.as_str()),
            Rule::EOI => {}
            _ => content = Some(build_term(pair)?),
        }
    }
    parsed.content = content.ok_or_else(|| NoesisError::parse("missing term"))?;
    Ok(parsed)
}

pub fn parse_term(text: &str) -> Result<Term> {
    let mut pairs = NarseseParser::parse(Rule::term_only, text.trim()).map_err(|e| parse_error(text.trim(), e))?;
    let outer = pairs.next().ok_or_else(|| NoesisError::parse("empty input"))?;
    let pair = outer
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or_else(|| NoesisError::parse("missing term"))?;
    build_term(pair)
}

fn fields(pair: Pair<Rule>, what: &str) -> Result<Vec<f32>> {
    pair.into_inner()
        .filter(|p| p.as_rule() == Rule::field)
        .map(|field| {
            let text = field.as_str().trim();
            if text.is_empty() {
                return Err(NoesisError::parse(format!("empty {} field", what)));
            }
            text.parse::<f32>()
                .map_err(|_| NoesisError::parse(format!("invalid number '{}' in {}", text, what)))
        })
        .collect()
}

fn build_term(pair: Pair<Rule>) -> Result<Term> {
    match pair.as_rule() {
        Rule::atom => Ok(Term::atom(pair.as_str())),
        Rule::variable => {
            let text = pair.as_str();
            let mut chars = text.chars();
            let kind = chars
                .next()
                .and_then(VarKind::from_prefix)
                .ok_or_else(|| NoesisError::parse(format!("invalid variable '{}'", text)))?;
            Ok(Term::variable(kind, chars.as_str()))
        }
        Rule::statement => {
            let mut inner = pair.into_inner();
            let subject = next_term(&mut inner)?;
            let copula = inner
                .next()
                .and_then(|p| Copula::from_symbol(p.as_str()))
                .ok_or_else(|| NoesisError::parse("missing copula"))?;
            let predicate = next_term(&mut inner)?;
            Term::statement(copula, subject, predicate)
        }
        Rule::compound => {
            let mut inner = pair.into_inner();
            let connector = inner
                .next()
                .and_then(|p| Connector::from_symbol(p.as_str()))
                .ok_or_else(|| NoesisError::parse("missing connector"))?;
            Term::compound(connector, components(inner)?)
        }
        Rule::ext_set => Term::compound(Connector::ExtSet, components(pair.into_inner())?),
        Rule::int_set => Term::compound(Connector::IntSet, components(pair.into_inner())?),
        other => Err(NoesisError::parse(format!("unexpected {:?}", other))),
    }
}

fn next_term(inner: &mut pest::iterators::Pairs<Rule>) -> Result<Term> {
    let pair = inner.next().ok_or_else(|| NoesisError::parse("missing term"))?;
    build_term(pair)
}

fn components(inner: pest::iterators::Pairs<Rule>) -> Result<Vec<Term>> {
    inner
        .filter(|p| !is_closer(p.as_rule()))
        .map(build_term)
        .collect()
}

fn is_closer(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::statement_close | Rule::compound_close | Rule::ext_set_close | Rule::int_set_close
    )
}

fn parse_error(text: &str, e: pest::error::Error<Rule>) -> NoesisError {
    let (line, col) = match e.line_col {
        LineColLocation::Pos((l, c)) => (l, c),
        LineColLocation::Span((l, c), _) => (l, c),
    };
    let offset = match e.location {
        InputLocation::Pos(p) => p,
        InputLocation::Span((p, _)) => p,
    };
    let found = text[offset..].chars().next();
    let message = match &e.variant {
        ErrorVariant::ParsingError { positives, .. } => describe(positives, found),
        ErrorVariant::CustomError { message } => message.clone(),
    };
    NoesisError::Parse { message, line: Some(line), col: Some(col) }
}

// The first expected rule that has a specific explanation wins.
fn describe(positives: &[Rule], found: Option<char>) -> String {
    for rule in positives {
        let closer = match rule {
            Rule::statement_close => Some('>'),
            Rule::compound_close => Some(')'),
            Rule::ext_set_close => Some('}'),
            Rule::int_set_close => Some(']'),
            Rule::budget_close => Some('$'),
            Rule::truth_close => Some('%'),
            _ => None,
        };
        if let Some(closer) = closer {
            return format!("missing closer '{}'", closer);
        }
    }
    if positives.contains(&Rule::punctuation) {
        return match found {
            Some(c) => format!("unknown punctuation '{}'", c),
            None => "missing punctuation".to_owned(),
        };
    }
    if positives.contains(&Rule::copula) {
        return "missing copula".to_owned();
    }
    if positives.contains(&Rule::connector) {
        return "missing connector".to_owned();
    }
    match found {
        Some(c) => format!("unexpected '{}'", c),
        None => "unexpected end of input".to_owned(),
    }
}

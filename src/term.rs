//! Terms as a tagged variant.
//!
//! The engine treats terms mostly as opaque keys: the canonical printed form
//! (see [`Term::name`]) names the concept a term belongs to. Structure is only
//! consulted to precompute term-link templates and by rule implementations,
//! which match on the variant rather than on any notion of type identity.

use std::collections::HashMap;
use std::fmt;

use crate::error::{NoesisError, Result};

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Copula {
    Inheritance,
    Similarity,
    Implication,
    Equivalence,
}

impl Copula {
    pub fn symbol(&self) -> &'static str {
        match self {
            Copula::Inheritance => "-->",
            Copula::Similarity => "<->",
            Copula::Implication => "==>",
            Copula::Equivalence => "<=>",
        }
    }
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "-->" => Some(Copula::Inheritance),
            "<->" => Some(Copula::Similarity),
            "==>" => Some(Copula::Implication),
            "<=>" => Some(Copula::Equivalence),
            _ => None,
        }
    }
    /// Symmetric copulas keep their two sides in canonical order.
    pub fn is_symmetric(&self) -> bool {
        matches!(self, Copula::Similarity | Copula::Equivalence)
    }
    /// Higher-order copulas relate statements rather than terms.
    pub fn is_higher_order(&self) -> bool {
        matches!(self, Copula::Implication | Copula::Equivalence)
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Connector {
    Conjunction,
    Disjunction,
    Negation,
    Product,
    ExtSet,
    IntSet,
    ExtIntersection,
    IntIntersection,
    ExtDifference,
    IntDifference,
    ExtImage,
    IntImage,
}

impl Connector {
    pub fn symbol(&self) -> &'static str {
        match self {
            Connector::Conjunction => "&&",
            Connector::Disjunction => "||",
            Connector::Negation => "--",
            Connector::Product => "*",
            Connector::ExtSet => "{}",
            Connector::IntSet => "[]",
            Connector::ExtIntersection => "&",
            Connector::IntIntersection => "|",
            Connector::ExtDifference => "-",
            Connector::IntDifference => "~",
            Connector::ExtImage => "/",
            Connector::IntImage => "\\",
        }
    }
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "&&" => Some(Connector::Conjunction),
            "||" => Some(Connector::Disjunction),
            "--" => Some(Connector::Negation),
            "*" => Some(Connector::Product),
            "&" => Some(Connector::ExtIntersection),
            "|" => Some(Connector::IntIntersection),
            "-" => Some(Connector::ExtDifference),
            "~" => Some(Connector::IntDifference),
            "/" => Some(Connector::ExtImage),
            "\\" => Some(Connector::IntImage),
            _ => None,
        }
    }
    pub fn is_commutative(&self) -> bool {
        matches!(
            self,
            Connector::Conjunction
                | Connector::Disjunction
                | Connector::ExtSet
                | Connector::IntSet
                | Connector::ExtIntersection
                | Connector::IntIntersection
        )
    }
    fn arity_ok(&self, n: usize) -> bool {
        match self {
            Connector::Negation => n == 1,
            Connector::ExtDifference | Connector::IntDifference => n == 2,
            Connector::ExtSet | Connector::IntSet | Connector::Product => n >= 1,
            Connector::ExtImage | Connector::IntImage => n >= 2,
            _ => n >= 2,
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum VarKind {
    Independent,
    Dependent,
    Query,
}

impl VarKind {
    pub fn prefix(&self) -> char {
        match self {
            VarKind::Independent => '$',
            VarKind::Dependent => '#',
            VarKind::Query => '?',
        }
    }
    pub fn from_prefix(c: char) -> Option<Self> {
        match c {
            '$' => Some(VarKind::Independent),
            '#' => Some(VarKind::Dependent),
            '?' => Some(VarKind::Query),
            _ => None,
        }
    }
}

/// Placeholder atom marking the relation slot of an image.
pub const IMAGE_PLACEHOLDER: &str = "_";

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug)]
pub enum Term {
    Atom(String),
    Variable { kind: VarKind, name: String },
    Statement { copula: Copula, subject: Box<Term>, predicate: Box<Term> },
    Compound { connector: Connector, components: Vec<Term> },
}

impl Term {
    pub fn atom(name: impl Into<String>) -> Self {
        Term::Atom(name.into())
    }
    pub fn variable(kind: VarKind, name: impl Into<String>) -> Self {
        Term::Variable { kind, name: name.into() }
    }
    /// Builds a statement; a term related to itself is not a valid statement.
    pub fn statement(copula: Copula, subject: Term, predicate: Term) -> Result<Self> {
        if subject == predicate {
            return Err(NoesisError::Term(format!("{} relates {} to itself", copula.symbol(), subject)));
        }
        let (subject, predicate) = if copula.is_symmetric() && predicate.name() < subject.name() {
            (predicate, subject)
        } else {
            (subject, predicate)
        };
        Ok(Term::Statement { copula, subject: Box::new(subject), predicate: Box::new(predicate) })
    }
    /// Builds a compound in canonical form: components of commutative
    /// connectors are sorted by name and deduplicated.
    pub fn compound(connector: Connector, mut components: Vec<Term>) -> Result<Self> {
        if connector.is_commutative() {
            components.sort_by_cached_key(|t| t.name());
            components.dedup();
        }
        if !connector.arity_ok(components.len()) {
            return Err(NoesisError::Term(format!(
                "connector {} does not take {} component(s)",
                connector.symbol(),
                components.len()
            )));
        }
        Ok(Term::Compound { connector, components })
    }
    pub fn inheritance(subject: Term, predicate: Term) -> Result<Self> {
        Self::statement(Copula::Inheritance, subject, predicate)
    }

    /// Canonical printed form, also the key of the term's concept.
    pub fn name(&self) -> String {
        self.to_string()
    }
    pub fn is_atomic(&self) -> bool {
        matches!(self, Term::Atom(_) | Term::Variable { .. })
    }
    pub fn is_compound(&self) -> bool {
        !self.is_atomic()
    }
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable { .. })
    }
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Term::Atom(name) if name == IMAGE_PLACEHOLDER)
    }
    pub fn copula(&self) -> Option<Copula> {
        match self {
            Term::Statement { copula, .. } => Some(*copula),
            _ => None,
        }
    }
    pub fn connector(&self) -> Option<Connector> {
        match self {
            Term::Compound { connector, .. } => Some(*connector),
            _ => None,
        }
    }
    pub fn subject(&self) -> Option<&Term> {
        match self {
            Term::Statement { subject, .. } => Some(subject),
            _ => None,
        }
    }
    pub fn predicate(&self) -> Option<&Term> {
        match self {
            Term::Statement { predicate, .. } => Some(predicate),
            _ => None,
        }
    }
    /// Direct components: subject and predicate of a statement, the members of
    /// a compound, nothing for atomic terms.
    pub fn components(&self) -> Vec<&Term> {
        match self {
            Term::Statement { subject, predicate, .. } => vec![subject, predicate],
            Term::Compound { components, .. } => components.iter().collect(),
            _ => Vec::new(),
        }
    }
    pub fn complexity(&self) -> usize {
        match self {
            Term::Atom(_) => 1,
            Term::Variable { .. } => 0,
            _ => 1 + self.components().iter().map(|c| c.complexity()).sum::<usize>(),
        }
    }
    pub fn has_var(&self, kind: VarKind) -> bool {
        match self {
            Term::Variable { kind: k, .. } => *k == kind,
            Term::Atom(_) => false,
            _ => self.components().iter().any(|c| c.has_var(kind)),
        }
    }
    pub fn has_vars(&self) -> bool {
        match self {
            Term::Variable { .. } => true,
            Term::Atom(_) => false,
            _ => self.components().iter().any(|c| c.has_vars()),
        }
    }
    /// A term without variables names something definite.
    pub fn is_constant(&self) -> bool {
        !self.has_vars()
    }
    /// Copy with variables renamed `1, 2, ...` in order of first appearance,
    /// so two occurrences of the same sentence share one key.
    pub fn renamed_variables(&self) -> Term {
        if !self.has_vars() {
            return self.clone();
        }
        let mut names = HashMap::new();
        self.rename(&mut names)
    }
    fn rename(&self, names: &mut HashMap<(VarKind, String), usize>) -> Term {
        match self {
            Term::Atom(_) => self.clone(),
            Term::Variable { kind, name } => {
                let next = names.len() + 1;
                let n = *names.entry((*kind, name.clone())).or_insert(next);
                Term::Variable { kind: *kind, name: n.to_string() }
            }
            Term::Statement { copula, subject, predicate } => Term::Statement {
                copula: *copula,
                subject: Box::new(subject.rename(names)),
                predicate: Box::new(predicate.rename(names)),
            },
            Term::Compound { connector, components } => Term::Compound {
                connector: *connector,
                components: components.iter().map(|c| c.rename(names)).collect(),
            },
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Atom(name) => write!(f, "{}", name),
            Term::Variable { kind, name } => write!(f, "{}{}", kind.prefix(), name),
            Term::Statement { copula, subject, predicate } => {
                write!(f, "<{} {} {}>", subject, copula.symbol(), predicate)
            }
            Term::Compound { connector, components } => {
                let inner = components.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(",");
                match connector {
                    Connector::ExtSet => write!(f, "{{{}}}", inner),
                    Connector::IntSet => write!(f, "[{}]", inner),
                    _ => write!(f, "({},{})", connector.symbol(), inner),
                }
            }
        }
    }
}

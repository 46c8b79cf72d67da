//! The hook through which inference rules reach the engine.
//!
//! When a concept fires, the memory pairs a task with a belief candidate and
//! hands both to an [`InferenceRules`] implementation through the cycle
//! context. Rules read the premises from the context and report conclusions
//! only through [`CycleContext::single_premise_task`] and
//! [`CycleContext::double_premise_task`]; they never see a bag or a table.
//!
//! [`Syllogism`] is a small first-order rule set: inheritance deduction,
//! abduction and induction, plus the product/image transformation.

use crate::context::CycleContext;
use crate::term::{Connector, Copula, Term, IMAGE_PLACEHOLDER};
use crate::truth::{abduction, deduction, induction, TruthValue};

pub trait InferenceRules: Send {
    /// Task and belief are in `ctx.task()` and `ctx.belief()`.
    fn reason(&mut self, ctx: &mut CycleContext);
    /// Called instead of [`InferenceRules::reason`] for task links that only
    /// admit structural transformation; there is no belief.
    fn transform(&mut self, _ctx: &mut CycleContext) {}
}

/// Derives nothing. The engine still revises, stores and answers locally.
#[derive(Debug, Default)]
pub struct NoRules;

impl InferenceRules for NoRules {
    fn reason(&mut self, _ctx: &mut CycleContext) {}
}

#[derive(Debug, Default)]
pub struct Syllogism;

impl InferenceRules for Syllogism {
    fn reason(&mut self, ctx: &mut CycleContext) {
        let (Some(task), Some(belief)) = (ctx.task().cloned(), ctx.belief().cloned()) else {
            return;
        };
        let premise = task.sentence();
        if !premise.is_judgment() || !belief.is_judgment() {
            return;
        }
        let (Some(t1), Some(t2)) = (premise.truth().copied(), belief.truth().copied()) else {
            return;
        };
        let (Some((s1, p1)), Some((s2, p2))) = (inheritance(premise.content()), inheritance(belief.content())) else {
            return;
        };
        let mut conclusions: Vec<(&Term, &Term, TruthValue)> = Vec::new();
        // <M --> P>, <S --> M> |- <S --> P>
        if s1 == p2 {
            conclusions.push((s2, p1, deduction(&t1, &t2)));
        }
        // <S --> M>, <M --> P> |- <S --> P>
        if p1 == s2 {
            conclusions.push((s1, p2, deduction(&t1, &t2)));
        }
        // <P --> M>, <S --> M> |- <S --> P>
        if p1 == p2 {
            conclusions.push((s2, s1, abduction(&t1, &t2)));
        }
        // <M --> P>, <M --> S> |- <S --> P>
        if s1 == s2 {
            conclusions.push((p2, p1, induction(&t1, &t2)));
        }
        for (subject, predicate, truth) in conclusions {
            let Ok(content) = Term::inheritance(subject.clone(), predicate.clone()) else {
                continue;
            };
            let budget = ctx.forward(&truth);
            ctx.double_premise_task(content, Some(truth), budget, premise, &belief);
        }
    }

    fn transform(&mut self, ctx: &mut CycleContext) {
        let Some(task) = ctx.task().cloned() else {
            return;
        };
        let Some((subject, predicate)) = inheritance(task.content()) else {
            return;
        };
        let truth = task.sentence().truth().copied();
        for content in product_image_transforms(subject, predicate) {
            let budget = match &truth {
                Some(t) => ctx.compound_forward(t, &content),
                None => ctx.compound_backward(&content),
            };
            ctx.single_premise_task(content, truth, budget);
        }
    }
}

fn inheritance(term: &Term) -> Option<(&Term, &Term)> {
    match term {
        Term::Statement { copula: Copula::Inheritance, subject, predicate } => Some((&**subject, &**predicate)),
        _ => None,
    }
}

/// `<(*,a,b) --> R>` becomes `<a --> (/,R,_,b)>` and `<b --> (/,R,a,_)>`;
/// `<a --> (/,R,_,b)>` becomes `<(*,a,b) --> R>`.
fn product_image_transforms(subject: &Term, predicate: &Term) -> Vec<Term> {
    let mut out = Vec::new();
    if let Term::Compound { connector: Connector::Product, components } = subject {
        for (i, component) in components.iter().enumerate() {
            let mut image = Vec::with_capacity(components.len() + 1);
            image.push(predicate.clone());
            for (j, other) in components.iter().enumerate() {
                image.push(if i == j { Term::atom(IMAGE_PLACEHOLDER) } else { other.clone() });
            }
            if let Ok(image) = Term::compound(Connector::ExtImage, image) {
                if let Ok(statement) = Term::inheritance(component.clone(), image) {
                    out.push(statement);
                }
            }
        }
    }
    if let Term::Compound { connector: Connector::ExtImage, components } = predicate {
        if let Some((relation, rest)) = components.split_first() {
            if rest.iter().any(|c| c.is_placeholder()) {
                let product = rest
                    .iter()
                    .map(|c| if c.is_placeholder() { subject.clone() } else { c.clone() })
                    .collect();
                if let Ok(product) = Term::compound(Connector::Product, product) {
                    if let Ok(statement) = Term::inheritance(product, relation.clone()) {
                        out.push(statement);
                    }
                }
            }
        }
    }
    out
}

//! Noesis: a resource-bounded reasoning core in the NARS tradition.
//!
//! The system keeps an open-ended body of knowledge about terms while holding
//! memory and per-cycle work to fixed bounds. It never works through all it
//! knows. Every cycle it picks *one* thing to think about, with probability
//! proportional to priority, and lets everything else decay a little.
//!
//! * A [`term::Term`] names something: an atom, a variable, a compound or a
//!   statement such as `<bird --> animal>`.
//! * A [`sentence::Sentence`] says something about a term: a judgment (`.`),
//!   question (`?`), goal (`!`) or quest (`@`), with a
//!   [`truth::TruthValue`] where one applies and a [`stamp::Stamp`] recording
//!   which input evidence it rests on.
//! * A [`sentence::Task`] is a sentence competing for attention with a
//!   [`budget::BudgetValue`] of priority, durability and quality.
//! * A [`concept::Concept`] gathers the beliefs, desires and open questions
//!   about one term, and links to related concepts.
//!
//! Concepts, links and waiting tasks all live in [`bag::Bag`]s: bounded
//! containers that select items by priority and evict the weakest when full.
//! That is what keeps the system bounded.
//!
//! ## Modules
//! * [`value`], [`truth`], [`budget`] – fixed-point values and their algebra.
//! * [`stamp`] – evidential bases, overlap and merging.
//! * [`term`], [`sentence`] – the content the engine reasons about.
//! * [`bag`], [`link`], [`concept`] – storage and the term graph.
//! * [`memory`], [`context`] – the working cycle and the task-creation API.
//! * [`rules`] – the hook for inference rules, with a small syllogistic set.
//! * [`event`] – optional observation of what the engine does.
//! * [`narsese`] – parser for the textual format, grammar in `narsese.pest`.
//! * [`parameters`] – tunables, loaded with `config`.
//! * [`reasoner`] – a threaded driver with cooperative cancellation.
//!
//! ## Quick Start
//! ```
//! use noesis::{memory::Memory, narsese::parse_term, parameters::Parameters};
//! let mut memory = Memory::new(Parameters::default()).unwrap();
//! memory.input("<bird --> animal>. %1.0;0.9%").unwrap();
//! memory.input("<bird --> animal>. %0.8;0.8%").unwrap();
//! memory.run(2);
//! let term = parse_term("<bird --> animal>").unwrap();
//! let concept = memory.concept(&term).unwrap();
//! let best = concept.top_belief().and_then(|b| b.truth()).unwrap();
//! assert!(best.confidence() > 0.9);
//! ```

pub mod bag;
pub mod budget;
pub mod concept;
pub mod context;
pub mod error;
pub mod event;
pub mod link;
pub mod memory;
pub mod narsese;
pub mod parameters;
pub mod reasoner;
pub mod rules;
pub mod sentence;
pub mod stamp;
pub mod term;
pub mod truth;
pub mod value;

pub use error::{NoesisError, Result};
pub use memory::Memory;
pub use parameters::Parameters;

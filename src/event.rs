//! Observation points of the engine.
//!
//! The memory reports what happens to an [`EventSink`]: concepts created and
//! fired, items evicted, answers found and decisions taken. Sinks sit outside
//! the reasoning path; dropping every event changes nothing about the results.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::error::{NoesisError, Result};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BagKind {
    Concept,
    TaskLink,
    TermLink,
    NovelTask,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ConceptCreated { term: String },
    Evicted { bag: BagKind, key: String },
    Fired { concept: String, task: String },
    Derived { task: String },
    Neglected { task: String },
    Answer { question: String, answer: String },
    Decision { goal: String, expectation: f32 },
}

pub trait EventSink: Send {
    fn on_event(&mut self, _event: &Event) {}
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// Forwards events to `tracing`: answers and decisions at info level, the
/// rest at debug or trace.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::Answer { question, answer } => info!(%question, %answer, "answer"),
            Event::Decision { goal, expectation } => info!(%goal, expectation, "decision"),
            Event::Evicted { bag, key } => debug!(?bag, %key, "evicted"),
            Event::Neglected { task } => debug!(%task, "neglected"),
            Event::ConceptCreated { term } => trace!(%term, "concept created"),
            Event::Fired { concept, task } => trace!(%concept, %task, "fired"),
            Event::Derived { task } => trace!(%task, "derived"),
        }
    }
}

/// Collects events for later inspection. Clones share one log.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn events(&self) -> Result<Vec<Event>> {
        let guard = self.events.lock().map_err(|e| NoesisError::Lock(e.to_string()))?;
        Ok(guard.clone())
    }
    pub fn drain(&self) -> Result<Vec<Event>> {
        let mut guard = self.events.lock().map_err(|e| NoesisError::Lock(e.to_string()))?;
        Ok(std::mem::take(&mut *guard))
    }
}

impl EventSink for EventLog {
    fn on_event(&mut self, event: &Event) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        }
    }
}

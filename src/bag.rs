//! The bag: a bounded, priority-bucketed container with probabilistic
//! selection and forgetting.
//!
//! Items are filed by key in a name table and, by quantized priority, into one
//! of a fixed number of levels, each a FIFO queue of keys. [`Bag::take_out`]
//! picks a level with probability proportional to `(level + 1) * count` and
//! pops its head, so the cost of a selection is bounded by the number of
//! levels, not the number of items. An item that has been taken out is in
//! neither structure until it is put back.
//!
//! When the bag is full, admitting a new key displaces the lowest-priority
//! resident, unless the newcomer would itself be the lowest, in which case it
//! is turned away. Neither outcome is an error; see [`PutIn`].

use core::hash::BuildHasherDefault;
use std::collections::{HashMap, VecDeque};

use rand::Rng;
use seahash::SeaHasher;
use tracing::debug;

use crate::budget::BudgetValue;

pub type NameHasher = BuildHasherDefault<SeaHasher>;

/// Anything with a budget and a unique key can live in a bag.
pub trait Item {
    fn key(&self) -> &str;
    fn budget(&self) -> &BudgetValue;
    fn budget_mut(&mut self) -> &mut BudgetValue;
    fn priority(&self) -> f32 {
        self.budget().priority()
    }
    /// Absorbs an incoming item with the same key. The receiver is the resident
    /// and keeps its identity; only the budgets combine.
    fn merge(&mut self, other: Self)
    where
        Self: Sized,
    {
        let incoming = *other.budget();
        self.budget_mut().merge(&incoming);
    }
}

/// Outcome of offering an item to a bag.
#[derive(Debug)]
pub enum PutIn<E> {
    /// Stored under a new key.
    Added,
    /// Merged into the resident with the same key.
    Merged,
    /// Stored, displacing the returned lowest-priority resident.
    Evicted(E),
    /// Turned away: the bag is full and the item would be its lowest.
    Rejected(E),
}

impl<E> PutIn<E> {
    pub fn inserted(&self) -> bool {
        !matches!(self, PutIn::Rejected(_))
    }
    /// The item that left the bag because of this call, if any.
    pub fn displaced(self) -> Option<E> {
        match self {
            PutIn::Evicted(e) | PutIn::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Resident<E> {
    level: usize,
    item: E,
}

#[derive(Debug)]
pub struct Bag<E: Item> {
    capacity: usize,
    forget_rate: f32,
    relative_threshold: f32,
    levels: Vec<VecDeque<String>>,
    name_table: HashMap<String, Resident<E>, NameHasher>,
    // sum over residents of (level + 1), the total selection weight
    mass: u64,
}

impl<E: Item> Bag<E> {
    pub const DEFAULT_RELATIVE_THRESHOLD: f32 = 0.3;

    pub fn new(capacity: usize, levels: usize, forget_rate: f32) -> Self {
        let levels = levels.max(1);
        Self {
            capacity,
            forget_rate,
            relative_threshold: Self::DEFAULT_RELATIVE_THRESHOLD,
            levels: (0..levels).map(|_| VecDeque::new()).collect(),
            name_table: HashMap::default(),
            mass: 0,
        }
    }
    pub fn with_relative_threshold(mut self, relative_threshold: f32) -> Self {
        self.relative_threshold = relative_threshold;
        self
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn forget_rate(&self) -> f32 {
        self.forget_rate
    }
    pub fn len(&self) -> usize {
        self.name_table.len()
    }
    pub fn is_empty(&self) -> bool {
        self.name_table.is_empty()
    }
    pub fn mass(&self) -> u64 {
        self.mass
    }
    pub fn contains(&self, key: &str) -> bool {
        self.name_table.contains_key(key)
    }
    pub fn get(&self, key: &str) -> Option<&E> {
        self.name_table.get(key).map(|r| &r.item)
    }
    /// Mutable access for changes that leave the budget alone. A budget change
    /// made through here is not reflected in the item's level until it is
    /// picked out and put back in.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut E> {
        self.name_table.get_mut(key).map(|r| &mut r.item)
    }
    /// Residents from the highest level down, FIFO within a level.
    pub fn iter(&self) -> impl Iterator<Item = &E> + '_ {
        self.levels
            .iter()
            .rev()
            .flat_map(|queue| queue.iter())
            .filter_map(|key| self.name_table.get(key).map(|r| &r.item))
    }
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|e| e.key())
    }
    pub fn average_priority(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.iter().map(|e| e.priority()).sum::<f32>() / self.len() as f32
    }
    /// Level a priority is filed under, `0` being the lowest.
    pub fn level_for(&self, priority: f32) -> usize {
        let top = self.levels.len();
        let level = (priority * top as f32).ceil() as usize;
        level.saturating_sub(1).min(top - 1)
    }

    /// Offers an item. An item whose key is already resident is merged into
    /// the resident instead of being stored twice.
    pub fn put_in(&mut self, item: E) -> PutIn<E> {
        if let Some(mut resident) = self.remove(item.key()) {
            resident.merge(item);
            self.file(resident);
            return PutIn::Merged;
        }
        if self.name_table.len() < self.capacity {
            self.file(item);
            return PutIn::Added;
        }
        let Some((victim_key, victim_priority)) = self.lowest() else {
            return PutIn::Rejected(item);
        };
        if item.priority() <= victim_priority {
            debug!(key = item.key(), priority = item.priority(), "bag full, item turned away");
            return PutIn::Rejected(item);
        }
        match self.remove(&victim_key) {
            Some(victim) => {
                debug!(key = %victim_key, priority = victim_priority, "bag full, lowest item evicted");
                self.file(item);
                PutIn::Evicted(victim)
            }
            None => PutIn::Rejected(item),
        }
    }
    /// Forgets for the cycles elapsed since the item's last visit, then puts it in.
    pub fn put_back(&mut self, mut item: E, now: u64) -> PutIn<E> {
        item.budget_mut().forget(self.forget_rate, self.relative_threshold, now);
        self.put_in(item)
    }
    /// Priority-weighted random selection. `None` when the bag is empty.
    pub fn take_out<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<E> {
        if self.mass == 0 {
            return None;
        }
        let mut draw = rng.gen_range(0..self.mass);
        for level in (0..self.levels.len()).rev() {
            let weight = (level as u64 + 1) * self.levels[level].len() as u64;
            if draw < weight {
                let key = self.levels[level].pop_front()?;
                self.mass -= level as u64 + 1;
                return self.name_table.remove(&key).map(|r| r.item);
            }
            draw -= weight;
        }
        None
    }
    /// Removes an item by key for out-of-band changes.
    pub fn pick_out(&mut self, key: &str) -> Option<E> {
        self.remove(key)
    }

    fn file(&mut self, item: E) {
        let level = self.level_for(item.priority());
        let key = item.key().to_owned();
        self.levels[level].push_back(key.clone());
        self.mass += level as u64 + 1;
        self.name_table.insert(key, Resident { level, item });
    }
    fn remove(&mut self, key: &str) -> Option<E> {
        let resident = self.name_table.remove(key)?;
        let queue = &mut self.levels[resident.level];
        if let Some(position) = queue.iter().position(|k| k == key) {
            queue.remove(position);
        }
        self.mass -= resident.level as u64 + 1;
        Some(resident.item)
    }
    // lowest non-empty level, lowest priority within it, oldest among equals
    fn lowest(&self) -> Option<(String, f32)> {
        let queue = self.levels.iter().find(|q| !q.is_empty())?;
        queue
            .iter()
            .filter_map(|key| self.name_table.get(key).map(|r| (key, r.item.priority())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, priority)| (key.clone(), priority))
    }
}

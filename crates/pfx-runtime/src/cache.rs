//! Bounded instrument metadata cache.
//!
//! Keyed by instrument identifier, FIFO eviction once `capacity` entries are
//! held. Only successful lookups are stored.

use std::collections::{HashMap, VecDeque};

use pfx_portfolio::InstrumentMeta;

#[derive(Debug)]
pub struct InstrumentCache {
    capacity: usize,
    entries: HashMap<String, InstrumentMeta>,
    order: VecDeque<String>,
}

impl InstrumentCache {
    /// `capacity` must be non-zero; a zero-capacity cache is expressed by not
    /// having one.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn get(&self, instrument_id: &str) -> Option<&InstrumentMeta> {
        self.entries.get(instrument_id)
    }

    pub fn insert(&mut self, meta: InstrumentMeta) {
        if self.entries.contains_key(&meta.instrument_id) {
            self.entries.insert(meta.instrument_id.clone(), meta);
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
        self.order.push_back(meta.instrument_id.clone());
        self.entries.insert(meta.instrument_id.clone(), meta);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! In-memory reading journal. Bounded; the oldest readings are evicted first.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;

use crate::eigen::ScoringStrategy;
use crate::model::{CardPlacement, Reading};

pub const MAX_JOURNAL_CAPACITY: usize = 10_000;

/// Everything a reading needs except its id and timestamp.
#[derive(Debug, Clone)]
pub struct NewReading {
    pub deck_id: String,
    pub spread_id: String,
    pub placements: Vec<CardPlacement>,
    pub question: Option<String>,
    pub interpretation: String,
    pub eigenvalue: Option<f64>,
    pub notes: Option<String>,
    pub method: ScoringStrategy,
}

#[derive(Debug)]
struct Inner {
    next_id: u64,
    entries: VecDeque<Reading>,
}

#[derive(Debug)]
pub struct Journal {
    inner: Mutex<Inner>,
    cap: usize,
}

impl Journal {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, MAX_JOURNAL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                entries: VecDeque::with_capacity(cap.min(256)),
            }),
            cap,
        }
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Assign id and timestamp, store, and return the stored reading.
    pub fn record(&self, new: NewReading) -> Reading {
        let mut g = self.inner.lock().expect("journal mutex poisoned");
        let reading = Reading {
            id: g.next_id,
            created_at: Utc::now(),
            deck_id: new.deck_id,
            spread_id: new.spread_id,
            placements: new.placements,
            question: new.question,
            interpretation: new.interpretation,
            eigenvalue: new.eigenvalue,
            notes: new.notes,
            method: new.method,
        };
        g.next_id += 1;
        g.entries.push_back(reading.clone());
        while g.entries.len() > self.cap {
            g.entries.pop_front();
        }
        reading
    }

    pub fn get(&self, id: u64) -> Option<Reading> {
        let g = self.inner.lock().expect("journal mutex poisoned");
        g.entries.iter().find(|r| r.id == id).cloned()
    }

    /// Newest first.
    pub fn last_n(&self, n: usize) -> Vec<Reading> {
        let g = self.inner.lock().expect("journal mutex poisoned");
        g.entries.iter().rev().take(n).cloned().collect()
    }

    /// Replace the notes; the score is left untouched.
    pub fn update_notes(&self, id: u64, notes: Option<String>) -> Option<Reading> {
        let mut g = self.inner.lock().expect("journal mutex poisoned");
        let r = g.entries.iter_mut().find(|r| r.id == id)?;
        r.notes = notes;
        Some(r.clone())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("journal mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

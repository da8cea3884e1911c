//! Bookkeeping of in-flight probe attempts for one pathway.
//!
//! [`ActiveProbes::take`] is the only way an entry leaves the map, and it
//! checks and removes under a single lock acquisition. Whoever gets the
//! probe back owns the outcome; every other caller sees `None` and must not
//! report anything.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::token::Token;

/// A pending probe attempt
#[derive(Debug, Clone, Copy)]
pub struct Probe {
    pub started: Instant,
}

impl Probe {
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[derive(Debug, Default)]
pub struct ActiveProbes {
    active: Mutex<HashMap<Token, Probe>>,
}

impl ActiveProbes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `token` as of now
    pub fn register(&self, token: Token) {
        self.active.lock().insert(token, Probe { started: Instant::now() });
    }

    /// Remove and return the probe for `token` if it is still pending
    pub fn take(&self, token: &str) -> Option<Probe> {
        self.active.lock().remove(token)
    }

    /// Whether this call resolved `token`
    pub fn resolve(&self, token: &str) -> bool {
        self.take(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.active.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

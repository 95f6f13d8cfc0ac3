use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use crate::config::LedgerConfig;

/// Issues unique identifiers per named scope.
pub trait SequenceGenerator: Send + Sync {
    fn next_value(&self, scope: &str) -> String;
}

/// Counter per scope, formatted as `prefix` followed by the zero-padded value.
///
/// Values handed out to a unit of work that later fails are not reused.
#[derive(Debug)]
pub struct InMemorySequence {
    config: LedgerConfig,
    counters: Mutex<HashMap<String, u64>>,
}

impl InMemorySequence {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            counters: Mutex::default(),
        }
    }
}

impl Default for InMemorySequence {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl SequenceGenerator for InMemorySequence {
    fn next_value(&self, scope: &str) -> String {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry(scope.to_string()).or_default();
        *counter += 1;
        format!(
            "{}{:0width$}",
            self.config.prefix_for(scope),
            counter,
            width = self.config.sequence_padding
        )
    }
}

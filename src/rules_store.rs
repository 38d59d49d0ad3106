use std::sync::{Arc, RwLock};

use crate::Rules;

/// `RulesStore` provides a Sync storage for the active rule tree that allows concurrent access
/// for readers and writers.
#[derive(Debug, Default)]
pub struct RulesStore {
    rules: RwLock<Option<Arc<Rules>>>,
}

impl RulesStore {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(None),
        }
    }

    /// Snapshot of the active rules. Later writes don't affect the returned tree.
    pub fn get_rules(&self) -> Option<Arc<Rules>> {
        // read() only fails if a writer panicked while holding the lock. Not crashing the request
        // pipeline over it.
        let rules = self.rules.read().ok()?;
        rules.clone()
    }

    /// Set new rules, returning the previous ones.
    pub fn set_rules(&self, rules: Rules) -> Option<Arc<Rules>> {
        // Constructing new value before requesting the lock to minimize lock span.
        let new_value = Some(Arc::new(rules));

        let mut rules_slot = self.rules.write().ok()?;
        std::mem::replace(&mut *rules_slot, new_value)
    }
}

use std::collections::HashMap;

use super::state_key::StateKey;
use crate::game::Action;

/// Running return statistics for one (state, action) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ActionValueRecord {
    pub sum: f64,
    pub count: u64,
}

impl ActionValueRecord {
    /// Average recorded return, 0 before the first visit.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn record(&mut self, return_value: f64) {
        self.sum += return_value;
        self.count += 1;
    }
}

/// Statistics for both actions at one key, indexed by [`Action::index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateValues {
    pub records: [ActionValueRecord; 2],
}

impl StateValues {
    pub fn get(&self, action: Action) -> &ActionValueRecord {
        &self.records[action.index()]
    }

    pub fn mean(&self, action: Action) -> f64 {
        self.get(action).mean()
    }

    pub fn visits(&self) -> u64 {
        self.records.iter().map(|r| r.count).sum()
    }
}

/// One persisted row of the table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValueEntry {
    pub key: StateKey,
    pub values: StateValues,
}

/// The Q-table: per-key, per-action return statistics.
///
/// Entries are created lazily and never removed.
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    table: HashMap<StateKey, StateValues>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for `key`, inserting zero statistics the first time.
    pub fn get_or_create(&mut self, key: StateKey) -> &mut StateValues {
        self.table.entry(key).or_default()
    }

    pub fn record(&mut self, key: StateKey, action: Action, return_value: f64) {
        self.get_or_create(key).records[action.index()].record(return_value);
    }

    /// Read-only view of `key`. Absent keys read as zero statistics and are
    /// not inserted, so workers can share the store immutably.
    pub fn lookup(&self, key: &StateKey) -> StateValues {
        self.table.get(key).copied().unwrap_or_default()
    }

    pub fn get(&self, key: &StateKey) -> Option<&StateValues> {
        self.table.get(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Sum of visit counts over every key and action.
    pub fn total_visits(&self) -> u64 {
        self.table.values().map(StateValues::visits).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &StateValues)> {
        self.table.iter()
    }

    /// All rows sorted by key.
    pub fn entries(&self) -> Vec<ValueEntry> {
        let mut entries: Vec<ValueEntry> = self
            .table
            .iter()
            .map(|(key, values)| ValueEntry {
                key: *key,
                values: *values,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Rebuild a store from persisted rows. Later duplicates win.
    pub fn from_entries(entries: impl IntoIterator<Item = ValueEntry>) -> Self {
        ValueStore {
            table: entries.into_iter().map(|e| (e.key, e.values)).collect(),
        }
    }
}

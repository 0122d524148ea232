use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::Storage;
use crate::error::Result;

pub const TRANSACTIONS_KEY: &str = "finflow_transactions";
pub const LOGISTICS_KEY: &str = "finflow_logistics";
pub const COSTS_KEY: &str = "finflow_costs";
pub const RECEIVABLES_KEY: &str = "finflow_receivables";
pub const IMPORTS_KEY: &str = "finflow_imports";
pub const RULES_KEY: &str = "finflow_rules";

/// An in-memory list mirrored to one storage key. Loaded once at construction,
/// written back in full after every mutation.
pub struct Collection<'a, T> {
    storage: &'a dyn Storage,
    key: &'static str,
    items: Vec<T>,
}

impl<'a, T> Collection<'a, T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn load(storage: &'a dyn Storage, key: &'static str) -> Result<Self> {
        let items = match storage.load(key)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "discarding unreadable stored collection");
                Vec::new()
            }),
            None => Vec::new(),
        };
        Ok(Self { storage, key, items })
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Apply `f` to the items and persist. The closure's return value is passed through.
    pub fn mutate<R>(&mut self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let out = f(&mut self.items);
        self.persist()?;
        Ok(out)
    }

    /// Keep only the items matching `keep`; returns how many were dropped.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> Result<usize> {
        let before = self.items.len();
        self.items.retain(keep);
        let removed = before - self.items.len();
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.items)?;
        self.storage.save(self.key, &json)
    }
}

//! Per-key serialization
//!
//! A `KeyedStore` hands out one mutex per logical key. The map lock is only
//! held long enough to find or create the slot, so operations on different
//! keys never contend beyond that.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Shared handle to a single keyed slot.
pub type Slot<V> = Arc<Mutex<V>>;

/// Map of independently lockable values.
pub struct KeyedStore<K, V> {
    entries: RwLock<HashMap<K, Slot<V>>>,
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Slot for `key`, if one exists.
    pub fn get(&self, key: &K) -> Option<Slot<V>> {
        self.entries.read().get(key).cloned()
    }

    /// Slot for `key`, creating it with `init` if absent.
    pub fn get_or_insert_with(&self, key: &K, init: impl FnOnce() -> V) -> Slot<V> {
        if let Some(slot) = self.get(key) {
            return slot;
        }
        self.entries
            .write()
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(init())))
            .clone()
    }

    /// Insert `value` unless the key is taken. The flag is true when this
    /// call created the slot.
    pub fn insert_if_absent(&self, key: &K, value: V) -> (Slot<V>, bool) {
        let mut entries = self.entries.write();
        if let Some(slot) = entries.get(key) {
            return (slot.clone(), false);
        }
        let slot = Arc::new(Mutex::new(value));
        entries.insert(key.clone(), slot.clone());
        (slot, true)
    }

    /// Remove `key` only if it still maps to `slot`.
    pub fn remove_slot(&self, key: &K, slot: &Slot<V>) -> bool {
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(current) if Arc::ptr_eq(current, slot) => {
                entries.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K, V> KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Copy of the value under `key`.
    pub fn snapshot(&self, key: &K) -> Option<V> {
        self.get(key).map(|slot| slot.lock().clone())
    }
}

impl<K, V> Default for KeyedStore<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

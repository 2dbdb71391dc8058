use crate::{
    db::index::record,
    key::{IntoKeyComponent, KeyComponent},
    model::index::IndexKind,
    obs::MetricsEvent,
    types::Id,
};
use std::collections::BTreeMap;

///
/// UniqueIndex
///
/// Single-component key → identifier, 1:1. Plain mapping semantics:
/// `set` overwrites, `delete` removes whatever is bound.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UniqueIndex {
    entries: BTreeMap<KeyComponent, Id>,
}

impl UniqueIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has<K: IntoKeyComponent>(&self, key: K) -> bool {
        self.entries.contains_key(&key.into_key_component())
    }

    pub fn get<K: IntoKeyComponent>(&self, key: K) -> Option<Id> {
        self.entries.get(&key.into_key_component()).copied()
    }

    /// Bind `id` under `key`, returning the identifier it displaced.
    pub fn set<K: IntoKeyComponent>(&mut self, key: K, id: Id) -> Option<Id> {
        let previous = self.entries.insert(key.into_key_component(), id);
        if previous != Some(id) {
            record(MetricsEvent::IndexInsert {
                kind: IndexKind::Unique,
            });
        }

        previous
    }

    pub fn delete<K: IntoKeyComponent>(&mut self, key: K) -> bool {
        let removed = self.entries.remove(&key.into_key_component()).is_some();
        if removed {
            record(MetricsEvent::IndexRemove {
                kind: IndexKind::Unique,
            });
        }

        removed
    }

    /// Iterate bound identifiers in key order.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries.values().copied()
    }

    /// Iterate `(key, id)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&KeyComponent, Id)> + '_ {
        self.entries.iter().map(|(key, id)| (key, *id))
    }
}

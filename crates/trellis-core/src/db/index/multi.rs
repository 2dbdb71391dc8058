use crate::{
    db::index::{
        id_set::{EMPTY_ID_SET, IdSet},
        record,
    },
    key::{IntoKeyComponent, KeyComponent},
    model::index::IndexKind,
    obs::MetricsEvent,
    types::Id,
};
use std::collections::BTreeMap;

///
/// MultiValueIndex
///
/// Single-component key → insertion-ordered identifier set, 1:N.
///
/// All mutation goes through `add`/`delete`: sets are created on first add
/// and dropped as soon as they empty, so no empty set is ever retained.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MultiValueIndex {
    entries: BTreeMap<KeyComponent, IdSet>,
}

impl MultiValueIndex {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of stored identifiers across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(IdSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has<K: IntoKeyComponent>(&self, key: K) -> bool {
        self.entries.contains_key(&key.into_key_component())
    }

    /// Identifiers under `key`; a shared empty set when absent.
    pub fn get<K: IntoKeyComponent>(&self, key: K) -> &IdSet {
        self.entries
            .get(&key.into_key_component())
            .unwrap_or(&EMPTY_ID_SET)
    }

    /// Add `id` under `key`, moving it last if it is already there.
    pub fn add<K: IntoKeyComponent>(&mut self, key: K, id: Id) {
        let added = self
            .entries
            .entry(key.into_key_component())
            .or_default()
            .insert(id);

        if added {
            record(MetricsEvent::IndexInsert {
                kind: IndexKind::MultiValue,
            });
        }
    }

    pub fn delete<K: IntoKeyComponent>(&mut self, key: K, id: Id) -> bool {
        let key = key.into_key_component();
        let Some(set) = self.entries.get_mut(&key) else {
            return false;
        };

        let removed = set.remove(&id);
        if set.is_empty() {
            self.entries.remove(&key);
        }
        if removed {
            record(MetricsEvent::IndexRemove {
                kind: IndexKind::MultiValue,
            });
        }

        removed
    }

    /// Every stored identifier: keys in key order, each key's ids in
    /// insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.entries.values().flat_map(IdSet::iter)
    }

    pub fn keys(&self) -> impl Iterator<Item = &KeyComponent> + '_ {
        self.entries.keys()
    }
}

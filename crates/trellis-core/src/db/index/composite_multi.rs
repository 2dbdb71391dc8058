use crate::{
    MAX_KEY_COMPONENTS_LIMIT,
    db::index::{
        IndexWriter,
        id_set::IdSet,
        record, reject,
        trie::Trie,
        view::{SubCompositeMultiValueIndex, TrieLookup},
    },
    error::IndexError,
    key::KeyComponent,
    model::index::IndexKind,
    obs::MetricsEvent,
    types::Id,
};

const KIND: IndexKind = IndexKind::CompositeMultiValue;

///
/// CompositeMultiValueIndex
///
/// Composite key trie terminating in insertion-ordered identifier sets.
/// Populated only through `add`/`delete`; `set` is rejected.
///

#[derive(Clone, Debug)]
pub struct CompositeMultiValueIndex {
    trie: Trie<IdSet>,
}

impl CompositeMultiValueIndex {
    /// Build an index over `component_count` key components.
    ///
    /// # Panics
    /// If `component_count` is zero or above `MAX_KEY_COMPONENTS_LIMIT`.
    #[must_use]
    pub fn new(component_count: usize) -> Self {
        assert!(
            (1..=MAX_KEY_COMPONENTS_LIMIT).contains(&component_count),
            "composite index needs 1..={MAX_KEY_COMPONENTS_LIMIT} components, got {component_count}"
        );

        Self {
            trie: Trie::new(component_count),
        }
    }

    pub fn try_new(component_count: usize) -> Result<Self, IndexError> {
        if !(1..=MAX_KEY_COMPONENTS_LIMIT).contains(&component_count) {
            return Err(IndexError::ComponentCount {
                found: component_count,
                max: MAX_KEY_COMPONENTS_LIMIT,
            });
        }

        Ok(Self {
            trie: Trie::new(component_count),
        })
    }

    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.trie.component_count()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.trie.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Trie node count (diagnostics only).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.trie.node_count()
    }

    pub fn get(
        &self,
        keys: &[Option<KeyComponent>],
    ) -> Result<TrieLookup<'_, IdSet>, IndexError> {
        self.trie.lookup(keys)
    }

    /// Read-only view narrowed to `prefix`.
    pub fn prefix(
        &self,
        prefix: &[Option<KeyComponent>],
    ) -> Result<Option<SubCompositeMultiValueIndex<'_>>, IndexError> {
        Ok(self.get(prefix)?.prefix())
    }

    pub fn has(&self, keys: &[Option<KeyComponent>]) -> Result<bool, IndexError> {
        self.trie.contains(keys)
    }

    /// Add `id` under the full key `keys`.
    ///
    /// Returns how many leading components were defined and consumed; zero
    /// means the first component was unset and nothing was written.
    pub fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        let inserted = self.trie.insert(keys, id).map_err(|err| reject(KIND, err))?;
        if inserted.bound.changed {
            record(MetricsEvent::IndexInsert { kind: KIND });
        }

        Ok(inserted.consumed)
    }

    pub fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        let removed = self.trie.remove(keys, id).map_err(|err| reject(KIND, err))?;
        if removed {
            record(MetricsEvent::IndexRemove { kind: KIND });
        }

        Ok(removed)
    }

    /// Every stored identifier, depth-first with undefined buckets first.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.trie.ids()
    }
}

impl IndexWriter for CompositeMultiValueIndex {
    fn kind(&self) -> IndexKind {
        KIND
    }

    fn set(&mut self, _keys: &[Option<KeyComponent>], _id: Id) -> Result<(), IndexError> {
        Err(reject(
            KIND,
            IndexError::ReadOnly {
                target: "CompositeMultiValueIndex",
            },
        ))
    }

    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        Self::add(self, keys, id)
    }

    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        Self::delete(self, keys, id)
    }
}

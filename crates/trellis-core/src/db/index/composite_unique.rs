use crate::{
    MAX_KEY_COMPONENTS_LIMIT,
    db::index::{
        IndexWriter, record, reject,
        trie::Trie,
        view::{SubCompositeUniqueIndex, TrieLookup},
    },
    error::IndexError,
    key::KeyComponent,
    model::index::IndexKind,
    obs::MetricsEvent,
    types::Id,
};

const KIND: IndexKind = IndexKind::CompositeUnique;

///
/// CompositeUniqueIndex
///
/// Composite key trie terminating in single identifiers.
///
/// Shorter keys yield read-only prefix views. Unset trailing components
/// route the identifier into the undefined bucket of the depth where the
/// key stopped; an unset first component makes a write a no-op.
///

#[derive(Clone, Debug)]
pub struct CompositeUniqueIndex {
    trie: Trie<Id>,
}

impl CompositeUniqueIndex {
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

    /// Number of stored bindings, undefined-bucket entries included.
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

    pub fn get(&self, keys: &[Option<KeyComponent>]) -> Result<TrieLookup<'_, Id>, IndexError> {
        self.trie.lookup(keys)
    }

    /// Convenience over `get` for a full key.
    pub fn get_id(&self, keys: &[Option<KeyComponent>]) -> Result<Option<Id>, IndexError> {
        Ok(self.get(keys)?.found().copied())
    }

    /// Read-only view narrowed to `prefix`.
    pub fn prefix(
        &self,
        prefix: &[Option<KeyComponent>],
    ) -> Result<Option<SubCompositeUniqueIndex<'_>>, IndexError> {
        Ok(self.get(prefix)?.prefix())
    }

    pub fn has(&self, keys: &[Option<KeyComponent>]) -> Result<bool, IndexError> {
        self.trie.contains(keys)
    }

    /// Bind `id` under the full key `keys`; last write wins.
    pub fn set(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<(), IndexError> {
        let inserted = self.trie.insert(keys, id).map_err(|err| reject(KIND, err))?;
        if inserted.bound.changed {
            record(MetricsEvent::IndexInsert { kind: KIND });
        }

        Ok(())
    }

    /// Remove `id` from the full key `keys`, pruning emptied levels.
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

impl IndexWriter for CompositeUniqueIndex {
    fn kind(&self) -> IndexKind {
        KIND
    }

    fn set(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<(), IndexError> {
        Self::set(self, keys, id)
    }

    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        let inserted = self.trie.insert(keys, id).map_err(|err| reject(KIND, err))?;
        if inserted.bound.changed {
            record(MetricsEvent::IndexInsert { kind: KIND });
        }

        Ok(inserted.consumed)
    }

    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        Self::delete(self, keys, id)
    }
}

use crate::types::Id;
use std::{
    collections::{BTreeMap, btree_map},
    fmt,
    iter::Copied,
};

/// Shared empty set handed out by reads that miss; never mutated.
pub(crate) static EMPTY_ID_SET: IdSet = IdSet::new();

///
/// IdSet
///
/// Insertion-ordered set of identifiers.
///
/// Re-inserting an identifier that is already present moves it to the
/// most-recently-added position instead of duplicating it. Consumers may
/// rely on this: iteration order is the order of last insertion.
///

#[derive(Clone, Default)]
pub struct IdSet {
    order: BTreeMap<u64, Id>,
    slots: BTreeMap<Id, u64>,
    next: u64,
}

impl IdSet {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            order: BTreeMap::new(),
            slots: BTreeMap::new(),
            next: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &Id) -> bool {
        self.slots.contains_key(id)
    }

    /// Iterate in insertion (re-insertion) order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        self.order.values().copied()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        self.iter().collect()
    }

    /// Insert `id` at the end; returns whether it was not already present.
    pub(crate) fn insert(&mut self, id: Id) -> bool {
        let seq = self.next;
        self.next += 1;

        let prev = self.slots.insert(id, seq);
        if let Some(prev) = prev {
            self.order.remove(&prev);
        }
        self.order.insert(seq, id);

        prev.is_none()
    }

    pub(crate) fn remove(&mut self, id: &Id) -> bool {
        let Some(seq) = self.slots.remove(id) else {
            return false;
        };
        self.order.remove(&seq);

        // restart sequencing once drained
        if self.slots.is_empty() {
            self.next = 0;
        }

        true
    }

    /// Drain every member in iteration order.
    pub(crate) fn take(&mut self) -> Vec<Id> {
        let ids = self.to_vec();
        *self = Self::new();

        ids
    }
}

/// Iterator over an [`IdSet`] in insertion order.
pub type Iter<'a> = Copied<btree_map::Values<'a, u64, Id>>;

impl<'a> IntoIterator for &'a IdSet {
    type Item = Id;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for IdSet {}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Id> for IdSet {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }

        set
    }
}

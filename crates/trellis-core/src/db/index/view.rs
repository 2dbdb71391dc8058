use crate::{
    MAX_KEY_COMPONENTS_LIMIT,
    db::index::{
        id_set::{EMPTY_ID_SET, IdSet},
        trie::{Leaf, Node},
    },
    error::IndexError,
    key::KeyComponent,
    types::Id,
};
use std::{fmt, iter};

const EMPTY_VIEW_SLOTS: usize = MAX_KEY_COMPONENTS_LIMIT + 1;

/// Shared empty prefix views for unique tries, indexed by missing components.
pub(crate) static EMPTY_UNIQUE_VIEWS: [SubIndex<'static, Id>; EMPTY_VIEW_SLOTS] = empty_views();

/// Shared empty prefix views for multi-valued tries.
pub(crate) static EMPTY_MULTI_VIEWS: [SubIndex<'static, IdSet>; EMPTY_VIEW_SLOTS] = empty_views();

const fn empty_views<L>() -> [SubIndex<'static, L>; EMPTY_VIEW_SLOTS] {
    let mut views = [SubIndex::empty(0); EMPTY_VIEW_SLOTS];

    let mut remaining = 0;
    while remaining < EMPTY_VIEW_SLOTS {
        views[remaining] = SubIndex::empty(remaining);
        remaining += 1;
    }

    views
}

/// Read-only prefix view over a composite unique index.
pub type SubCompositeUniqueIndex<'a> = SubIndex<'a, Id>;

/// Read-only prefix view over a composite multi-valued index.
pub type SubCompositeMultiValueIndex<'a> = SubIndex<'a, IdSet>;

///
/// TrieLookup
///
/// Result of walking a composite key: a terminal binding, nothing, or a
/// narrower read-only view when the key stopped short.
///

pub enum TrieLookup<'a, L> {
    Found(&'a L),
    Absent,
    Prefix(SubIndex<'a, L>),
}

impl<'a, L> TrieLookup<'a, L> {
    #[must_use]
    pub const fn found(&self) -> Option<&'a L> {
        match self {
            Self::Found(leaf) => Some(*leaf),
            _ => None,
        }
    }

    #[must_use]
    pub const fn prefix(&self) -> Option<SubIndex<'a, L>> {
        match self {
            Self::Prefix(view) => Some(*view),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<L: fmt::Debug> fmt::Debug for TrieLookup<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(leaf) => f.debug_tuple("Found").field(leaf).finish(),
            Self::Absent => f.write_str("Absent"),
            Self::Prefix(view) => f.debug_tuple("Prefix").field(view).finish(),
        }
    }
}

///
/// SubIndex
///
/// Frozen, depth-tagged view into a composite index, narrowed to a key
/// prefix. Exposes reads only; there is no way to mutate through it.
/// Empty views (prefix misses) are shared per missing-component count.
///

pub struct SubIndex<'a, L> {
    node: Option<&'a Node<L>>,
    remaining: usize,
}

impl<L> Clone for SubIndex<'_, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for SubIndex<'_, L> {}

impl<L> SubIndex<'_, L> {
    pub(crate) const fn empty(remaining: usize) -> Self {
        Self {
            node: None,
            remaining,
        }
    }

    /// Number of trailing key components this view still expects.
    #[must_use]
    pub const fn missing_components(&self) -> usize {
        self.remaining
    }
}

impl<'a, L: Leaf> SubIndex<'a, L> {
    pub(crate) const fn new(node: &'a Node<L>, remaining: usize) -> Self {
        Self {
            node: Some(node),
            remaining,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node.is_none_or(Node::is_empty)
    }

    /// Whether this view is one of the shared empty sentinels.
    #[must_use]
    pub const fn is_sentinel(&self) -> bool {
        self.node.is_none()
    }

    /// Look up the remaining components below this prefix.
    pub fn get(&self, keys: &[Option<KeyComponent>]) -> Result<TrieLookup<'a, L>, IndexError> {
        match self.node {
            Some(node) => node.lookup(self.remaining, keys),
            None => {
                if keys.len() > self.remaining {
                    return Err(IndexError::arity(self.remaining, keys.len()));
                }

                Ok(match keys.len() {
                    0 => TrieLookup::Prefix(*self),
                    _ if self.remaining == 1 => TrieLookup::Absent,
                    _ => TrieLookup::Prefix(L::empty_view(self.remaining - 1)),
                })
            }
        }
    }

    pub fn has(&self, keys: &[Option<KeyComponent>]) -> Result<bool, IndexError> {
        match self.node {
            Some(node) => node.contains(self.remaining, keys),
            None if keys.len() > self.remaining => {
                Err(IndexError::arity(self.remaining, keys.len()))
            }
            None => Ok(false),
        }
    }

    /// Every identifier below this prefix, depth-first.
    #[must_use]
    pub fn iter(&self) -> Box<dyn Iterator<Item = Id> + 'a> {
        match self.node {
            Some(node) => node.ids(),
            None => Box::new(iter::empty()),
        }
    }

    /// Identifiers whose key has no value for the next component.
    #[must_use]
    pub fn undefined(&self) -> &'a IdSet {
        self.node.map_or(&EMPTY_ID_SET, Node::undefined)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        self.iter().collect()
    }
}

impl<L> fmt::Debug for SubIndex<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubIndex")
            .field("missing_components", &self.remaining)
            .field("sentinel", &self.node.is_none())
            .finish()
    }
}

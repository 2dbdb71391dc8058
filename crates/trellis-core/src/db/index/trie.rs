//! Composite key trie shared by the unique and multi-valued composite indexes.
//!
//! Invariants:
//! - A node with `remaining == 1` holds leaf storage; every other node holds
//!   child nodes.
//! - Nodes exist only while they hold a binding or a non-empty undefined
//!   bucket. Deletes prune empty nodes on the way back up; the root stays.
//! - The root never holds undefined-bucket entries (an unset first component
//!   is a no-op write).

use crate::{
    db::index::{
        id_set::{self, IdSet},
        view::{EMPTY_MULTI_VIEWS, EMPTY_UNIQUE_VIEWS, SubIndex, TrieLookup},
    },
    error::IndexError,
    key::KeyComponent,
    types::Id,
};
use std::{collections::BTreeMap, iter};

mod sealed {
    pub trait Sealed {}

    impl Sealed for crate::types::Id {}
    impl Sealed for crate::db::index::IdSet {}
}

///
/// Leaf
///
/// Terminal storage of a composite trie: a single identifier for unique
/// indexes, an insertion-ordered set for multi-valued ones.
///

pub trait Leaf: sealed::Sealed + Sized + 'static {
    #[doc(hidden)]
    type Ids<'a>: Iterator<Item = Id>
    where
        Self: 'a;

    #[doc(hidden)]
    fn ids(&self) -> Self::Ids<'_>;

    #[doc(hidden)]
    fn bind(leaves: &mut BTreeMap<KeyComponent, Self>, component: KeyComponent, id: Id) -> Bound;

    /// Unbind `id` from `component`; returns whether anything was removed.
    #[doc(hidden)]
    fn unbind(leaves: &mut BTreeMap<KeyComponent, Self>, component: &KeyComponent, id: Id)
    -> bool;

    /// The shared empty view for `remaining` missing components.
    #[doc(hidden)]
    fn empty_view(remaining: usize) -> SubIndex<'static, Self>;
}

impl Leaf for Id {
    type Ids<'a> = iter::Once<Id>;

    fn ids(&self) -> Self::Ids<'_> {
        iter::once(*self)
    }

    // last write wins
    fn bind(leaves: &mut BTreeMap<KeyComponent, Self>, component: KeyComponent, id: Id) -> Bound {
        let previous = leaves.insert(component, id);

        Bound {
            grew: previous.is_none(),
            changed: previous != Some(id),
        }
    }

    // only the identifier currently bound may remove the binding
    fn unbind(
        leaves: &mut BTreeMap<KeyComponent, Self>,
        component: &KeyComponent,
        id: Id,
    ) -> bool {
        if leaves.get(component) != Some(&id) {
            return false;
        }

        leaves.remove(component).is_some()
    }

    fn empty_view(remaining: usize) -> SubIndex<'static, Self> {
        EMPTY_UNIQUE_VIEWS
            .get(remaining)
            .copied()
            .unwrap_or_else(|| SubIndex::empty(remaining))
    }
}

impl Leaf for IdSet {
    type Ids<'a> = id_set::Iter<'a>;

    fn ids(&self) -> Self::Ids<'_> {
        self.iter()
    }

    fn bind(leaves: &mut BTreeMap<KeyComponent, Self>, component: KeyComponent, id: Id) -> Bound {
        Bound::grown(leaves.entry(component).or_default().insert(id))
    }

    fn unbind(
        leaves: &mut BTreeMap<KeyComponent, Self>,
        component: &KeyComponent,
        id: Id,
    ) -> bool {
        let Some(set) = leaves.get_mut(component) else {
            return false;
        };

        let removed = set.remove(&id);
        if set.is_empty() {
            leaves.remove(component);
        }

        removed
    }

    fn empty_view(remaining: usize) -> SubIndex<'static, Self> {
        EMPTY_MULTI_VIEWS
            .get(remaining)
            .copied()
            .unwrap_or_else(|| SubIndex::empty(remaining))
    }
}

///
/// Node
///
/// One level of the composite key path. The undefined bucket holds ids
/// whose key has no value for the component this node would consume.
///

#[derive(Clone, Debug)]
pub(crate) struct Node<L> {
    entries: Entries<L>,
    undefined: IdSet,
}

///
/// Entries
///

#[derive(Clone, Debug)]
pub(crate) enum Entries<L> {
    Branch(BTreeMap<KeyComponent, Node<L>>),
    Leaf(BTreeMap<KeyComponent, L>),
}

impl<L: Leaf> Node<L> {
    /// Build an empty node that consumes `remaining` more components.
    pub(crate) const fn new(remaining: usize) -> Self {
        let entries = if remaining <= 1 {
            Entries::Leaf(BTreeMap::new())
        } else {
            Entries::Branch(BTreeMap::new())
        };

        Self {
            entries,
            undefined: IdSet::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.undefined.is_empty()
            && match &self.entries {
                Entries::Branch(children) => children.is_empty(),
                Entries::Leaf(leaves) => leaves.is_empty(),
            }
    }

    pub(crate) const fn undefined(&self) -> &IdSet {
        &self.undefined
    }

    /// Depth-first: this node's undefined bucket, then each child in key
    /// order, terminal bindings last.
    pub(crate) fn ids(&self) -> Box<dyn Iterator<Item = Id> + '_> {
        let bucket = self.undefined.iter();

        match &self.entries {
            Entries::Branch(children) => {
                Box::new(bucket.chain(children.values().flat_map(Self::ids)))
            }
            Entries::Leaf(leaves) => Box::new(bucket.chain(leaves.values().flat_map(L::ids))),
        }
    }

    /// Count of nodes in this subtree, including this one.
    pub(crate) fn node_count(&self) -> usize {
        match &self.entries {
            Entries::Branch(children) => 1 + children.values().map(Self::node_count).sum::<usize>(),
            Entries::Leaf(_) => 1,
        }
    }

    /// Walk `keys` from this node, which has `remaining` components left.
    pub(crate) fn lookup<'a>(
        &'a self,
        remaining: usize,
        keys: &[Option<KeyComponent>],
    ) -> Result<TrieLookup<'a, L>, IndexError> {
        if keys.len() > remaining {
            return Err(IndexError::arity(remaining, keys.len()));
        }

        let mut node = self;
        let mut remaining = remaining;

        for part in keys {
            // unset components never address a binding
            let Some(component) = part else {
                return Ok(if remaining == 1 {
                    TrieLookup::Absent
                } else {
                    TrieLookup::Prefix(L::empty_view(remaining - 1))
                });
            };

            match &node.entries {
                Entries::Leaf(leaves) => {
                    return Ok(leaves
                        .get(component)
                        .map_or(TrieLookup::Absent, TrieLookup::Found));
                }
                Entries::Branch(children) => match children.get(component) {
                    Some(child) => {
                        node = child;
                        remaining -= 1;
                    }
                    None => return Ok(TrieLookup::Prefix(L::empty_view(remaining - 1))),
                },
            }
        }

        Ok(TrieLookup::Prefix(SubIndex::new(node, remaining)))
    }

    /// Same walk as `lookup`, reduced to presence.
    pub(crate) fn contains(
        &self,
        remaining: usize,
        keys: &[Option<KeyComponent>],
    ) -> Result<bool, IndexError> {
        if keys.len() > remaining {
            return Err(IndexError::arity(remaining, keys.len()));
        }

        let mut node = self;
        let mut remaining = remaining;

        for part in keys {
            // unset components never address a binding
            let Some(component) = part else {
                return Ok(false);
            };

            match &node.entries {
                Entries::Leaf(leaves) => return Ok(leaves.contains_key(component)),
                Entries::Branch(children) => match children.get(component) {
                    Some(child) => {
                        node = child;
                        remaining -= 1;
                    }
                    None => return Ok(false),
                },
            }
        }

        Ok(!node.is_empty())
    }

    /// Store `id` under `keys[depth..]`, creating nodes lazily.
    fn insert_at(&mut self, keys: &[Option<KeyComponent>], depth: usize, id: Id) -> Inserted {
        let Some(component) = &keys[depth] else {
            if depth == 0 {
                return Inserted::NONE;
            }

            return Inserted {
                consumed: depth,
                bound: Bound::grown(self.undefined.insert(id)),
            };
        };

        match &mut self.entries {
            Entries::Leaf(leaves) => Inserted {
                consumed: keys.len(),
                bound: L::bind(leaves, component.clone(), id),
            },
            Entries::Branch(children) => {
                let remaining = keys.len() - depth - 1;
                let child = children
                    .entry(component.clone())
                    .or_insert_with(|| Self::new(remaining));

                child.insert_at(keys, depth + 1, id)
            }
        }
    }

    /// Remove `id` from `keys[depth..]`, pruning children that empty out.
    fn remove_at(&mut self, keys: &[Option<KeyComponent>], depth: usize, id: Id) -> bool {
        let Some(component) = &keys[depth] else {
            return depth != 0 && self.undefined.remove(&id);
        };

        match &mut self.entries {
            Entries::Leaf(leaves) => L::unbind(leaves, component, id),
            Entries::Branch(children) => {
                let Some(child) = children.get_mut(component) else {
                    return false;
                };

                let removed = child.remove_at(keys, depth + 1, id);
                if removed && child.is_empty() {
                    children.remove(component);
                }

                removed
            }
        }
    }
}

///
/// Inserted
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Inserted {
    /// Consecutive defined leading components consumed.
    pub(crate) consumed: usize,
    pub(crate) bound: Bound,
}

impl Inserted {
    const NONE: Self = Self {
        consumed: 0,
        bound: Bound::grown(false),
    };
}

///
/// Bound
///
/// Outcome of binding one identifier in leaf storage or a bucket.
///

#[doc(hidden)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Bound {
    /// Whether the stored id count grew.
    pub grew: bool,
    /// Whether any key now resolves to a different identifier. Moving an
    /// id last inside a set is not a change.
    pub changed: bool,
}

impl Bound {
    const fn grown(grew: bool) -> Self {
        Self {
            grew,
            changed: grew,
        }
    }
}

///
/// Trie
///
/// Root node plus the fixed component count.
///

#[derive(Clone, Debug)]
pub(crate) struct Trie<L> {
    root: Node<L>,
    component_count: usize,
    len: usize,
}

impl<L: Leaf> Trie<L> {
    pub(crate) const fn new(component_count: usize) -> Self {
        Self {
            root: Node::new(component_count),
            component_count,
            len: 0,
        }
    }

    pub(crate) const fn component_count(&self) -> usize {
        self.component_count
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub(crate) fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub(crate) fn lookup(
        &self,
        keys: &[Option<KeyComponent>],
    ) -> Result<TrieLookup<'_, L>, IndexError> {
        self.root.lookup(self.component_count, keys)
    }

    pub(crate) fn contains(&self, keys: &[Option<KeyComponent>]) -> Result<bool, IndexError> {
        self.root.contains(self.component_count, keys)
    }

    pub(crate) fn insert(
        &mut self,
        keys: &[Option<KeyComponent>],
        id: Id,
    ) -> Result<Inserted, IndexError> {
        self.check_full_key(keys)?;

        let inserted = self.root.insert_at(keys, 0, id);
        if inserted.bound.grew {
            self.len += 1;
        }

        Ok(inserted)
    }

    pub(crate) fn remove(
        &mut self,
        keys: &[Option<KeyComponent>],
        id: Id,
    ) -> Result<bool, IndexError> {
        self.check_full_key(keys)?;

        let removed = self.root.remove_at(keys, 0, id);
        if removed {
            self.len -= 1;
        }

        Ok(removed)
    }

    pub(crate) fn ids(&self) -> Box<dyn Iterator<Item = Id> + '_> {
        self.root.ids()
    }

    const fn check_full_key(&self, keys: &[Option<KeyComponent>]) -> Result<(), IndexError> {
        if keys.len() != self.component_count {
            return Err(IndexError::arity(self.component_count, keys.len()));
        }

        Ok(())
    }
}

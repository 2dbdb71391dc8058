//! Mirrored association sets.
//!
//! Each relation owns both halves of every edge, so an `add`, `delete` or
//! `clear` updates the two sides together before returning. Application
//! code gets validated handles (`ChildSet`, `MemberSet`) that resolve the
//! foreign identifier first; the collection layer gets raw writers that
//! skip the lookup.

mod many_to_many;
mod one_to_many;


pub use many_to_many::{ManyToMany, ManyToManyWriter, MemberSet};
pub use one_to_many::{ChildSet, OneToMany, OneToManyWriter};

use crate::{
    db::index::{IdSet, IdSetIter},
    model::relation::RelationKind,
    obs::{MetricsEvent, sink},
    types::Id,
};
use std::{
    collections::{BTreeSet, HashSet},
    hash::BuildHasher,
};
use thiserror::Error as ThisError;

///
/// RelationError
///

#[derive(Debug, ThisError)]
pub enum RelationError {
    #[error("relation '{relation}': no item {id} in the related collection")]
    ForeignNotFound { relation: &'static str, id: Id },
}

///
/// Collection
///
/// Identifier lookup into the sibling collection a relation points at.
///

pub trait Collection {
    fn contains(&self, id: &Id) -> bool;
}

impl Collection for BTreeSet<Id> {
    fn contains(&self, id: &Id) -> bool {
        Self::contains(self, id)
    }
}

impl<S: BuildHasher> Collection for HashSet<Id, S> {
    fn contains(&self, id: &Id) -> bool {
        Self::contains(self, id)
    }
}

impl<C: Collection + ?Sized> Collection for &C {
    fn contains(&self, id: &Id) -> bool {
        (**self).contains(id)
    }
}

///
/// Side
///
/// Which end of a many-to-many relation an item sits on.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

///
/// AssociationView
///
/// Read-only membership of one item's association set: iteration, an
/// array snapshot, and size. There is no way to mutate through it.
///

#[derive(Clone, Copy, Debug)]
pub struct AssociationView<'a> {
    owner: Id,
    ids: &'a IdSet,
}

/// Children of one parent in a one-to-many relation.
pub type ChildView<'a> = AssociationView<'a>;

/// Members of one item in a many-to-many relation.
pub type MemberView<'a> = AssociationView<'a>;

impl<'a> AssociationView<'a> {
    pub(crate) const fn new(owner: Id, ids: &'a IdSet) -> Self {
        Self { owner, ids }
    }

    /// The item this set belongs to.
    #[must_use]
    pub const fn owner(&self) -> Id {
        self.owner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn iter(&self) -> IdSetIter<'a> {
        self.ids.iter()
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        self.ids.to_vec()
    }
}

impl<'a> IntoIterator for AssociationView<'a> {
    type Item = Id;
    type IntoIter = IdSetIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

fn record_link(kind: RelationKind) {
    sink::record(MetricsEvent::AssociationLink { kind });
}

fn record_unlink(kind: RelationKind) {
    sink::record(MetricsEvent::AssociationUnlink { kind });
}

use crate::{
    db::{
        index::{EMPTY_ID_SET, IdSet},
        relation::{ChildView, Collection, RelationError, record_link, record_unlink},
    },
    model::relation::{RelationKind, RelationModel},
    types::Id,
};
use std::collections::BTreeMap;

const KIND: RelationKind = RelationKind::OneToMany;

///
/// OneToMany
///
/// Parent → children association. Every child points at most at one
/// parent; the parent's child set and the child's backreference are
/// always updated together.
///

#[derive(Clone, Debug)]
pub struct OneToMany {
    model: RelationModel,
    parent_of: BTreeMap<Id, Id>,
    children: BTreeMap<Id, IdSet>,
}

impl OneToMany {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            model: RelationModel::new(name, KIND),
            parent_of: BTreeMap::new(),
            children: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn model(&self) -> &RelationModel {
        &self.model
    }

    /// Number of parent/child edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent_of.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent_of.is_empty()
    }

    /// The parent `child` currently belongs to.
    #[must_use]
    pub fn parent_of(&self, child: Id) -> Option<Id> {
        self.parent_of.get(&child).copied()
    }

    /// Read-only children of `parent`, in attach order.
    #[must_use]
    pub fn children(&self, parent: Id) -> ChildView<'_> {
        let ids = self.children.get(&parent).unwrap_or(&EMPTY_ID_SET);

        ChildView::new(parent, ids)
    }

    /// Validated child set of `parent`; adds resolve ids against `foreign`.
    pub fn child_set<'a, C: Collection>(
        &'a mut self,
        parent: Id,
        foreign: &'a C,
    ) -> ChildSet<'a, C> {
        ChildSet {
            relation: self,
            parent,
            foreign,
        }
    }

    /// Raw engine surface; no foreign lookup.
    pub const fn writer(&mut self) -> OneToManyWriter<'_> {
        OneToManyWriter { relation: self }
    }

    /// Drop every edge of a removed parent; returns the detached children.
    pub fn remove_parent(&mut self, parent: Id) -> Vec<Id> {
        let Some(mut set) = self.children.remove(&parent) else {
            return Vec::new();
        };

        let children = set.take();
        for child in &children {
            self.parent_of.remove(child);
            record_unlink(KIND);
        }

        children
    }

    /// Drop the edge of a removed child; returns its former parent.
    pub fn remove_child(&mut self, child: Id) -> Option<Id> {
        self.detach(child)
    }

    // Attach `child` under `parent`, detaching it from any previous parent
    // first. Re-attaching to the same parent moves it last.
    fn attach(&mut self, parent: Id, child: Id) -> Option<Id> {
        let previous = match self.parent_of(child) {
            Some(current) if current == parent => {
                self.children.entry(parent).or_default().insert(child);
                return Some(current);
            }
            Some(_) => self.detach(child),
            None => None,
        };

        self.parent_of.insert(child, parent);
        self.children.entry(parent).or_default().insert(child);
        record_link(KIND);

        previous
    }

    fn detach(&mut self, child: Id) -> Option<Id> {
        let parent = self.parent_of.remove(&child)?;

        if let Some(set) = self.children.get_mut(&parent) {
            set.remove(&child);
            if set.is_empty() {
                self.children.remove(&parent);
            }
        }
        record_unlink(KIND);

        Some(parent)
    }
}

///
/// ChildSet
///
/// Application-facing handle on one parent's children. Mutation goes only
/// through `add`/`delete`/`clear`, each of which fixes up the child's
/// backreference in the same step.
///

pub struct ChildSet<'a, C> {
    relation: &'a mut OneToMany,
    parent: Id,
    foreign: &'a C,
}

impl<C: Collection> ChildSet<'_, C> {
    #[must_use]
    pub const fn parent(&self) -> Id {
        self.parent
    }

    /// Attach `child`, moving it away from its current parent.
    ///
    /// Returns whether the edge is new.
    pub fn add(&mut self, child: Id) -> Result<bool, RelationError> {
        if !self.foreign.contains(&child) {
            return Err(RelationError::ForeignNotFound {
                relation: self.relation.model.name,
                id: child,
            });
        }

        let previous = self.relation.attach(self.parent, child);

        Ok(previous != Some(self.parent))
    }

    /// Detach `child` if it currently belongs to this parent.
    pub fn delete(&mut self, child: Id) -> bool {
        if self.relation.parent_of(child) != Some(self.parent) {
            return false;
        }

        self.relation.detach(child).is_some()
    }

    /// Detach every current child; returns how many were detached.
    pub fn clear(&mut self) -> usize {
        self.relation.remove_parent(self.parent).len()
    }

    #[must_use]
    pub fn view(&self) -> ChildView<'_> {
        self.relation.children(self.parent)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.view().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.view().is_empty()
    }

    #[must_use]
    pub fn contains(&self, child: Id) -> bool {
        self.relation.parent_of(child) == Some(self.parent)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        self.view().to_vec()
    }
}

///
/// OneToManyWriter
///
/// Engine-only raw surface used by the scalar property setter on the child
/// side. Skips foreign lookup; still keeps both halves of the edge in step.
///

pub struct OneToManyWriter<'a> {
    relation: &'a mut OneToMany,
}

impl OneToManyWriter<'_> {
    /// Point `child` at `parent` (or at nothing); returns the previous parent.
    pub fn set_parent(&mut self, child: Id, parent: Option<Id>) -> Option<Id> {
        match parent {
            Some(parent) => self.relation.attach(parent, child),
            None => self.relation.detach(child),
        }
    }

    pub fn insert(&mut self, parent: Id, child: Id) -> bool {
        self.relation.attach(parent, child) != Some(parent)
    }

    pub fn remove(&mut self, parent: Id, child: Id) -> bool {
        if self.relation.parent_of(child) != Some(parent) {
            return false;
        }

        self.relation.detach(child).is_some()
    }
}

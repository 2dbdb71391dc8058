use crate::{
    db::{
        index::{EMPTY_ID_SET, IdSet},
        relation::{Collection, MemberView, RelationError, Side, record_link, record_unlink},
    },
    model::relation::{RelationKind, RelationModel},
    types::Id,
};
use std::collections::BTreeMap;

const KIND: RelationKind = RelationKind::ManyToMany;

///
/// ManyToMany
///
/// Symmetric association between a left and a right collection. Both ends
/// hold true sets; each edge is stored once per side and the two copies
/// are created and removed together.
///

#[derive(Clone, Debug)]
pub struct ManyToMany {
    model: RelationModel,
    left: BTreeMap<Id, IdSet>,
    right: BTreeMap<Id, IdSet>,
}

impl ManyToMany {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            model: RelationModel::new(name, KIND),
            left: BTreeMap::new(),
            right: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn model(&self) -> &RelationModel {
        &self.model
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.left.values().map(IdSet::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Read-only members of `owner` on `side`, in link order.
    #[must_use]
    pub fn members(&self, side: Side, owner: Id) -> MemberView<'_> {
        let ids = self.side(side).get(&owner).unwrap_or(&EMPTY_ID_SET);

        MemberView::new(owner, ids)
    }

    /// Whether `left` and `right` are linked.
    #[must_use]
    pub fn linked(&self, left: Id, right: Id) -> bool {
        self.left.get(&left).is_some_and(|set| set.contains(&right))
    }

    /// Validated member set of `owner`; adds resolve ids against `foreign`,
    /// the collection on the opposite side.
    pub fn member_set<'a, C: Collection>(
        &'a mut self,
        side: Side,
        owner: Id,
        foreign: &'a C,
    ) -> MemberSet<'a, C> {
        MemberSet {
            relation: self,
            side,
            owner,
            foreign,
        }
    }

    /// Raw engine surface; no foreign lookup.
    pub const fn writer(&mut self) -> ManyToManyWriter<'_> {
        ManyToManyWriter { relation: self }
    }

    /// Drop every edge of a removed item; returns how many were dropped.
    pub fn remove_item(&mut self, side: Side, id: Id) -> usize {
        let Some(mut set) = self.side_mut(side).remove(&id) else {
            return 0;
        };

        let members = set.take();
        for member in &members {
            Self::unmirror(self.side_mut(side.opposite()), *member, id);
            record_unlink(KIND);
        }

        members.len()
    }

    const fn side(&self, side: Side) -> &BTreeMap<Id, IdSet> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    const fn side_mut(&mut self, side: Side) -> &mut BTreeMap<Id, IdSet> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    // Insert both halves of the edge. Re-linking moves each id last on
    // both sides.
    fn link(&mut self, side: Side, owner: Id, member: Id) -> bool {
        let added = self.side_mut(side).entry(owner).or_default().insert(member);
        self.side_mut(side.opposite())
            .entry(member)
            .or_default()
            .insert(owner);

        if added {
            record_link(KIND);
        }

        added
    }

    fn unlink(&mut self, side: Side, owner: Id, member: Id) -> bool {
        if !Self::unmirror(self.side_mut(side), owner, member) {
            return false;
        }
        Self::unmirror(self.side_mut(side.opposite()), member, owner);
        record_unlink(KIND);

        true
    }

    // Remove `member` from `owner`'s set, dropping the set once empty.
    fn unmirror(map: &mut BTreeMap<Id, IdSet>, owner: Id, member: Id) -> bool {
        let Some(set) = map.get_mut(&owner) else {
            return false;
        };

        let removed = set.remove(&member);
        if set.is_empty() {
            map.remove(&owner);
        }

        removed
    }
}

///
/// MemberSet
///
/// Application-facing handle on one item's side of a many-to-many
/// relation. `add`/`delete`/`clear` always touch both sides.
///

pub struct MemberSet<'a, C> {
    relation: &'a mut ManyToMany,
    side: Side,
    owner: Id,
    foreign: &'a C,
}

impl<C: Collection> MemberSet<'_, C> {
    #[must_use]
    pub const fn owner(&self) -> Id {
        self.owner
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Link `member` on both sides; returns whether the edge is new.
    pub fn add(&mut self, member: Id) -> Result<bool, RelationError> {
        if !self.foreign.contains(&member) {
            return Err(RelationError::ForeignNotFound {
                relation: self.relation.model.name,
                id: member,
            });
        }

        Ok(self.relation.link(self.side, self.owner, member))
    }

    pub fn delete(&mut self, member: Id) -> bool {
        self.relation.unlink(self.side, self.owner, member)
    }

    /// Unlink every member; returns how many edges were removed.
    pub fn clear(&mut self) -> usize {
        self.relation.remove_item(self.side, self.owner)
    }

    #[must_use]
    pub fn view(&self) -> MemberView<'_> {
        self.relation.members(self.side, self.owner)
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
    pub fn contains(&self, member: Id) -> bool {
        self.view().contains(member)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        self.view().to_vec()
    }
}

///
/// ManyToManyWriter
///

pub struct ManyToManyWriter<'a> {
    relation: &'a mut ManyToMany,
}

impl ManyToManyWriter<'_> {
    pub fn link(&mut self, left: Id, right: Id) -> bool {
        self.relation.link(Side::Left, left, right)
    }

    pub fn unlink(&mut self, left: Id, right: Id) -> bool {
        self.relation.unlink(Side::Left, left, right)
    }
}

use crate::{
    db::index::{
        CompositeMultiValueIndex, CompositeUniqueIndex, IdSet, IndexWriter, MultiValueIndex,
        UniqueIndex,
        id_set::EMPTY_ID_SET,
        view::{SubCompositeMultiValueIndex, SubCompositeUniqueIndex, TrieLookup},
    },
    error::IndexError,
    key::KeyComponent,
    model::index::{IndexKind, IndexModel},
    types::Id,
};

///
/// AnyIndex
///
/// One index of any kind, built from its `IndexModel`. Gives the
/// collection layer a single read and write surface over all four kinds.
///

#[derive(Clone, Debug)]
pub enum AnyIndex {
    Unique(UniqueIndex),
    MultiValue(MultiValueIndex),
    CompositeUnique(CompositeUniqueIndex),
    CompositeMultiValue(CompositeMultiValueIndex),
}

impl AnyIndex {
    /// Build an empty index shaped by `model`.
    pub fn from_model(model: &IndexModel) -> Result<Self, IndexError> {
        Ok(match model.kind() {
            IndexKind::Unique => Self::Unique(UniqueIndex::new()),
            IndexKind::MultiValue => Self::MultiValue(MultiValueIndex::new()),
            IndexKind::CompositeUnique => {
                Self::CompositeUnique(CompositeUniqueIndex::try_new(model.component_count())?)
            }
            IndexKind::CompositeMultiValue => Self::CompositeMultiValue(
                CompositeMultiValueIndex::try_new(model.component_count())?,
            ),
        })
    }

    #[must_use]
    pub const fn component_count(&self) -> usize {
        match self {
            Self::Unique(_) | Self::MultiValue(_) => 1,
            Self::CompositeUnique(index) => index.component_count(),
            Self::CompositeMultiValue(index) => index.component_count(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Unique(index) => index.len(),
            Self::MultiValue(index) => index.len(),
            Self::CompositeUnique(index) => index.len(),
            Self::CompositeMultiValue(index) => index.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unique(index) => index.is_empty(),
            Self::MultiValue(index) => index.is_empty(),
            Self::CompositeUnique(index) => index.is_empty(),
            Self::CompositeMultiValue(index) => index.is_empty(),
        }
    }

    pub fn get(&self, keys: &[Option<KeyComponent>]) -> Result<Lookup<'_>, IndexError> {
        let lookup = match self {
            Self::Unique(index) => match leaf_component(keys)? {
                Some(component) => index.get(component).map_or(Lookup::Absent, Lookup::Id),
                None => Lookup::Absent,
            },
            Self::MultiValue(index) => match leaf_component(keys)? {
                Some(component) => Lookup::Ids(index.get(component)),
                None => Lookup::Ids(&EMPTY_ID_SET),
            },
            Self::CompositeUnique(index) => match index.get(keys)? {
                TrieLookup::Found(id) => Lookup::Id(*id),
                TrieLookup::Absent => Lookup::Absent,
                TrieLookup::Prefix(view) => Lookup::UniquePrefix(view),
            },
            Self::CompositeMultiValue(index) => match index.get(keys)? {
                TrieLookup::Found(ids) => Lookup::Ids(ids),
                TrieLookup::Absent => Lookup::Ids(&EMPTY_ID_SET),
                TrieLookup::Prefix(view) => Lookup::MultiPrefix(view),
            },
        };

        Ok(lookup)
    }

    pub fn has(&self, keys: &[Option<KeyComponent>]) -> Result<bool, IndexError> {
        match self {
            Self::Unique(index) => Ok(leaf_component(keys)?.is_some_and(|c| index.has(c))),
            Self::MultiValue(index) => Ok(leaf_component(keys)?.is_some_and(|c| index.has(c))),
            Self::CompositeUnique(index) => index.has(keys),
            Self::CompositeMultiValue(index) => index.has(keys),
        }
    }

    /// Whether a unique binding for `keys` is held by an identifier other
    /// than `id`. Always `false` on multi-valued indexes.
    pub fn conflicts(&self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        match self {
            Self::Unique(_) | Self::CompositeUnique(_) => match self.get(keys)? {
                Lookup::Id(bound) => Ok(bound != id),
                _ => Ok(false),
            },
            Self::MultiValue(_) | Self::CompositeMultiValue(_) => Ok(false),
        }
    }

    /// Every stored identifier (full scan).
    #[must_use]
    pub fn ids(&self) -> Box<dyn Iterator<Item = Id> + '_> {
        match self {
            Self::Unique(index) => Box::new(index.iter()),
            Self::MultiValue(index) => Box::new(index.iter()),
            Self::CompositeUnique(index) => Box::new(index.iter()),
            Self::CompositeMultiValue(index) => Box::new(index.iter()),
        }
    }

    fn writer(&mut self) -> &mut dyn IndexWriter {
        match self {
            Self::Unique(index) => index,
            Self::MultiValue(index) => index,
            Self::CompositeUnique(index) => index,
            Self::CompositeMultiValue(index) => index,
        }
    }
}

impl IndexWriter for AnyIndex {
    fn kind(&self) -> IndexKind {
        match self {
            Self::Unique(_) => IndexKind::Unique,
            Self::MultiValue(_) => IndexKind::MultiValue,
            Self::CompositeUnique(_) => IndexKind::CompositeUnique,
            Self::CompositeMultiValue(_) => IndexKind::CompositeMultiValue,
        }
    }

    fn set(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<(), IndexError> {
        self.writer().set(keys, id)
    }

    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        self.writer().add(keys, id)
    }

    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        self.writer().delete(keys, id)
    }

    fn clear(&mut self) -> Result<(), IndexError> {
        self.writer().clear()
    }
}

// Leaf reads take exactly one component.
fn leaf_component(keys: &[Option<KeyComponent>]) -> Result<Option<&KeyComponent>, IndexError> {
    match keys {
        [part] => Ok(part.as_ref()),
        _ => Err(IndexError::arity(1, keys.len())),
    }
}

///
/// Lookup
///
/// Result of `AnyIndex::get`.
///

#[derive(Debug)]
pub enum Lookup<'a> {
    Id(Id),
    Ids(&'a IdSet),
    Absent,
    UniquePrefix(SubCompositeUniqueIndex<'a>),
    MultiPrefix(SubCompositeMultiValueIndex<'a>),
}

impl Lookup<'_> {
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub const fn is_prefix(&self) -> bool {
        matches!(self, Self::UniquePrefix(_) | Self::MultiPrefix(_))
    }

    /// Snapshot of every identifier this lookup covers.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Id> {
        match self {
            Self::Id(id) => vec![*id],
            Self::Ids(ids) => ids.to_vec(),
            Self::Absent => Vec::new(),
            Self::UniquePrefix(view) => view.to_vec(),
            Self::MultiPrefix(view) => view.to_vec(),
        }
    }
}

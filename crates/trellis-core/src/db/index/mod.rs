mod any;
mod composite_multi;
mod composite_unique;
mod id_set;
mod multi;
mod registry;
mod trie;
mod unique;
mod view;

#[cfg(test)]
mod tests;

pub use any::{AnyIndex, Lookup};
pub use composite_multi::CompositeMultiValueIndex;
pub use composite_unique::CompositeUniqueIndex;
pub use id_set::{IdSet, Iter as IdSetIter};
pub use multi::MultiValueIndex;
pub use registry::{IndexRegistry, IndexRegistryError};
pub use trie::Leaf;
pub use unique::UniqueIndex;
pub use view::{SubCompositeMultiValueIndex, SubCompositeUniqueIndex, SubIndex, TrieLookup};

pub(crate) use id_set::EMPTY_ID_SET;

use crate::{
    error::IndexError,
    key::KeyComponent,
    model::index::IndexKind,
    obs::{MetricsEvent, sink},
    types::Id,
};

///
/// IndexWriter
///
/// Uniform mutation surface the collection layer drives on property writes
/// and item removal. Keys are passed as full component tuples; an unset
/// component is `None`.
///

pub trait IndexWriter {
    fn kind(&self) -> IndexKind;

    /// Bind `id` under `keys`, replacing any prior binding.
    fn set(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<(), IndexError>;

    /// Add `id` under `keys`; returns the number of leading components
    /// consumed (zero when nothing was written).
    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError>;

    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError>;

    /// Bulk reset; no index supports it.
    fn clear(&mut self) -> Result<(), IndexError> {
        let kind = self.kind();

        Err(reject(
            kind,
            IndexError::Unsupported {
                op: "clear",
                target: kind.type_name(),
            },
        ))
    }
}

impl IndexWriter for UniqueIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::Unique
    }

    fn set(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<(), IndexError> {
        if let Some(component) = single_component(IndexKind::Unique, keys)? {
            Self::set(self, component.clone(), id);
        }

        Ok(())
    }

    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        let Some(component) = single_component(IndexKind::Unique, keys)? else {
            return Ok(0);
        };
        Self::set(self, component.clone(), id);

        Ok(1)
    }

    // only the identifier currently bound may remove the binding
    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        let Some(component) = single_component(IndexKind::Unique, keys)? else {
            return Ok(false);
        };
        if self.get(component) != Some(id) {
            return Ok(false);
        }

        Ok(Self::delete(self, component))
    }
}

impl IndexWriter for MultiValueIndex {
    fn kind(&self) -> IndexKind {
        IndexKind::MultiValue
    }

    fn set(&mut self, _keys: &[Option<KeyComponent>], _id: Id) -> Result<(), IndexError> {
        Err(reject(
            IndexKind::MultiValue,
            IndexError::ReadOnly {
                target: "MultiValueIndex",
            },
        ))
    }

    fn add(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<usize, IndexError> {
        let Some(component) = single_component(IndexKind::MultiValue, keys)? else {
            return Ok(0);
        };
        Self::add(self, component.clone(), id);

        Ok(1)
    }

    fn delete(&mut self, keys: &[Option<KeyComponent>], id: Id) -> Result<bool, IndexError> {
        let Some(component) = single_component(IndexKind::MultiValue, keys)? else {
            return Ok(false);
        };

        Ok(Self::delete(self, component, id))
    }
}

// Leaf indexes take exactly one component through the uniform surface.
fn single_component(
    kind: IndexKind,
    keys: &[Option<KeyComponent>],
) -> Result<Option<&KeyComponent>, IndexError> {
    match keys {
        [part] => Ok(part.as_ref()),
        _ => Err(reject(kind, IndexError::arity(1, keys.len()))),
    }
}

pub(crate) fn record(event: MetricsEvent) {
    sink::record(event);
}

/// Record a rejected mutation and hand the error back for propagation.
pub(crate) fn reject(kind: IndexKind, err: IndexError) -> IndexError {
    sink::record(MetricsEvent::IndexRejected {
        kind,
        reason: err.label(),
    });

    err
}

use crate::{
    config::EngineConfig,
    db::index::{AnyIndex, IndexWriter},
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::KeyComponent,
    model::index::IndexModel,
    types::Id,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// IndexRegistryError
///

#[derive(Debug, ThisError)]
pub enum IndexRegistryError {
    #[error("index '{0}' not found")]
    IndexNotFound(String),

    #[error("index '{0}' already registered")]
    IndexAlreadyRegistered(String),

    #[error("index '{0}' declares no fields")]
    NoFields(String),

    #[error("index '{name}' declares {found} fields, max is {max}")]
    TooManyFields {
        name: String,
        found: usize,
        max: usize,
    },
}

impl IndexRegistryError {
    pub(crate) const fn class(&self) -> ErrorClass {
        match self {
            Self::IndexNotFound(_) => ErrorClass::NotFound,
            Self::IndexAlreadyRegistered(_) | Self::NoFields(_) => ErrorClass::InvariantViolation,
            Self::TooManyFields { .. } => ErrorClass::Unsupported,
        }
    }
}

impl From<IndexRegistryError> for InternalError {
    fn from(err: IndexRegistryError) -> Self {
        Self::new(err.class(), ErrorOrigin::Index, err.to_string())
    }
}

///
/// IndexRegistry
///
/// Per-collection set of indexes keyed by index name, created once at
/// collection setup from the schema's `IndexModel`s.
///

#[derive(Debug, Default)]
pub struct IndexRegistry {
    config: EngineConfig,
    models: BTreeMap<&'static str, IndexModel>,
    indexes: BTreeMap<&'static str, AnyIndex>,
}

impl IndexRegistry {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Build a registry holding one empty index per model.
    pub fn from_models(
        config: EngineConfig,
        models: impl IntoIterator<Item = IndexModel>,
    ) -> Result<Self, InternalError> {
        let mut registry = Self::new(config);
        for model in models {
            registry.register(model)?;
        }

        Ok(registry)
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    /// Register an empty index for `model`.
    pub fn register(&mut self, model: IndexModel) -> Result<(), InternalError> {
        let name = model.name;

        if self.indexes.contains_key(name) {
            return Err(IndexRegistryError::IndexAlreadyRegistered(name.to_string()).into());
        }
        if model.fields.is_empty() {
            return Err(IndexRegistryError::NoFields(name.to_string()).into());
        }
        if model.component_count() > self.config.max_key_components {
            return Err(IndexRegistryError::TooManyFields {
                name: name.to_string(),
                found: model.component_count(),
                max: self.config.max_key_components,
            }
            .into());
        }

        let index = AnyIndex::from_model(&model)?;
        self.models.insert(name, model);
        self.indexes.insert(name, index);

        Ok(())
    }

    #[must_use]
    pub fn model(&self, name: &str) -> Option<&IndexModel> {
        self.models.get(name)
    }

    /// Iterate registered models in name order.
    pub fn models(&self) -> impl Iterator<Item = &IndexModel> {
        self.models.values()
    }

    pub fn get(&self, name: &str) -> Result<&AnyIndex, InternalError> {
        self.indexes
            .get(name)
            .ok_or_else(|| IndexRegistryError::IndexNotFound(name.to_string()).into())
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut AnyIndex, InternalError> {
        self.indexes
            .get_mut(name)
            .ok_or_else(|| IndexRegistryError::IndexNotFound(name.to_string()).into())
    }

    /// Refuse `id` under `keys` if a unique index already binds the key to
    /// another identifier, reporting a uniqueness violation.
    pub fn check_unique(
        &self,
        name: &str,
        keys: &[Option<KeyComponent>],
        id: Id,
    ) -> Result<(), InternalError> {
        let index = self.get(name)?;
        if index.conflicts(keys, id)? {
            let fields = self.model(name).map_or(&[][..], |model| model.fields);
            return Err(InternalError::index_violation(name, fields));
        }

        Ok(())
    }

    /// Write `id` under `keys` on the named index through its uniform
    /// surface, choosing `set` for unique kinds and `add` otherwise.
    pub fn insert(
        &mut self,
        name: &str,
        keys: &[Option<KeyComponent>],
        id: Id,
    ) -> Result<(), InternalError> {
        self.check_unique(name, keys, id)?;

        let index = self.get_mut(name)?;
        if index.kind().is_unique() {
            index.set(keys, id)?;
        } else {
            index.add(keys, id)?;
        }

        Ok(())
    }

    pub fn remove(
        &mut self,
        name: &str,
        keys: &[Option<KeyComponent>],
        id: Id,
    ) -> Result<bool, InternalError> {
        Ok(self.get_mut(name)?.delete(keys, id)?)
    }
}

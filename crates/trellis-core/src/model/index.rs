use std::fmt::{self, Display};

///
/// IndexModel
/// Runtime-only descriptor for one indexed, unique, or composite property.
/// Keeps the engine decoupled from the schema layer's declaration shape.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexModel {
    pub name: &'static str,
    pub fields: &'static [&'static str],
    pub unique: bool,
}

impl IndexModel {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [&'static str], unique: bool) -> Self {
        Self {
            name,
            fields,
            unique,
        }
    }

    /// Number of key components; fixed for the life of the index.
    #[must_use]
    pub const fn component_count(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub const fn kind(&self) -> IndexKind {
        match (self.fields.len() > 1, self.unique) {
            (false, true) => IndexKind::Unique,
            (false, false) => IndexKind::MultiValue,
            (true, true) => IndexKind::CompositeUnique,
            (true, false) => IndexKind::CompositeMultiValue,
        }
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = self.fields.join(", ");

        if self.unique {
            write!(f, "UNIQUE {}({})", self.name, fields)
        } else {
            write!(f, "{}({})", self.name, fields)
        }
    }
}

///
/// IndexKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexKind {
    Unique,
    MultiValue,
    CompositeUnique,
    CompositeMultiValue,
}

impl IndexKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::MultiValue => "multi_value",
            Self::CompositeUnique => "composite_unique",
            Self::CompositeMultiValue => "composite_multi_value",
        }
    }

    /// Type name used in error messages.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Unique => "UniqueIndex",
            Self::MultiValue => "MultiValueIndex",
            Self::CompositeUnique => "CompositeUniqueIndex",
            Self::CompositeMultiValue => "CompositeMultiValueIndex",
        }
    }

    #[must_use]
    pub const fn is_unique(self) -> bool {
        matches!(self, Self::Unique | Self::CompositeUnique)
    }
}

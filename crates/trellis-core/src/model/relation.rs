use std::fmt::{self, Display};

///
/// RelationModel
/// Runtime descriptor for one mirrored relation between two collections.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationModel {
    pub name: &'static str,
    pub kind: RelationKind,
}

impl RelationModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: RelationKind) -> Self {
        Self { name, kind }
    }
}

impl Display for RelationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind.label())
    }
}

///
/// RelationKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum RelationKind {
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
        }
    }
}

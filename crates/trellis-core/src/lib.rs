//! Core runtime for Trellis: secondary indexes, composite prefix tries, and
//! mirrored association sets for in-memory schema-driven collections.
#![warn(unreachable_pub)]

extern crate self as trellis;

#[macro_use]
mod macros;

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod key;
pub mod model;
pub mod obs;
pub mod types;

///
/// CONSTANTS
///

/// Hard upper bound on key components any composite index may declare.
///
/// `EngineConfig::max_key_components` may lower this, never raise it.
pub const MAX_KEY_COMPONENTS_LIMIT: usize = 16;

/// Default number of key components allowed on one index.
pub const MAX_KEY_COMPONENTS: usize = 4;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, sinks, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            index::{
                AnyIndex, CompositeMultiValueIndex, CompositeUniqueIndex, IdSet, IndexWriter,
                Lookup, MultiValueIndex, UniqueIndex,
            },
            relation::{Collection, ManyToMany, OneToMany, Side},
        },
        key::{IntoKeyComponent, KeyComponent, UNDEFINED},
        model::{index::IndexModel, relation::RelationModel},
        types::Id,
    };
}

//! Runtime descriptors for schema-declared indexes and relations.

pub mod index;
pub mod relation;

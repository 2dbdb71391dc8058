//! Module: db
//! Responsibility: in-memory index structures and mirrored association sets.
//! Does not own: item storage, schema validation, or transactional ordering;
//! the collection layer drives every mutation through these types.

pub mod index;
pub mod relation;

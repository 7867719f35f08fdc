//! Serde helpers.

pub mod hash_map;

//! String keyed dictionary on an open addressing hash table
//!
//! Collisions are resolved with linear probing, deletes leave tombstones
//! behind and the slot array is doubled once `(stored + deleted) / capacity`
//! reaches the rehash threshold. See [`Dict`].

#[macro_use]
mod macros;
pub mod hashmap;

pub use hashmap::{Dict, DictConfig, DictError};

//! Context-isolated shared state
//!
//! A process-wide key/value store in which every module boundary sees its
//! own overlay of the shared base map.

pub mod store;

pub use store::{IsolatedStore, PropertyMap};

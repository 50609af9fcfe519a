//! Module registry and executor
//!
//! Tracks which modules exist in the host and runs work inside a module's
//! isolation boundary.

pub mod descriptor;
pub mod executor;

pub use descriptor::{ModuleDescriptor, ModuleManifest};
pub use executor::{ModuleRegistry, RegistryError};

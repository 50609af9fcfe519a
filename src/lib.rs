//! modhost - multi-module host runtime
//!
//! Hosts independently deployed modules inside one long-lived process. Each
//! module gets an isolated view of shared mutable global state while still
//! sharing the process's resources, and a lifecycle control client installs
//! and uninstalls modules on a running host over its loopback control
//! endpoint.
//!
//! Subsystems:
//!
//! 1. [`context`]: the isolation-boundary tree, the thread-current context
//!    pointer, and owning-boundary resolution
//! 2. [`state`]: the context-isolated key/value store with per-boundary
//!    overlays over a shared base map
//! 3. [`registry`]: module bookkeeping and the run-as executor
//! 4. [`control`]: the install/uninstall lifecycle client
//! 5. [`config`]: run modes, target hosts and client configuration
//!
//! The runtime does not sandbox modules: memory, file descriptors and
//! sockets stay shared. Isolation covers module identity resolution and the
//! property store, nothing more.

pub mod config;
pub mod context;
pub mod control;
pub mod registry;
pub mod state;

pub use config::{ConfigError, ControlConfig, RunMode, TargetHost};
pub use context::{current_context, ContextRegistry, ContextScope, ExecutionContext};
pub use control::{ControlError, ControlService, HttpControlClient};
pub use registry::{ModuleDescriptor, ModuleManifest, ModuleRegistry, RegistryError};
pub use state::IsolatedStore;

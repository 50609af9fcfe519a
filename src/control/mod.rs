//! Lifecycle control client
//!
//! Issues install/uninstall commands to a running host's control endpoint
//! and classifies the structured responses, including the idempotent
//! uninstall-of-an-absent-module case.

pub mod client;
pub mod error;
pub mod protocol;

pub use client::{ControlService, HttpControlClient};
pub use error::ControlError;
pub use protocol::{InstallResponse, ModulePayload, UninstallDetail, UninstallResponse};

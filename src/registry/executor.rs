//! Module registry and the run-as executor

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info};

use super::descriptor::ModuleDescriptor;
use crate::context::{ContextScope, ExecutionContext};

/// Registry errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("module {name}:{version} is already registered")]
    AlreadyRegistered { name: String, version: String },

    #[error("module {name}:{version} is not registered")]
    NotRegistered { name: String, version: String },

    #[error("invalid module manifest: {0}")]
    InvalidManifest(String),
}

struct RegisteredModule {
    descriptor: ModuleDescriptor,
    context: Arc<ExecutionContext>,
}

/// Tracks installed modules and runs work inside their boundaries.
///
/// Modules are keyed by `(name, version)`; registering the same pair twice
/// is an error.
pub struct ModuleRegistry {
    modules: RwLock<HashMap<(String, String), RegisteredModule>>,
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(HashMap::new()),
        }
    }

    /// Register a module and the context marking its boundary.
    pub fn register(
        &self,
        descriptor: ModuleDescriptor,
        context: Arc<ExecutionContext>,
    ) -> Result<(), RegistryError> {
        let key = (descriptor.name.clone(), descriptor.version.clone());
        let mut modules = self.modules.write();
        if modules.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered {
                name: key.0,
                version: key.1,
            });
        }
        info!(module = %descriptor.name, version = %descriptor.version, "module registered");
        modules.insert(key, RegisteredModule { descriptor, context });
        Ok(())
    }

    /// Remove a module, returning its descriptor.
    pub fn deregister(&self, name: &str, version: &str) -> Result<ModuleDescriptor, RegistryError> {
        let removed = self
            .modules
            .write()
            .remove(&(name.to_string(), version.to_string()));
        match removed {
            Some(module) => {
                info!(module = name, version, "module deregistered");
                Ok(module.descriptor)
            }
            None => Err(RegistryError::NotRegistered {
                name: name.to_string(),
                version: version.to_string(),
            }),
        }
    }

    /// Whether `(name, version)` is currently registered.
    pub fn is_registered(&self, name: &str, version: &str) -> bool {
        self.modules
            .read()
            .contains_key(&(name.to_string(), version.to_string()))
    }

    /// Descriptors of all registered modules.
    pub fn list_modules(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .read()
            .values()
            .map(|m| m.descriptor.clone())
            .collect()
    }

    /// Boundary context of a registered module.
    pub fn context_of(&self, name: &str, version: &str) -> Option<Arc<ExecutionContext>> {
        self.modules
            .read()
            .get(&(name.to_string(), version.to_string()))
            .map(|m| Arc::clone(&m.context))
    }

    /// Run `work` with the module's context installed on the calling thread.
    ///
    /// Rejects modules that were never registered. The previous thread
    /// context is restored on every exit path, including a panicking `work`,
    /// so later calls on the same thread are unaffected. The output of
    /// `work` is returned unmodified.
    pub fn run_as<T>(
        &self,
        name: &str,
        version: &str,
        work: impl FnOnce() -> T,
    ) -> Result<T, RegistryError> {
        let context = self
            .context_of(name, version)
            .ok_or_else(|| RegistryError::NotRegistered {
                name: name.to_string(),
                version: version.to_string(),
            })?;
        debug!(module = name, version, "entering module boundary");
        let _scope = ContextScope::enter(context);
        Ok(work())
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::current_context;

    fn descriptor(name: &str, version: &str) -> ModuleDescriptor {
        ModuleDescriptor::new(name, version, "file:///tmp/module.pkg")
    }

    fn module_context(name: &str) -> Arc<ExecutionContext> {
        let base = ExecutionContext::root("base");
        ExecutionContext::for_module(name, &base)
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let registry = ModuleRegistry::new();
        registry
            .register(descriptor("biz", "0.1.0"), module_context("biz"))
            .unwrap();
        let err = registry
            .register(descriptor("biz", "0.1.0"), module_context("biz"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));

        // A different version of the same name is a distinct module.
        registry
            .register(descriptor("biz", "0.2.0"), module_context("biz"))
            .unwrap();
        assert_eq!(registry.list_modules().len(), 2);
    }

    #[test]
    fn run_as_installs_and_restores_context() {
        let registry = ModuleRegistry::new();
        let context = module_context("biz");
        registry
            .register(descriptor("biz", "0.1.0"), Arc::clone(&context))
            .unwrap();

        assert!(current_context().is_none());
        let seen = registry
            .run_as("biz", "0.1.0", || current_context().unwrap())
            .unwrap();
        assert!(seen.is(&context));
        assert!(current_context().is_none());
    }

    #[test]
    fn run_as_rejects_unregistered_module() {
        let registry = ModuleRegistry::new();
        let err = registry.run_as("ghost", "0.0.1", || ()).unwrap_err();
        assert!(matches!(err, RegistryError::NotRegistered { .. }));
    }

    #[test]
    fn run_as_restores_context_when_work_panics() {
        let registry = ModuleRegistry::new();
        registry
            .register(descriptor("biz", "0.1.0"), module_context("biz"))
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry
                .run_as("biz", "0.1.0", || panic!("work failed"))
                .unwrap()
        }));
        assert!(result.is_err());
        assert!(current_context().is_none());
    }

    #[test]
    fn run_as_passes_failure_through_unmodified() {
        let registry = ModuleRegistry::new();
        registry
            .register(descriptor("biz", "0.1.0"), module_context("biz"))
            .unwrap();

        let outcome: Result<Result<(), String>, RegistryError> =
            registry.run_as("biz", "0.1.0", || Err("inner failure".to_string()));
        assert_eq!(outcome.unwrap(), Err("inner failure".to_string()));
    }

    #[test]
    fn deregister_removes_module() {
        let registry = ModuleRegistry::new();
        registry
            .register(descriptor("biz", "0.1.0"), module_context("biz"))
            .unwrap();
        assert!(registry.is_registered("biz", "0.1.0"));

        let removed = registry.deregister("biz", "0.1.0").unwrap();
        assert_eq!(removed.name, "biz");
        assert!(!registry.is_registered("biz", "0.1.0"));
        assert!(matches!(
            registry.deregister("biz", "0.1.0"),
            Err(RegistryError::NotRegistered { .. })
        ));
    }
}

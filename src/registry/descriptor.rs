//! Module descriptors and manifest parsing

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::executor::RegistryError;

/// Identity and artifact location of an installable module.
///
/// `(name, version)` is the uniqueness key within one host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Module name (unique together with version)
    pub name: String,
    /// Module version
    pub version: String,
    /// Where the module artifact can be fetched from
    #[serde(default)]
    pub artifact_url: String,
}

impl ModuleDescriptor {
    /// Create a descriptor.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        artifact_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            artifact_url: artifact_url.into(),
        }
    }
}

/// Module manifest (module.toml structure)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module name
    pub name: String,
    /// Module version
    pub version: String,
    /// Artifact location
    #[serde(default)]
    pub artifact_url: String,
    /// Human-readable description
    pub description: Option<String>,
}

impl ModuleManifest {
    /// Load and validate a manifest from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            RegistryError::InvalidManifest(format!("failed to read manifest file: {}", e))
        })?;

        let manifest: ModuleManifest = toml::from_str(&contents).map_err(|e| {
            RegistryError::InvalidManifest(format!("failed to parse manifest TOML: {}", e))
        })?;

        if manifest.name.is_empty() {
            return Err(RegistryError::InvalidManifest(
                "module name cannot be empty".to_string(),
            ));
        }
        if manifest.version.is_empty() {
            return Err(RegistryError::InvalidManifest(
                "module version cannot be empty".to_string(),
            ));
        }

        Ok(manifest)
    }

    /// Convert to a descriptor.
    pub fn to_descriptor(&self) -> ModuleDescriptor {
        ModuleDescriptor {
            name: self.name.clone(),
            version: self.version.clone(),
            artifact_url: self.artifact_url.clone(),
        }
    }
}

impl TryFrom<ModuleManifest> for ModuleDescriptor {
    type Error = RegistryError;

    fn try_from(manifest: ModuleManifest) -> Result<Self, Self::Error> {
        Ok(manifest.to_descriptor())
    }
}

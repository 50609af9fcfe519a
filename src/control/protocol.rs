//! Wire types for the install/uninstall control protocol
//!
//! JSON over loopback HTTP. Field names follow the host endpoint's contract
//! (`bizName`, `bizVersion`, `bizUrl`), so they are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::registry::ModuleDescriptor;

/// Response code for a successful operation.
pub const CODE_SUCCESS: &str = "SUCCESS";
/// Response code for a failed operation.
pub const CODE_FAILED: &str = "FAILED";
/// Uninstall failure sub-code meaning the module is already absent.
pub const SUBCODE_NOT_FOUND_BIZ: &str = "NOT_FOUND_BIZ";

/// Module identity carried in install/uninstall request bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModulePayload {
    /// Module name
    pub biz_name: String,
    /// Module version
    pub biz_version: String,
    /// Artifact location the host fetches the module from
    #[serde(default)]
    pub biz_url: String,
}

impl From<&ModuleDescriptor> for ModulePayload {
    fn from(descriptor: &ModuleDescriptor) -> Self {
        Self {
            biz_name: descriptor.name.clone(),
            biz_version: descriptor.version.clone(),
            biz_url: descriptor.artifact_url.clone(),
        }
    }
}

/// Response body of `POST /installBiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallResponse {
    /// `SUCCESS` or `FAILED`
    pub code: String,
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
}

/// Structured detail attached to uninstall failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UninstallDetail {
    /// Failure sub-code, e.g. `NOT_FOUND_BIZ`
    #[serde(default)]
    pub code: String,
}

/// Response body of `POST /uninstallBiz`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UninstallResponse {
    /// `SUCCESS` or `FAILED`
    pub code: String,
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Structured failure detail, when present
    #[serde(default)]
    pub data: Option<UninstallDetail>,
}

impl UninstallResponse {
    /// Whether this failure means the module was already absent.
    pub fn is_not_found(&self) -> bool {
        self.code == CODE_FAILED
            && self
                .data
                .as_ref()
                .is_some_and(|d| d.code == SUBCODE_NOT_FOUND_BIZ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_wire_field_names() {
        let descriptor = ModuleDescriptor::new("biz", "0.0.1-SNAPSHOT", "file:///tmp/biz.pkg");
        let payload = ModulePayload::from(&descriptor);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["bizName"], "biz");
        assert_eq!(json["bizVersion"], "0.0.1-SNAPSHOT");
        assert_eq!(json["bizUrl"], "file:///tmp/biz.pkg");
    }

    #[test]
    fn uninstall_response_decodes_nested_detail() {
        let response: UninstallResponse = serde_json::from_str(
            r#"{"code":"FAILED","message":"uninstall biz failed","data":{"code":"NOT_FOUND_BIZ"}}"#,
        )
        .unwrap();
        assert!(response.is_not_found());

        let other: UninstallResponse =
            serde_json::from_str(r#"{"code":"FAILED","data":{"code":"FOO"}}"#).unwrap();
        assert!(!other.is_not_found());

        let bare: UninstallResponse = serde_json::from_str(r#"{"code":"SUCCESS"}"#).unwrap();
        assert!(!bare.is_not_found());
        assert!(bare.data.is_none());
    }
}

//! HTTP lifecycle control client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use super::error::ControlError;
use super::protocol::{
    InstallResponse, ModulePayload, UninstallResponse, CODE_SUCCESS,
};
use crate::config::{RunMode, TargetHost};
use crate::registry::ModuleDescriptor;

/// Lifecycle operations against a running host's control endpoint.
///
/// The precondition for both operations is that the module artifact is
/// already reachable by the target host (uploaded or on a shared path);
/// the client only drives the host's install/uninstall machinery.
#[async_trait]
pub trait ControlService: Send + Sync {
    /// Ask the target host to install `module`.
    async fn install(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError>;

    /// Ask the target host to uninstall `module`.
    ///
    /// Uninstalling a module the host no longer has is success, not
    /// failure, so the operation is safe to repeat.
    async fn uninstall(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError>;
}

/// Control client speaking JSON over loopback HTTP.
///
/// Calls block on network I/O under the configured timeout; dropping the
/// returned future aborts the in-flight request.
pub struct HttpControlClient {
    http: Client,
}

impl HttpControlClient {
    /// Create a client with the default 10 second request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(10))
    }

    /// Create a client with an explicit request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }

    async fn install_local(
        &self,
        module: &ModuleDescriptor,
        port: u16,
    ) -> Result<(), ControlError> {
        let payload = ModulePayload::from(module);
        let response = self
            .http
            .post(format!("http://127.0.0.1:{port}/installBiz"))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::HttpStatus {
                operation: "install biz",
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let decoded: InstallResponse =
            serde_json::from_slice(&body).map_err(|source| ControlError::Decode {
                operation: "install biz",
                source,
            })?;

        if decoded.code != CODE_SUCCESS {
            return Err(ControlError::InstallFailed {
                message: decoded.message,
            });
        }
        Ok(())
    }

    async fn uninstall_local(
        &self,
        module: &ModuleDescriptor,
        port: u16,
    ) -> Result<(), ControlError> {
        let payload = ModulePayload::from(module);
        let response = self
            .http
            .post(format!("http://127.0.0.1:{port}/uninstallBiz"))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ControlError::HttpStatus {
                operation: "uninstall biz",
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let decoded: UninstallResponse =
            serde_json::from_slice(&body).map_err(|source| ControlError::Decode {
                operation: "uninstall biz",
                source,
            })?;

        if decoded.code == CODE_SUCCESS {
            return Ok(());
        }
        // The host reporting the module as already absent counts as a
        // completed uninstall; only this one sub-code is normalized.
        if decoded.is_not_found() {
            return Ok(());
        }
        Err(ControlError::UninstallFailed { response: decoded })
    }

    async fn dispatch_install(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError> {
        match target.run_mode {
            RunMode::Local => self.install_local(module, target.require_port()?).await,
            RunMode::RemoteExec => Err(ControlError::Unimplemented {
                mode: target.run_mode,
            }),
        }
    }

    async fn dispatch_uninstall(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError> {
        match target.run_mode {
            RunMode::Local => self.uninstall_local(module, target.require_port()?).await,
            RunMode::RemoteExec => Err(ControlError::Unimplemented {
                mode: target.run_mode,
            }),
        }
    }
}

impl Default for HttpControlClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ControlService for HttpControlClient {
    async fn install(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError> {
        info!(
            module = %module.name,
            version = %module.version,
            mode = %target.run_mode,
            "install biz started"
        );
        let result = self.dispatch_install(module, target).await;
        match &result {
            Ok(()) => info!(module = %module.name, version = %module.version, "install biz completed"),
            Err(cause) => error!(module = %module.name, version = %module.version, %cause, "install biz failed"),
        }
        result
    }

    async fn uninstall(
        &self,
        module: &ModuleDescriptor,
        target: &TargetHost,
    ) -> Result<(), ControlError> {
        info!(
            module = %module.name,
            version = %module.version,
            mode = %target.run_mode,
            "uninstall biz started"
        );
        let result = self.dispatch_uninstall(module, target).await;
        match &result {
            Ok(()) => info!(module = %module.name, version = %module.version, "uninstall biz completed"),
            Err(cause) => error!(module = %module.name, version = %module.version, %cause, "uninstall biz failed"),
        }
        result
    }
}

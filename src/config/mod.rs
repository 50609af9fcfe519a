//! Run modes, target hosts and control client configuration

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown run mode: {0}")]
    UnknownRunMode(String),

    #[error("target host has no port configured for {mode} mode")]
    MissingPort { mode: RunMode },

    #[error("invalid control port: {0}")]
    InvalidPort(String),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How a target host's control endpoint is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Loopback HTTP to a port on this machine
    Local,
    /// Exec into an orchestrated sandbox (declared, not implemented)
    RemoteExec,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Local => write!(f, "local"),
            RunMode::RemoteExec => write!(f, "remote-exec"),
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(RunMode::Local),
            "remote-exec" => Ok(RunMode::RemoteExec),
            other => Err(ConfigError::UnknownRunMode(other.to_string())),
        }
    }
}

/// Identifies the control endpoint of a running host process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetHost {
    /// How the endpoint is reached
    pub run_mode: RunMode,
    /// Control port (required for local mode)
    pub port: Option<u16>,
}

impl TargetHost {
    /// Target the local host's control endpoint on `port`.
    pub fn local(port: u16) -> Self {
        Self {
            run_mode: RunMode::Local,
            port: Some(port),
        }
    }

    /// Target a remote-exec host (the path is declared but unimplemented).
    pub fn remote_exec() -> Self {
        Self {
            run_mode: RunMode::RemoteExec,
            port: None,
        }
    }

    /// Port of the endpoint, or a configuration error when absent.
    pub fn require_port(&self) -> Result<u16, ConfigError> {
        self.port.ok_or(ConfigError::MissingPort {
            mode: self.run_mode,
        })
    }
}

/// Control client settings (TOML-loadable, env-overridable).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Default run mode for lifecycle operations
    pub run_mode: RunMode,
    /// Default control port
    pub port: Option<u16>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Local,
            port: None,
            request_timeout_secs: 10,
        }
    }
}

impl ControlConfig {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&contents)?)
    }

    /// Override settings from `MODHOST_RUN_MODE` and `MODHOST_CONTROL_PORT`.
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(mode) = std::env::var("MODHOST_RUN_MODE") {
            self.run_mode = mode.parse()?;
        }
        if let Ok(port) = std::env::var("MODHOST_CONTROL_PORT") {
            self.port = Some(
                port.parse()
                    .map_err(|_| ConfigError::InvalidPort(port.clone()))?,
            );
        }
        Ok(self)
    }

    /// Target host described by these settings.
    pub fn target_host(&self) -> TargetHost {
        TargetHost {
            run_mode: self.run_mode,
            port: self.port,
        }
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn run_mode_parses_known_strings() {
        assert_eq!("local".parse::<RunMode>().unwrap(), RunMode::Local);
        assert_eq!(
            "remote-exec".parse::<RunMode>().unwrap(),
            RunMode::RemoteExec
        );
        assert_eq!(RunMode::Local.to_string(), "local");
        assert_eq!(RunMode::RemoteExec.to_string(), "remote-exec");
    }

    #[test]
    fn unknown_run_mode_is_a_config_error() {
        let err = "k8s-pod".parse::<RunMode>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRunMode(mode) if mode == "k8s-pod"));
    }

    #[test]
    fn local_target_requires_port() {
        assert_eq!(TargetHost::local(1238).require_port().unwrap(), 1238);

        let portless = TargetHost {
            run_mode: RunMode::Local,
            port: None,
        };
        assert!(matches!(
            portless.require_port(),
            Err(ConfigError::MissingPort {
                mode: RunMode::Local
            })
        ));
    }

    #[test]
    fn config_loads_from_toml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "run_mode = \"local\"\nport = 1238").unwrap();

        let config = ControlConfig::from_file(file.path()).unwrap();
        assert_eq!(config.run_mode, RunMode::Local);
        assert_eq!(config.port, Some(1238));
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.target_host(), TargetHost::local(1238));
    }
}

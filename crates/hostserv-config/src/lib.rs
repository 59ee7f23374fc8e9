//! Shared configuration for the HostServ vhost tooling.
//!
//! Configuration is layered by [`ortho_config`]: built-in defaults are
//! overridden by a configuration file (`--config-path` or
//! `HOSTSERV_CONFIG_PATH`), then by `HOSTSERV_*` environment variables, and
//! finally by command-line flags.

mod defaults;
mod logging;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_HOST_LENGTH, DEFAULT_SERVICE_NAME, DEFAULT_STATE_PATH,
    default_log_filter, default_log_filter_string, default_log_format, default_max_host_length,
    default_service_name, default_state_path,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved configuration for the HostServ binaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTSERV")]
pub struct Config {
    /// Filter expression handed to the tracing subscriber.
    #[serde(default = "default_log_filter_string")]
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format for structured logs.
    #[serde(default = "default_log_format")]
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// Location of the JSON directory snapshot.
    #[serde(default = "default_state_path")]
    #[ortho_config(default = default_state_path())]
    pub state_path: Utf8PathBuf,
    /// Longest vhost the hostname policy accepts.
    #[serde(default = "default_max_host_length")]
    #[ortho_config(default = default_max_host_length())]
    pub max_host_length: usize,
    /// Name used when the service itself performs an action.
    #[serde(default = "default_service_name")]
    #[ortho_config(default = default_service_name())]
    pub service_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            state_path: default_state_path(),
            max_host_length: default_max_host_length(),
            service_name: default_service_name(),
        }
    }
}

impl Config {
    /// Returns the tracing filter expression.
    #[must_use]
    pub const fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the structured log format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the path of the directory snapshot.
    #[must_use]
    pub fn state_path(&self) -> &Utf8Path {
        self.state_path.as_path()
    }

    /// Returns the longest vhost the hostname policy accepts.
    #[must_use]
    pub const fn max_host_length(&self) -> usize {
        self.max_host_length
    }

    /// Returns the name used for system actions.
    #[must_use]
    pub const fn service_name(&self) -> &str {
        self.service_name.as_str()
    }
}

//! Built-in defaults applied when no configuration layer supplies a value.

use camino::Utf8PathBuf;

use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default location of the directory snapshot, relative to the working
/// directory.
pub const DEFAULT_STATE_PATH: &str = "hostserv-state.json";

/// Longest vhost accepted by the default hostname policy.
///
/// Matches the classic IRC `HOSTLEN` of 64 bytes minus the terminator.
pub const DEFAULT_MAX_HOST_LENGTH: usize = 63;

/// Display name of the service performing system actions.
pub const DEFAULT_SERVICE_NAME: &str = "HostServ";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default path of the directory snapshot.
#[must_use]
pub fn default_state_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_STATE_PATH)
}

/// Default maximum vhost length.
#[must_use]
pub const fn default_max_host_length() -> usize {
    DEFAULT_MAX_HOST_LENGTH
}

/// Owned service name used where allocation is required (e.g. serde).
#[must_use]
pub fn default_service_name() -> String {
    DEFAULT_SERVICE_NAME.to_owned()
}

//! Error types for the CLI runtime.

use std::sync::Arc;

use hostserv_vhost::VhostError;
use thiserror::Error;

use crate::render;
use crate::state::StateError;
use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error("{}", render::failure(.0))]
    Vhost(#[from] VhostError),
    #[error("failed to write reply: {0}")]
    WriteReply(std::io::Error),
}

//! Command-line surface for the HostServ vhost engine.
//!
//! The runtime splits leading configuration flags from the command, loads
//! [`hostserv_config::Config`], installs telemetry, restores the directory
//! snapshot, and runs one HostServ command against a
//! [`hostserv_vhost::VhostEngine`]. Replies go to stdout and failures to
//! stderr, so the runtime can be driven from the binary or from tests with
//! in-memory writers.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use hostserv_config::Config;
use hostserv_vhost::{AuditEvent, MemoryDirectory, MemoryVhostStore, PolicyValidator, VhostEngine};
use time::OffsetDateTime;

mod cli;
mod config;
mod errors;
mod render;
pub mod state;
pub mod telemetry;

use cli::{Cli, CliCommand};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
pub(crate) use errors::AppError;
use state::Snapshot;

type Engine = VhostEngine<MemoryDirectory, MemoryVhostStore>;

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    run_with_loader(args, stdout, stderr, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(split.command_arguments) {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => {
            let _ = write!(stdout, "{error}");
            return ExitCode::SUCCESS;
        }
        Err(error) => {
            let _ = write!(stderr, "{}", AppError::CliUsage(error));
            return ExitCode::FAILURE;
        }
    };

    let result = loader
        .load(&split.config_arguments)
        .and_then(|config| execute(cli, &config, stdout));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(cli: Cli, config: &Config, stdout: &mut W) -> Result<(), AppError> {
    telemetry::initialise(config)?;

    let mut snapshot = Snapshot::load(config.state_path())?;
    let (directory, store) = snapshot.restore()?;
    let engine = VhostEngine::new(directory, store).with_validator(Arc::new(
        PolicyValidator::new(config.max_host_length()),
    ));
    let operator = cli
        .operator
        .unwrap_or_else(|| config.service_name().to_owned());

    match cli.command {
        CliCommand::Vhost { target, host } => {
            let reply = match host {
                Some(host) => render::assigned(&engine.assign_vhost(&target, &host, &operator)?),
                None => render::cleared(&engine.clear_vhost(&target, &operator)?),
            };
            snapshot.capture_vhosts(engine.store());
            snapshot.save(config.state_path())?;
            writeln!(stdout, "{reply}").map_err(AppError::WriteReply)
        }
        CliCommand::ListVhost { pattern } => list_vhosts(&engine, &pattern, &operator, stdout),
    }
}

fn list_vhosts<W: Write>(
    engine: &Engine,
    pattern: &str,
    operator: &str,
    stdout: &mut W,
) -> Result<(), AppError> {
    let now = OffsetDateTime::now_utc();
    let mut listing = engine.list_vhosts(pattern);
    let mut matches = 0_usize;
    for entry in listing.by_ref() {
        writeln!(stdout, "{}", render::listing_line(&entry, now)).map_err(AppError::WriteReply)?;
        matches += 1;
    }

    let searched = listing.pattern();
    engine.audit().record(&AuditEvent::VhostsListed {
        actor: operator.to_owned(),
        pattern: searched.as_str().to_owned(),
        matches,
    });
    writeln!(stdout, "{}", render::listing_summary(matches, searched))
        .map_err(AppError::WriteReply)
}

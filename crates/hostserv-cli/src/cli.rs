//! CLI argument definitions for the `hostserv` binary.

use clap::{Parser, Subcommand};

/// Command-line interface for HostServ vhost administration.
#[derive(Parser, Debug)]
#[command(name = "hostserv", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Operator performing the command. Defaults to the service itself.
    #[arg(long = "as", value_name = "OPERATOR")]
    pub(crate) operator: Option<String>,
    /// The command to run.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// HostServ commands.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Assigns a vhost to every nickname of an account, or removes it when
    /// no host is given.
    Vhost {
        /// Account name or any nickname registered to it.
        #[arg(value_name = "TARGET")]
        target: String,
        /// The vhost to assign.
        #[arg(value_name = "HOST")]
        host: Option<String>,
    },
    /// Lists active vhosts matching a wildcard pattern.
    #[command(name = "listvhost")]
    ListVhost {
        /// Pattern using `*` and `?` wildcards.
        #[arg(value_name = "PATTERN", default_value = hostserv_vhost::MATCH_ALL)]
        pattern: String,
    },
}

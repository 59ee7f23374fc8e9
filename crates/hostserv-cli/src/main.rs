//! CLI entrypoint for the HostServ vhost tool.
//!
//! The binary delegates to [`hostserv_cli::run`], which loads configuration,
//! parses the command, applies it to the directory snapshot, and prints the
//! service's replies.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hostserv_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}

//! CLI entrypoint for the hostlink client.
//!
//! The binary delegates to [`hostlink_cli::run`], which loads configuration,
//! parses the subcommand, sends one request to the host server and prints the
//! response.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    hostlink_cli::run(std::env::args_os(), &mut stdout, &mut stderr)
}

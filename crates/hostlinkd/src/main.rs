//! Entrypoint for the `hostlinkd` host server.
//!
//! Configuration comes from `HOSTLINK_*` variables, an optional TOML file and
//! command-line flags; see [`hostlinkd::run_daemon`].

use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match hostlinkd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "hostlinkd: {error}");
            ExitCode::FAILURE
        }
    }
}

//! CLI argument definitions for the hostlink client.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Command-line client for a hostlink host server.
#[derive(Parser, Debug)]
#[command(name = "hostlink", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Checks that the server is alive.
    Health,
    /// Prints scene, host and render settings.
    Scene,
    /// Lists the cameras in the scene.
    Cameras,
    /// Runs a code payload on the host.
    Exec(ExecArgs),
    /// Renders a camera view.
    Render(RenderArgs),
    /// Sends an arbitrary command.
    Call {
        /// Command name.
        #[arg(value_name = "COMMAND")]
        command: String,
        /// Parameters as a JSON object.
        #[arg(long, value_name = "JSON")]
        params: Option<String>,
    },
    /// Calls `health_check` repeatedly and reports latency.
    Probe {
        /// Number of calls.
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
        /// Pause between calls in milliseconds.
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub(crate) struct ExecArgs {
    /// Code passed inline.
    #[arg(long)]
    pub(crate) code: Option<String>,
    /// File holding the code.
    #[arg(long, value_name = "PATH")]
    pub(crate) file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct RenderArgs {
    /// Camera to render; the server defaults to `Camera`.
    #[arg(long)]
    pub(crate) camera: Option<String>,
    #[arg(long)]
    pub(crate) width: Option<u32>,
    #[arg(long)]
    pub(crate) height: Option<u32>,
    /// `PNG` or `JPEG`.
    #[arg(long)]
    pub(crate) format: Option<String>,
    /// JPEG quality from 1 to 100.
    #[arg(long)]
    pub(crate) quality: Option<u8>,
}

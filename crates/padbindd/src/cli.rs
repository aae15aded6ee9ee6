use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Run the daemon in the foreground.
    Run,
    /// List connected joysticks.
    List,
    /// Bind a joystick input to a gamepad button or axis.
    Map {
        /// Joystick GUID, 32 hex characters
        guid: String,
        /// Physical input: a2, b10, h0.4
        input: String,
        /// Gamepad button or axis: a, guide, lefttrigger
        target: String,
    },
    /// Print the mapping string of a joystick.
    Show {
        /// Joystick GUID, 32 hex characters
        guid: String,
    },
    /// Print the mappings of every gamepad seen.
    Export,
    /// Load a mappings file and store it in the workspace.
    Import {
        /// Mappings file in SDL_GameControllerDB format
        file: PathBuf,
    },
}

/// Remaps joysticks as gamepads with SDL mapping strings.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// The directory containing settings and mappings
    #[arg(short, long)]
    pub workspace: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}

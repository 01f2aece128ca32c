mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, LaunchArgs};
use devboot_core::observability;

fn main() -> Result<()> {
    observability::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        None => {
            commands::up::cmd_up(&cli.global, &LaunchArgs::default(), false, false)?;
        }
        Some(Commands::Up {
            launch,
            install_deps,
            no_window,
        }) => {
            commands::up::cmd_up(&cli.global, &launch, install_deps, no_window)?;
        }
        Some(Commands::Plan { launch }) => {
            commands::plan::cmd_plan(&cli.global, &launch)?;
        }
        Some(Commands::Profiles { json }) => {
            commands::profiles::cmd_profiles(json)?;
        }
    }

    Ok(())
}

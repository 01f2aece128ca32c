use clap::{Args, Parser, Subcommand};

/// devboot - create the project venv and start the API and dashboard in their own windows
#[derive(Parser, Debug)]
#[command(name = "devboot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Defaults to `up` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Project root holding the venv, API package and dashboard script (default: current directory)
    #[arg(long, short = 'C', global = true, value_name = "DIR", env = "DEVBOOT_PROJECT_DIR")]
    pub project_dir: Option<String>,

    /// Built-in layout: "backend" (backend/ + streamlit/) or "app" (app/ + dashboard/)
    #[arg(long, short, global = true)]
    pub profile: Option<String>,

    /// Profile overrides file (default: <project>/devboot.yaml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    /// API bind host (default: from profile, 127.0.0.1)
    #[arg(long)]
    pub host: Option<String>,

    /// API port; also used for API_BASE (default: from profile, 8000)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Output as structured JSON (default: false)
    #[arg(long, default_value = "false")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the venv if missing, activate it, then launch the API and the dashboard
    Up {
        #[command(flatten)]
        launch: LaunchArgs,

        /// Run `pip install -r <requirements>` even if the profile disables it
        #[arg(long, default_value = "false")]
        install_deps: bool,

        /// Launch in the background instead of opening new console windows
        #[arg(long, default_value = "false")]
        no_window: bool,
    },

    /// Show what `up` would run, without creating or launching anything
    Plan {
        #[command(flatten)]
        launch: LaunchArgs,
    },

    /// List built-in profiles
    Profiles {
        /// Output as structured JSON (default: false)
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

//! Project virtual environment: existence check, creation and dependency
//! install commands.
//!
//! Builders only describe commands; the bootstrap runs them through a
//! `ProcessBackend` so failures can be recorded instead of aborting.

pub mod builder;

pub use builder::{
    create_command, pip_install_command, resolve_env_dir, venv_bin_dir, venv_python, venv_ready,
    which_python,
};

//! Venv activation for spawned children.
//!
//! Activation is never applied to devboot's own process; each child gets
//! `VIRTUAL_ENV`, a `PATH` with the venv's bin dir first, and no
//! `PYTHONHOME`, the same effect as sourcing the activate script in the
//! shell that launches it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use devboot_core::config::env_keys::exported;

use crate::process::CommandSpec;
use crate::venv;

/// Interpreter name used when no venv could be activated.
pub const FALLBACK_PYTHON: &str = "python";

/// An activated environment: interpreter plus the variables children need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub env_dir: PathBuf,
    pub bin_dir: PathBuf,
    /// Venv interpreter, used as the program for both launches
    pub python: PathBuf,
    /// Composed `PATH` value; `None` when it could not be joined
    pub path: Option<String>,
}

impl Activation {
    /// Activate `env_dir` on top of `inherited_path`.
    /// Returns `None` when the venv has no interpreter.
    pub fn new(env_dir: &Path, inherited_path: Option<OsString>) -> Option<Self> {
        let python = venv::venv_python(env_dir)?;
        let bin_dir = venv::venv_bin_dir(env_dir);
        let path = compose_path(&bin_dir, inherited_path);
        Some(Self {
            env_dir: env_dir.to_path_buf(),
            bin_dir,
            python,
            path,
        })
    }

    /// Activation a venv at `env_dir` will have once created, for previews.
    /// Uses the platform's layout without looking at the filesystem.
    pub fn prospective(env_dir: &Path, inherited_path: Option<OsString>) -> Self {
        let (bin, exe) = if cfg!(windows) {
            ("Scripts", "python.exe")
        } else {
            ("bin", "python")
        };
        let bin_dir = env_dir.join(bin);
        let path = compose_path(&bin_dir, inherited_path);
        Self {
            env_dir: env_dir.to_path_buf(),
            python: bin_dir.join(exe),
            bin_dir,
            path,
        }
    }

    /// Activate using the current process's `PATH`.
    pub fn from_current_env(env_dir: &Path) -> Option<Self> {
        Self::new(env_dir, std::env::var_os(exported::PATH))
    }

    /// Variables set on each child.
    pub fn extra_env(&self) -> Vec<(String, String)> {
        let mut vars = vec![(
            exported::VIRTUAL_ENV.to_string(),
            self.env_dir.to_string_lossy().to_string(),
        )];
        if let Some(ref path) = self.path {
            vars.push((exported::PATH.to_string(), path.clone()));
        }
        vars
    }

    pub fn apply(&self, spec: &mut CommandSpec) {
        for (key, value) in self.extra_env() {
            spec.set_env(&key, &value);
        }
        spec.remove_env(exported::PYTHONHOME);
    }
}

/// Interpreter for the launches: the venv's when activated, else bare `python`.
pub fn resolve_python(activation: Option<&Activation>) -> PathBuf {
    activation
        .map(|a| a.python.clone())
        .unwrap_or_else(|| PathBuf::from(FALLBACK_PYTHON))
}

fn compose_path(bin_dir: &Path, inherited: Option<OsString>) -> Option<String> {
    let rest: Vec<PathBuf> = inherited
        .as_deref()
        .map(|p| std::env::split_paths(p).filter(|d| d != bin_dir).collect())
        .unwrap_or_default();
    match std::env::join_paths(std::iter::once(bin_dir.to_path_buf()).chain(rest)) {
        Ok(joined) => Some(joined.to_string_lossy().to_string()),
        Err(e) => {
            tracing::warn!("Cannot prepend {} to PATH: {}", bin_dir.display(), e);
            None
        }
    }
}

//! Create the project's virtual environment and resolve its interpreter.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::process::CommandSpec;

/// Interpreter inside a venv, relative to the venv root, for both layouts.
const VENV_PYTHON_CANDIDATES: &[&[&str]] = &[&["Scripts", "python.exe"], &["bin", "python"]];

/// Return the venv interpreter if the environment exists.
///
/// This is the idempotence check: a venv counts as present as soon as its
/// interpreter does, whichever layout (Windows `Scripts/` or POSIX `bin/`).
pub fn venv_python(env_dir: &Path) -> Option<PathBuf> {
    VENV_PYTHON_CANDIDATES
        .iter()
        .map(|parts| parts.iter().fold(env_dir.to_path_buf(), |acc, p| acc.join(p)))
        .find(|p| p.exists())
}

pub fn venv_ready(env_dir: &Path) -> bool {
    venv_python(env_dir).is_some()
}

/// Directory holding the venv's executables (`Scripts` or `bin`).
pub fn venv_bin_dir(env_dir: &Path) -> PathBuf {
    match venv_python(env_dir).and_then(|p| p.parent().map(Path::to_path_buf)) {
        Some(dir) => dir,
        None if cfg!(windows) => env_dir.join("Scripts"),
        None => env_dir.join("bin"),
    }
}

/// Base interpreter used to create the venv.
///
/// An explicit setting (`DEVBOOT_PYTHON`) wins and is taken as-is when it is
/// not on PATH (it may be an absolute path). Otherwise `python3`, then `python`.
pub fn which_python(explicit: Option<&str>) -> Result<PathBuf> {
    if let Some(name) = explicit {
        return Ok(which::which(name).unwrap_or_else(|_| PathBuf::from(name)));
    }
    for name in ["python3", "python"] {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }
    anyhow::bail!("python3 or python not found in PATH")
}

/// `<python> -m venv <env_dir>`, run from the project directory.
pub fn create_command(python: &Path, env_dir: &Path, project_dir: &Path) -> CommandSpec {
    CommandSpec::new("venv", python)
        .args(["-m", "venv"])
        .arg(env_dir.to_string_lossy())
        .cwd(project_dir)
}

/// `<venv python> -m pip install -r <requirements>`.
pub fn pip_install_command(venv_python: &Path, requirements: &Path, project_dir: &Path) -> CommandSpec {
    CommandSpec::new("deps", venv_python)
        .args(["-m", "pip", "install", "-r"])
        .arg(requirements.to_string_lossy())
        .cwd(project_dir)
}

/// Absolute venv directory for a project.
pub fn resolve_env_dir(project_dir: &Path, venv_dir: &Path) -> Result<PathBuf> {
    let joined = if venv_dir.is_absolute() {
        venv_dir.to_path_buf()
    } else {
        project_dir.join(venv_dir)
    };
    if joined.is_absolute() {
        return Ok(joined);
    }
    let cwd = std::env::current_dir().context("Resolve current directory")?;
    Ok(cwd.join(joined))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_venv_python_posix_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join(".venv");
        assert!(!venv_ready(&env_dir));

        fs::create_dir_all(env_dir.join("bin")).unwrap();
        fs::write(env_dir.join("bin").join("python"), "").unwrap();
        assert_eq!(venv_python(&env_dir), Some(env_dir.join("bin").join("python")));
        assert_eq!(venv_bin_dir(&env_dir), env_dir.join("bin"));
    }

    #[test]
    fn test_venv_python_windows_layout_preferred() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join(".venv");
        fs::create_dir_all(env_dir.join("Scripts")).unwrap();
        fs::write(env_dir.join("Scripts").join("python.exe"), "").unwrap();
        assert!(venv_ready(&env_dir));
        assert_eq!(venv_bin_dir(&env_dir), env_dir.join("Scripts"));
    }

    #[test]
    fn test_empty_venv_dir_is_not_ready() {
        let tmp = tempfile::tempdir().unwrap();
        let env_dir = tmp.path().join(".venv");
        fs::create_dir_all(&env_dir).unwrap();
        assert!(!venv_ready(&env_dir));
    }

    #[test]
    fn test_create_command() {
        let spec = create_command(Path::new("python3"), Path::new("/p/.venv"), Path::new("/p"));
        assert_eq!(spec.command_line(), "python3 -m venv /p/.venv");
        assert_eq!(spec.cwd, PathBuf::from("/p"));
    }

    #[test]
    fn test_pip_install_command() {
        let spec = pip_install_command(
            Path::new("/p/.venv/bin/python"),
            Path::new("requirements.txt"),
            Path::new("/p"),
        );
        assert_eq!(
            spec.command_line(),
            "/p/.venv/bin/python -m pip install -r requirements.txt"
        );
    }

    #[test]
    fn test_which_python_explicit_passthrough() {
        let p = which_python(Some("/nonexistent/python3.12")).unwrap();
        assert_eq!(p, PathBuf::from("/nonexistent/python3.12"));
    }

    #[test]
    fn test_resolve_env_dir() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_env_dir(tmp.path(), Path::new(".venv")).unwrap(),
            tmp.path().join(".venv")
        );
        let abs = tmp.path().join("elsewhere");
        assert_eq!(resolve_env_dir(Path::new("ignored"), &abs).unwrap(), abs);
    }
}

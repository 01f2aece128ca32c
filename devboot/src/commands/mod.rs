//! CLI commands.
//!
//!   up       — venv + activation + both launches
//!   plan     — resolved commands, no side effects
//!   profiles — built-in layouts

pub mod plan;
pub mod profiles;
pub mod up;

use anyhow::{Context, Result};
use std::path::PathBuf;

use devboot_core::config::ProfileConfig;
use devboot_core::profile::{resolve_profile, LaunchProfile, ProfileRequest};

use crate::cli::{GlobalArgs, LaunchArgs};

/// Project directory: `--project-dir`, else the current directory.
pub fn project_dir(global: &GlobalArgs) -> Result<PathBuf> {
    let dir = match global.project_dir {
        Some(ref dir) => PathBuf::from(dir),
        None => std::env::current_dir().context("Resolve current directory")?,
    };
    if !dir.is_dir() {
        anyhow::bail!("Project directory not found: {}", dir.display());
    }
    Ok(dir)
}

/// Build the profile request from CLI flags over `DEVBOOT_*` settings.
pub fn profile_request(
    global: &GlobalArgs,
    launch: &LaunchArgs,
    env: &ProfileConfig,
    force_install_deps: bool,
) -> ProfileRequest {
    ProfileRequest {
        name: global.profile.clone(),
        config_path: global.config.as_ref().map(PathBuf::from),
        env_name: env.profile.clone(),
        api_host: launch.host.clone().or_else(|| env.api_host.clone()),
        api_port: launch.api_port.or(env.api_port),
        force_install_deps,
    }
}

pub fn load_profile(
    global: &GlobalArgs,
    launch: &LaunchArgs,
    force_install_deps: bool,
) -> Result<(PathBuf, LaunchProfile)> {
    let dir = project_dir(global)?;
    let request = profile_request(global, launch, &ProfileConfig::from_env(), force_install_deps);
    let profile = resolve_profile(&dir, &request)?;
    tracing::debug!(profile = %profile.name, project = %dir.display(), "profile resolved");
    Ok((dir, profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags_win_over_env() {
        let global = GlobalArgs {
            profile: Some("app".into()),
            config: Some("custom.yaml".into()),
            ..Default::default()
        };
        let launch = LaunchArgs {
            api_port: Some(9100),
            ..Default::default()
        };
        let env = ProfileConfig {
            profile: Some("backend".into()),
            api_host: Some("0.0.0.0".into()),
            api_port: Some(8001),
        };
        let req = profile_request(&global, &launch, &env, true);
        assert_eq!(req.name.as_deref(), Some("app"));
        assert_eq!(req.env_name.as_deref(), Some("backend"));
        assert_eq!(req.config_path, Some(PathBuf::from("custom.yaml")));
        assert_eq!(req.api_host.as_deref(), Some("0.0.0.0"));
        assert_eq!(req.api_port, Some(9100));
        assert!(req.force_install_deps);
    }

    #[test]
    fn test_project_dir_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            project_dir: Some(tmp.path().join("missing").to_string_lossy().to_string()),
            ..Default::default()
        };
        assert!(project_dir(&global).is_err());

        let global = GlobalArgs {
            project_dir: Some(tmp.path().to_string_lossy().to_string()),
            ..Default::default()
        };
        assert_eq!(project_dir(&global).unwrap(), tmp.path());
    }
}

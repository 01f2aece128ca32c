//! The bootstrap sequence: create venv → install deps → activate → launch.
//!
//! Only profile errors are fatal (they are raised before this module runs).
//! Every step here records its outcome and moves on, so a failed venv
//! creation still leads to both launches, and one failed launch does not
//! prevent the other.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;
use serde_json::json;

use devboot_core::config::env_keys::exported;
use devboot_core::observability;
use devboot_core::profile::LaunchProfile;

use crate::activation::{resolve_python, Activation};
use crate::process::{CommandSpec, ProcessBackend};
use crate::venv;

/// Result of a foreground step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    Skipped { reason: String },
    Failed { error: String },
}

impl StepOutcome {
    fn skipped(reason: &str) -> Self {
        Self::Skipped {
            reason: reason.to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchOutcome {
    pub name: String,
    pub command_line: String,
    pub pid: Option<u32>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub profile: String,
    pub env_dir: PathBuf,
    pub venv: StepOutcome,
    pub deps: StepOutcome,
    pub activated: bool,
    pub launches: Vec<LaunchOutcome>,
}

impl BootstrapReport {
    pub fn launched_count(&self) -> usize {
        self.launches.iter().filter(|l| l.error.is_none()).count()
    }
}

/// Everything `up` would do, resolved without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapPlan {
    pub profile: LaunchProfile,
    pub project_dir: PathBuf,
    pub env_dir: PathBuf,
    pub venv_present: bool,
    /// Files the children need that do not exist yet
    pub missing_files: Vec<PathBuf>,
    pub launches: Vec<CommandSpec>,
}

pub struct Bootstrapper<'a, B: ProcessBackend> {
    backend: &'a B,
    profile: &'a LaunchProfile,
    project_dir: PathBuf,
    /// Base interpreter override (`DEVBOOT_PYTHON`)
    base_python: Option<String>,
    inherited_path: Option<OsString>,
}

impl<'a, B: ProcessBackend> Bootstrapper<'a, B> {
    pub fn new(backend: &'a B, profile: &'a LaunchProfile, project_dir: &Path) -> Self {
        Self {
            backend,
            profile,
            project_dir: project_dir.to_path_buf(),
            base_python: None,
            inherited_path: std::env::var_os(exported::PATH),
        }
    }

    pub fn with_base_python(mut self, python: Option<String>) -> Self {
        self.base_python = python;
        self
    }

    pub fn with_inherited_path(mut self, path: Option<OsString>) -> Self {
        self.inherited_path = path;
        self
    }

    fn env_dir(&self) -> Result<PathBuf> {
        venv::resolve_env_dir(&self.project_dir, &self.profile.venv_dir)
    }

    fn activation(&self, env_dir: &Path) -> Option<Activation> {
        Activation::new(env_dir, self.inherited_path.clone())
    }

    pub fn plan(&self) -> Result<BootstrapPlan> {
        let env_dir = self.env_dir()?;
        let activation = self.activation(&env_dir);
        let venv_present = activation.is_some();
        // A venv that does not exist yet will live at env_dir; preview the
        // activation it will get once created.
        let activation = activation
            .unwrap_or_else(|| Activation::prospective(&env_dir, self.inherited_path.clone()));
        let launches = launch_commands(self.profile, &self.project_dir, Some(&activation));
        Ok(BootstrapPlan {
            profile: self.profile.clone(),
            project_dir: self.project_dir.clone(),
            venv_present,
            env_dir,
            missing_files: missing_files(self.profile, &self.project_dir),
            launches,
        })
    }

    /// Run all steps. Only an unresolvable venv path is an error.
    pub fn run(&self) -> Result<BootstrapReport> {
        let env_dir = self.env_dir()?;
        for path in missing_files(self.profile, &self.project_dir) {
            tracing::warn!("{} not found; the process using it will fail to start", path.display());
        }

        let venv = self.ensure_venv(&env_dir);
        observability::log_step("venv", !venv.is_failed(), json!(venv));

        let deps = self.install_deps(&env_dir);
        observability::log_step("deps", !deps.is_failed(), json!(deps));

        let activation = self.activation(&env_dir);
        match activation {
            Some(ref act) => tracing::info!("Activated {}", act.env_dir.display()),
            None => tracing::warn!(
                "No interpreter in {}; launching with `{}` from PATH",
                env_dir.display(),
                crate::activation::FALLBACK_PYTHON
            ),
        }
        observability::log_step(
            "activate",
            activation.is_some(),
            json!({ "env_dir": env_dir.display().to_string() }),
        );

        let launches = launch_commands(self.profile, &self.project_dir, activation.as_ref())
            .iter()
            .map(|spec| self.launch(spec))
            .collect();

        Ok(BootstrapReport {
            profile: self.profile.name.clone(),
            env_dir,
            venv,
            deps,
            activated: activation.is_some(),
            launches,
        })
    }

    fn ensure_venv(&self, env_dir: &Path) -> StepOutcome {
        if venv::venv_ready(env_dir) {
            tracing::debug!("venv present at {}", env_dir.display());
            return StepOutcome::skipped("already present");
        }
        let python = match venv::which_python(self.base_python.as_deref()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!("Cannot create venv: {}", e);
                return StepOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };
        tracing::info!("Creating venv at {}", env_dir.display());
        let spec = venv::create_command(&python, env_dir, &self.project_dir);
        run_step(self.backend, &spec)
    }

    fn install_deps(&self, env_dir: &Path) -> StepOutcome {
        if !self.profile.install_deps {
            return StepOutcome::skipped("disabled");
        }
        let requirements = self.project_dir.join(&self.profile.requirements);
        if !requirements.exists() {
            tracing::warn!("{} not found; skipping dependency install", requirements.display());
            return StepOutcome::skipped("requirements file missing");
        }
        let Some(python) = venv::venv_python(env_dir) else {
            tracing::warn!("No venv interpreter; skipping dependency install");
            return StepOutcome::skipped("no virtual environment");
        };
        tracing::info!("Installing dependencies from {}", requirements.display());
        let spec = venv::pip_install_command(&python, &self.profile.requirements, &self.project_dir);
        run_step(self.backend, &spec)
    }

    fn launch(&self, spec: &CommandSpec) -> LaunchOutcome {
        let command_line = spec.command_line();
        let outcome = match self.backend.spawn_detached(spec) {
            Ok(pid) => {
                tracing::info!(pid, "Started {}: {}", spec.name, command_line);
                LaunchOutcome {
                    name: spec.name.clone(),
                    command_line,
                    pid: Some(pid),
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!("Failed to start {}: {:#}", spec.name, e);
                LaunchOutcome {
                    name: spec.name.clone(),
                    command_line,
                    pid: None,
                    error: Some(format!("{:#}", e)),
                }
            }
        };
        observability::log_launch(
            &outcome.name,
            &outcome.command_line,
            outcome.pid,
            outcome.error.as_deref(),
        );
        outcome
    }
}

fn run_step<B: ProcessBackend>(backend: &B, spec: &CommandSpec) -> StepOutcome {
    match backend.run(spec) {
        Ok(Some(0)) => StepOutcome::Done,
        Ok(code) => {
            let error = match code {
                Some(c) => format!("`{}` exited with code {}", spec.command_line(), c),
                None => format!("`{}` was terminated by a signal", spec.command_line()),
            };
            tracing::warn!("{}", error);
            StepOutcome::Failed { error }
        }
        Err(e) => {
            tracing::warn!("{:#}", e);
            StepOutcome::Failed {
                error: format!("{:#}", e),
            }
        }
    }
}

/// The two launch commands, API first, with exports and activation applied.
pub fn launch_commands(
    profile: &LaunchProfile,
    project_dir: &Path,
    activation: Option<&Activation>,
) -> Vec<CommandSpec> {
    let python = resolve_python(activation);

    let mut api = CommandSpec::new("api", &python)
        .title(&format!("{} API", profile.name))
        .args(["-m", "uvicorn"])
        .arg(profile.api.module.as_str())
        .args(["--host", profile.api.host.as_str()])
        .args(["--port".to_string(), profile.api.port.to_string()])
        .cwd(project_dir);
    if profile.api.reload {
        api = api.arg("--reload");
    }

    let dashboard = CommandSpec::new("dashboard", &python)
        .title(&format!("{} dashboard", profile.name))
        .args(["-m", "streamlit", "run"])
        .arg(profile.dashboard.script.to_string_lossy())
        .args(profile.dashboard.args.iter().cloned())
        .cwd(project_dir);

    let exports = profile.exports();
    let mut specs = vec![api, dashboard];
    for spec in &mut specs {
        if let Some(act) = activation {
            act.apply(spec);
        }
        for (key, value) in &exports {
            spec.set_env(key, value);
        }
    }
    specs
}

fn missing_files(profile: &LaunchProfile, project_dir: &Path) -> Vec<PathBuf> {
    [profile.api.module_path(), profile.dashboard.script.clone()]
        .into_iter()
        .map(|p| project_dir.join(p))
        .filter(|p| !p.exists())
        .collect()
}

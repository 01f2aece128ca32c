//! Launch profiles: where the API module and dashboard script live.
//!
//! Two layouts exist in the wild (`backend/` + `streamlit/`, and `app/` +
//! `dashboard/`), so both are built in. A `devboot.yaml` next to the project
//! can extend either one and override individual fields.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::env_keys::exported;
use crate::error::ProfileError;

/// File looked up in the project directory when `--config` is not given.
pub const OVERRIDES_FILE: &str = "devboot.yaml";

pub const DEFAULT_PROFILE: &str = "backend";

/// The API server process (`python -m uvicorn <module> ...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiSpec {
    /// ASGI target, e.g. `backend.main:app`
    pub module: String,
    pub host: String,
    pub port: u16,
    /// Pass `--reload` (restart on file change).
    pub reload: bool,
}

impl ApiSpec {
    /// Base URL the dashboard uses to reach the API.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Relative path of the file backing `module`, e.g. `backend/main.py`.
    pub fn module_path(&self) -> PathBuf {
        let dotted = self.module.split(':').next().unwrap_or_default();
        let mut path: PathBuf = dotted.split('.').collect();
        path.set_extension("py");
        path
    }
}

/// The dashboard process (`python -m streamlit run <script> ...`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSpec {
    /// Script path relative to the project directory.
    pub script: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchProfile {
    pub name: String,
    /// Virtual environment directory, relative to the project directory.
    pub venv_dir: PathBuf,
    pub install_deps: bool,
    pub requirements: PathBuf,
    pub api: ApiSpec,
    pub dashboard: DashboardSpec,
    /// Extra variables exported to both children, merged over the defaults.
    pub env: BTreeMap<String, String>,
}

impl LaunchProfile {
    /// Names of all built-in profiles, default first.
    pub fn builtin_names() -> &'static [&'static str] {
        &["backend", "app"]
    }

    pub fn builtin(name: &str) -> Result<Self, ProfileError> {
        let (module, script, install_deps) = match name {
            "backend" => ("backend.main:app", ["streamlit", "app.py"], false),
            "app" => ("app.main:app", ["dashboard", "dashboard_streamlit.py"], true),
            _ => {
                return Err(ProfileError::UnknownProfile {
                    name: name.to_string(),
                    available: Self::builtin_names().join(", "),
                })
            }
        };
        let mut env = BTreeMap::new();
        env.insert(exported::PYTHONUTF8.to_string(), "1".to_string());
        Ok(Self {
            name: name.to_string(),
            venv_dir: PathBuf::from(".venv"),
            install_deps,
            requirements: PathBuf::from("requirements.txt"),
            api: ApiSpec {
                module: module.to_string(),
                host: "127.0.0.1".to_string(),
                port: 8000,
                reload: true,
            },
            dashboard: DashboardSpec {
                script: script.iter().collect(),
                args: Vec::new(),
            },
            env,
        })
    }

    /// Variables every child receives: profile `env` plus `API_BASE`.
    ///
    /// `API_BASE` is derived from the API host/port unless the profile sets it
    /// explicitly.
    pub fn exports(&self) -> Vec<(String, String)> {
        let mut vars = self.env.clone();
        vars.entry(exported::API_BASE.to_string())
            .or_insert_with(|| self.api.base_url());
        vars.into_iter().collect()
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.api.module.trim().is_empty() {
            return Err(ProfileError::Invalid("api.module is empty".into()));
        }
        if self.api.host.trim().is_empty() {
            return Err(ProfileError::Invalid("api.host is empty".into()));
        }
        if self.api.port == 0 {
            return Err(ProfileError::Invalid("api.port must be non-zero".into()));
        }
        if self.dashboard.script.as_os_str().is_empty() {
            return Err(ProfileError::Invalid("dashboard.script is empty".into()));
        }
        if self.venv_dir.as_os_str().is_empty() {
            return Err(ProfileError::Invalid("venv_dir is empty".into()));
        }
        // Names the OS refuses to put in a child's environment.
        for key in self.env.keys() {
            if key.trim().is_empty() || key.contains('=') || key.contains('\0') {
                return Err(ProfileError::Invalid(format!(
                    "env key {:?} is not a valid variable name",
                    key
                )));
            }
        }
        Ok(())
    }
}

/// Partial profile read from `devboot.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    /// Built-in profile to start from.
    #[serde(default)]
    pub extends: Option<String>,
    #[serde(default)]
    pub venv_dir: Option<PathBuf>,
    #[serde(default)]
    pub install_deps: Option<bool>,
    #[serde(default)]
    pub requirements: Option<PathBuf>,
    #[serde(default)]
    pub api: ApiOverrides,
    #[serde(default)]
    pub dashboard: DashboardOverrides,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiOverrides {
    pub module: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub reload: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardOverrides {
    pub script: Option<PathBuf>,
    pub args: Option<Vec<String>>,
}

impl ProfileOverrides {
    pub fn from_yaml(path: &Path, content: &str) -> Result<Self, ProfileError> {
        // An empty file deserializes to unit, not a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source| ProfileError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read overrides from `path`. A missing file yields `None`.
    pub fn load(path: &Path) -> Result<Option<Self>, ProfileError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(path, &content).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ProfileError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn apply(self, profile: &mut LaunchProfile) {
        if let Some(v) = self.venv_dir {
            profile.venv_dir = v;
        }
        if let Some(v) = self.install_deps {
            profile.install_deps = v;
        }
        if let Some(v) = self.requirements {
            profile.requirements = v;
        }
        if let Some(v) = self.api.module {
            profile.api.module = v;
        }
        if let Some(v) = self.api.host {
            profile.api.host = v;
        }
        if let Some(v) = self.api.port {
            profile.api.port = v;
        }
        if let Some(v) = self.api.reload {
            profile.api.reload = v;
        }
        if let Some(v) = self.dashboard.script {
            profile.dashboard.script = v;
        }
        if let Some(v) = self.dashboard.args {
            profile.dashboard.args = v;
        }
        profile.env.extend(self.env);
    }
}

/// Inputs that select and adjust a profile, highest priority first.
#[derive(Debug, Clone, Default)]
pub struct ProfileRequest {
    /// `--profile`
    pub name: Option<String>,
    /// `--config`; when unset `<project>/devboot.yaml` is tried.
    pub config_path: Option<PathBuf>,
    /// `DEVBOOT_PROFILE`
    pub env_name: Option<String>,
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    /// `--install-deps` forces the dependency step on.
    pub force_install_deps: bool,
}

/// Resolve the effective profile for `project_dir`.
///
/// Name order: `--profile`, `DEVBOOT_PROFILE`, `extends` in the overrides
/// file, then [`DEFAULT_PROFILE`]. An explicit `--config` that does not exist
/// is an error; a missing default `devboot.yaml` is not.
pub fn resolve_profile(
    project_dir: &Path,
    request: &ProfileRequest,
) -> Result<LaunchProfile, ProfileError> {
    let overrides = match &request.config_path {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                project_dir.join(path)
            };
            match ProfileOverrides::load(&path)? {
                Some(o) => Some(o),
                None => {
                    return Err(ProfileError::Read {
                        path,
                        source: std::io::Error::new(
                            std::io::ErrorKind::NotFound,
                            "config file not found",
                        ),
                    })
                }
            }
        }
        None => ProfileOverrides::load(&project_dir.join(OVERRIDES_FILE))?,
    };

    let name = request
        .name
        .clone()
        .or_else(|| request.env_name.clone())
        .or_else(|| overrides.as_ref().and_then(|o| o.extends.clone()))
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

    let mut profile = LaunchProfile::builtin(&name)?;
    if let Some(overrides) = overrides {
        overrides.apply(&mut profile);
    }
    if let Some(ref host) = request.api_host {
        profile.api.host = host.clone();
    }
    if let Some(port) = request.api_port {
        profile.api.port = port;
    }
    if request.force_install_deps {
        profile.install_deps = true;
    }
    profile.validate()?;
    Ok(profile)
}

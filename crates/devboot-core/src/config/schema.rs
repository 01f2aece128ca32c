//! 按领域分组的配置结构体
//!
//! 从环境变量加载，统一 fallback 逻辑。

use super::env_keys::{observability as obv_keys, profile as profile_keys, runtime as rt_keys};
use super::loader::{env_bool, env_optional, env_or};

/// Profile 选择与 API 监听地址覆盖
#[derive(Debug, Clone, Default)]
pub struct ProfileConfig {
    pub profile: Option<String>,
    pub api_host: Option<String>,
    /// Ignored (with a warning) when not a valid port number.
    pub api_port: Option<u16>,
}

impl ProfileConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let api_port = env_optional(profile_keys::DEVBOOT_API_PORT, &[]).and_then(|s| {
            s.parse::<u16>()
                .map_err(|_| {
                    tracing::warn!(value = %s, "ignoring invalid {}", profile_keys::DEVBOOT_API_PORT)
                })
                .ok()
        });
        Self {
            profile: env_optional(profile_keys::DEVBOOT_PROFILE, &[]),
            api_host: env_optional(profile_keys::DEVBOOT_API_HOST, &[]),
            api_port,
        }
    }
}

/// 解释器与终端配置
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// Explicit base interpreter for `-m venv`.
    pub python: Option<String>,
    /// Terminal wrapper command line (Unix only).
    pub terminal: Option<String>,
    pub no_window: bool,
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            python: env_optional(rt_keys::DEVBOOT_PYTHON, &[]),
            terminal: env_optional(rt_keys::DEVBOOT_TERMINAL, &[]),
            no_window: env_bool(rt_keys::DEVBOOT_NO_WINDOW, &[], false),
        }
    }
}

/// 可观测性配置：quiet、log_level、log_json、launch_log
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
    pub launch_log: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::DEVBOOT_QUIET, &[], false),
                log_level: env_or(obv_keys::DEVBOOT_LOG_LEVEL, &[], || {
                    "devboot=info,devboot_runtime=info,devboot_core=info".to_string()
                }),
                log_json: env_bool(obv_keys::DEVBOOT_LOG_JSON, &[], false),
                launch_log: env_optional(obv_keys::DEVBOOT_LAUNCH_LOG, &[]),
            }
        })
    }
}

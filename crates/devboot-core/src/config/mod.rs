//! devboot 统一配置层
//!
//! 所有环境变量读取集中在此模块，业务代码通过结构化配置访问，避免直接 `std::env::var`。
//!
//! - `loader`：env_or、env_optional、env_bool、`.env` 加载
//! - `schema`：ProfileConfig、RuntimeConfig、ObservabilityConfig
//! - `env_keys`：key 常量

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{
    env_bool, env_bool_with, env_optional, env_optional_with, env_or, env_or_with, load_dotenv,
    load_dotenv_from_dir, pending_dotenv, set_env_var,
};
pub use schema::{ObservabilityConfig, ProfileConfig, RuntimeConfig};

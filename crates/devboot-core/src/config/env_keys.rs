//! 环境变量 key 常量
//!
//! devboot 自身读取的变量统一使用 `DEVBOOT_*` 前缀；导出给子进程的变量
//! （`API_BASE`、`PYTHONUTF8` 等）单独分组。

/// Launch profile 选择与布局
pub mod profile {
    /// Built-in profile name (`backend` / `app`), overridden by `--profile`.
    pub const DEVBOOT_PROFILE: &str = "DEVBOOT_PROFILE";
    pub const DEVBOOT_API_HOST: &str = "DEVBOOT_API_HOST";
    pub const DEVBOOT_API_PORT: &str = "DEVBOOT_API_PORT";
}

/// 解释器与终端
pub mod runtime {
    /// Base interpreter used for `-m venv` (default: python3, then python on PATH).
    pub const DEVBOOT_PYTHON: &str = "DEVBOOT_PYTHON";

    /// Terminal wrapper for new windows on Unix, e.g. "gnome-terminal --".
    pub const DEVBOOT_TERMINAL: &str = "DEVBOOT_TERMINAL";

    /// Spawn detached in the background instead of opening new console windows.
    pub const DEVBOOT_NO_WINDOW: &str = "DEVBOOT_NO_WINDOW";
}

/// 可观测性与日志
pub mod observability {
    pub const DEVBOOT_QUIET: &str = "DEVBOOT_QUIET";
    pub const DEVBOOT_LOG_LEVEL: &str = "DEVBOOT_LOG_LEVEL";
    pub const DEVBOOT_LOG_JSON: &str = "DEVBOOT_LOG_JSON";

    /// JSONL file receiving one record per bootstrap step.
    pub const DEVBOOT_LAUNCH_LOG: &str = "DEVBOOT_LAUNCH_LOG";
}

/// 导出给子进程（API / dashboard）的变量
pub mod exported {
    /// Where the dashboard finds the API, e.g. `http://127.0.0.1:8000`.
    pub const API_BASE: &str = "API_BASE";
    pub const PYTHONUTF8: &str = "PYTHONUTF8";
    pub const VIRTUAL_ENV: &str = "VIRTUAL_ENV";
    pub const PATH: &str = "PATH";
    pub const PYTHONHOME: &str = "PYTHONHOME";
}

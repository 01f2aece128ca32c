//! Command descriptions and the process backend seam.
//!
//! Everything devboot executes is first described as a [`CommandSpec`]; the
//! [`ProcessBackend`] decides how to run it. The bootstrap never touches
//! `std::process` directly, which keeps the launch sequence testable.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

/// One fully resolved command line plus the environment changes it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Short identifier (`venv`, `deps`, `api`, `dashboard`)
    pub name: String,
    /// Window title when the command gets its own console
    pub title: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Variables set on top of the inherited environment, applied in order
    pub env: Vec<(String, String)>,
    /// Variables removed from the inherited environment
    pub env_remove: Vec<String>,
}

impl CommandSpec {
    pub fn new(name: &str, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            title: name.to_string(),
            program: program.into(),
            args: Vec::new(),
            cwd: PathBuf::from("."),
            env: Vec::new(),
            env_remove: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    /// Set (or replace) a variable.
    pub fn set_env(&mut self, key: &str, value: &str) {
        self.env.retain(|(k, _)| k != key);
        self.env_remove.retain(|k| k != key);
        self.env.push((key.to_string(), value.to_string()));
    }

    pub fn remove_env(&mut self, key: &str) {
        self.env.retain(|(k, _)| k != key);
        if !self.env_remove.iter().any(|k| k == key) {
            self.env_remove.push(key.to_string());
        }
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Human-readable command line (program + args, quoted when needed).
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().cloned())
            .map(|s| quote(&s))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn quote(s: &str) -> String {
    if s.is_empty() || s.chars().any(|c| c.is_whitespace() || c == '"') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

/// How commands are executed.
pub trait ProcessBackend {
    /// Run in the foreground with inherited stdio and wait for it.
    /// Returns the exit code (`None` when killed by a signal).
    fn run(&self, spec: &CommandSpec) -> Result<Option<i32>>;

    /// Spawn without waiting and return the spawned process id.
    fn spawn_detached(&self, spec: &CommandSpec) -> Result<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_spaces() {
        let spec = CommandSpec::new("api", "/opt/my env/bin/python")
            .args(["-m", "uvicorn", "backend.main:app"])
            .arg("");
        assert_eq!(
            spec.command_line(),
            "\"/opt/my env/bin/python\" -m uvicorn backend.main:app \"\""
        );
    }

    #[test]
    fn test_set_env_replaces_and_unremoves() {
        let mut spec = CommandSpec::new("dashboard", "python");
        spec.remove_env("PYTHONHOME");
        spec.set_env("API_BASE", "http://a");
        spec.set_env("API_BASE", "http://b");
        spec.set_env("PYTHONHOME", "/x");
        assert_eq!(spec.env_value("API_BASE"), Some("http://b"));
        assert_eq!(spec.env.len(), 2);
        assert!(spec.env_remove.is_empty());

        spec.remove_env("API_BASE");
        assert_eq!(spec.env_value("API_BASE"), None);
        assert_eq!(spec.env_remove, vec!["API_BASE".to_string()]);
    }
}

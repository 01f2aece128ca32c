//! [`ProcessBackend`] on top of `std::process`.
//!
//! Detached launches get their own console window:
//! - Windows: `cmd /c start "<title>" cmd /k <command>`, so the window stays
//!   open after the child exits and startup errors remain readable.
//! - Unix: the command is wrapped in a terminal emulator when one is
//!   configured or found on PATH; otherwise it runs in a new session.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};

use crate::process::{CommandSpec, ProcessBackend};

/// Terminal emulators looked up on Unix, with the flag that precedes the command.
const TERMINAL_CANDIDATES: &[(&str, &str)] = &[
    ("x-terminal-emulator", "-e"),
    ("gnome-terminal", "--"),
    ("konsole", "-e"),
    ("xterm", "-e"),
];

/// Shell script run inside a new terminal window: start the child (`$0 $@`),
/// then keep the window open until Enter so exit output stays readable.
pub const HOLD_SCRIPT: &str =
    r#""$0" "$@"; status=$?; echo; echo "[exited $status] press Enter to close"; read _"#;

/// Where detached children put their output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleMode {
    /// A new console window. `terminal` is the Unix wrapper argv (ignored on Windows).
    NewWindow { terminal: Option<Vec<String>> },
    /// No window: background process sharing our stdout/stderr.
    Detached,
}

impl ConsoleMode {
    /// Pick the console mode from `--no-window` / `DEVBOOT_TERMINAL`.
    pub fn select(no_window: bool, terminal: Option<&str>) -> Self {
        if no_window {
            return Self::Detached;
        }
        if cfg!(windows) {
            return Self::NewWindow { terminal: None };
        }
        match detect_terminal(terminal) {
            Some(argv) => Self::NewWindow {
                terminal: Some(argv),
            },
            None => {
                tracing::warn!(
                    "No terminal emulator found (set DEVBOOT_TERMINAL); launching in the background"
                );
                Self::Detached
            }
        }
    }
}

/// Terminal wrapper argv: explicit setting first, else the first candidate on PATH.
pub fn detect_terminal(explicit: Option<&str>) -> Option<Vec<String>> {
    if let Some(raw) = explicit {
        let argv: Vec<String> = raw.split_whitespace().map(String::from).collect();
        if !argv.is_empty() {
            return Some(argv);
        }
    }
    TERMINAL_CANDIDATES.iter().find_map(|(bin, flag)| {
        which::which(bin)
            .ok()
            .map(|path| vec![path.to_string_lossy().to_string(), flag.to_string()])
    })
}

/// Program and argv that realize `spec` under `mode` on Unix.
///
/// Inside a terminal the child runs under `sh -c HOLD_SCRIPT`, so the window
/// outlives it.
pub fn unix_argv(spec: &CommandSpec, mode: &ConsoleMode) -> (PathBuf, Vec<String>) {
    match mode {
        ConsoleMode::NewWindow {
            terminal: Some(term),
        } if !term.is_empty() => {
            let mut args: Vec<String> = term[1..].to_vec();
            args.extend(["sh".to_string(), "-c".to_string(), HOLD_SCRIPT.to_string()]);
            args.push(spec.program.to_string_lossy().to_string());
            args.extend(spec.args.iter().cloned());
            (PathBuf::from(&term[0]), args)
        }
        _ => (spec.program.clone(), spec.args.clone()),
    }
}

#[derive(Debug, Clone)]
pub struct OsBackend {
    pub console: ConsoleMode,
}

impl OsBackend {
    pub fn new(console: ConsoleMode) -> Self {
        Self { console }
    }
}

fn apply_env(cmd: &mut Command, spec: &CommandSpec) {
    for key in &spec.env_remove {
        cmd.env_remove(key);
    }
    for (key, value) in &spec.env {
        cmd.env(key, value);
    }
    cmd.current_dir(&spec.cwd);
}

#[cfg(unix)]
fn detached_command(spec: &CommandSpec, mode: &ConsoleMode) -> Command {
    use std::os::unix::process::CommandExt;

    let (program, args) = unix_argv(spec, mode);
    let mut cmd = Command::new(program);
    cmd.args(args);
    apply_env(&mut cmd, spec);
    cmd.stdin(Stdio::null());
    if matches!(mode, ConsoleMode::NewWindow { .. }) {
        // The terminal emulator's own chatter is not the child's output.
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
    }
    // New session: Ctrl-C in the invoking shell does not reach the child.
    unsafe {
        cmd.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }
    cmd
}

#[cfg(windows)]
fn detached_command(spec: &CommandSpec, mode: &ConsoleMode) -> Command {
    use std::os::windows::process::CommandExt;
    use windows_sys::Win32::System::Threading::{CREATE_NEW_PROCESS_GROUP, CREATE_NO_WINDOW};

    match mode {
        ConsoleMode::NewWindow { .. } => {
            let mut cmd = Command::new("cmd");
            cmd.args(["/c", "start"]);
            // `start` only treats a *quoted* first argument as the title.
            cmd.raw_arg(format!("\"{}\"", spec.title.replace('"', "'")));
            cmd.args(["cmd", "/k"]);
            cmd.arg(&spec.program);
            cmd.args(&spec.args);
            apply_env(&mut cmd, spec);
            cmd.creation_flags(CREATE_NO_WINDOW);
            cmd
        }
        ConsoleMode::Detached => {
            let mut cmd = Command::new(&spec.program);
            cmd.args(&spec.args);
            apply_env(&mut cmd, spec);
            cmd.stdin(Stdio::null());
            cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
            cmd
        }
    }
}

impl ProcessBackend for OsBackend {
    fn run(&self, spec: &CommandSpec) -> Result<Option<i32>> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        apply_env(&mut cmd, spec);
        let status = cmd
            .status()
            .with_context(|| format!("Failed to run {}", spec.program.display()))?;
        Ok(status.code())
    }

    fn spawn_detached(&self, spec: &CommandSpec) -> Result<u32> {
        let mut cmd = detached_command(spec, &self.console);
        let child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn {}", spec.command_line()))?;
        // Fire-and-forget: the handle is dropped without waiting.
        Ok(child.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_spec() -> CommandSpec {
        CommandSpec::new("api", "/p/.venv/bin/python").args(["-m", "uvicorn", "backend.main:app"])
    }

    #[test]
    fn test_detect_terminal_explicit() {
        assert_eq!(
            detect_terminal(Some("gnome-terminal --")),
            Some(vec!["gnome-terminal".to_string(), "--".to_string()])
        );
    }

    #[test]
    fn test_select_no_window_is_detached() {
        assert_eq!(ConsoleMode::select(true, Some("xterm -e")), ConsoleMode::Detached);
    }

    #[test]
    fn test_unix_argv_wraps_in_terminal() {
        let mode = ConsoleMode::NewWindow {
            terminal: Some(vec!["xterm".into(), "-T".into(), "devboot".into(), "-e".into()]),
        };
        let (program, args) = unix_argv(&api_spec(), &mode);
        assert_eq!(program, PathBuf::from("xterm"));
        assert_eq!(
            args,
            vec![
                "-T",
                "devboot",
                "-e",
                "sh",
                "-c",
                HOLD_SCRIPT,
                "/p/.venv/bin/python",
                "-m",
                "uvicorn",
                "backend.main:app",
            ]
        );
        assert!(HOLD_SCRIPT.contains("read _"));
    }

    #[test]
    fn test_unix_argv_detached_is_unwrapped() {
        let (program, args) = unix_argv(&api_spec(), &ConsoleMode::Detached);
        assert_eq!(program, PathBuf::from("/p/.venv/bin/python"));
        assert_eq!(args, vec!["-m", "uvicorn", "backend.main:app"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_reports_exit_code_and_env() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = OsBackend::new(ConsoleMode::Detached);
        let mut spec = CommandSpec::new("check", "sh")
            .args(["-c", "test \"$DEVBOOT_CHECK\" = yes && exit 3"])
            .cwd(tmp.path());
        spec.set_env("DEVBOOT_CHECK", "yes");
        assert_eq!(backend.run(&spec).unwrap(), Some(3));
    }

    #[cfg(unix)]
    #[test]
    fn test_spawn_detached_applies_env_and_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = OsBackend::new(ConsoleMode::Detached);
        let mut spec = CommandSpec::new("dashboard", "sh")
            .args(["-c", "printf '%s|%s' \"$API_BASE\" \"${HOME-unset}\" > out.tmp && mv out.tmp out"])
            .cwd(tmp.path());
        spec.set_env("API_BASE", "http://127.0.0.1:8000");
        spec.remove_env("HOME");
        assert!(backend.spawn_detached(&spec).unwrap() > 0);

        let out = tmp.path().join("out");
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !out.exists() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
        }
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "http://127.0.0.1:8000|unset"
        );
    }

    #[test]
    fn test_run_missing_program_is_error() {
        let backend = OsBackend::new(ConsoleMode::Detached);
        let spec = CommandSpec::new("missing", "devboot-definitely-missing-binary");
        assert!(backend.run(&spec).is_err());
        assert!(backend.spawn_detached(&spec).is_err());
    }
}

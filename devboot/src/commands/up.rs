//! `devboot up` — the default command.

use anyhow::Result;

use devboot_core::config::RuntimeConfig;
use devboot_runtime::{BootstrapReport, Bootstrapper, ConsoleMode, OsBackend, StepOutcome};

use crate::cli::{GlobalArgs, LaunchArgs};

/// `devboot up`
///
/// Returns once both launches have been attempted; the children keep running.
pub fn cmd_up(global: &GlobalArgs, launch: &LaunchArgs, install_deps: bool, no_window: bool) -> Result<()> {
    let (project_dir, profile) = super::load_profile(global, launch, install_deps)?;
    let runtime = RuntimeConfig::from_env();

    let console = ConsoleMode::select(no_window || runtime.no_window, runtime.terminal.as_deref());
    let backend = OsBackend::new(console);
    let report = Bootstrapper::new(&backend, &profile, &project_dir)
        .with_base_python(runtime.python.clone())
        .run()?;

    if launch.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

fn describe(step: &StepOutcome) -> String {
    match step {
        StepOutcome::Done => "done".to_string(),
        StepOutcome::Skipped { reason } => format!("skipped ({})", reason),
        StepOutcome::Failed { error } => format!("FAILED: {}", error),
    }
}

pub fn render_report(report: &BootstrapReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("🚀 devboot [{}]\n", report.profile));
    out.push_str(&format!("   venv:      {} ({})\n", describe(&report.venv), report.env_dir.display()));
    out.push_str(&format!("   deps:      {}\n", describe(&report.deps)));
    out.push_str(&format!(
        "   activated: {}\n",
        if report.activated { "yes" } else { "no (using python from PATH)" }
    ));
    for launch in &report.launches {
        match (&launch.pid, &launch.error) {
            (Some(pid), _) => out.push_str(&format!(
                "   ✅ {} (pid {}): {}\n",
                launch.name, pid, launch.command_line
            )),
            (None, Some(err)) => out.push_str(&format!(
                "   ❌ {}: {}\n      {}\n",
                launch.name, launch.command_line, err
            )),
            (None, None) => out.push_str(&format!("   ? {}: {}\n", launch.name, launch.command_line)),
        }
    }
    out
}

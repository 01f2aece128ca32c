//! `devboot plan` — print the resolved bootstrap without running it.

use anyhow::Result;

use devboot_core::config::env_keys::exported;
use devboot_runtime::{BootstrapPlan, Bootstrapper, ConsoleMode, OsBackend};

use crate::cli::{GlobalArgs, LaunchArgs};

pub fn cmd_plan(global: &GlobalArgs, launch: &LaunchArgs) -> Result<()> {
    let (project_dir, profile) = super::load_profile(global, launch, false)?;
    // Never used to run anything; plan() only resolves paths.
    let backend = OsBackend::new(ConsoleMode::Detached);
    let plan = Bootstrapper::new(&backend, &profile, &project_dir).plan()?;

    if launch.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render_plan(&plan));
    }
    Ok(())
}

pub fn render_plan(plan: &BootstrapPlan) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Profile: {}   Project: {}\n",
        plan.profile.name,
        plan.project_dir.display()
    ));
    out.push_str(&format!(
        "venv: {} ({})\n",
        plan.env_dir.display(),
        if plan.venv_present { "present" } else { "will be created" }
    ));
    if plan.profile.install_deps {
        out.push_str(&format!("deps: pip install -r {}\n", plan.profile.requirements.display()));
    }
    for path in &plan.missing_files {
        out.push_str(&format!("⚠ missing: {}\n", path.display()));
    }
    for spec in &plan.launches {
        out.push_str(&format!("\n[{}] {}\n", spec.name, spec.command_line()));
        for (key, value) in &spec.env {
            // PATH is long and only informative
            if key != exported::PATH {
                out.push_str(&format!("    {}={}\n", key, value));
            }
        }
    }
    out
}

//! `devboot profiles`

use anyhow::Result;
use serde_json::json;

use devboot_core::profile::{LaunchProfile, DEFAULT_PROFILE};

pub fn cmd_profiles(json: bool) -> Result<()> {
    let profiles = LaunchProfile::builtin_names()
        .iter()
        .map(|name| LaunchProfile::builtin(name))
        .collect::<Result<Vec<_>, _>>()?;

    if json {
        let value = json!({ "default": DEFAULT_PROFILE, "profiles": profiles });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for p in &profiles {
        let marker = if p.name == DEFAULT_PROFILE { " (default)" } else { "" };
        println!("{}{}", p.name, marker);
        println!("  api:       uvicorn {}", p.api.module);
        println!("  dashboard: streamlit run {}", p.dashboard.script.display());
        println!(
            "  deps:      {}",
            if p.install_deps { "pip install -r requirements.txt" } else { "not installed" }
        );
    }
    Ok(())
}

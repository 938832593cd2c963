//! InitConfig command - writes a settings file with every default spelled out

use std::path::Path;

use anyhow::{bail, Context};
use scriptexec_config::EngineSettings;

use super::CommandResult;

pub fn execute(path: &Path, force: bool) -> CommandResult {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    EngineSettings::default()
        .save_to_file(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(format!("wrote default settings to {}", path.display()))
}

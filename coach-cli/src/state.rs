use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn coach_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".coach"))
}

pub fn ensure_coach_home() -> Result<PathBuf> {
    let dir = coach_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where `coach plan` drops the last rendered weekly plan.
pub fn last_plan_path() -> Result<PathBuf> {
    Ok(ensure_coach_home()?.join("last_plan.md"))
}

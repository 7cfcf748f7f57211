use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn credo_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".credo"))
}

pub fn ensure_credo_home() -> Result<PathBuf> {
    let dir = credo_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

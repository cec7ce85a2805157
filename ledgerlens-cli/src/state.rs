use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$LEDGERLENS_HOME`, else `~/.ledgerlens`
pub fn ledgerlens_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("LEDGERLENS_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".ledgerlens"))
}

pub fn ensure_ledgerlens_home() -> Result<PathBuf> {
    let dir = ledgerlens_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_ledger_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("ledger.json"))
}

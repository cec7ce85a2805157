use anyhow::{Context, Result};
use ledgerlens_core::{Categorizer, KeywordTable};
use ledgerlens_finance::remote_classifier::{RemoteClassifier, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::state::{default_ledger_path, ensure_ledgerlens_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierSection,
    #[serde(default)]
    pub ledger: LedgerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierSection {
    /// e.g. "http://127.0.0.1:8700/classify". Unset means keyword table only.
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSection {
    #[serde(default = "default_owner")]
    pub owner: String,
    /// Defaults to ledger.json in the ledgerlens home
    pub path: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_owner() -> String {
    "default".to_string()
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LedgerSection {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            path: None,
        }
    }
}

impl Config {
    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.ledger.path {
            Some(p) => Ok(p.clone()),
            None => default_ledger_path(),
        }
    }

    /// Remote classifier when an endpoint is configured, keyword table otherwise.
    pub fn categorizer(&self) -> Categorizer {
        let table = KeywordTable::default();
        let Some(endpoint) = &self.classifier.endpoint else {
            return Categorizer::keywords_only(table);
        };
        match RemoteClassifier::new(endpoint.as_str(), Duration::from_secs(self.classifier.timeout_secs)) {
            Ok(remote) => Categorizer::new(Arc::new(remote), table),
            Err(e) => {
                warn!("classifier at {} unusable ({}), using keyword table", endpoint, e);
                Categorizer::keywords_only(table)
            }
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_ledgerlens_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

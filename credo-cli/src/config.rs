use anyhow::{Context, Result, bail};
use credo_ingest::SchemaTemplate;
use credo_scoring::{ScoringPolicy, validate_policy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::{credo_home, ensure_credo_home, read_text};

/// `~/.credo/config.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub scoring: ScoringPolicy,
    /// Extra bank layouts, tried after the built-in templates
    pub templates: Vec<SchemaTemplate>,
}

impl Config {
    /// Every problem in the file, scoring policy first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = match validate_policy(&self.scoring) {
            Ok(()) => Vec::new(),
            Err(errs) => errs.into_iter().map(|e| format!("scoring.{}", e)).collect(),
        };
        for template in &self.templates {
            if let Err(errs) = template.validate() {
                errors.extend(errs);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(credo_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = read_text(&p)?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

/// Scoring policy from a standalone TOML file (same shape as `[scoring]`)
pub fn load_policy(path: &Path) -> Result<ScoringPolicy> {
    let s = read_text(path)?;
    toml::from_str(&s).with_context(|| format!("parse {}", path.display()))
}

/// Reject a configuration that would produce meaningless scores
pub fn ensure_valid(cfg: &Config) -> Result<()> {
    if let Err(errors) = cfg.validate() {
        bail!("invalid configuration:\n  {}", errors.join("\n  "));
    }
    Ok(())
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = ensure_credo_home()?.join("config.toml");
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    let s = toml::to_string_pretty(&cfg).context("serialize config")?;
    println!("# {}", config_path()?.display());
    print!("{}", s);
    Ok(())
}

pub fn check_config() -> Result<()> {
    let cfg = load_config()?;
    ensure_valid(&cfg)?;
    println!(
        "Config OK: weights sum to {:.2}, {} extra template(s)",
        cfg.scoring.weights.sum(),
        cfg.templates.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_config_with_template() {
        let text = r#"
[scoring.bands]
low_risk_min = 75.0

[[templates]]
name = "acme-bank"
amount_rule = "signed"
date = ["booking day"]
description = ["memo"]
amount = ["value"]
"#;
        let cfg: Config = toml::from_str(text).unwrap();
        assert_eq!(cfg.scoring.bands.low_risk_min, 75.0);
        assert_eq!(cfg.templates.len(), 1);
        assert_eq!(cfg.templates[0].name, "acme-bank");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_policy_is_prefixed() {
        let mut cfg = Config::default();
        cfg.scoring.weights.high_risk = 0.5;
        let errors = cfg.validate().unwrap_err();
        assert!(errors[0].starts_with("scoring.weights"));
    }
}

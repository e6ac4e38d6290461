//! Configuration discovery and effective settings resolution.
//!
//! xmsgs reads `xmsgs.toml|yaml|yml` from the project root (or closest
//! ancestor) and merges it with CLI flags to produce an `Effective` config.
//! Defaults:
//! - `output`: `human`
//! - `color`: true
//! - `filter.types`: all of `error|severe|warning|info`
//! - `filter.severe`: `[413]`
//! - `filter.ignore|skip_paths`: empty
//! - `print.full|everything|show_path|by_file`: false
//!
//! Overrides precedence: CLI > config file > defaults. Ignored codes and
//! severe codes given on the CLI extend the configured lists instead.

use crate::error::{Result, XmsgsError};
use crate::models::policy::{FilterPolicy, DEFAULT_SEVERE_CODES};
use crate::models::Severity;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_NAMES: [&str; 3] = ["xmsgs.toml", "xmsgs.yaml", "xmsgs.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Message filtering section under `[filter]`.
pub struct FilterCfg {
    pub types: Option<Vec<String>>,
    pub ignore: Option<Vec<i64>>,
    pub skip_paths: Option<Vec<String>>,
    /// Codes promoted to `severe`; replaces the built-in list.
    pub severe: Option<Vec<i64>>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Listing options under `[print]`.
pub struct PrintCfg {
    pub full: Option<bool>,
    pub everything: Option<bool>,
    pub show_path: Option<bool>,
    pub by_file: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
/// Root configuration loaded from `xmsgs.toml|yaml`.
pub struct XmsgsConfig {
    pub output: Option<String>,
    pub color: Option<bool>,
    #[serde(default)]
    pub filter: Option<FilterCfg>,
    #[serde(default)]
    pub print: Option<PrintCfg>,
}

#[derive(Debug, Default, Clone)]
/// Values supplied on the command line; `None` defers to the config file.
pub struct Overrides {
    pub no_color: bool,
    pub ignore: Vec<i64>,
    pub types: Option<Vec<String>>,
    pub skip_paths: Option<Vec<String>>,
    pub severe: Vec<i64>,
    pub output: Option<String>,
    pub full: Option<bool>,
    pub everything: Option<bool>,
    pub show_path: Option<bool>,
    pub by_file: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    pub config_found: bool,
    pub output: String,
    pub color: bool,
    pub full: bool,
    pub everything: bool,
    pub show_path: bool,
    pub by_file: bool,
    pub policy: FilterPolicy,
}

/// Walk upward from `start` to detect the project root.
///
/// Stops when an `xmsgs.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `XmsgsConfig` from `xmsgs.toml` or `xmsgs.yaml|yml` if present.
///
/// A config file that exists but cannot be parsed is an error, not a
/// silent fallback to defaults.
pub fn load_config(root: &Path) -> Result<Option<XmsgsConfig>> {
    let toml_path = root.join("xmsgs.toml");
    if toml_path.exists() {
        let s = read_config(&toml_path)?;
        let cfg: XmsgsConfig = toml::from_str(&s).map_err(|e| {
            XmsgsError::InvalidConfiguration(format!("{}: {}", toml_path.display(), e))
        })?;
        return Ok(Some(cfg));
    }
    for yml in ["xmsgs.yaml", "xmsgs.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = read_config(&p)?;
            let cfg: XmsgsConfig = serde_yaml::from_str(&s)
                .map_err(|e| XmsgsError::InvalidConfiguration(format!("{}: {}", p.display(), e)))?;
            return Ok(Some(cfg));
        }
    }
    Ok(None)
}

fn read_config(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| XmsgsError::InvalidConfiguration(format!("{}: {}", path.display(), e)))
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli_root: Option<&str>, cli: &Overrides) -> Result<Effective> {
    let start = PathBuf::from(cli_root.unwrap_or("."));
    let root = detect_root(&start);
    let loaded = load_config(&root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();
    let filter = cfg.filter.unwrap_or_default();
    let print = cfg.print.unwrap_or_default();

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(XmsgsError::InvalidConfiguration(format!(
            "unknown output mode '{output}' (expected human|json)"
        )));
    }
    let color = !cli.no_color && cfg.color.unwrap_or(true);

    let types = cli
        .types
        .clone()
        .or(filter.types)
        .unwrap_or_else(|| Severity::ALL.iter().map(|t| t.to_string()).collect());
    let skip_paths = cli.skip_paths.clone().or(filter.skip_paths).unwrap_or_default();
    let mut ignore = filter.ignore.unwrap_or_default();
    ignore.extend(cli.ignore.iter().copied());
    let mut severe = filter
        .severe
        .unwrap_or_else(|| DEFAULT_SEVERE_CODES.to_vec());
    severe.extend(cli.severe.iter().copied());

    let policy = FilterPolicy::new(severe, ignore, &types, &skip_paths)?;

    Ok(Effective {
        root,
        config_found,
        output,
        color,
        full: cli.full.or(print.full).unwrap_or(false),
        everything: cli.everything.or(print.everything).unwrap_or(false),
        show_path: cli.show_path.or(print.show_path).unwrap_or(false),
        by_file: cli.by_file.or(print.by_file).unwrap_or(false),
        policy,
    })
}

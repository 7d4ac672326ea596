//! Discovery of Azure Developer CLI environment files.
//!
//! azd keeps one folder per environment under `.azure/`, each with a `.env`
//! file, and names the active one in `.azure/config.json`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::config::loader::ConfigError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzdConfig {
    default_environment: Option<String>,
}

/// Walk up from `start` until a directory containing `.azure/` is found.
pub fn find_azure_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".azure"))
        .find(|candidate| candidate.is_dir())
}

/// Locate the `.env` file of the default azd environment.
///
/// Falls back to the first environment folder that has a `.env` file when
/// `config.json` is missing or names no environment.
pub fn find_env_file(start: &Path) -> Option<PathBuf> {
    let azure_dir = find_azure_dir(start)?;

    let named = fs::read_to_string(azure_dir.join("config.json"))
        .ok()
        .and_then(|raw| serde_json::from_str::<AzdConfig>(&raw).ok())
        .and_then(|cfg| cfg.default_environment)
        .map(|env| azure_dir.join(env).join(".env"))
        .filter(|path| path.is_file());
    if named.is_some() {
        return named;
    }

    let mut folders: Vec<PathBuf> = fs::read_dir(&azure_dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();
    folders
        .into_iter()
        .map(|dir| dir.join(".env"))
        .find(|path| path.is_file())
}

/// Parse `KEY=value` lines; surrounding quotes are removed.
pub fn parse_env(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), unquote(value.trim()).to_string());
        }
    }
    map
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Read the default azd environment reachable from `start`, if any.
pub fn load_azd_environment(start: &Path) -> Result<Option<HashMap<String, String>>, ConfigError> {
    let Some(path) = find_env_file(start) else {
        tracing::debug!(start = %start.display(), "No azd environment found");
        return Ok(None);
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::info!(path = %path.display(), "Loaded azd environment");
    Ok(Some(parse_env(&content)))
}

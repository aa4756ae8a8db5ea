use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::types::{DEFAULT_BIND_ADDR, DEFAULT_CONTEST_ID};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Optional schedule document to import at startup.
    pub schedule_path: String,
    /// Contest the startup schedule is loaded into.
    pub contest_id: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            schedule_path: "schedules/bowl_2025_26.json".to_string(),
            contest_id: DEFAULT_CONTEST_ID,
        }
    }
}

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resolve_repo_path(raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        path
    } else {
        repo_root().join(path)
    }
}

pub fn config_path() -> PathBuf {
    repo_root().join("config.json")
}

pub fn env_default(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn apply_env_defaults(mut config: AppConfig) -> AppConfig {
    if let Some(value) = env_default("PICKEM_BIND_ADDR") {
        config.bind_addr = value;
    }
    if config.schedule_path.trim().is_empty() {
        if let Some(value) = env_default("PICKEM_SCHEDULE_PATH") {
            config.schedule_path = value;
        }
    }
    if let Some(value) = env_default("PICKEM_CONTEST_ID") {
        if let Ok(id) = value.parse::<u64>() {
            config.contest_id = id;
        }
    }
    config
}

pub fn load_config_inner() -> Result<AppConfig, String> {
    let path = config_path();
    if !path.is_file() {
        return Ok(apply_env_defaults(AppConfig::default()));
    }
    let data =
        fs::read_to_string(&path).map_err(|e| format!("read config {}: {e}", path.display()))?;
    let config = serde_json::from_str::<AppConfig>(&data)
        .map_err(|e| format!("parse config {}: {e}", path.display()))?;
    Ok(apply_env_defaults(config))
}

pub fn load_env_file() {
    let env_path = repo_root().join(".env");
    load_env_file_from(&env_path);
}

fn load_env_file_from(env_path: &Path) {
    if !env_path.is_file() {
        return;
    }
    let contents = match fs::read_to_string(env_path) {
        Ok(data) => data,
        Err(_) => return,
    };
    for line in contents.lines() {
        if let Some((key, value)) = parse_env_line(line) {
            if env::var_os(&key).is_none() {
                env::set_var(key, value);
            }
        }
    }
}

pub fn parse_env_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (key, raw_value) = trimmed.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let mut value = raw_value.trim();
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        value = &value[1..value.len() - 1];
    } else if value.starts_with('\'') && value.ends_with('\'') && value.len() >= 2 {
        value = &value[1..value.len() - 1];
    } else if let Some(idx) = value.find('#') {
        value = value[..idx].trim_end();
    }
    Some((key.to_string(), value.to_string()))
}

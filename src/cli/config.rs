use std::fs;
use std::path::PathBuf;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

pub const SETTINGS_FILE: &str = "cli.json";

/// Settings persisted by `budget config`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliSettings {
    pub api_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CliSettings {
    pub fn set_api_url(&mut self, url: &str) {
        self.api_url = Some(url.trim().trim_end_matches('/').to_string());
        self.updated_at = Some(Utc::now());
    }
}

pub fn get_config_dir(config: &ClientConfig) -> anyhow::Result<PathBuf> {
    let config_dir = if let Some(custom_dir) = &config.session.storage_dir {
        custom_dir.clone()
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("budget").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn load_settings(config: &ClientConfig) -> anyhow::Result<CliSettings> {
    let settings_file = get_config_dir(config)?.join(SETTINGS_FILE);

    if !settings_file.exists() {
        return Ok(CliSettings::default());
    }

    let content = fs::read_to_string(settings_file)?;
    let settings: CliSettings = serde_json::from_str(&content)?;
    Ok(settings)
}

pub fn save_settings(config: &ClientConfig, settings: &CliSettings) -> anyhow::Result<()> {
    let settings_file = get_config_dir(config)?.join(SETTINGS_FILE);

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(settings_file, content)?;
    Ok(())
}

/// `--api-url` beats `cli.json`, which beats the environment default
pub fn resolve_api_url(flag: Option<&str>, settings: &CliSettings, config: &ClientConfig) -> String {
    flag.map(str::to_string)
        .or_else(|| settings.api_url.clone())
        .unwrap_or_else(|| config.api.base_url.clone())
}

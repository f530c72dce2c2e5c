use crate::{error::Result, StoryError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    LmStudio,
    OpenAi,
}

impl Default for AiProvider {
    fn default() -> Self {
        AiProvider::LmStudio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: AiProvider,
    #[serde(default = "default_lm_studio_url")]
    pub lm_studio_url: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: Option<String>,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_story_temperature")]
    pub story_temperature: f32,
    #[serde(default = "default_link_temperature")]
    pub link_temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Override for the SQLite database location. Defaults next to the config file.
    #[serde(default)]
    pub database_path: Option<String>,

    #[serde(default)]
    pub crossmint_api_key: Option<String>,
    #[serde(default = "default_crossmint_env")]
    pub crossmint_env: String,
    #[serde(default = "default_crossmint_chain")]
    pub crossmint_chain: String,
    #[serde(default)]
    pub crossmint_collection_id: Option<String>,
    #[serde(default)]
    pub signer_public_key: Option<String>,
}

fn default_lm_studio_url() -> String {
    "http://localhost:1234/v1".to_string()
}

fn default_openai_base_url() -> Option<String> {
    Some("https://api.openai.com/v1".to_string())
}

fn default_chat_model() -> String {
    "gpt-4".to_string()
}

fn default_story_temperature() -> f32 {
    0.7
}

fn default_link_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> usize {
    1024
}

fn default_crossmint_env() -> String {
    "staging".to_string()
}

fn default_crossmint_chain() -> String {
    "solana".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: AiProvider::LmStudio,
            lm_studio_url: default_lm_studio_url(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            chat_model: default_chat_model(),
            story_temperature: default_story_temperature(),
            link_temperature: default_link_temperature(),
            max_tokens: default_max_tokens(),
            database_path: None,
            crossmint_api_key: None,
            crossmint_env: default_crossmint_env(),
            crossmint_chain: default_crossmint_chain(),
            crossmint_collection_id: None,
            signer_public_key: None,
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir()
        .ok_or_else(|| StoryError::Internal("Failed to get config directory".to_string()))?;

    path.push("storyline");
    fs::create_dir_all(&path)?;

    path.push("config.json");
    Ok(path)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        let default_config = Config::default();
        save_config(&default_config)?;
        return Ok(default_config);
    }

    let content = fs::read_to_string(&config_path)?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| StoryError::Internal(format!("Failed to parse config: {}", e)))?;

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_path = get_config_path()?;

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| StoryError::Internal(format!("Failed to serialize config: {}", e)))?;

    fs::write(&config_path, content)?;

    Ok(())
}

impl Config {
    /// Resolves the SQLite database path, defaulting to the config directory.
    pub fn resolve_db_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(PathBuf::from(path));
        }
        let mut path = get_config_path()?;
        path.set_file_name("storyline.db");
        Ok(path)
    }
}

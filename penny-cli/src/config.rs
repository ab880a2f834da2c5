//! Configuration for the penny CLI: ~/.penny/config.toml plus API keys
//! from the environment.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use penny_llm::{AzureSection, LlmConfig, Provider};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSection {
    /// "openai" or "azure"
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,

    /// For provider = "azure": deployment name and api version
    pub azure_deployment: Option<String>,
    pub azure_api_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageSection {
    /// Defaults to ~/.penny/penny.db
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LlmSection {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                base_url: "https://api.openai.com".to_string(),
                temperature: 0.7,
                azure_deployment: None,
                azure_api_version: None,
            },
            storage: StorageSection::default(),
        }
    }
}

impl Config {
    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(p) => Ok(p.clone()),
            None => Ok(ensure_penny_home()?.join("penny.db")),
        }
    }

    /// Translate the config section into the client's typed config
    pub fn llm_config(&self) -> Result<LlmConfig> {
        let provider = match self.llm.provider.as_str() {
            "openai" => Provider::OpenAI,
            "azure" => Provider::Azure,
            other => bail!("unknown llm provider {other:?} (expected openai or azure)"),
        };

        let azure = match provider {
            Provider::Azure => Some(AzureSection {
                deployment: self
                    .llm
                    .azure_deployment
                    .clone()
                    .context("azure provider needs llm.azure_deployment")?,
                api_version: self
                    .llm
                    .azure_api_version
                    .clone()
                    .context("azure provider needs llm.azure_api_version")?,
            }),
            Provider::OpenAI => None,
        };

        Ok(LlmConfig {
            provider,
            model: self.llm.model.clone(),
            base_url: self.llm.base_url.clone(),
            temperature: self.llm.temperature,
            azure,
        })
    }

    /// Environment variable holding the API key for the active provider
    pub fn api_key(&self) -> Result<String> {
        let var = match self.llm.provider.as_str() {
            "azure" => "AZURE_OPENAI_KEY",
            _ => "OPENAI_API_KEY",
        };
        std::env::var(var).with_context(|| format!("{var} is not set"))
    }
}

pub fn penny_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".penny"))
}

pub fn ensure_penny_home() -> Result<PathBuf> {
    let dir = penny_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_penny_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.llm.provider, "openai");
        assert_eq!(back.llm.model, cfg.llm.model);
        assert!(back.storage.db_path.is_none());
    }

    #[test]
    fn test_azure_requires_deployment() {
        let mut cfg = Config::default();
        cfg.llm.provider = "azure".to_string();
        assert!(cfg.llm_config().is_err());

        cfg.llm.azure_deployment = Some("gpt-4o".to_string());
        cfg.llm.azure_api_version = Some("2024-06-01".to_string());
        let llm = cfg.llm_config().unwrap();
        assert_eq!(llm.provider, Provider::Azure);
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let mut cfg = Config::default();
        cfg.llm.provider = "bedrock".to_string();
        assert!(cfg.llm_config().is_err());
    }
}

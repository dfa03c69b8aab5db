//! llm-router configuration management

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::router::{Backend, PromptRouter};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8787;
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
const DEFAULT_FAST_TIMEOUT_SECS: u64 = 12;
const DEFAULT_QUALITY_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    /// `[presets.*]` and `[providers.*]` tables
    #[serde(flatten)]
    pub llm: llm_client::Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted request body
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Preset used as the fast, low-cost backend
    #[serde(default = "default_fast")]
    pub fast: String,

    /// Preset used as the high-quality backend
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Deadline for one call to the fast backend
    #[serde(default = "default_fast_timeout")]
    pub fast_timeout_secs: u64,

    /// Deadline for one call to the high-quality backend
    #[serde(default = "default_quality_timeout")]
    pub quality_timeout_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_fast() -> String {
    "groq".to_string()
}

fn default_quality() -> String {
    "openai".to_string()
}

fn default_fast_timeout() -> u64 {
    DEFAULT_FAST_TIMEOUT_SECS
}

fn default_quality_timeout() -> u64 {
    DEFAULT_QUALITY_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            quality: default_quality(),
            fast_timeout_secs: default_fast_timeout(),
            quality_timeout_secs: default_quality_timeout(),
        }
    }
}

impl RoutingConfig {
    pub fn fast_deadline(&self) -> Duration {
        Duration::from_secs(self.fast_timeout_secs)
    }

    pub fn quality_deadline(&self) -> Duration {
        Duration::from_secs(self.quality_timeout_secs)
    }
}

impl RouterConfig {
    /// Get the config file path: ~/.config/cli-programs/llm-router.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("llm-router.toml"))
    }

    /// Load config from `path`, returning default if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: RouterConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.routing.fast_timeout_secs == 0 || self.routing.quality_timeout_secs == 0 {
            bail!("routing timeouts must be at least one second");
        }
        if self.routing.fast == self.routing.quality {
            bail!(
                "fast and quality backends must be different presets (both are '{}')",
                self.routing.fast
            );
        }
        for name in [&self.routing.fast, &self.routing.quality] {
            self.llm.get_preset(name)?;
        }
        Ok(())
    }

    /// Build a router with one provider per configured preset.
    ///
    /// Backends are reported under their preset names.
    pub fn build_router(&self) -> Result<PromptRouter> {
        self.validate()?;

        let fast = self.backend(&self.routing.fast, self.routing.fast_deadline())?;
        let quality = self.backend(&self.routing.quality, self.routing.quality_deadline())?;
        Ok(PromptRouter::new(fast, quality))
    }

    fn backend(&self, preset_name: &str, deadline: Duration) -> Result<Backend> {
        let preset = self.llm.get_preset(preset_name)?;
        let provider_config = self.llm.get_provider_config(&preset.provider);
        let provider = llm_client::get_provider(preset, provider_config).with_context(|| {
            format!(
                "Failed to initialize provider '{}' for preset '{}'",
                preset.provider, preset_name
            )
        })?;

        Ok(Backend::new(preset_name, Arc::from(provider), deadline))
    }
}

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use mdr_core::RenderOptions;

use crate::Cli;

fn default_margin() -> usize {
    4
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Fixed left margin in columns
    #[serde(default = "default_margin")]
    pub margin: usize,

    /// Total column width; the terminal width when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<usize>,

    #[serde(flatten)]
    pub render: RenderOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            width: None,
            render: RenderOptions::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the config file if present, then `MDR_*`
    /// environment variables.
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok();
        Self::figment(path.as_deref())
            .extract()
            .context("Failed to load configuration")
    }

    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("MDR_"))
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("mdr").join("config.toml"))
    }

    /// Command-line flags take precedence over everything else.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(width) = cli.width {
            self.width = Some(width);
        }
        if let Some(margin) = cli.margin {
            self.margin = margin;
        }
        if let Some(theme) = &cli.theme {
            self.render.theme = theme.clone();
        }
        if cli.no_highlight {
            self.render.highlight = false;
        }
        if cli.no_emoji {
            self.render.emoji = false;
        }
    }
}

//! Tally configuration file handling
//!
//! `tally.toml` has two tables:
//! - `[animation]` - transition settings (duration, decimals, easing, delay)
//! - `[display]` - how values are rendered and how fast frames are drawn

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tally_animation::TransitionConfig;
use tally_format::NumberFormat;

/// File looked up in the working directory when `--config` is not given
pub const CONFIG_FILE: &str = "tally.toml";

/// Workspace configuration stored in tally.toml
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub animation: TransitionConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Rendering settings
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// BCP-47 locale tag used for grouped output
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Insert thousands separators
    #[serde(default)]
    pub grouped: bool,
    /// Frame rate of the background scheduler
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_fps() -> u32 {
    60
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            grouped: false,
            fps: default_fps(),
        }
    }
}

impl TallyConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `tally.toml` in the working
    /// directory is used if present, and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE);
                if local.exists() {
                    Self::load_from_file(local)
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config = Self::from_toml(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TallyConfig = toml::from_str(content).context("Invalid TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// Check both tables, as flags may have changed them after loading
    pub fn validate(&self) -> Result<()> {
        self.animation
            .validate()
            .context("Invalid [animation] settings")?;
        self.number_format()?;
        Ok(())
    }

    /// Display style described by `[display]` and the animation precision
    pub fn number_format(&self) -> Result<NumberFormat> {
        let decimals = self.animation.decimals;
        if self.display.grouped {
            NumberFormat::grouped(decimals, &self.display.locale)
                .context("Invalid [display] locale")
        } else {
            Ok(NumberFormat::fixed(decimals))
        }
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

//! Configuration file support for petstride.
//!
//! This module handles loading and validating user settings from the
//! configuration file located at `~/.config/petstride/config.toml`. Settings
//! include walk movement tuning, hold-escalation timing, the input dispatch
//! profile, and direction keybindings.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::InputProfile;
pub use keybindings::{KeybindingError, KeybindingsConfig};
pub use types::{HoldConfig, InputConfig, WalkConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML
/// file. All fields have sensible defaults and will use those if not
/// specified in the config file.
///
/// # Example TOML
/// ```toml
/// [walk]
/// interval_ms = 60
/// step_px = 10
/// speed_happy = 15
///
/// [hold]
/// hold_ms = 1000
///
/// [input]
/// profile = "posture-hold"
///
/// [keybindings]
/// left = ["A", "Left"]
/// right = ["D", "Right"]
/// ```
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Walk movement tuning (tick interval, per-tick distances)
    #[serde(default)]
    pub walk: WalkConfig,

    /// Hold-escalation timing for the Down/Up keys
    #[serde(default)]
    pub hold: HoldConfig,

    /// Input dispatch profile
    #[serde(default)]
    pub input: InputConfig,

    /// Direction keybindings
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is
    /// logged.
    ///
    /// Validated ranges:
    /// - `walk.interval_ms`: 16 - 1000
    /// - `walk.step_px`: 1 - 100
    /// - `walk.speed_happy` / `speed_normal` / `speed_poor`: 1 - 100
    /// - `hold.hold_ms`: 100 - 10000
    fn validate_and_clamp(&mut self) {
        // Move tick interval: 16 - 1000 ms
        if !(16..=1000).contains(&self.walk.interval_ms) {
            log::warn!(
                "Invalid walk interval_ms {}, clamping to 16-1000 range",
                self.walk.interval_ms
            );
            self.walk.interval_ms = self.walk.interval_ms.clamp(16, 1000);
        }

        // Vertical step: 1 - 100 px
        if !(1..=100).contains(&self.walk.step_px) {
            log::warn!(
                "Invalid walk step_px {}, clamping to 1-100 range",
                self.walk.step_px
            );
            self.walk.step_px = self.walk.step_px.clamp(1, 100);
        }

        // Per-mood horizontal speeds: 1 - 100 px
        if !(1..=100).contains(&self.walk.speed_happy) {
            log::warn!(
                "Invalid walk speed_happy {}, clamping to 1-100 range",
                self.walk.speed_happy
            );
            self.walk.speed_happy = self.walk.speed_happy.clamp(1, 100);
        }

        if !(1..=100).contains(&self.walk.speed_normal) {
            log::warn!(
                "Invalid walk speed_normal {}, clamping to 1-100 range",
                self.walk.speed_normal
            );
            self.walk.speed_normal = self.walk.speed_normal.clamp(1, 100);
        }

        if !(1..=100).contains(&self.walk.speed_poor) {
            log::warn!(
                "Invalid walk speed_poor {}, clamping to 1-100 range",
                self.walk.speed_poor
            );
            self.walk.speed_poor = self.walk.speed_poor.clamp(1, 100);
        }

        // Hold escalation delay: 100 - 10000 ms
        if !(100..=10000).contains(&self.hold.hold_ms) {
            log::warn!(
                "Invalid hold_ms {}, clamping to 100-10000 range",
                self.hold.hold_ms
            );
            self.hold.hold_ms = self.hold.hold_ms.clamp(100, 10000);
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/petstride/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("petstride");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from file, or returns defaults if not found.
    ///
    /// Attempts to read and parse the config file at
    /// `~/.config/petstride/config.toml`. If the file doesn't exist, returns
    /// a Config with default values. All loaded values are validated and
    /// clamped to acceptable ranges.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory path cannot be determined
    /// - The file exists but cannot be read
    /// - The file exists but contains invalid TOML syntax
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let config = Self::parse(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Parses configuration from a TOML string, clamping values to their
    /// documented ranges.
    pub fn parse(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;
        config.validate_and_clamp();
        Ok(config)
    }

    /// Saves the current configuration to file.
    ///
    /// Serializes the config to TOML format and writes it to
    /// `~/.config/petstride/config.toml`. Creates the parent directory if it
    /// doesn't exist. This method is kept for future use (e.g., runtime
    /// config editing).
    ///
    /// # Errors
    /// Returns an error if:
    /// - The config directory cannot be created
    /// - The config cannot be serialized to TOML
    /// - The file cannot be written
    #[allow(dead_code)]
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }
}

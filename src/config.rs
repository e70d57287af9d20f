use crate::error::{BridgeError, Result};
use crate::homekit::AccessoryInfo;
use crate::light::{ColorCapability, LightColorValues, LightState, LightTraits, object_id_from_name};
use crate::light::traits::{DEFAULT_MAX_MIREDS, DEFAULT_MIN_MIREDS};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before the runtime is built)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }

    pairs
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub accessory: AccessoryInfo,
    pub lights: Vec<LightConfig>,
}

/// Supported color temperature range, in mireds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MiredRange {
    pub min_mireds: f32,
    pub max_mireds: f32,
}

impl Default for MiredRange {
    fn default() -> Self {
        Self {
            min_mireds: DEFAULT_MIN_MIREDS,
            max_mireds: DEFAULT_MAX_MIREDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub name: String,
    /// On/off is implied
    pub capabilities: Vec<ColorCapability>,
    pub mireds: Option<MiredRange>,
    /// Internal lights are published but never push state to HomeKit
    pub internal: bool,
    pub transition_ms: u64,
    pub initial: LightColorValues,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            name: "Lamp".to_string(),
            capabilities: vec![ColorCapability::Brightness],
            mireds: None,
            internal: false,
            transition_ms: 0,
            initial: LightColorValues::default(),
        }
    }
}

impl LightConfig {
    pub fn traits(&self) -> LightTraits {
        let traits: LightTraits = self.capabilities.iter().copied().collect();
        match self.mireds {
            Some(range) => traits.with_mireds(range.min_mireds, range.max_mireds),
            None => traits,
        }
    }

    /// Create the light described by this entry.
    pub fn build(&self) -> LightState {
        LightState::new(self.name.clone(), self.traits())
            .with_internal(self.internal)
            .with_default_transition(Duration::from_millis(self.transition_ms))
            .with_initial_values(self.initial)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accessory: AccessoryInfo::default(),
            lights: vec![LightConfig::default()],
        }
    }
}

impl Config {
    /// `$XDG_CONFIG_HOME/hap-light-bridge/config.json` (or the platform equivalent).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hap-light-bridge").join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load the configuration used by the bridge.
    ///
    /// Starts from `path` (or the default path when it exists, or the
    /// built-in defaults), then applies environment overrides and validates.
    /// Call [`load_dotenv`] first for `.env` values to be picked up.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|path| path.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(model) = lookup("HAP_MODEL") {
            self.accessory.model = model;
        }
        if let Some(manufacturer) = lookup("HAP_MANUFACTURER") {
            self.accessory.manufacturer = manufacturer;
        }
        if let Some(firmware) = lookup("HAP_FIRMWARE_REVISION") {
            self.accessory.firmware_revision = firmware;
        }
        if let Some(hardware) = lookup("HAP_HARDWARE_REVISION") {
            self.accessory.hardware_revision = Some(hardware).filter(|h| !h.is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        let mut object_ids = HashSet::new();

        for light in &self.lights {
            if light.name.trim().is_empty() {
                return Err(BridgeError::InvalidConfig("light name is empty".into()));
            }
            // Lights are identified by their object id, not their display name
            if !object_ids.insert(object_id_from_name(&light.name)) {
                return Err(BridgeError::InvalidConfig(format!(
                    "light '{}' clashes with another light's name",
                    light.name
                )));
            }
            if let Some(range) = light.mireds
                && !(range.min_mireds > 0.0 && range.min_mireds <= range.max_mireds)
            {
                return Err(BridgeError::InvalidConfig(format!(
                    "light '{}': invalid mired range {}..{}",
                    light.name, range.min_mireds, range.max_mireds
                )));
            }
        }

        Ok(())
    }
}

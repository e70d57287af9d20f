//! Capability model for lights.
//!
//! A light declares which color/behavior features it supports. Consumers
//! (like the HomeKit publisher) only expose what the light declares.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// A single feature a light may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorCapability {
    /// Switching on and off. Every light supports this.
    OnOff,
    /// Dimming, brightness as a fraction in `[0.0, 1.0]`
    Brightness,
    /// White color temperature in mireds
    ColorTemperature,
}

impl ColorCapability {
    const fn bit(self) -> u8 {
        match self {
            ColorCapability::OnOff => 1 << 0,
            ColorCapability::Brightness => 1 << 1,
            ColorCapability::ColorTemperature => 1 << 2,
        }
    }
}

/// Default coldest color temperature (mireds), about 6500 K.
pub const DEFAULT_MIN_MIREDS: f32 = 153.0;
/// Default warmest color temperature (mireds), about 2000 K.
pub const DEFAULT_MAX_MIREDS: f32 = 500.0;

/// Supported capabilities of a light plus its color temperature range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTraits {
    capabilities: u8,
    min_mireds: f32,
    max_mireds: f32,
}

impl LightTraits {
    /// A plain on/off light.
    pub const fn on_off() -> Self {
        Self {
            capabilities: ColorCapability::OnOff.bit(),
            min_mireds: DEFAULT_MIN_MIREDS,
            max_mireds: DEFAULT_MAX_MIREDS,
        }
    }

    /// A dimmable light.
    pub const fn brightness() -> Self {
        Self::on_off().with(ColorCapability::Brightness)
    }

    /// Add a capability. Returns self for method chaining.
    pub const fn with(mut self, capability: ColorCapability) -> Self {
        self.capabilities |= capability.bit();
        self
    }

    /// Set the supported color temperature range (mireds).
    pub const fn with_mireds(mut self, min_mireds: f32, max_mireds: f32) -> Self {
        self.min_mireds = min_mireds;
        self.max_mireds = max_mireds;
        self
    }

    /// Whether the light declares the given capability.
    pub const fn supports(&self, capability: ColorCapability) -> bool {
        self.capabilities & capability.bit() != 0
    }

    pub const fn min_mireds(&self) -> f32 {
        self.min_mireds
    }

    pub const fn max_mireds(&self) -> f32 {
        self.max_mireds
    }
}

impl Default for LightTraits {
    fn default() -> Self {
        Self::on_off()
    }
}

impl FromIterator<ColorCapability> for LightTraits {
    fn from_iter<I: IntoIterator<Item = ColorCapability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::on_off(), Self::with)
    }
}

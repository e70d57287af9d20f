//! Light color values (on/off, brightness, color temperature).

use serde::{Deserialize, Serialize};

/// Snapshot of everything a light can be asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightColorValues {
    /// On/off flag
    pub state: bool,
    /// Brightness as a normalized fraction in `[0.0, 1.0]`
    pub brightness: f32,
    /// Color temperature in mireds
    pub color_temperature: f32,
}

impl LightColorValues {
    pub fn get_state(&self) -> bool {
        self.state
    }

    pub fn get_brightness(&self) -> f32 {
        self.brightness
    }

    pub fn get_color_temperature(&self) -> f32 {
        self.color_temperature
    }

    /// Linear interpolation between two snapshots, `progress` in `[0.0, 1.0]`.
    ///
    /// A light being switched on is on for the whole transition, a light
    /// being switched off stays on until the transition completes.
    pub fn lerp(start: &Self, end: &Self, progress: f32) -> Self {
        let progress = progress.clamp(0.0, 1.0);
        if progress >= 1.0 {
            return *end;
        }
        Self {
            state: start.state || end.state,
            brightness: start.brightness + (end.brightness - start.brightness) * progress,
            color_temperature: start.color_temperature
                + (end.color_temperature - start.color_temperature) * progress,
        }
    }
}

impl Default for LightColorValues {
    fn default() -> Self {
        Self {
            state: false,
            brightness: 1.0,
            color_temperature: 370.0,
        }
    }
}

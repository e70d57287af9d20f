//! Accessory information supplied by the application.
//!
//! Model, manufacturer and revisions are the same for every light the
//! bridge publishes; name and serial number come from each light.

use serde::{Deserialize, Serialize};

/// HAP protocol version advertised by published accessories.
pub const PROTOCOL_VERSION: &str = "1.1.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessoryInfo {
    pub model: String,
    pub manufacturer: String,
    pub firmware_revision: String,
    pub hardware_revision: Option<String>,
}

impl Default for AccessoryInfo {
    fn default() -> Self {
        Self {
            model: "HAP-LIGHT".to_string(),
            manufacturer: "hap-light-bridge".to_string(),
            firmware_revision: env!("CARGO_PKG_VERSION").to_string(),
            hardware_revision: None,
        }
    }
}

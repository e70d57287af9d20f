//! Outbound path: light state to characteristic values.
//!
//! Runs whenever a published light reaches its target state, whatever
//! caused the change (a controller write, a physical button, an
//! automation). Characteristics are only a cache of the light's state, so
//! the projector re-reads the light and overwrites them.
//!
//! Every lookup is soft: an unknown light, a missing accessory or a missing
//! service is skipped silently. Listener registration and accessory
//! publication happen in the same setup sequence, so a miss here is an
//! ordering race, not an error.

use super::index::AccessoryIndex;
use crate::hap::uuid::{CHAR_BRIGHTNESS, CHAR_COLOR_TEMPERATURE, CHAR_ON, SERV_LIGHTBULB};
use crate::hap::{HapBridge, HapValue, MIREDS_MAX, MIREDS_MIN, Service};
use crate::light::{ColorCapability, LightState};
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

/// Brightness fraction as the integer percent shown by controllers.
pub fn brightness_percent(brightness: f32) -> i32 {
    (brightness * 100.0).round().clamp(0.0, 100.0) as i32
}

/// Color temperature as the integer mireds accepted by controllers.
pub fn mireds_value(color_temperature: f32) -> u32 {
    (color_temperature.round() as u32).clamp(MIREDS_MIN, MIREDS_MAX)
}

/// Pushes light state into the accessory's characteristics.
#[derive(Clone)]
pub struct StateProjector {
    hap: Arc<HapBridge>,
    index: Arc<AccessoryIndex>,
}

impl StateProjector {
    /// Create a projector writing into `hap`, resolving lights through `index`.
    pub fn new(hap: Arc<HapBridge>, index: Arc<AccessoryIndex>) -> Self {
        Self { hap, index }
    }

    /// Project the light's current values onto its lightbulb service.
    pub fn on_light_update(&self, light: &LightState) {
        let Some(aid) = self.index.aid_of(light.object_id_hash()) else {
            return;
        };
        let Some(accessory) = self.hap.get_by_aid(aid) else {
            return;
        };
        let Some(service) = accessory.get_serv_by_type(SERV_LIGHTBULB) else {
            return;
        };

        let values = light.current_values();
        let traits = light.traits();
        debug!("'{}': projecting {:?} onto aid {}", light.name(), values, aid);

        push(service, CHAR_ON, HapValue::Bool(values.get_state()));

        if traits.supports(ColorCapability::Brightness) {
            push(
                service,
                CHAR_BRIGHTNESS,
                HapValue::Int(brightness_percent(values.get_brightness())),
            );
        }

        if traits.supports(ColorCapability::ColorTemperature) {
            push(
                service,
                CHAR_COLOR_TEMPERATURE,
                HapValue::UInt(mireds_value(values.get_color_temperature())),
            );
        }
    }
}

fn push(service: &Service, type_uuid: Uuid, value: HapValue) {
    if let Some(characteristic) = service.get_char_by_type(type_uuid) {
        characteristic.update_value(value);
    }
}

//! Inbound path: controller writes to light commands.

use crate::hap::uuid::{CHAR_BRIGHTNESS, CHAR_COLOR_TEMPERATURE, CHAR_ON};
use crate::hap::{HapStatus, HapValue, WriteRequest};
use crate::light::{ColorCapability, LightState};
use log::debug;
use strum::{EnumIter, IntoEnumIterator};
use uuid::Uuid;

/// Characteristics of the lightbulb service that map to light commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum LightCharacteristic {
    On,
    Brightness,
    ColorTemperature,
}

impl LightCharacteristic {
    pub fn from_type(type_uuid: Uuid) -> Option<Self> {
        Self::iter().find(|kind| kind.type_uuid() == type_uuid)
    }

    pub fn type_uuid(self) -> Uuid {
        match self {
            Self::On => CHAR_ON,
            Self::Brightness => CHAR_BRIGHTNESS,
            Self::ColorTemperature => CHAR_COLOR_TEMPERATURE,
        }
    }

    /// Capability the light must declare for this characteristic to exist.
    pub fn capability(self) -> ColorCapability {
        match self {
            Self::On => ColorCapability::OnOff,
            Self::Brightness => ColorCapability::Brightness,
            Self::ColorTemperature => ColorCapability::ColorTemperature,
        }
    }
}

/// Apply a batch of writes to `light`, in order, one command per request.
///
/// Recognized writes are performed with `save`, echoed into the
/// characteristic and marked `Success`. Anything else, including a
/// characteristic the light has no capability for, is marked
/// `ResourceAbsent` and leaves the light untouched. Earlier requests are
/// never rolled back. The batch itself always succeeds.
pub fn handle_writes(requests: &mut [WriteRequest<'_>], light: &LightState) -> HapStatus {
    let traits = light.traits();

    for write in requests.iter_mut() {
        let kind = LightCharacteristic::from_type(write.characteristic.type_uuid())
            .filter(|kind| traits.supports(kind.capability()));

        let call = match (kind, &write.value) {
            (Some(LightCharacteristic::On), HapValue::Bool(on)) => {
                if *on {
                    light.turn_on()
                } else {
                    light.turn_off()
                }
            }
            (Some(LightCharacteristic::Brightness), HapValue::Int(percent)) => {
                light.make_call().set_brightness(*percent as f32 / 100.0)
            }
            (Some(LightCharacteristic::ColorTemperature), HapValue::UInt(mireds)) => {
                light.make_call().set_color_temperature(*mireds as f32)
            }
            _ => {
                debug!(
                    "'{}': no handler for characteristic {} (iid {})",
                    light.name(),
                    write.characteristic.type_uuid(),
                    write.characteristic.iid()
                );
                write.status = HapStatus::ResourceAbsent;
                continue;
            }
        };

        debug!(
            "'{}': iid {} <- {:?}",
            light.name(),
            write.characteristic.iid(),
            write.value
        );
        call.set_save(true).perform();
        write.characteristic.update_value(write.value.clone());
        write.status = HapStatus::Success;
    }

    HapStatus::Success
}

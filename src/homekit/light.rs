//! Publishing lights as HomeKit accessories.
//!
//! `LightPublisher` creates one accessory per light with a single lightbulb
//! service whose characteristics match the light's capabilities, installs
//! the inbound write handler and subscribes the outbound projector.

use super::index::{AccessoryIndex, LinkedLight};
use super::info::{AccessoryInfo, PROTOCOL_VERSION};
use super::projector::{StateProjector, brightness_percent, mireds_value};
use super::write::handle_writes;
use crate::error::Result;
use crate::hap::{
    Accessory, AccessoryConfig, Aid, Category, Characteristic, HapBridge, HapStatus, Service,
};
use crate::light::{ColorCapability, LightState};
use log::info;
use std::sync::Arc;

const TAG: &str = "LightEntity";

fn acc_identify(accessory: &Accessory) -> HapStatus {
    info!("[{}] Accessory identified: '{}'", TAG, accessory.name());
    HapStatus::Success
}

/// Publishes lights on a HAP bridge and keeps them in sync.
pub struct LightPublisher {
    hap: Arc<HapBridge>,
    index: Arc<AccessoryIndex>,
    projector: StateProjector,
    info: AccessoryInfo,
}

impl LightPublisher {
    /// Create a publisher for `hap`, stamping every accessory with `info`.
    pub fn new(hap: Arc<HapBridge>, info: AccessoryInfo) -> Self {
        let index = Arc::new(AccessoryIndex::new());
        let projector = StateProjector::new(hap.clone(), index.clone());
        Self {
            hap,
            index,
            projector,
            info,
        }
    }

    /// The bridge accessories are published on.
    pub fn hap(&self) -> &Arc<HapBridge> {
        &self.hap
    }

    /// Published lights by identity hash.
    pub fn index(&self) -> &AccessoryIndex {
        &self.index
    }

    /// The projector subscribed to published lights.
    pub fn projector(&self) -> &StateProjector {
        &self.projector
    }

    /// Aid a light is (or would be) published under.
    pub fn aid_for(light: &LightState) -> Aid {
        HapBridge::unique_aid(&light.object_id_hash().to_string())
    }

    /// Publish `light` as a bridged accessory.
    ///
    /// Errors from the accessory table (a light already published under the
    /// same identity) are returned unchanged and leave nothing subscribed.
    pub fn publish(&self, light: &Arc<LightState>) -> Result<Aid> {
        let name = light.name().to_string();
        let serial_num = light.object_id_hash().to_string();
        let traits = light.traits();
        let values = light.current_values();

        let mut accessory = Accessory::new(AccessoryConfig {
            name: name.clone(),
            model: self.info.model.clone(),
            manufacturer: self.info.manufacturer.clone(),
            serial_num: serial_num.clone(),
            fw_rev: self.info.firmware_revision.clone(),
            hw_rev: self.info.hardware_revision.clone(),
            pv: PROTOCOL_VERSION.to_string(),
            cid: Category::Bridge,
            identify_routine: acc_identify,
        });

        let mut service = Service::lightbulb(values.get_state());
        service.add_char(Characteristic::name(name.clone()));

        if traits.supports(ColorCapability::Brightness) {
            service.add_char(Characteristic::brightness(brightness_percent(
                values.get_brightness(),
            )));
        }

        if traits.supports(ColorCapability::ColorTemperature) {
            service.add_char(Characteristic::color_temperature(mireds_value(
                values.get_color_temperature(),
            )));
        }

        // The light is owned by the application; the accessory only refers to it
        let context = Arc::downgrade(light);
        let projector = self.projector.clone();
        service.set_write_callback(move |requests| match context.upgrade() {
            Some(light) => {
                let status = handle_writes(requests, &light);
                // Echoes carry the raw written values; a settled light may have
                // clamped them, so its state is projected over the echoes
                if !light.is_internal() && !light.is_transitioning() {
                    projector.on_light_update(&light);
                }
                status
            }
            None => {
                for request in requests.iter_mut() {
                    request.status = HapStatus::ResourceAbsent;
                }
                HapStatus::Success
            }
        });
        accessory.add_service(service);

        let aid = self.hap.add_bridged_accessory(accessory, Self::aid_for(light))?;

        let listener = (!light.is_internal()).then(|| {
            let projector = self.projector.clone();
            light.add_target_state_reached_listener(move |light| projector.on_light_update(light))
        });
        self.index
            .insert(light.object_id_hash(), LinkedLight { aid, listener });

        info!("[{}] Light '{}' linked to HomeKit", TAG, name);
        Ok(aid)
    }

    /// Undo [`publish`](Self::publish): unsubscribe the listener and remove
    /// the accessory. Returns `false` if the light was not published.
    pub fn unlink(&self, light: &LightState) -> bool {
        let Some(linked) = self.index.remove(light.object_id_hash()) else {
            return false;
        };
        if let Some(listener) = linked.listener {
            light.remove_target_state_reached_listener(listener);
        }
        self.hap.remove_bridged_accessory(linked.aid);
        info!("[{}] Light '{}' unlinked from HomeKit", TAG, light.name());
        true
    }
}

//! Accessory table of a HAP bridge.
//!
//! Holds every bridged accessory by aid and performs controller-side
//! operations on them: reads, batched writes and identify. Accessories are
//! shared as `Arc`s and the table lock is never held while a write callback
//! or identify routine runs, so callbacks are free to look accessories up
//! again.

use super::accessory::{Accessory, Aid};
use super::characteristic::{Characteristic, Perms};
use super::service::WriteRequest;
use super::uuid::{CHAR_IDENTIFY, short_form};
use super::value::{CharFormat, HapStatus, HapValue};
use crate::error::{BridgeError, Result};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aid of the bridge accessory itself.
pub const BRIDGE_AID: Aid = 1;

/// The accessory table.
#[derive(Default)]
pub struct HapBridge {
    accessories: RwLock<BTreeMap<Aid, Arc<Accessory>>>,
}

impl HapBridge {
    /// Create an empty accessory table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive an aid from a stable identifier.
    ///
    /// The same identifier always yields the same aid. 32-bit FNV-1a,
    /// moved off 0 and the bridge's own aid.
    pub fn unique_aid(identifier: &str) -> Aid {
        let hash = identifier.bytes().fold(2_166_136_261u32, |hash, byte| {
            (hash ^ u32::from(byte)).wrapping_mul(16_777_619)
        });
        if hash <= BRIDGE_AID { hash + 2 } else { hash }
    }

    /// Register an accessory under `aid`.
    pub fn add_bridged_accessory(&self, mut accessory: Accessory, aid: Aid) -> Result<Aid> {
        let mut accessories = self.accessories.write();
        if aid == BRIDGE_AID || accessories.contains_key(&aid) {
            return Err(BridgeError::DuplicateAccessory(aid));
        }
        accessory.set_aid(aid);
        info!("[HAP] Bridged accessory '{}' added with aid {}", accessory.name(), aid);
        accessories.insert(aid, Arc::new(accessory));
        Ok(aid)
    }

    /// Remove an accessory. Returns it if it was registered.
    pub fn remove_bridged_accessory(&self, aid: Aid) -> Option<Arc<Accessory>> {
        let removed = self.accessories.write().remove(&aid);
        if let Some(accessory) = &removed {
            info!("[HAP] Bridged accessory '{}' removed (aid {})", accessory.name(), aid);
        }
        removed
    }

    /// Accessory registered under `aid`.
    pub fn get_by_aid(&self, aid: Aid) -> Option<Arc<Accessory>> {
        self.accessories.read().get(&aid).cloned()
    }

    /// Number of bridged accessories.
    pub fn accessory_count(&self) -> usize {
        self.accessories.read().len()
    }

    /// Read a characteristic's cached value.
    pub fn read(&self, aid: Aid, iid: u64) -> std::result::Result<HapValue, HapStatus> {
        let accessory = self.get_by_aid(aid).ok_or(HapStatus::ResourceAbsent)?;
        let (_, characteristic) = accessory.find_char(iid).ok_or(HapStatus::ResourceAbsent)?;
        if !characteristic.perms().contains(Perms::READ) {
            return Err(HapStatus::WriteOnly);
        }
        Ok(characteristic.value())
    }

    /// Ask an accessory to identify itself.
    pub fn identify(&self, aid: Aid) -> HapStatus {
        match self.get_by_aid(aid) {
            Some(accessory) => accessory.identify(),
            None => HapStatus::ResourceAbsent,
        }
    }

    /// Perform a controller write of `(iid, value)` pairs on one accessory.
    ///
    /// Requests that fail validation are answered here; the rest are handed
    /// to their service's write callback as one ordered batch per service.
    /// Returns one status per request, in request order.
    pub fn write(&self, aid: Aid, writes: &[(u64, HapValue)]) -> Vec<(u64, HapStatus)> {
        let Some(accessory) = self.get_by_aid(aid) else {
            return writes
                .iter()
                .map(|(iid, _)| (*iid, HapStatus::ResourceAbsent))
                .collect();
        };

        let mut statuses = vec![HapStatus::CommunicationFailure; writes.len()];
        // Per service: (index into `writes`, request)
        let mut batches: Vec<(u64, Vec<(usize, WriteRequest<'_>)>)> = Vec::new();

        for (index, (iid, value)) in writes.iter().enumerate() {
            let Some((service, characteristic)) = accessory.find_char(*iid) else {
                statuses[index] = HapStatus::ResourceAbsent;
                continue;
            };

            if characteristic.type_uuid() == CHAR_IDENTIFY {
                statuses[index] = accessory.identify();
                continue;
            }

            match validate(characteristic, value.clone()) {
                Ok(value) => {
                    let request = WriteRequest {
                        characteristic,
                        value,
                        status: HapStatus::CommunicationFailure,
                    };
                    match batches.iter_mut().find(|(s, _)| *s == service.iid()) {
                        Some((_, batch)) => batch.push((index, request)),
                        None => batches.push((service.iid(), vec![(index, request)])),
                    }
                }
                Err(status) => statuses[index] = status,
            }
        }

        for (service_iid, batch) in batches {
            let Some(callback) = accessory
                .services()
                .iter()
                .find(|s| s.iid() == service_iid)
                .and_then(|s| s.write_callback())
            else {
                for (index, _) in batch {
                    statuses[index] = HapStatus::ReadOnly;
                }
                continue;
            };

            let (indices, mut requests): (Vec<usize>, Vec<WriteRequest<'_>>) =
                batch.into_iter().unzip();
            debug!(
                "[HAP] aid {}: dispatching {} write(s) to service {}",
                aid,
                requests.len(),
                service_iid
            );
            let result = callback(requests.as_mut_slice());
            if result != HapStatus::Success {
                warn!("[HAP] aid {}: write callback returned {}", aid, result);
            }
            for (index, request) in indices.into_iter().zip(requests) {
                statuses[index] = request.status;
            }
        }

        writes
            .iter()
            .zip(statuses)
            .map(|((iid, _), status)| (*iid, status))
            .collect()
    }

    /// The accessory database as served to controllers.
    pub fn accessories_json(&self) -> serde_json::Value {
        let accessories = self.accessories.read();
        let database = AccessoryDatabase {
            accessories: accessories.values().map(|a| AccessoryView::from(a.as_ref())).collect(),
        };
        // Plain data, serialisation cannot fail
        serde_json::to_value(database).unwrap_or_default()
    }
}

fn validate(characteristic: &Characteristic, value: HapValue) -> std::result::Result<HapValue, HapStatus> {
    if !characteristic.perms().contains(Perms::WRITE) {
        return Err(HapStatus::ReadOnly);
    }
    value
        .coerce(characteristic.format(), characteristic.constraints())
        .ok_or(HapStatus::InvalidValue)
}

#[derive(Serialize)]
struct AccessoryDatabase {
    accessories: Vec<AccessoryView>,
}

#[derive(Serialize)]
struct AccessoryView {
    aid: Aid,
    services: Vec<ServiceView>,
}

#[derive(Serialize)]
struct ServiceView {
    iid: u64,
    #[serde(rename = "type")]
    type_id: String,
    characteristics: Vec<CharacteristicView>,
}

#[derive(Serialize)]
struct CharacteristicView {
    iid: u64,
    #[serde(rename = "type")]
    type_id: String,
    perms: Vec<&'static str>,
    format: CharFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<HapValue>,
    #[serde(rename = "minValue", skip_serializing_if = "Option::is_none")]
    min_value: Option<f64>,
    #[serde(rename = "maxValue", skip_serializing_if = "Option::is_none")]
    max_value: Option<f64>,
}

impl From<&Accessory> for AccessoryView {
    fn from(accessory: &Accessory) -> Self {
        Self {
            aid: accessory.aid(),
            services: accessory
                .services()
                .iter()
                .map(|service| ServiceView {
                    iid: service.iid(),
                    type_id: short_form(&service.type_uuid()),
                    characteristics: service
                        .characteristics()
                        .iter()
                        .map(|c| CharacteristicView {
                            iid: c.iid(),
                            type_id: short_form(&c.type_uuid()),
                            perms: c.perms().tags(),
                            format: c.format(),
                            value: c.perms().contains(Perms::READ).then(|| c.value()),
                            min_value: c.constraints().map(|r| r.min),
                            max_value: c.constraints().map(|r| r.max),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hap::accessory::{AccessoryConfig, Category};
    use crate::hap::service::Service;
    use crate::hap::uuid::{CHAR_BRIGHTNESS, CHAR_NAME, CHAR_ON, SERV_LIGHTBULB};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static IDENTIFIED: AtomicUsize = AtomicUsize::new(0);

    fn identify(_: &Accessory) -> HapStatus {
        IDENTIFIED.fetch_add(1, Ordering::SeqCst);
        HapStatus::Success
    }

    fn accessory(name: &str) -> Accessory {
        Accessory::new(AccessoryConfig {
            name: name.into(),
            model: "HAP-LIGHT".into(),
            manufacturer: "Acme".into(),
            serial_num: "1".into(),
            fw_rev: "1.0.0".into(),
            hw_rev: None,
            pv: "1.1.0".into(),
            cid: Category::Bridge,
            identify_routine: identify,
        })
    }

    /// Accessory whose lightbulb callback accepts everything and echoes it.
    fn echo_light() -> Accessory {
        let mut service = Service::lightbulb(false);
        service.add_char(Characteristic::name("Lamp"));
        service.add_char(Characteristic::brightness(0));
        service.set_write_callback(|requests| {
            for request in requests.iter_mut() {
                request.characteristic.update_value(request.value.clone());
                request.status = HapStatus::Success;
            }
            HapStatus::Success
        });
        let mut accessory = accessory("Lamp");
        accessory.add_service(service);
        accessory
    }

    fn iid_of(bridge: &HapBridge, aid: Aid, type_uuid: uuid::Uuid) -> u64 {
        bridge
            .get_by_aid(aid)
            .and_then(|a| {
                a.get_serv_by_type(SERV_LIGHTBULB)
                    .and_then(|s| s.get_char_by_type(type_uuid))
                    .map(Characteristic::iid)
            })
            .unwrap()
    }

    #[test]
    fn test_unique_aid_is_deterministic() {
        let a = HapBridge::unique_aid("12345");
        assert_eq!(a, HapBridge::unique_aid("12345"));
        assert_ne!(a, HapBridge::unique_aid("12346"));
        assert!(a > BRIDGE_AID);
    }

    #[test]
    fn test_duplicate_aid_rejected() {
        let bridge = HapBridge::new();
        bridge.add_bridged_accessory(accessory("A"), 7).unwrap();
        let err = bridge.add_bridged_accessory(accessory("B"), 7).unwrap_err();
        assert!(matches!(err, BridgeError::DuplicateAccessory(7)));
        assert!(bridge.add_bridged_accessory(accessory("C"), BRIDGE_AID).is_err());
        assert_eq!(bridge.accessory_count(), 1);
    }

    #[test]
    fn test_write_dispatches_and_validates() {
        let bridge = HapBridge::new();
        let aid = bridge.add_bridged_accessory(echo_light(), 42).unwrap();
        let on = iid_of(&bridge, aid, CHAR_ON);
        let brightness = iid_of(&bridge, aid, CHAR_BRIGHTNESS);
        let name = iid_of(&bridge, aid, CHAR_NAME);

        let statuses = bridge.write(
            aid,
            &[
                (on, HapValue::Int(1)),
                (brightness, HapValue::Int(150)),
                (name, HapValue::String("Other".into())),
                (999, HapValue::Bool(true)),
            ],
        );

        assert_eq!(
            statuses,
            vec![
                (on, HapStatus::Success),
                (brightness, HapStatus::InvalidValue),
                (name, HapStatus::ReadOnly),
                (999, HapStatus::ResourceAbsent),
            ]
        );
        assert_eq!(bridge.read(aid, on), Ok(HapValue::Bool(true)));
        assert_eq!(bridge.read(aid, brightness), Ok(HapValue::Int(0)));
    }

    #[test]
    fn test_write_to_missing_accessory() {
        let bridge = HapBridge::new();
        assert_eq!(
            bridge.write(5, &[(9, HapValue::Bool(true))]),
            vec![(9, HapStatus::ResourceAbsent)]
        );
    }

    #[test]
    fn test_identify() {
        let bridge = HapBridge::new();
        let aid = bridge.add_bridged_accessory(accessory("A"), 3).unwrap();
        let before = IDENTIFIED.load(Ordering::SeqCst);

        assert_eq!(bridge.identify(aid), HapStatus::Success);
        // Identify characteristic write goes to the same routine (iid 2)
        assert_eq!(bridge.write(aid, &[(2, HapValue::Bool(true))]), vec![(2, HapStatus::Success)]);
        assert!(IDENTIFIED.load(Ordering::SeqCst) >= before + 2);
        assert_eq!(bridge.read(aid, 2), Err(HapStatus::WriteOnly));

        assert_eq!(bridge.identify(99), HapStatus::ResourceAbsent);
    }

    #[test]
    fn test_accessories_json() {
        let bridge = HapBridge::new();
        let aid = bridge.add_bridged_accessory(echo_light(), 42).unwrap();
        let json = bridge.accessories_json();

        let accessory = &json["accessories"][0];
        assert_eq!(accessory["aid"], aid);
        let bulb = &accessory["services"][1];
        assert_eq!(bulb["type"], "43");
        assert_eq!(bulb["characteristics"][0]["type"], "25");
        assert_eq!(bulb["characteristics"][0]["value"], false);
        assert_eq!(bulb["characteristics"][2]["maxValue"], 100.0);
    }

    #[test]
    fn test_remove() {
        let bridge = HapBridge::new();
        let aid = bridge.add_bridged_accessory(accessory("A"), 3).unwrap();
        assert!(bridge.remove_bridged_accessory(aid).is_some());
        assert!(bridge.get_by_aid(aid).is_none());
        assert!(bridge.remove_bridged_accessory(aid).is_none());
    }
}

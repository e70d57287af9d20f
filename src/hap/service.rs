//! HAP services: a typed group of characteristics with one write callback.

use super::characteristic::Characteristic;
use super::uuid::{SERV_ACCESSORY_INFORMATION, SERV_LIGHTBULB};
use super::value::{HapStatus, HapValue};
use uuid::Uuid;

/// One entry of a write batch handed to a service's write callback.
///
/// `status` is the output slot: the callback must fill it for every request.
pub struct WriteRequest<'a> {
    pub characteristic: &'a Characteristic,
    pub value: HapValue,
    pub status: HapStatus,
}

/// Callback receiving an ordered batch of writes for one service.
///
/// The return value is the overall result of processing the batch;
/// per-item outcomes go into each request's `status`.
pub type WriteCallback = Box<dyn Fn(&mut [WriteRequest<'_>]) -> HapStatus + Send + Sync>;

/// A service and its characteristics.
pub struct Service {
    iid: u64,
    type_uuid: Uuid,
    characteristics: Vec<Characteristic>,
    write_callback: Option<WriteCallback>,
}

impl Service {
    /// Empty service of the given type, without a write callback.
    pub fn new(type_uuid: Uuid) -> Self {
        Self {
            iid: 0,
            type_uuid,
            characteristics: Vec::new(),
            write_callback: None,
        }
    }

    /// Lightbulb service seeded with its mandatory on/off characteristic.
    pub fn lightbulb(on: bool) -> Self {
        let mut service = Self::new(SERV_LIGHTBULB);
        service.add_char(Characteristic::on(on));
        service
    }

    pub(crate) fn accessory_information() -> Self {
        Self::new(SERV_ACCESSORY_INFORMATION)
    }

    /// Append a characteristic. Iids are assigned when the service is added to an accessory.
    pub fn add_char(&mut self, characteristic: Characteristic) {
        self.characteristics.push(characteristic);
    }

    /// Install the handler that receives controller writes to this service.
    pub fn set_write_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut [WriteRequest<'_>]) -> HapStatus + Send + Sync + 'static,
    {
        self.write_callback = Some(Box::new(callback));
    }

    /// Instance id, unique within the accessory.
    pub fn iid(&self) -> u64 {
        self.iid
    }

    /// Service type.
    pub fn type_uuid(&self) -> Uuid {
        self.type_uuid
    }

    /// Characteristics in insertion order.
    pub fn characteristics(&self) -> &[Characteristic] {
        &self.characteristics
    }

    /// First characteristic of the given type, if the service has one.
    pub fn get_char_by_type(&self, type_uuid: Uuid) -> Option<&Characteristic> {
        self.characteristics
            .iter()
            .find(|c| c.type_uuid() == type_uuid)
    }

    /// Characteristic with the given instance id.
    pub fn get_char_by_iid(&self, iid: u64) -> Option<&Characteristic> {
        self.characteristics.iter().find(|c| c.iid() == iid)
    }

    pub(crate) fn write_callback(&self) -> Option<&WriteCallback> {
        self.write_callback.as_ref()
    }

    /// Assign instance ids starting at `next`; returns the next free id.
    pub(crate) fn assign_iids(&mut self, mut next: u64) -> u64 {
        self.iid = next;
        next += 1;
        for characteristic in &mut self.characteristics {
            characteristic.set_iid(next);
            next += 1;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hap::uuid::{CHAR_BRIGHTNESS, CHAR_ON};

    #[test]
    fn test_lightbulb_has_on_only() {
        let service = Service::lightbulb(true);
        assert_eq!(service.type_uuid(), SERV_LIGHTBULB);
        assert_eq!(service.characteristics().len(), 1);
        assert_eq!(
            service.get_char_by_type(CHAR_ON).map(Characteristic::value),
            Some(HapValue::Bool(true))
        );
        assert!(service.get_char_by_type(CHAR_BRIGHTNESS).is_none());
    }

    #[test]
    fn test_assign_iids() {
        let mut service = Service::lightbulb(false);
        service.add_char(Characteristic::brightness(50));

        let next = service.assign_iids(10);
        assert_eq!(service.iid(), 10);
        assert_eq!(service.get_char_by_type(CHAR_ON).unwrap().iid(), 11);
        assert_eq!(service.get_char_by_iid(12).unwrap().type_uuid(), CHAR_BRIGHTNESS);
        assert_eq!(next, 13);
    }
}

//! HAP characteristics.
//!
//! A characteristic is one typed, addressable value inside a service. Its
//! cached value can be read by controllers and updated from either side;
//! every change bumps a version counter so subscribers can detect it.

use super::uuid::{
    CHAR_BRIGHTNESS, CHAR_COLOR_TEMPERATURE, CHAR_FIRMWARE_REVISION, CHAR_HARDWARE_REVISION,
    CHAR_IDENTIFY, CHAR_MANUFACTURER, CHAR_MODEL, CHAR_NAME, CHAR_ON, CHAR_SERIAL_NUMBER,
};
use super::value::{CharFormat, Constraints, HapValue};
use log::debug;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Coldest color temperature a controller may request (mireds).
pub const MIREDS_MIN: u32 = 140;
/// Warmest color temperature a controller may request (mireds).
pub const MIREDS_MAX: u32 = 500;

/// Permission bits of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Perms(u8);

impl Perms {
    pub const READ: Perms = Perms(1 << 0);
    pub const WRITE: Perms = Perms(1 << 1);
    pub const NOTIFY: Perms = Perms(1 << 2);
    pub const READ_WRITE_NOTIFY: Perms = Perms(Self::READ.0 | Self::WRITE.0 | Self::NOTIFY.0);

    pub const fn contains(self, other: Perms) -> bool {
        self.0 & other.0 == other.0
    }

    /// Permission tags as listed in the accessory database.
    pub fn tags(self) -> Vec<&'static str> {
        [(Self::READ, "pr"), (Self::WRITE, "pw"), (Self::NOTIFY, "ev")]
            .into_iter()
            .filter(|(perm, _)| self.contains(*perm))
            .map(|(_, tag)| tag)
            .collect()
    }
}

/// A single characteristic.
pub struct Characteristic {
    iid: u64,
    type_uuid: Uuid,
    format: CharFormat,
    perms: Perms,
    constraints: Option<Constraints>,
    value: RwLock<HapValue>,
    version: AtomicU32,
}

impl Characteristic {
    /// Create a characteristic. Its instance id is assigned when the
    /// owning service is added to an accessory.
    pub fn new(type_uuid: Uuid, format: CharFormat, perms: Perms, initial: HapValue) -> Self {
        Self {
            iid: 0,
            type_uuid,
            format,
            perms,
            constraints: None,
            value: RwLock::new(initial),
            version: AtomicU32::new(0),
        }
    }

    /// Restrict numeric values to `[min, max]`.
    pub fn with_constraints(mut self, min: f64, max: f64) -> Self {
        self.constraints = Some(Constraints { min, max });
        self
    }

    /// Name characteristic (static, read-only).
    pub fn name(name: impl Into<String>) -> Self {
        Self::new(CHAR_NAME, CharFormat::String, Perms::READ, HapValue::String(name.into()))
    }

    /// On/off characteristic.
    pub fn on(on: bool) -> Self {
        Self::new(CHAR_ON, CharFormat::Bool, Perms::READ_WRITE_NOTIFY, HapValue::Bool(on))
    }

    /// Brightness characteristic, integer percent `0..=100`.
    pub fn brightness(percent: i32) -> Self {
        Self::new(
            CHAR_BRIGHTNESS,
            CharFormat::Int,
            Perms::READ_WRITE_NOTIFY,
            HapValue::Int(percent),
        )
        .with_constraints(0.0, 100.0)
    }

    /// Color temperature characteristic, mireds `MIREDS_MIN..=MIREDS_MAX`.
    pub fn color_temperature(mireds: u32) -> Self {
        Self::new(
            CHAR_COLOR_TEMPERATURE,
            CharFormat::Uint32,
            Perms::READ_WRITE_NOTIFY,
            HapValue::UInt(mireds),
        )
        .with_constraints(f64::from(MIREDS_MIN), f64::from(MIREDS_MAX))
    }

    /// Identify characteristic (write-only trigger).
    pub fn identify() -> Self {
        Self::new(CHAR_IDENTIFY, CharFormat::Bool, Perms::WRITE, HapValue::Bool(false))
    }

    pub(crate) fn manufacturer(value: &str) -> Self {
        Self::info_string(CHAR_MANUFACTURER, value)
    }

    pub(crate) fn model(value: &str) -> Self {
        Self::info_string(CHAR_MODEL, value)
    }

    pub(crate) fn serial_number(value: &str) -> Self {
        Self::info_string(CHAR_SERIAL_NUMBER, value)
    }

    pub(crate) fn firmware_revision(value: &str) -> Self {
        Self::info_string(CHAR_FIRMWARE_REVISION, value)
    }

    pub(crate) fn hardware_revision(value: &str) -> Self {
        Self::info_string(CHAR_HARDWARE_REVISION, value)
    }

    fn info_string(type_uuid: Uuid, value: &str) -> Self {
        Self::new(type_uuid, CharFormat::String, Perms::READ, HapValue::String(value.to_string()))
    }

    /// Instance id, unique within the accessory.
    pub fn iid(&self) -> u64 {
        self.iid
    }

    pub(crate) fn set_iid(&mut self, iid: u64) {
        self.iid = iid;
    }

    /// Characteristic type.
    pub fn type_uuid(&self) -> Uuid {
        self.type_uuid
    }

    /// Value format.
    pub fn format(&self) -> CharFormat {
        self.format
    }

    /// Controller permissions.
    pub fn perms(&self) -> Perms {
        self.perms
    }

    /// Numeric range, if any.
    pub fn constraints(&self) -> Option<Constraints> {
        self.constraints
    }

    /// Current cached value.
    pub fn value(&self) -> HapValue {
        self.value.read().clone()
    }

    /// Number of times the cached value changed.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Replace the cached value. Increments the version if the value changed.
    pub fn update_value(&self, value: HapValue) {
        let mut current = self.value.write();
        if *current != value {
            debug!("[HAP] iid {}: {:?} -> {:?}", self.iid, *current, value);
            *current = value;
            self.version.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_increments_version_on_change() {
        let on = Characteristic::on(false);
        assert_eq!(on.version(), 0);

        on.update_value(HapValue::Bool(true));
        assert_eq!(on.value(), HapValue::Bool(true));
        assert_eq!(on.version(), 1);

        // Same value doesn't count as a change
        on.update_value(HapValue::Bool(true));
        assert_eq!(on.version(), 1);
    }

    #[test]
    fn test_perm_tags() {
        assert_eq!(Perms::READ_WRITE_NOTIFY.tags(), vec!["pr", "pw", "ev"]);
        assert_eq!(Perms::READ.tags(), vec!["pr"]);
        assert!(!Characteristic::name("Lamp").perms().contains(Perms::WRITE));
    }

    #[test]
    fn test_brightness_constraints() {
        let brightness = Characteristic::brightness(10);
        assert_eq!(
            brightness.constraints(),
            Some(Constraints {
                min: 0.0,
                max: 100.0
            })
        );
        assert_eq!(brightness.format(), CharFormat::Int);
    }
}

//! HAP type identifiers.
//!
//! Apple-defined services and characteristics share the base UUID
//! `0000XXXX-0000-1000-8000-0026BB765291`; only the leading 32 bits differ.

use uuid::Uuid;

const APPLE_BASE_TAIL: [u8; 8] = [0x80, 0x00, 0x00, 0x26, 0xBB, 0x76, 0x52, 0x91];

/// Build an Apple-defined type UUID from its short form.
pub const fn apple_uuid(short: u32) -> Uuid {
    Uuid::from_fields(short, 0x0000, 0x1000, &APPLE_BASE_TAIL)
}

/// Short form used in the accessory database (`"25"` for On), or the full
/// upper-case UUID for types outside the Apple base.
pub fn short_form(uuid: &Uuid) -> String {
    let (short, d2, d3, tail) = uuid.as_fields();
    if d2 == 0 && d3 == 0x1000 && *tail == APPLE_BASE_TAIL {
        format!("{short:X}")
    } else {
        uuid.hyphenated().to_string().to_uppercase()
    }
}

// public.hap.service.accessory-information
pub const SERV_ACCESSORY_INFORMATION: Uuid = apple_uuid(0x3E);
// public.hap.service.lightbulb
pub const SERV_LIGHTBULB: Uuid = apple_uuid(0x43);

/// public.hap.characteristic.brightness
pub const CHAR_BRIGHTNESS: Uuid = apple_uuid(0x08);
/// public.hap.characteristic.identify
pub const CHAR_IDENTIFY: Uuid = apple_uuid(0x14);
/// public.hap.characteristic.manufacturer
pub const CHAR_MANUFACTURER: Uuid = apple_uuid(0x20);
/// public.hap.characteristic.model
pub const CHAR_MODEL: Uuid = apple_uuid(0x21);
/// public.hap.characteristic.name
pub const CHAR_NAME: Uuid = apple_uuid(0x23);
/// public.hap.characteristic.on
pub const CHAR_ON: Uuid = apple_uuid(0x25);
/// public.hap.characteristic.serial-number
pub const CHAR_SERIAL_NUMBER: Uuid = apple_uuid(0x30);
/// public.hap.characteristic.firmware.revision
pub const CHAR_FIRMWARE_REVISION: Uuid = apple_uuid(0x52);
/// public.hap.characteristic.hardware.revision
pub const CHAR_HARDWARE_REVISION: Uuid = apple_uuid(0x53);
/// public.hap.characteristic.color-temperature
pub const CHAR_COLOR_TEMPERATURE: Uuid = apple_uuid(0xCE);

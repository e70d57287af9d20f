//! HAP accessory object model.
//!
//! The subset of a HomeKit Accessory Protocol stack a bridge needs:
//! - `accessory`: accessories, their configuration and identify routine
//! - `service`: services, write callbacks and write requests
//! - `characteristic`: typed values with permissions and constraints
//! - `bridge`: the accessory table, controller reads/writes, accessory database
//! - `uuid` / `value`: type identifiers, value formats and status codes

pub mod accessory;
pub mod bridge;
pub mod characteristic;
pub mod service;
pub mod uuid;
pub mod value;

pub use accessory::{Accessory, AccessoryConfig, Aid, Category, IdentifyRoutine};
pub use bridge::{BRIDGE_AID, HapBridge};
pub use characteristic::{Characteristic, MIREDS_MAX, MIREDS_MIN, Perms};
pub use service::{Service, WriteCallback, WriteRequest};
pub use value::{CharFormat, HapStatus, HapValue};

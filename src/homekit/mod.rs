//! HomeKit integration for lights.
//!
//! Bridges [`LightState`](crate::light::LightState) devices onto a
//! [`HapBridge`](crate::hap::HapBridge):
//! - `light`: publishes one accessory per light and unlinks it again
//! - `write`: controller writes to light commands
//! - `projector`: light state back to characteristic values
//! - `index`: identity hash to aid and listener
//! - `info`: accessory information shared by all lights

pub mod index;
pub mod info;
pub mod light;
pub mod projector;
pub mod write;

pub use index::{AccessoryIndex, LinkedLight};
pub use info::{AccessoryInfo, PROTOCOL_VERSION};
pub use light::LightPublisher;
pub use projector::{StateProjector, brightness_percent, mireds_value};
pub use write::{LightCharacteristic, handle_writes};

//! Light device abstraction.
//!
//! This module models a controllable light the way the bridge consumes it:
//! - `state`: identity, current/target values, target-state-reached listeners
//! - `call`: fluent command builder (`make_call()...perform()`)
//! - `traits`: declared capabilities (on/off, brightness, color temperature)
//! - `values`: value snapshots and interpolation

pub mod call;
pub mod state;
pub mod traits;
pub mod values;

pub use call::LightCall;
pub use state::{ListenerId, LightState, TargetStateReachedListener, fnv1_hash, object_id_from_name};
pub use traits::{ColorCapability, LightTraits};
pub use values::LightColorValues;

//! HAP light bridge library.
//!
//! This library exposes lights as bridged HomeKit accessories and keeps
//! them in sync in both directions.

pub mod config;
pub mod error;
pub mod hap;
pub mod homekit;
pub mod light;

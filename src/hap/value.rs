//! Characteristic values, formats and status codes.

use serde::Serialize;
use strum::{AsRefStr, Display};

/// A characteristic value as carried by the protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HapValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    String(String),
}

/// Value format of a characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CharFormat {
    Bool,
    Uint8,
    Uint32,
    Int,
    Float,
    String,
}

/// Inclusive numeric range a characteristic accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constraints {
    pub min: f64,
    pub max: f64,
}

impl HapValue {
    /// Convert a controller-supplied value into the canonical shape for
    /// `format`, checking `constraints` on the way.
    ///
    /// Returns `None` if the value cannot represent the format
    /// (e.g. `2` for a bool, a string for a number, or out of range).
    pub fn coerce(self, format: CharFormat, constraints: Option<Constraints>) -> Option<Self> {
        let value = match (format, self) {
            (CharFormat::Bool, HapValue::Bool(b)) => HapValue::Bool(b),
            (CharFormat::Bool, HapValue::Int(i @ (0 | 1))) => HapValue::Bool(i == 1),
            (CharFormat::Bool, HapValue::UInt(u @ (0 | 1))) => HapValue::Bool(u == 1),
            (CharFormat::Int, HapValue::Int(i)) => HapValue::Int(i),
            (CharFormat::Int, HapValue::UInt(u)) => HapValue::Int(i32::try_from(u).ok()?),
            (CharFormat::Uint8, HapValue::UInt(u)) => HapValue::UInt(u8::try_from(u).ok()?.into()),
            (CharFormat::Uint8, HapValue::Int(i)) => HapValue::UInt(u8::try_from(i).ok()?.into()),
            (CharFormat::Uint32, HapValue::UInt(u)) => HapValue::UInt(u),
            (CharFormat::Uint32, HapValue::Int(i)) => HapValue::UInt(u32::try_from(i).ok()?),
            (CharFormat::Float, HapValue::Float(f)) if f.is_finite() => HapValue::Float(f),
            (CharFormat::Float, HapValue::Int(i)) => HapValue::Float(i as f32),
            (CharFormat::Float, HapValue::UInt(u)) => HapValue::Float(u as f32),
            (CharFormat::String, HapValue::String(s)) => HapValue::String(s),
            _ => return None,
        };

        if let Some(Constraints { min, max }) = constraints
            && let Some(number) = value.as_f64()
            && !(min..=max).contains(&number)
        {
            return None;
        }
        Some(value)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            HapValue::Int(i) => Some(f64::from(*i)),
            HapValue::UInt(u) => Some(f64::from(*u)),
            HapValue::Float(f) => Some(f64::from(*f)),
            HapValue::Bool(_) | HapValue::String(_) => None,
        }
    }
}

/// Per-request status reported back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HapStatus {
    Success,
    CommunicationFailure,
    ResourceBusy,
    ReadOnly,
    WriteOnly,
    ResourceAbsent,
    InvalidValue,
}

impl HapStatus {
    /// Numeric status code as sent on the wire.
    pub fn code(self) -> i32 {
        match self {
            HapStatus::Success => 0,
            HapStatus::CommunicationFailure => -70402,
            HapStatus::ResourceBusy => -70403,
            HapStatus::ReadOnly => -70404,
            HapStatus::WriteOnly => -70405,
            HapStatus::ResourceAbsent => -70409,
            HapStatus::InvalidValue => -70410,
        }
    }
}

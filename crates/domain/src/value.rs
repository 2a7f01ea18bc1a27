//! Value: one reading in a device's append-only history.

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::error::ValidationError;
use crate::id::{DeviceId, ValueId};

/// Maximum length of a smart device reading.
pub const TEXT_MAX_LEN: usize = 255;

/// A typed reading. The variant in use is dictated by the device kind:
/// analog → float, digital → boolean, smart → text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Bool(bool),
    Float(f64),
    Text(String),
}

impl Reading {
    /// Coerce a submitted reading into the type recorded by `kind`.
    ///
    /// Analog accepts numbers and numeric strings; digital accepts booleans,
    /// `0`/`1` and the usual textual spellings; smart accepts text and
    /// renders numbers as text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidReading`] when the reading cannot be
    /// represented for `kind`, or [`ValidationError::TooLong`] for overlong text.
    pub fn conform(self, kind: DeviceKind) -> Result<Self, ValidationError> {
        let invalid = |reason| ValidationError::InvalidReading { kind, reason };
        match (kind, self) {
            (DeviceKind::Analog, Self::Float(value)) if value.is_finite() => {
                Ok(Self::Float(value))
            }
            (DeviceKind::Analog, Self::Text(text)) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Self::Float)
                .ok_or_else(|| invalid("a valid number is required")),
            (DeviceKind::Analog, _) => Err(invalid("a valid number is required")),

            (DeviceKind::Digital, Self::Bool(value)) => Ok(Self::Bool(value)),
            #[allow(clippy::float_cmp)]
            (DeviceKind::Digital, Self::Float(value)) if value == 0.0 || value == 1.0 => {
                Ok(Self::Bool(value == 1.0))
            }
            (DeviceKind::Digital, Self::Text(text)) => parse_bool(&text)
                .map(Self::Bool)
                .ok_or_else(|| invalid("must be a valid boolean")),
            (DeviceKind::Digital, Self::Float(_)) => Err(invalid("must be a valid boolean")),

            (DeviceKind::Smart, Self::Text(text)) => smart_text(text),
            (DeviceKind::Smart, Self::Float(value)) => smart_text(value.to_string()),
            (DeviceKind::Smart, Self::Bool(_)) => Err(invalid("not a valid string")),
        }
    }
}

fn smart_text(text: String) -> Result<Reading, ValidationError> {
    if text.chars().count() > TEXT_MAX_LEN {
        return Err(ValidationError::TooLong {
            field: "value",
            max: TEXT_MAX_LEN,
        });
    }
    Ok(Reading::Text(text))
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A stored reading of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    pub id: ValueId,
    pub kind: DeviceKind,
    #[serde(rename = "device")]
    pub device_id: DeviceId,
    #[serde(rename = "value")]
    pub reading: Reading,
}

/// Data needed to persist a new [`Value`]; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewValue {
    pub kind: DeviceKind,
    pub device_id: DeviceId,
    pub reading: Reading,
}

impl NewValue {
    /// Materialize the stored value once the store assigned an id.
    #[must_use]
    pub fn into_value(self, id: ValueId) -> Value {
        Value {
            id,
            kind: self.kind,
            device_id: self.device_id,
            reading: self.reading,
        }
    }
}

/// Requested modifications of a [`Value`].
#[derive(Debug, Clone, Default)]
pub struct ValueChanges {
    pub device_id: Option<DeviceId>,
    pub reading: Option<Reading>,
}

impl ValueChanges {
    /// Whether every field is supplied, as a full replacement requires.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.device_id.is_some() && self.reading.is_some()
    }

    /// Name of the first missing field, if any.
    #[must_use]
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.device_id.is_none() {
            Some("device")
        } else if self.reading.is_none() {
            Some("value")
        } else {
            None
        }
    }
}

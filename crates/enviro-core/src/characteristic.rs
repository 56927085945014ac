//! Encoding of averaged readings into characteristic values.
//!
//! Layout is fixed by what the gateway reads back:
//!
//! | Quantity    | Bytes | Encoding                 |
//! |-------------|-------|--------------------------|
//! | Temperature | 4     | `f32`, little-endian     |
//! | Humidity    | 4     | `f32`, little-endian     |
//! | Air quality | 2     | `u16`, little-endian     |
//! | Light       | 2     | `u16`, little-endian     |
//!
//! Integer quantities are rounded and saturate at the `u16` range; NaN
//! encodes as zero.

use heapless::Vec;

use crate::sensors::SensorKind;

/// Largest encoded value
pub const MAX_VALUE_LEN: usize = 4;

pub type CharacteristicValue = Vec<u8, MAX_VALUE_LEN>;

/// Encoded length for `kind`
pub const fn value_len(kind: SensorKind) -> usize {
    match kind {
        SensorKind::Temperature | SensorKind::Humidity => 4,
        SensorKind::AirQuality | SensorKind::Light => 2,
    }
}

pub fn encode(kind: SensorKind, value: f32) -> CharacteristicValue {
    let mut out = CharacteristicValue::new();
    // Both arms fit in MAX_VALUE_LEN, so extending never fails
    match kind {
        SensorKind::Temperature | SensorKind::Humidity => {
            let _ = out.extend_from_slice(&value.to_le_bytes());
        }
        SensorKind::AirQuality | SensorKind::Light => {
            let _ = out.extend_from_slice(&saturate_u16(value).to_le_bytes());
        }
    }
    out
}

/// Read back a value written by [`encode`]. `None` if the length is wrong.
pub fn decode(kind: SensorKind, bytes: &[u8]) -> Option<f32> {
    match kind {
        SensorKind::Temperature | SensorKind::Humidity => {
            let raw: [u8; 4] = bytes.try_into().ok()?;
            Some(f32::from_le_bytes(raw))
        }
        SensorKind::AirQuality | SensorKind::Light => {
            let raw: [u8; 2] = bytes.try_into().ok()?;
            Some(u16::from_le_bytes(raw) as f32)
        }
    }
}

fn saturate_u16(value: f32) -> u16 {
    // NaN and non-positive values encode as 0
    if value <= 0.0 || value.is_nan() {
        return 0;
    }

    // Round half up without `f32::round` (std only). Splitting off the
    // fraction is exact, unlike adding 0.5 before truncating.
    let whole = value as u32;
    let fraction = value - whole as f32;
    let rounded = if fraction >= 0.5 {
        whole.saturating_add(1)
    } else {
        whole
    };

    u16::try_from(rounded).unwrap_or(u16::MAX)
}

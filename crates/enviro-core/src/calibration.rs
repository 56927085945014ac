//! Per-quantity calibration offsets.
//!
//! Offsets are applied to raw readings before they enter a smoothing buffer.
//! A stock node ships with every offset at zero; sensors that read
//! consistently high or low get a non-zero offset in the node config.

use serde::{Deserialize, Serialize};

use crate::sensors::{SENSOR_KIND_COUNT, SensorKind};

/// Additive offset for each [`SensorKind`], indexed by [`SensorKind::index`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Calibration {
    offsets: [f32; SENSOR_KIND_COUNT],
}

impl Calibration {
    pub const fn new() -> Self {
        Self {
            offsets: [0.0; SENSOR_KIND_COUNT],
        }
    }

    pub const fn with_offset(mut self, kind: SensorKind, offset: f32) -> Self {
        self.offsets[kind.index()] = offset;
        self
    }

    pub const fn offset(&self, kind: SensorKind) -> f32 {
        self.offsets[kind.index()]
    }

    /// Corrected value for a raw reading of `kind`
    pub fn apply(&self, kind: SensorKind, raw: f32) -> f32 {
        raw + self.offset(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_identity() {
        let calibration = Calibration::default();

        for kind in SensorKind::ALL {
            assert_eq!(calibration.apply(kind, 42.5), 42.5);
        }
    }

    #[test]
    fn test_offset_only_affects_its_kind() {
        let calibration = Calibration::new()
            .with_offset(SensorKind::Temperature, -1.5)
            .with_offset(SensorKind::Humidity, 2.0);

        assert_eq!(calibration.apply(SensorKind::Temperature, 23.0), 21.5);
        assert_eq!(calibration.apply(SensorKind::Humidity, 40.0), 42.0);
        assert_eq!(calibration.apply(SensorKind::Light, 300.0), 300.0);
        assert_eq!(calibration.offset(SensorKind::AirQuality), 0.0);
    }
}

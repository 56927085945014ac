//! Quality assessment for smoothed readings
//!
//! Maps an average onto a coarse comfort rating. Only used for log output on
//! the node; the gateway receives the raw averages.

use crate::sensors::SensorKind;

/// Quality level assessment for sensor readings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLevel {
    /// Optimal conditions
    Excellent,
    /// Acceptable conditions
    Good,
    /// Sub-optimal conditions
    Poor,
    /// Problematic conditions
    Bad,
}

impl QualityLevel {
    /// Assess quality level for a given reading, in the sensor's own units.
    pub fn assess(kind: SensorKind, value: f32) -> Self {
        match kind {
            // Comfortable indoor range is 20-24°C
            SensorKind::Temperature => {
                Self::banded(value, (20.0, 24.0), (18.0, 26.0), (15.0, 28.0))
            }
            // Optimal indoor humidity is 40-60%
            SensorKind::Humidity => Self::banded(value, (40.0, 60.0), (30.0, 70.0), (20.0, 80.0)),
            // Lower index is cleaner air
            SensorKind::AirQuality => {
                if value <= 50.0 {
                    Self::Excellent
                } else if value <= 100.0 {
                    Self::Good
                } else if value <= 150.0 {
                    Self::Poor
                } else {
                    Self::Bad
                }
            }
            // Office lighting is roughly 300-1000 lux
            SensorKind::Light => {
                Self::banded(value, (300.0, 1000.0), (150.0, 2000.0), (50.0, 5000.0))
            }
        }
    }

    fn banded(value: f32, excellent: (f32, f32), good: (f32, f32), poor: (f32, f32)) -> Self {
        if (excellent.0..=excellent.1).contains(&value) {
            Self::Excellent
        } else if (good.0..=good.1).contains(&value) {
            Self::Good
        } else if (poor.0..=poor.1).contains(&value) {
            Self::Poor
        } else {
            Self::Bad
        }
    }

    /// Get the display label for this quality level
    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Poor => "Poor",
            Self::Bad => "Bad",
        }
    }
}

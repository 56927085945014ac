//! Sensor kinds, readings and the trait every sensor implements.
//!
//! Drivers themselves live outside this crate. A driver implements
//! [`Sensor`] and hands back typed readings; [`SensorReadings::to_array`]
//! flattens them into [`Reading`]s tagged with their [`SensorKind`], which is
//! how the sampler knows which smoothing buffer each value belongs to.

mod devices;

use thiserror_no_std::Error;

pub use devices::*;

/// Number of tracked quantities on the node
pub const SENSOR_KIND_COUNT: usize = 4;

/// Physical quantities tracked by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Ambient temperature in °C
    Temperature,
    /// Relative humidity in %
    Humidity,
    /// Air quality index (unitless, higher is worse)
    AirQuality,
    /// Illuminance in lux
    Light,
}

impl SensorKind {
    pub const ALL: [SensorKind; SENSOR_KIND_COUNT] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::AirQuality,
        SensorKind::Light,
    ];

    /// Position of this kind in per-kind arrays
    pub const fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Humidity => 1,
            Self::AirQuality => 2,
            Self::Light => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::AirQuality => "Air quality",
            Self::Light => "Light",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::AirQuality => "AQI",
            Self::Light => "lux",
        }
    }
}

/// A single value produced by a sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub kind: SensorKind,
    pub value: f32,
}

impl Reading {
    pub const fn new(kind: SensorKind, value: f32) -> Self {
        Self { kind, value }
    }
}

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("{sensor}: {operation} failed ({details})")]
    ReadFailed {
        sensor: &'static str,
        operation: &'static str,
        details: &'static str,
    },
    #[error("{sensor}: not ready")]
    NotReady { sensor: &'static str },
}

/// Trait for sensor reading data structures.
/// Provides compile-time guarantees about the number of values a sensor produces.
pub trait SensorReadings<const COUNT: usize> {
    /// Convert the readings into tagged values.
    fn to_array(self) -> [Reading; COUNT];
}

/// Trait for sensors that produce typed readings.
pub trait Sensor<const COUNT: usize> {
    /// Human readable device name used in logs.
    const NAME: &'static str;

    /// Quantities this sensor reports, in the order of its readings.
    const KINDS: [SensorKind; COUNT];

    /// The type of readings this sensor produces.
    type Readings: SensorReadings<COUNT>;

    /// Read the sensor and return typed readings.
    fn read(&mut self) -> impl Future<Output = Result<Self::Readings, SensorError>>;
}

//! Node configuration.
//!
//! Everything here is plain data. `NodeConfig::default()` matches the
//! stock SmartEnviro node; a provisioning tool may ship a different config as a
//! postcard blob, which is decoded and validated with
//! [`NodeConfig::from_bytes`].

extern crate alloc;
use alloc::vec::Vec;

use embassy_time::Duration;
use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::calibration::Calibration;
use crate::sensors::SensorKind;
use crate::smoothing::DEFAULT_CAPACITY;

/// Samples averaged per quantity
pub const BUFFER_SIZE: usize = DEFAULT_CAPACITY;

pub const DEFAULT_DEVICE_NAME: &str = "SmartEnviro-Node-01";
pub const DEFAULT_SERVICE_UUID: &str = "4fafc201-1fb5-459e-8fcc-c5c9c331914b";

pub const TEMPERATURE_CHAR_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26a8";
pub const HUMIDITY_CHAR_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26a9";
pub const AIR_QUALITY_CHAR_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26aa";
pub const LIGHT_CHAR_UUID: &str = "beb5483e-36e1-4688-b7f5-ea07361b26ab";

/// How often the sensors are read
pub const DEFAULT_SAMPLE_INTERVAL_MS: u32 = 5_000;
/// How often the characteristics are refreshed
pub const DEFAULT_PUBLISH_INTERVAL_MS: u32 = 1_000;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
    #[error("min_samples_to_publish ({requested}) exceeds buffer capacity ({capacity})")]
    MinSamplesTooLarge { requested: u8, capacity: usize },
    #[error("max_consecutive_failures must be greater than zero")]
    ZeroFailureThreshold,
    #[error("Failed to encode config: {0}")]
    Encode(postcard::Error),
    #[error("Failed to decode config: {0}")]
    Decode(postcard::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct NodeConfig<'a> {
    pub service: ServiceConfig<'a>,
    pub timing: TimingConfig,
    pub smoothing: SmoothingConfig,
    pub calibration: Calibration,
}

impl Default for NodeConfig<'_> {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            timing: TimingConfig::default(),
            smoothing: SmoothingConfig::default(),
            calibration: Calibration::default(),
        }
    }
}

impl<'a> NodeConfig<'a> {
    /// Decode a postcard provisioning blob and validate it.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(ConfigError::Decode)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(ConfigError::Encode)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timing.sample_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "sample_interval_ms",
            });
        }
        if self.timing.publish_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                field: "publish_interval_ms",
            });
        }
        if usize::from(self.smoothing.min_samples_to_publish) > BUFFER_SIZE {
            return Err(ConfigError::MinSamplesTooLarge {
                requested: self.smoothing.min_samples_to_publish,
                capacity: BUFFER_SIZE,
            });
        }
        if self.smoothing.max_consecutive_failures == 0 {
            return Err(ConfigError::ZeroFailureThreshold);
        }
        Ok(())
    }
}

/// Identity of the node's wireless service
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(bound(deserialize = "'de: 'a"))]
pub struct ServiceConfig<'a> {
    pub device_name: &'a str,
    pub service_uuid: &'a str,
    pub characteristics: CharacteristicUuids<'a>,
}

impl Default for ServiceConfig<'_> {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME,
            service_uuid: DEFAULT_SERVICE_UUID,
            characteristics: CharacteristicUuids::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CharacteristicUuids<'a> {
    pub temperature: &'a str,
    pub humidity: &'a str,
    pub air_quality: &'a str,
    pub light: &'a str,
}

impl<'a> CharacteristicUuids<'a> {
    pub fn for_kind(&self, kind: SensorKind) -> &'a str {
        match kind {
            SensorKind::Temperature => self.temperature,
            SensorKind::Humidity => self.humidity,
            SensorKind::AirQuality => self.air_quality,
            SensorKind::Light => self.light,
        }
    }
}

impl Default for CharacteristicUuids<'_> {
    fn default() -> Self {
        Self {
            temperature: TEMPERATURE_CHAR_UUID,
            humidity: HUMIDITY_CHAR_UUID,
            air_quality: AIR_QUALITY_CHAR_UUID,
            light: LIGHT_CHAR_UUID,
        }
    }
}

/// Sampling and publishing cadence
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TimingConfig {
    pub sample_interval_ms: u32,
    pub publish_interval_ms: u32,
}

impl TimingConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms as u64)
    }

    pub fn publish_interval(&self) -> Duration {
        Duration::from_millis(self.publish_interval_ms as u64)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            publish_interval_ms: DEFAULT_PUBLISH_INTERVAL_MS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Averages built from fewer samples are not published
    pub min_samples_to_publish: u8,
    /// Failed reads in a row before a sensor's buffers are cleared
    pub max_consecutive_failures: u8,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            min_samples_to_publish: 1,
            max_consecutive_failures: 3,
        }
    }
}

//! Sampling and publishing drivers.
//!
//! The node runs two cadences over one [`SharedReadings`] bank:
//!
//! - the sampling task calls [`Sampler::sample`] for every sensor each
//!   sample interval, feeding calibrated readings into the smoothing buffers
//! - the publishing task calls [`Publisher::publish`] each publish interval,
//!   writing every available average to its characteristic
//!
//! Neither driver owns a timer. The caller decides the cadence (an embassy
//! `Ticker` on the node, a wall-clock loop in the simulator).
//!
//! ```rust,ignore
//! static READINGS: SharedReadings = shared_readings();
//!
//! let mut sampler = Sampler::new(&config);
//! let mut ticker = Ticker::every(config.timing.sample_interval());
//! loop {
//!     let _ = sampler.sample(&mut climate, &READINGS).await;
//!     let _ = sampler.sample(&mut light, &READINGS).await;
//!     ticker.next().await;
//! }
//! ```

use heapless::Vec;
use log::{debug, error, warn};
use thiserror_no_std::Error;

use crate::calibration::Calibration;
use crate::characteristic;
use crate::config::{CharacteristicUuids, NodeConfig};
use crate::readings::{RecordError, SharedReadings};
use crate::sensors::{SENSOR_KIND_COUNT, Sensor, SensorError, SensorKind, SensorReadings};

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum SinkError {
    #[error("No central connected")]
    NotConnected,
    #[error("{kind:?} characteristic rejected the write")]
    Rejected { kind: SensorKind },
}

/// Destination for encoded averages, usually the node's GATT server.
pub trait CharacteristicSink {
    /// Replace the value of the characteristic `uuid`, which carries `kind`.
    fn write(
        &mut self,
        kind: SensorKind,
        uuid: &str,
        value: &[u8],
    ) -> impl Future<Output = Result<(), SinkError>>;
}

/// Reads sensors into the shared bank and tracks failing sensors.
pub struct Sampler {
    calibration: Calibration,
    max_consecutive_failures: u8,
    failures: [u8; SENSOR_KIND_COUNT],
}

impl Sampler {
    pub fn new(config: &NodeConfig<'_>) -> Self {
        Self {
            calibration: config.calibration,
            max_consecutive_failures: config.smoothing.max_consecutive_failures,
            failures: [0; SENSOR_KIND_COUNT],
        }
    }

    /// Failed reads in a row for the sensor reporting `kind`
    pub fn consecutive_failures(&self, kind: SensorKind) -> u8 {
        self.failures[kind.index()]
    }

    /// Read `sensor` once and record its readings.
    ///
    /// Returns how many readings were stored. Non-finite readings are logged
    /// and dropped. When the sensor keeps failing its buffers are cleared so
    /// stale averages stop being published.
    pub async fn sample<S, const COUNT: usize>(
        &mut self,
        sensor: &mut S,
        shared: &SharedReadings,
    ) -> Result<usize, SensorError>
    where
        S: Sensor<COUNT>,
    {
        let readings = match sensor.read().await {
            Ok(readings) => readings.to_array(),
            Err(e) => {
                error!("{} read failed: {:?}", S::NAME, e);
                self.note_failure(&S::KINDS, shared);
                return Err(e);
            }
        };

        for kind in S::KINDS {
            self.failures[kind.index()] = 0;
        }

        let calibration = self.calibration;
        let mut rejected: Vec<RecordError, COUNT> = Vec::new();
        let stored = shared.lock(|bank| {
            let mut bank = bank.borrow_mut();
            let mut stored = 0;
            for reading in readings {
                match bank.record(reading.kind, reading.value, &calibration) {
                    Ok(_) => stored += 1,
                    // At most COUNT readings, so this never overflows
                    Err(e) => {
                        let _ = rejected.push(e);
                    }
                }
            }
            stored
        });

        for e in rejected {
            warn!("{}: dropping sample: {}", S::NAME, e);
        }
        debug!("{}: stored {}/{} readings", S::NAME, stored, COUNT);

        Ok(stored)
    }

    fn note_failure(&mut self, kinds: &[SensorKind], shared: &SharedReadings) {
        for &kind in kinds {
            let failures = &mut self.failures[kind.index()];
            *failures = failures.saturating_add(1);

            if *failures == self.max_consecutive_failures {
                warn!(
                    "{} sensor failed {} times in a row, clearing its readings",
                    kind.label(),
                    failures
                );
                shared.lock(|bank| bank.borrow_mut().clear(kind));
            }
        }
    }
}

/// Pushes averages from the shared bank to a [`CharacteristicSink`].
pub struct Publisher<'a, S> {
    sink: S,
    characteristics: CharacteristicUuids<'a>,
    min_samples: usize,
}

impl<'a, S: CharacteristicSink> Publisher<'a, S> {
    pub fn new(sink: S, config: &NodeConfig<'a>) -> Self {
        Self {
            sink,
            characteristics: config.service.characteristics.clone(),
            min_samples: usize::from(config.smoothing.min_samples_to_publish),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Write every publishable average to its characteristic.
    ///
    /// Returns the number of characteristics updated. Quantities that do not
    /// have `min_samples_to_publish` samples yet are skipped.
    pub async fn publish(&mut self, shared: &SharedReadings) -> Result<usize, SinkError> {
        let snapshot = shared.lock(|bank| bank.borrow().snapshot(self.min_samples));

        let mut written = 0;
        for kind in SensorKind::ALL {
            let Some(average) = snapshot.average(kind) else {
                debug!(
                    "{}: {} samples, not publishing yet",
                    kind.label(),
                    snapshot.count(kind)
                );
                continue;
            };

            let uuid = self.characteristics.for_kind(kind);
            let value = characteristic::encode(kind, average);
            self.sink.write(kind, uuid, &value).await.map_err(|e| {
                error!("{} characteristic write failed: {:?}", kind.label(), e);
                e
            })?;
            written += 1;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::readings::shared_readings;
    use crate::sensors::{ClimateReadings, LightReadings};
    use embassy_futures::block_on;

    /// Climate sensor replaying a fixed script of results
    struct ScriptedClimate {
        script: Vec<Option<(f32, f32)>, 16>,
        next: usize,
    }

    impl ScriptedClimate {
        fn new(results: &[Option<(f32, f32)>]) -> Self {
            Self {
                script: Vec::from_slice(results).unwrap(),
                next: 0,
            }
        }
    }

    impl Sensor<2> for ScriptedClimate {
        const NAME: &'static str = "Climate";
        const KINDS: [SensorKind; 2] = ClimateReadings::KINDS;
        type Readings = ClimateReadings;

        async fn read(&mut self) -> Result<ClimateReadings, SensorError> {
            let result = self.script[self.next];
            self.next += 1;
            result
                .map(|(temperature_celsius, humidity_percent)| ClimateReadings {
                    temperature_celsius,
                    humidity_percent,
                })
                .ok_or(SensorError::ReadFailed {
                    sensor: "Climate",
                    operation: "measure",
                    details: "scripted failure",
                })
        }
    }

    struct FixedLight(f32);

    impl Sensor<1> for FixedLight {
        const NAME: &'static str = "Light";
        const KINDS: [SensorKind; 1] = LightReadings::KINDS;
        type Readings = LightReadings;

        async fn read(&mut self) -> Result<LightReadings, SensorError> {
            Ok(LightReadings { lux: self.0 })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        writes: Vec<(SensorKind, Vec<u8, 4>), 8>,
        connected: bool,
    }

    impl CharacteristicSink for RecordingSink {
        async fn write(
            &mut self,
            kind: SensorKind,
            _uuid: &str,
            value: &[u8],
        ) -> Result<(), SinkError> {
            if !self.connected {
                return Err(SinkError::NotConnected);
            }
            self.writes
                .push((kind, Vec::from_slice(value).unwrap()))
                .unwrap();
            Ok(())
        }
    }

    #[test]
    fn test_sample_records_all_readings() {
        let shared = shared_readings();
        let mut sampler = Sampler::new(&NodeConfig::default());
        let mut climate = ScriptedClimate::new(&[Some((21.0, 40.0)), Some((23.0, 50.0))]);

        assert_eq!(block_on(sampler.sample(&mut climate, &shared)).unwrap(), 2);
        assert_eq!(block_on(sampler.sample(&mut climate, &shared)).unwrap(), 2);

        shared.lock(|bank| {
            let bank = bank.borrow();
            assert_eq!(bank.buffer(SensorKind::Temperature).average(), 22.0);
            assert_eq!(bank.buffer(SensorKind::Humidity).average(), 45.0);
        });
    }

    #[test]
    fn test_sample_applies_calibration() {
        let shared = shared_readings();
        let mut config = NodeConfig::default();
        config.calibration = Calibration::new().with_offset(SensorKind::Light, 10.0);
        let mut sampler = Sampler::new(&config);

        block_on(sampler.sample(&mut FixedLight(290.0), &shared)).unwrap();

        let average = shared.lock(|bank| bank.borrow().buffer(SensorKind::Light).average());
        assert_eq!(average, 300.0);
    }

    #[test]
    fn test_sample_drops_non_finite() {
        let shared = shared_readings();
        let mut sampler = Sampler::new(&NodeConfig::default());
        let mut climate = ScriptedClimate::new(&[Some((f32::NAN, 55.0))]);

        assert_eq!(block_on(sampler.sample(&mut climate, &shared)).unwrap(), 1);

        shared.lock(|bank| {
            let bank = bank.borrow();
            assert!(bank.buffer(SensorKind::Temperature).is_empty());
            assert_eq!(bank.buffer(SensorKind::Humidity).count(), 1);
        });
    }

    #[test]
    fn test_repeated_failures_clear_buffers() {
        let shared = shared_readings();
        let mut sampler = Sampler::new(&NodeConfig::default());
        let mut climate = ScriptedClimate::new(&[
            Some((20.0, 40.0)),
            None,
            None,
            Some((30.0, 60.0)),
            None,
            None,
            None,
        ]);
        let mut light = FixedLight(400.0);

        block_on(sampler.sample(&mut climate, &shared)).unwrap();
        block_on(sampler.sample(&mut light, &shared)).unwrap();

        // Two failures keep the old average
        assert!(block_on(sampler.sample(&mut climate, &shared)).is_err());
        assert!(block_on(sampler.sample(&mut climate, &shared)).is_err());
        assert_eq!(sampler.consecutive_failures(SensorKind::Temperature), 2);
        let count = shared.lock(|bank| bank.borrow().buffer(SensorKind::Temperature).count());
        assert_eq!(count, 1);

        // A success resets the counter
        block_on(sampler.sample(&mut climate, &shared)).unwrap();
        assert_eq!(sampler.consecutive_failures(SensorKind::Humidity), 0);

        // Third failure in a row clears the climate buffers only
        for _ in 0..3 {
            assert!(block_on(sampler.sample(&mut climate, &shared)).is_err());
        }
        shared.lock(|bank| {
            let bank = bank.borrow();
            assert!(bank.buffer(SensorKind::Temperature).is_empty());
            assert!(bank.buffer(SensorKind::Humidity).is_empty());
            assert_eq!(bank.buffer(SensorKind::Light).count(), 1);
        });
    }

    #[test]
    fn test_publish_writes_available_averages() {
        let shared = shared_readings();
        let config = NodeConfig::default();
        let mut sampler = Sampler::new(&config);
        let mut climate = ScriptedClimate::new(&[Some((21.5, 48.0))]);

        block_on(sampler.sample(&mut climate, &shared)).unwrap();

        let sink = RecordingSink {
            connected: true,
            ..Default::default()
        };
        let mut publisher = Publisher::new(sink, &config);
        assert_eq!(block_on(publisher.publish(&shared)).unwrap(), 2);

        let writes = &publisher.sink().writes;
        assert_eq!(writes[0].0, SensorKind::Temperature);
        assert_eq!(writes[0].1.as_slice(), &21.5f32.to_le_bytes());
        assert_eq!(writes[1].0, SensorKind::Humidity);
        assert_eq!(writes[1].1.as_slice(), &48.0f32.to_le_bytes());
    }

    #[test]
    fn test_publish_waits_for_min_samples() {
        let shared = shared_readings();
        let mut config = NodeConfig::default();
        config.smoothing.min_samples_to_publish = 2;
        let mut sampler = Sampler::new(&config);
        let mut light = FixedLight(250.0);

        let sink = RecordingSink {
            connected: true,
            ..Default::default()
        };
        let mut publisher = Publisher::new(sink, &config);

        block_on(sampler.sample(&mut light, &shared)).unwrap();
        assert_eq!(block_on(publisher.publish(&shared)).unwrap(), 0);

        block_on(sampler.sample(&mut light, &shared)).unwrap();
        assert_eq!(block_on(publisher.publish(&shared)).unwrap(), 1);
        assert_eq!(publisher.sink().writes[0].1.as_slice(), &[0xfa, 0x00]);
    }

    #[test]
    fn test_publish_propagates_sink_error() {
        let shared = shared_readings();
        let config = NodeConfig::default();
        let mut sampler = Sampler::new(&config);

        block_on(sampler.sample(&mut FixedLight(100.0), &shared)).unwrap();

        let mut publisher = Publisher::new(RecordingSink::default(), &config);
        assert_eq!(
            block_on(publisher.publish(&shared)),
            Err(SinkError::NotConnected)
        );
    }
}

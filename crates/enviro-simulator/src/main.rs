//! Desktop simulator for the enviro-node sensor pipeline.
//!
//! Runs enviro-core's sampler and publisher on the node's real cadence with
//! synthetic sensors, logging every characteristic write instead of sending
//! it over the air. Set `RUST_LOG=debug` to also see per-sample activity.
//!
//! The light sensor drops out periodically so the failure path (and the
//! buffer clear that follows it) can be watched without hardware.

use std::thread;
use std::time::{Duration, Instant};

use embassy_futures::block_on;
use log::{info, warn};

use enviro_core::characteristic;
use enviro_core::config::NodeConfig;
use enviro_core::metrics::QualityLevel;
use enviro_core::readings::{SharedReadings, shared_readings};
use enviro_core::sampling::{CharacteristicSink, Publisher, Sampler, SinkError};
use enviro_core::sensors::{
    AirQualityReadings, ClimateReadings, LightReadings, Sensor, SensorError, SensorKind,
};

static READINGS: SharedReadings = shared_readings();

// ---------------------------------------------------------------------------
// Mock sensors
// ---------------------------------------------------------------------------

/// Seconds since the simulator started, used as the phase of every waveform.
fn phase(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

/// Fast wobble layered on top of the slow signals to mimic sensor noise.
fn jitter(t: f64, amplitude: f64) -> f64 {
    amplitude * ((t * 7.3).sin() * 0.6 + (t * 13.1).cos() * 0.4)
}

struct MockClimate {
    start: Instant,
}

impl Sensor<2> for MockClimate {
    const NAME: &'static str = "Climate (mock)";
    const KINDS: [SensorKind; 2] = ClimateReadings::KINDS;
    type Readings = ClimateReadings;

    async fn read(&mut self) -> Result<ClimateReadings, SensorError> {
        let t = phase(self.start);

        // Temperature: 20-26 °C with a slow drift
        let temperature = 23.0 + 3.0 * (t / 120.0).sin() + jitter(t, 0.4);
        // Humidity: 40-60 %
        let humidity = 50.0 + 10.0 * (t / 180.0).sin() + jitter(t, 1.5);

        Ok(ClimateReadings {
            temperature_celsius: temperature as f32,
            humidity_percent: humidity as f32,
        })
    }
}

struct MockAirQuality {
    start: Instant,
}

impl Sensor<1> for MockAirQuality {
    const NAME: &'static str = "Air quality (mock)";
    const KINDS: [SensorKind; 1] = AirQualityReadings::KINDS;
    type Readings = AirQualityReadings;

    async fn read(&mut self) -> Result<AirQualityReadings, SensorError> {
        let t = phase(self.start);
        let index = 70.0 + 40.0 * (t / 300.0).sin() + jitter(t, 8.0);

        Ok(AirQualityReadings {
            index: index.max(0.0) as f32,
        })
    }
}

/// Light sensor whose last `outage_len` reads out of every `outage_every`
/// fail.
struct MockLight {
    start: Instant,
    reads: u32,
    outage_every: u32,
    outage_len: u32,
}

impl Sensor<1> for MockLight {
    const NAME: &'static str = "Light (mock)";
    const KINDS: [SensorKind; 1] = LightReadings::KINDS;
    type Readings = LightReadings;

    async fn read(&mut self) -> Result<LightReadings, SensorError> {
        self.reads += 1;
        if self.reads % self.outage_every >= self.outage_every - self.outage_len {
            return Err(SensorError::NotReady { sensor: Self::NAME });
        }

        let t = phase(self.start);
        let lux = 450.0 + 200.0 * (t / 90.0).sin() + jitter(t, 35.0);

        Ok(LightReadings {
            lux: lux.max(0.0) as f32,
        })
    }
}

// ---------------------------------------------------------------------------
// Characteristic sink
// ---------------------------------------------------------------------------

/// Logs each write the way a connected central would see it.
struct LogSink;

impl CharacteristicSink for LogSink {
    async fn write(&mut self, kind: SensorKind, uuid: &str, value: &[u8]) -> Result<(), SinkError> {
        let decoded = characteristic::decode(kind, value).ok_or(SinkError::Rejected { kind })?;

        info!(
            "{:<11} {:>8.2} {:<3} {:<9} -> {} {:02x?}",
            kind.label(),
            decoded,
            kind.unit(),
            QualityLevel::assess(kind, decoded).label(),
            uuid,
            value
        );
        Ok(())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = NodeConfig::default();
    config.validate().expect("Invalid node config");

    info!(
        "Simulating {} (service {})",
        config.service.device_name, config.service.service_uuid
    );

    let sample_interval = Duration::from_millis(config.timing.sample_interval().as_millis());
    let publish_interval = Duration::from_millis(config.timing.publish_interval().as_millis());

    let start = Instant::now();
    let mut climate = MockClimate { start };
    let mut air_quality = MockAirQuality { start };
    let mut light = MockLight {
        start,
        reads: 0,
        outage_every: 20,
        outage_len: 4,
    };

    let mut sampler = Sampler::new(&config);
    let mut publisher = Publisher::new(LogSink, &config);

    let mut next_sample = start;
    let mut next_publish = start + publish_interval;

    loop {
        let now = Instant::now();

        if now >= next_sample {
            // Failures are already logged by the sampler
            let _ = block_on(sampler.sample(&mut climate, &READINGS));
            let _ = block_on(sampler.sample(&mut air_quality, &READINGS));
            let _ = block_on(sampler.sample(&mut light, &READINGS));
            next_sample += sample_interval;
        }

        if now >= next_publish {
            match block_on(publisher.publish(&READINGS)) {
                Ok(0) => warn!("No averages available yet"),
                Ok(_) => {}
                Err(e) => warn!("Publish failed: {e}"),
            }
            next_publish += publish_interval;
        }

        let wake = next_sample.min(next_publish);
        thread::sleep(wake.saturating_duration_since(Instant::now()));
    }
}

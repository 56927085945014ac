//! Smoothed readings for every tracked quantity.
//!
//! [`NodeReadings`] owns one independent [`SmoothingBuffer`] per
//! [`SensorKind`]. Nothing is shared between the buffers, so a noisy or reset
//! sensor never bleeds into another quantity's average.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::{Mutex, raw::CriticalSectionRawMutex};
use thiserror_no_std::Error;

use crate::calibration::Calibration;
use crate::config::BUFFER_SIZE;
use crate::sensors::{SENSOR_KIND_COUNT, SensorKind};
use crate::smoothing::SmoothingBuffer;

/// Readings bank shared between the sampling and publishing tasks.
///
/// The lock is only ever held for synchronous bank calls, never across an
/// `.await`.
pub type SharedReadings = Mutex<CriticalSectionRawMutex, RefCell<NodeReadings>>;

/// Create an empty [`SharedReadings`], usable in a `static`.
pub const fn shared_readings() -> SharedReadings {
    Mutex::new(RefCell::new(NodeReadings::new()))
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum RecordError {
    #[error("{kind:?} reading is not finite ({value})")]
    NonFinite { kind: SensorKind, value: f32 },
}

#[derive(Debug, Clone, Default)]
pub struct NodeReadings {
    buffers: [SmoothingBuffer<BUFFER_SIZE>; SENSOR_KIND_COUNT],
}

impl NodeReadings {
    pub const fn new() -> Self {
        Self {
            buffers: [
                SmoothingBuffer::new(),
                SmoothingBuffer::new(),
                SmoothingBuffer::new(),
                SmoothingBuffer::new(),
            ],
        }
    }

    pub fn buffer(&self, kind: SensorKind) -> &SmoothingBuffer<BUFFER_SIZE> {
        &self.buffers[kind.index()]
    }

    pub fn buffer_mut(&mut self, kind: SensorKind) -> &mut SmoothingBuffer<BUFFER_SIZE> {
        &mut self.buffers[kind.index()]
    }

    /// Calibrate a raw reading and add it to its buffer.
    ///
    /// Non-finite values are rejected and leave the buffer untouched.
    /// Returns the calibrated value that was stored.
    pub fn record(
        &mut self,
        kind: SensorKind,
        raw: f32,
        calibration: &Calibration,
    ) -> Result<f32, RecordError> {
        let value = calibration.apply(kind, raw);
        if !value.is_finite() {
            return Err(RecordError::NonFinite { kind, value });
        }

        self.buffer_mut(kind).add(value);
        Ok(value)
    }

    pub fn clear(&mut self, kind: SensorKind) {
        self.buffer_mut(kind).clear();
    }

    pub fn clear_all(&mut self) {
        self.buffers.iter_mut().for_each(SmoothingBuffer::clear);
    }

    /// Current averages, leaving out any quantity with fewer than
    /// `min_samples` samples (an empty buffer is always left out).
    pub fn snapshot(&self, min_samples: usize) -> Snapshot {
        let mut averages = [None; SENSOR_KIND_COUNT];
        let mut counts = [0; SENSOR_KIND_COUNT];

        for kind in SensorKind::ALL {
            let buffer = self.buffer(kind);
            counts[kind.index()] = buffer.count();
            if buffer.count() >= min_samples.max(1) {
                averages[kind.index()] = Some(buffer.average());
            }
        }

        Snapshot { averages, counts }
    }
}

/// Point-in-time view of every quantity's average
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    averages: [Option<f32>; SENSOR_KIND_COUNT],
    counts: [usize; SENSOR_KIND_COUNT],
}

impl Snapshot {
    /// Average for `kind`, `None` when too few samples were available
    pub const fn average(&self, kind: SensorKind) -> Option<f32> {
        self.averages[kind.index()]
    }

    /// Samples behind the average for `kind`
    pub const fn count(&self, kind: SensorKind) -> usize {
        self.counts[kind.index()]
    }

    /// Every kind with a publishable average
    pub fn available(&self) -> impl Iterator<Item = (SensorKind, f32)> + '_ {
        SensorKind::ALL
            .into_iter()
            .filter_map(|kind| self.average(kind).map(|avg| (kind, avg)))
    }
}

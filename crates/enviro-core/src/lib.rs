//! Hardware-independent core library for the enviro-node sensor firmware
//!
//! This crate contains the platform-agnostic logic of the node: the
//! smoothing buffers that turn noisy sensor samples into moving averages,
//! the sensor trait definitions, calibration, configuration, and the drivers
//! that feed the buffers and publish their averages as characteristic values.
//!
//! It is `#![no_std]` so it compiles on both the microcontroller target and
//! desktop hosts (for the simulator and tests).

#![no_std]

pub mod calibration;
pub mod characteristic;
pub mod config;
pub mod metrics;
pub mod readings;
pub mod sampling;
pub mod sensors;
pub mod smoothing;

//! Periodic sensor sampling.
//!
//! Wraps the two fallible sensor reads behind a fixed cadence (much
//! slower than the loop tick, to avoid saturating the I2C bus). Each
//! read fails independently; a failure leaves the corresponding fields
//! absent for this tick and defers the retry to the next scheduled
//! sample — no immediate retry, no crash.

use std::time::Duration;

use log::warn;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, SensorPort};
use crate::timer::IntervalTimer;

/// One sample tick's worth of sensor values. Fields are absent when the
/// corresponding read failed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reading {
    pub temperature: Option<f32>,
    pub pressure: Option<f32>,
    pub lux: Option<f32>,
}

impl Reading {
    /// Overlay the present fields of `newer` onto `self`, keeping the
    /// last known good value for anything that failed this tick.
    pub fn merge_from(&mut self, newer: &Reading) {
        if newer.temperature.is_some() {
            self.temperature = newer.temperature;
        }
        if newer.pressure.is_some() {
            self.pressure = newer.pressure;
        }
        if newer.lux.is_some() {
            self.lux = newer.lux;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.pressure.is_none() && self.lux.is_none()
    }
}

// ───────────────────────────────────────────────────────────────
// Sampler
// ───────────────────────────────────────────────────────────────

pub struct SensorSampler {
    timer: IntervalTimer,
}

impl SensorSampler {
    pub fn new(interval: Duration, now: Duration) -> Self {
        Self {
            timer: IntervalTimer::new(interval, now),
        }
    }

    /// True once per sample interval. Resets the cadence timer.
    pub fn due(&mut self, now: Duration) -> bool {
        self.timer.fire_due(now)
    }

    /// Read both sensors once. Failures are logged and reported through
    /// the sink but never propagate past the tick boundary.
    pub fn sample(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) -> Reading {
        let mut reading = Reading::default();

        match hw.read_temperature_pressure() {
            Ok((temperature, pressure)) => {
                reading.temperature = Some(temperature);
                reading.pressure = Some(pressure);
            }
            Err(e) => {
                warn!("temperature/pressure read failed: {e}");
                sink.emit(&AppEvent::SampleFailed(e));
            }
        }

        match hw.read_lux() {
            Ok(lux) => reading.lux = Some(lux),
            Err(e) => {
                warn!("lux read failed: {e}");
                sink.emit(&AppEvent::SampleFailed(e));
            }
        }

        reading
    }
}

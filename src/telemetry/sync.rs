//! Remote synchronization: periodic push and pull.
//!
//! Two independently-timed, best-effort actions. Push serializes the
//! last-known reading plus goal state into the wire field-set and hands
//! it to the transport; pull fetches the channel's last entry for the
//! control state to merge. Either can fail without consequence beyond a
//! log line: the timers reset on firing whether or not the action
//! succeeded, so a dead link costs one attempt per interval, never a
//! retry storm.

use std::time::Duration;

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, TelemetryPort};
use crate::control::sampler::Reading;
use crate::control::state::ControlGoal;
use crate::telemetry::fields::{FieldMapping, FieldSet};
use crate::timer::IntervalTimer;

pub struct TelemetrySync {
    publish_timer: IntervalTimer,
    fetch_timer: IntervalTimer,
    /// One publish already failed; the next failure triggers a single
    /// reconnect attempt.
    reconnect_armed: bool,
}

impl TelemetrySync {
    pub fn new(publish_interval: Duration, fetch_interval: Duration, now: Duration) -> Self {
        Self {
            publish_timer: IntervalTimer::new(publish_interval, now),
            fetch_timer: IntervalTimer::new(fetch_interval, now),
            reconnect_armed: false,
        }
    }

    pub fn publish_due(&mut self, now: Duration) -> bool {
        self.publish_timer.fire_due(now)
    }

    pub fn fetch_due(&mut self, now: Duration) -> bool {
        self.fetch_timer.fire_due(now)
    }

    /// Build the outbound field-set from the last-known reading and the
    /// goal state. Absent reading fields are skipped — the channel keeps
    /// its previous value for them.
    pub fn build_payload(
        mapping: &FieldMapping,
        reading: &Reading,
        goal: &ControlGoal,
    ) -> String {
        let mut set = FieldSet::new();
        if let Some(t) = reading.temperature {
            set.insert(mapping.temperature, f64::from(t));
        }
        if let Some(p) = reading.pressure {
            set.insert(mapping.pressure, f64::from(p));
        }
        if let Some(lux) = reading.lux {
            set.insert(mapping.lux, f64::from(lux));
        }
        set.insert(mapping.temperature_goal, f64::from(goal.temperature_goal));
        set.insert(mapping.lux_goal, f64::from(goal.lux_goal));
        set.insert(mapping.brightness, f64::from(goal.brightness));
        set.encode()
    }

    /// Push `payload`, degrading gracefully on failure. Never blocks the
    /// loop beyond the transport's own send.
    pub fn publish(
        &mut self,
        net: &mut impl TelemetryPort,
        payload: &str,
        sink: &mut impl EventSink,
    ) {
        match net.publish(payload) {
            Ok(()) => {
                self.reconnect_armed = false;
                info!("published: {payload}");
                sink.emit(&AppEvent::Published);
            }
            Err(e) => {
                warn!("publish failed: {e}");
                sink.emit(&AppEvent::PublishFailed(e));
                if self.reconnect_armed {
                    self.reconnect_armed = false;
                    match net.reconnect() {
                        Ok(()) => info!("transport reconnected"),
                        Err(e) => warn!("reconnect failed: {e}"),
                    }
                } else {
                    self.reconnect_armed = true;
                }
            }
        }
    }

    /// Pull the last remote field-set. `None` on failure; local values
    /// stand untouched.
    pub fn fetch(
        &mut self,
        net: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) -> Option<FieldSet> {
        match net.fetch_last() {
            Ok(set) => Some(set),
            Err(e) => {
                warn!("fetch failed: {e}");
                sink.emit(&AppEvent::FetchFailed(e));
                None
            }
        }
    }
}

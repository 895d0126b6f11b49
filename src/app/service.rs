//! Control service — the loop's single tick, composed from the leaves.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  GpioPort   ◀──│        ControlService         │
//!                │ buttons · override · sampler  │
//!  TelemetryPort ◀─▶│        · sync              │
//!                └──────────────────────────────┘
//! ```
//!
//! One tick, in order: buttons (synchronous, same tick — a manual toggle
//! always wins over that tick's sensor update), sensor sample if due,
//! remote fetch if due, publish if due. All state is owned here and
//! mutated only from the loop thread; no locking anywhere.

use std::time::Duration;

use log::info;

use crate::config::SystemConfig;
use crate::control::button::{ButtonAction, ButtonBank};
use crate::control::sampler::{Reading, SensorSampler};
use crate::control::state::{ControlGoal, ControlState, GoalDirection, OverrideMode};
use crate::telemetry::fields::FieldMapping;
use crate::telemetry::sync::TelemetrySync;

use super::events::AppEvent;
use super::ports::{EventSink, GpioPort, SensorPort, TelemetryPort};

pub struct ControlService {
    state: ControlState,
    buttons: ButtonBank,
    sampler: SensorSampler,
    sync: TelemetrySync,
    /// Last known good reading, merged field-by-field each sample tick.
    latest: Reading,
    mapping: FieldMapping,
    led_pin: u8,
    tick_count: u64,
}

impl ControlService {
    /// Construct the service; seeds the button detectors from the pins'
    /// current levels. `now` is the loop's monotonic time origin.
    pub fn new(config: &SystemConfig, hw: &mut impl GpioPort, now: Duration) -> Self {
        Self {
            state: ControlState::new(config),
            buttons: ButtonBank::new(
                config.button_dec_pin,
                config.button_inc_pin,
                config.button_toggle_pin,
                hw,
            ),
            sampler: SensorSampler::new(Duration::from_secs(config.sample_interval_secs), now),
            sync: TelemetrySync::new(
                Duration::from_secs(config.publish_interval_secs),
                Duration::from_secs(config.fetch_interval_secs),
                now,
            ),
            latest: Reading::default(),
            mapping: config.fields.clone(),
            led_pin: config.led_pin,
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time startup: seed goals from the remote service before the
    /// first tick. A failed fetch is tolerated — defaults stand. The LED
    /// is not driven until the first sample tick (or an earlier button
    /// press or remote brightness).
    pub fn start(
        &mut self,
        hw: &mut impl GpioPort,
        net: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        if let Some(set) = self.sync.fetch(net, sink) {
            let outcome = self.state.merge_fetched(&set, &self.mapping);
            if let Some(brightness) = outcome.drive {
                hw.set_brightness(self.led_pin, brightness);
            }
            if outcome.goals_changed {
                let goal = self.state.goal();
                info!(
                    "initial goals from remote: lux_goal={} temperature_goal={}",
                    goal.lux_goal, goal.temperature_goal
                );
            }
        }
        sink.emit(&AppEvent::Started(self.state.mode()));
        info!("control loop started in {:?} mode", self.state.mode());
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle. `now` is monotonic time since the
    /// loop's origin; the caller owns the tick cadence and sleep.
    pub fn tick(
        &mut self,
        now: Duration,
        hw: &mut (impl SensorPort + GpioPort),
        net: &mut impl TelemetryPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Buttons first: presses apply before this tick's automatic
        //    update.
        let mut pressed: Vec<ButtonAction> = Vec::new();
        self.buttons.poll(hw, |action| pressed.push(action));
        for action in pressed {
            self.apply_action(action, hw, sink);
        }

        // 2. Sensor sample, on its own cadence.
        if self.sampler.due(now) {
            let reading = self.sampler.sample(hw, sink);
            self.latest.merge_from(&reading);
            // Only a fresh lux value feeds the rule; a failed read waits
            // for the next sample tick.
            if let Some(lux) = reading.lux {
                if let Some(update) = self.state.apply_automatic(lux) {
                    hw.set_brightness(self.led_pin, update.brightness);
                    if update.is_transition {
                        info!(
                            "lux {lux:.0} vs threshold {:.0}: LED -> {}",
                            self.state.threshold(),
                            update.brightness
                        );
                        sink.emit(&AppEvent::LedChanged {
                            brightness: update.brightness,
                        });
                    }
                }
            }
        }

        // 3. Remote pull: merge goals, partial-update semantics.
        if self.sync.fetch_due(now) {
            if let Some(set) = self.sync.fetch(net, sink) {
                let outcome = self.state.merge_fetched(&set, &self.mapping);
                if let Some(brightness) = outcome.drive {
                    hw.set_brightness(self.led_pin, brightness);
                }
                if outcome.goals_changed || outcome.drive.is_some() {
                    let goal = self.state.goal();
                    sink.emit(&AppEvent::GoalsFetched {
                        lux_goal: goal.lux_goal,
                        temperature_goal: goal.temperature_goal,
                    });
                }
            }
        }

        // 4. Remote push: last known reading + goal state.
        if self.sync.publish_due(now) {
            let payload =
                TelemetrySync::build_payload(&self.mapping, &self.latest, &self.state.goal());
            self.sync.publish(net, &payload, sink);
        }
    }

    // ── Button actions ────────────────────────────────────────

    fn apply_action(
        &mut self,
        action: ButtonAction,
        hw: &mut impl GpioPort,
        sink: &mut impl EventSink,
    ) {
        match action {
            ButtonAction::DecreaseGoal | ButtonAction::IncreaseGoal => {
                let direction = if action == ButtonAction::DecreaseGoal {
                    GoalDirection::Decrease
                } else {
                    GoalDirection::Increase
                };
                let lux_goal = self.state.adjust_goal(direction);
                info!("button: lux_goal -> {lux_goal}");
                sink.emit(&AppEvent::GoalAdjusted { lux_goal });
            }
            ButtonAction::ToggleOverride => {
                let outcome = self.state.toggle_override();
                hw.set_brightness(self.led_pin, outcome.brightness);
                info!(
                    "button: override -> {:?}, LED {}",
                    outcome.mode, outcome.brightness
                );
                sink.emit(&AppEvent::ModeChanged {
                    mode: outcome.mode,
                    brightness: outcome.brightness,
                });
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn mode(&self) -> OverrideMode {
        self.state.mode()
    }

    pub fn goal(&self) -> ControlGoal {
        self.state.goal()
    }

    /// Last known good reading (absent fields have never been read).
    pub fn latest_reading(&self) -> Reading {
        self.latest
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

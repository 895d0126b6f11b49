//! Override state machine and control state.
//!
//! Reconstructs what the original deployment kept in module-level globals
//! as one explicit [`ControlState`] owned by the control loop. Tracks
//! whether the LED is under automatic (sensor-driven) or manual control,
//! the goal values, and the last level actually driven to the pin.
//!
//! Invariants:
//! - `brightness` reflects either the automatic rule or the last manual
//!   action, never both.
//! - While `Manual`, nothing but the toggle button writes `brightness`;
//!   goal values still update from buttons and remote pulls.
//! - The automatic rule is idempotent: identical inputs never re-emit a
//!   transition.

use crate::config::{SystemConfig, ThresholdSource};
use crate::telemetry::fields::{FieldMapping, FieldSet};

/// Whether LED brightness is computed from sensor input or set manually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideMode {
    Automatic,
    Manual,
}

/// Direction of a goal-adjust button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalDirection {
    Decrease,
    Increase,
}

/// The goal/state values synchronized with the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlGoal {
    /// Target illuminance (scaled units, clamped to `[0, lux_goal_max]`).
    pub lux_goal: u16,
    /// Target temperature (integer degrees, remotely settable only).
    pub temperature_goal: i16,
    /// LED brightness (0..=100, clamped).
    pub brightness: u8,
}

/// Result of applying the automatic rule at a sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedUpdate {
    /// New level to drive onto the LED pin.
    pub brightness: u8,
    /// False for the very first application (output initialization),
    /// true for a real ON/OFF transition worth a log line.
    pub is_transition: bool,
}

/// Result of toggling the override mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub mode: OverrideMode,
    /// Level to drive immediately, same tick.
    pub brightness: u8,
}

/// Result of merging a fetched field-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOutcome {
    /// A goal value actually changed.
    pub goals_changed: bool,
    /// Remote brightness to drive (Automatic mode only).
    pub drive: Option<u8>,
}

// ───────────────────────────────────────────────────────────────
// Control state
// ───────────────────────────────────────────────────────────────

pub struct ControlState {
    goal: ControlGoal,
    mode: OverrideMode,
    /// Brightness remembered while Manual forces the LED off, restored
    /// when flipping back to Automatic.
    saved_brightness: u8,
    /// Last level driven onto the pin; `None` until first write. The
    /// automatic rule compares against this, not the threshold, so
    /// re-evaluation with unchanged inputs is side-effect free.
    driven: Option<u8>,
    // Rule parameters, fixed at startup.
    step: u16,
    lux_goal_max: u16,
    on_brightness: u8,
    threshold_source: ThresholdSource,
    lux_threshold: f32,
}

impl ControlState {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            goal: ControlGoal {
                lux_goal: config.lux_goal,
                temperature_goal: config.temperature_goal,
                brightness: config.brightness.min(100),
            },
            mode: OverrideMode::Automatic,
            saved_brightness: config.brightness.min(100),
            driven: None,
            step: config.lux_goal_step,
            lux_goal_max: config.lux_goal_max,
            on_brightness: config.on_brightness.min(100),
            threshold_source: config.threshold_source,
            lux_threshold: config.lux_threshold,
        }
    }

    pub fn mode(&self) -> OverrideMode {
        self.mode
    }

    pub fn goal(&self) -> ControlGoal {
        self.goal
    }

    /// The lux level below which the automatic rule switches the LED on.
    pub fn threshold(&self) -> f32 {
        match self.threshold_source {
            ThresholdSource::Fixed => self.lux_threshold,
            ThresholdSource::LuxGoal => f32::from(self.goal.lux_goal),
        }
    }

    // ── Button transitions ────────────────────────────────────

    /// Step the lux goal, clamped to `[0, lux_goal_max]`. Allowed in
    /// either mode; independent of the brightness override.
    pub fn adjust_goal(&mut self, direction: GoalDirection) -> u16 {
        self.goal.lux_goal = match direction {
            GoalDirection::Decrease => self.goal.lux_goal.saturating_sub(self.step),
            GoalDirection::Increase => self
                .goal
                .lux_goal
                .saturating_add(self.step)
                .min(self.lux_goal_max),
        };
        self.goal.lux_goal
    }

    /// Flip the override mode unconditionally.
    ///
    /// Entering Manual forces the LED off and remembers the brightness;
    /// entering Automatic restores it immediately and lets the rule
    /// recompute on the next sample tick.
    pub fn toggle_override(&mut self) -> ToggleOutcome {
        self.mode = match self.mode {
            OverrideMode::Automatic => {
                self.saved_brightness = self.goal.brightness;
                self.goal.brightness = 0;
                OverrideMode::Manual
            }
            OverrideMode::Manual => {
                self.goal.brightness = self.saved_brightness;
                OverrideMode::Automatic
            }
        };
        self.driven = Some(self.goal.brightness);
        ToggleOutcome {
            mode: self.mode,
            brightness: self.goal.brightness,
        }
    }

    // ── Automatic rule ────────────────────────────────────────

    /// Apply the threshold rule for one sample tick.
    ///
    /// Returns `None` in Manual mode, or when the target level equals
    /// what is already driven (idempotence). The first application after
    /// startup drives the pin but is not reported as a transition.
    pub fn apply_automatic(&mut self, lux: f32) -> Option<LedUpdate> {
        if self.mode == OverrideMode::Manual {
            return None;
        }
        let target = if lux < self.threshold() {
            self.on_brightness
        } else {
            0
        };
        if self.driven == Some(target) {
            return None;
        }
        let is_transition = self.driven.is_some();
        self.driven = Some(target);
        self.goal.brightness = target;
        Some(LedUpdate {
            brightness: target,
            is_transition,
        })
    }

    // ── Remote merge ──────────────────────────────────────────

    /// Merge a fetched field-set with partial-update semantics: fields
    /// absent from the response leave local values unchanged. A remote
    /// brightness field is honoured only in Automatic mode — the Manual
    /// override suppresses it for the brightness field alone.
    pub fn merge_fetched(&mut self, set: &FieldSet, mapping: &FieldMapping) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();

        if let Some(v) = set.get(mapping.lux_goal) {
            let clamped = (v.max(0.0) as u16).min(self.lux_goal_max);
            if clamped != self.goal.lux_goal {
                self.goal.lux_goal = clamped;
                outcome.goals_changed = true;
            }
        }
        if let Some(v) = set.get(mapping.temperature_goal) {
            let value = v as i16;
            if value != self.goal.temperature_goal {
                self.goal.temperature_goal = value;
                outcome.goals_changed = true;
            }
        }
        if self.mode == OverrideMode::Automatic {
            if let Some(v) = set.get(mapping.brightness) {
                let clamped = (v.max(0.0) as u8).min(100);
                if self.driven != Some(clamped) {
                    self.goal.brightness = clamped;
                    self.driven = Some(clamped);
                    outcome.drive = Some(clamped);
                }
            }
        }
        outcome
    }
}

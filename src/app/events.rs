//! Outbound application events.
//!
//! The [`ControlService`](super::service::ControlService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them — the production sink logs,
//! test sinks record.
//!
//! `LedChanged` is emitted only on actual transitions: the automatic rule
//! is idempotent, so repeated identical readings produce no duplicates.

use crate::control::state::OverrideMode;
use crate::error::{SensorError, TransportError};

/// Structured events emitted by the control core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppEvent {
    /// The loop started (carries the initial mode).
    Started(OverrideMode),

    /// A button press adjusted the lux goal.
    GoalAdjusted { lux_goal: u16 },

    /// The toggle button flipped the override mode.
    ModeChanged {
        mode: OverrideMode,
        brightness: u8,
    },

    /// The LED brightness actually changed (manual or automatic).
    LedChanged { brightness: u8 },

    /// A sensor read failed this sample tick; the field is absent and
    /// the next scheduled tick retries.
    SampleFailed(SensorError),

    /// A field-set was pushed to the remote service.
    Published,

    /// The push failed; local state is untouched.
    PublishFailed(TransportError),

    /// Remote goals were merged into local state.
    GoalsFetched {
        lux_goal: u16,
        temperature_goal: i16,
    },

    /// The pull failed; local values stand.
    FetchFailed(TransportError),
}

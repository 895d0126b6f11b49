//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the process logger. Tests use a recording sink instead; a future
//! display or metrics adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | mode={:?}", mode);
            }
            AppEvent::GoalAdjusted { lux_goal } => {
                info!("GOAL  | lux_goal={}", lux_goal);
            }
            AppEvent::ModeChanged { mode, brightness } => {
                info!("MODE  | {:?}, LED={}", mode, brightness);
            }
            AppEvent::LedChanged { brightness } => {
                info!("LED   | brightness={}", brightness);
            }
            AppEvent::SampleFailed(e) => {
                warn!("SENSE | read failed: {}", e);
            }
            AppEvent::Published => {
                info!("SYNC  | published");
            }
            AppEvent::PublishFailed(e) => {
                warn!("SYNC  | publish failed: {}", e);
            }
            AppEvent::GoalsFetched {
                lux_goal,
                temperature_goal,
            } => {
                info!(
                    "SYNC  | goals fetched: lux_goal={} temperature_goal={}",
                    lux_goal, temperature_goal
                );
            }
            AppEvent::FetchFailed(e) => {
                warn!("SYNC  | fetch failed: {}", e);
            }
        }
    }
}

//! Fixed-tick scheduler for the control service.
//!
//! Polling with sleep, not event-driven I/O: the loop wakes every tick,
//! runs one cycle, and sleeps the remainder. There is no terminal state
//! in production — the process runs until killed — but the loop checks a
//! [`CancelToken`] each tick so tests (and a future graceful-shutdown
//! path) can stop it without changing observable behavior.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::app::ports::{EventSink, GpioPort, SensorPort, TelemetryPort};
use crate::app::service::ControlService;

/// Cooperative cancellation flag, checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Drive the service forever (or until `token` is cancelled).
///
/// No operation inside a tick may block longer than the transport/bus
/// collaborators' own bounded calls; the loop imposes no extra timeout
/// and never retries within a tick.
pub fn run(
    service: &mut ControlService,
    hw: &mut (impl SensorPort + GpioPort),
    net: &mut impl TelemetryPort,
    sink: &mut impl EventSink,
    tick: Duration,
    token: &CancelToken,
) {
    let origin = Instant::now();
    service.start(hw, net, sink);
    while !token.is_cancelled() {
        service.tick(origin.elapsed(), hw, net, sink);
        thread::sleep(tick);
    }
}

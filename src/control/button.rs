//! Edge-detecting button input.
//!
//! Buttons are active-low momentary switches on pulled-up inputs. A press
//! event fires exactly once per HIGH→LOW transition, never on sustained
//! LOW and never on release. One square read per loop tick is trusted:
//! there is deliberately no debounce timer or stable-read filter beyond
//! edge detection, preserving the observable timing of the original
//! deployment. Do not add filtering here without revisiting that
//! requirement.

use crate::app::ports::{GpioPort, Level};

/// A single HIGH→LOW transition on a monitored pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    pub pin: u8,
}

/// What a press on a given button means to the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    DecreaseGoal,
    IncreaseGoal,
    ToggleOverride,
}

// ───────────────────────────────────────────────────────────────
// Per-pin edge detector
// ───────────────────────────────────────────────────────────────

/// Converts raw, possibly noisy digital reads into discrete press events.
#[derive(Debug)]
pub struct DebouncedInput {
    pin: u8,
    last_level: Level,
}

impl DebouncedInput {
    /// `initial` is the pin's level at loop start, so a button that is
    /// already held down does not fire a phantom press on the first tick.
    pub fn new(pin: u8, initial: Level) -> Self {
        Self {
            pin,
            last_level: initial,
        }
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Feed the pin's current level; returns a press on the falling edge.
    pub fn poll(&mut self, level: Level) -> Option<PressEvent> {
        let pressed = self.last_level == Level::High && level == Level::Low;
        self.last_level = level;
        pressed.then_some(PressEvent { pin: self.pin })
    }
}

// ───────────────────────────────────────────────────────────────
// Button bank
// ───────────────────────────────────────────────────────────────

/// The three control buttons, polled together once per tick.
pub struct ButtonBank {
    buttons: [(DebouncedInput, ButtonAction); 3],
}

impl ButtonBank {
    /// Seeds each detector from the pin's current level.
    pub fn new(dec_pin: u8, inc_pin: u8, toggle_pin: u8, hw: &mut impl GpioPort) -> Self {
        let seed = |pin: u8, action, hw: &mut dyn GpioPort| {
            (DebouncedInput::new(pin, hw.read_pin(pin)), action)
        };
        Self {
            buttons: [
                seed(dec_pin, ButtonAction::DecreaseGoal, &mut *hw),
                seed(inc_pin, ButtonAction::IncreaseGoal, &mut *hw),
                seed(toggle_pin, ButtonAction::ToggleOverride, &mut *hw),
            ],
        }
    }

    /// Poll every button once; invoke `on_press` for each press event,
    /// in bank order, synchronously within the same tick.
    pub fn poll(&mut self, hw: &mut impl GpioPort, mut on_press: impl FnMut(ButtonAction)) {
        for (input, action) in &mut self.buttons {
            let level = hw.read_pin(input.pin());
            if input.poll(level).is_some() {
                on_press(*action);
            }
        }
    }
}

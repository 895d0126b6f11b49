//! Raspberry Pi GPIO adapter: pulled-up button inputs and the
//! software-PWM LED output.

use std::collections::HashMap;

use anyhow::Context;
use log::warn;
use rppal::gpio::{Gpio, InputPin, OutputPin};

use crate::app::ports::{GpioPort, Level};
use crate::config::SystemConfig;

/// Software PWM carrier frequency for the LED.
const PWM_HZ: f64 = 100.0;

pub struct RpiGpio {
    inputs: HashMap<u8, InputPin>,
    led: OutputPin,
    led_pin: u8,
}

impl RpiGpio {
    pub fn new(config: &SystemConfig) -> anyhow::Result<Self> {
        let gpio = Gpio::new().context("GPIO init")?;

        let mut inputs = HashMap::new();
        for pin in [
            config.button_dec_pin,
            config.button_inc_pin,
            config.button_toggle_pin,
        ] {
            let input = gpio
                .get(pin)
                .with_context(|| format!("claim button pin {pin}"))?
                .into_input_pullup();
            inputs.insert(pin, input);
        }

        let led = gpio
            .get(config.led_pin)
            .with_context(|| format!("claim LED pin {}", config.led_pin))?
            .into_output_low();

        Ok(Self {
            inputs,
            led,
            led_pin: config.led_pin,
        })
    }
}

impl GpioPort for RpiGpio {
    fn read_pin(&mut self, pin: u8) -> Level {
        match self.inputs.get(&pin) {
            Some(input) if input.is_low() => Level::Low,
            Some(_) => Level::High,
            None => {
                // Unclaimed pin: report unpressed rather than stall.
                warn!("read of unconfigured pin {pin}");
                Level::High
            }
        }
    }

    fn set_brightness(&mut self, pin: u8, percent: u8) {
        if pin != self.led_pin {
            warn!("brightness write to unconfigured pin {pin}");
            return;
        }
        let duty = f64::from(percent.min(100)) / 100.0;
        if let Err(e) = self.led.set_pwm_frequency(PWM_HZ, duty) {
            warn!("LED PWM write failed: {e}");
        }
    }
}

//! roomlux — main entry point.
//!
//! Hexagonal wiring: construct the hardware and transport adapters,
//! hand them to the control service, and drive the fixed-tick loop
//! until the process is killed.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                │
//! │                                                      │
//! │  RpiGpio        I2cSensors      ThingSpeakLink       │
//! │  (GpioPort)     (SensorPort)    (TelemetryPort)      │
//! │  LogEventSink (EventSink)                            │
//! │                                                      │
//! │  ───────────── Port Trait Boundary ────────────      │
//! │                                                      │
//! │  ┌────────────────────────────────────────────┐      │
//! │  │        ControlService (pure logic)         │      │
//! │  │  buttons · override · sampler · sync       │      │
//! │  └────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────┘
//! ```

use std::fs;
use std::time::Duration;

use anyhow::Context;
use log::{info, warn};

use roomlux::adapters::gpio::RpiGpio;
use roomlux::adapters::log_sink::LogEventSink;
use roomlux::adapters::sensors::I2cSensors;
use roomlux::adapters::thingspeak::ThingSpeakLink;
use roomlux::app::ports::{GpioPort, Level, SensorPort};
use roomlux::app::service::ControlService;
use roomlux::config::SystemConfig;
use roomlux::error::SensorError;
use roomlux::runtime::{self, CancelToken};

const DEFAULT_CONFIG_PATH: &str = "/etc/roomlux.toml";

/// The service consumes one `hw` value for both pins and sensors (the
/// tick takes them as a single port bundle); this pairs the two
/// adapters.
struct Hardware {
    gpio: RpiGpio,
    sensors: I2cSensors,
}

impl GpioPort for Hardware {
    fn read_pin(&mut self, pin: u8) -> Level {
        self.gpio.read_pin(pin)
    }
    fn set_brightness(&mut self, pin: u8, percent: u8) {
        self.gpio.set_brightness(pin, percent);
    }
}

impl SensorPort for Hardware {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.sensors.read_lux()
    }
    fn read_temperature_pressure(&mut self) -> Result<(f32, f32), SensorError> {
        self.sensors.read_temperature_pressure()
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    info!("roomlux v{}", env!("CARGO_PKG_VERSION"));

    // Config file is optional; invalid content is fatal.
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match fs::read_to_string(&path) {
        Ok(doc) => SystemConfig::from_toml_str(&doc)
            .with_context(|| format!("config file {path}"))?,
        Err(e) => {
            warn!("config file {path} not readable ({e}), using defaults");
            SystemConfig::default()
        }
    };

    let mut hw = Hardware {
        gpio: RpiGpio::new(&config).context("GPIO adapter")?,
        sensors: I2cSensors::new().context("I2C sensor adapter")?,
    };
    let mut net = ThingSpeakLink::connect(&config.telemetry).context("telemetry transport")?;
    let mut sink = LogEventSink::new();

    let mut service = ControlService::new(&config, &mut hw, Duration::ZERO);

    // Runs until the process is killed; the token exists for tests and
    // a future graceful-shutdown hook.
    let token = CancelToken::new();
    runtime::run(
        &mut service,
        &mut hw,
        &mut net,
        &mut sink,
        Duration::from_millis(config.tick_interval_ms),
        &token,
    );
    Ok(())
}

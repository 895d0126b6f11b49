//! System configuration parameters.
//!
//! All tunable parameters for the roomlux loop. Values load from a TOML
//! file at startup; anything missing falls back to the defaults below.
//! Validation failures are fatal at startup — there is no runtime
//! reconfiguration path.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::telemetry::fields::FieldMapping;

/// Where the automatic LED rule takes its lux threshold from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Use the fixed `lux_threshold` value.
    Fixed,
    /// Use the current (remotely adjustable) lux goal.
    LuxGoal,
}

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- GPIO (BCM numbering) ---
    /// LED output pin (software PWM).
    pub led_pin: u8,
    /// Goal-decrement button (input, pull-up, pressed = LOW).
    pub button_dec_pin: u8,
    /// Goal-increment button.
    pub button_inc_pin: u8,
    /// Override-toggle button.
    pub button_toggle_pin: u8,

    // --- Goal defaults ---
    /// Initial lux goal (scaled units, 0..=lux_goal_max).
    pub lux_goal: u16,
    /// Initial temperature goal (integer degrees Celsius).
    pub temperature_goal: i16,
    /// Initial LED brightness (0..=100).
    pub brightness: u8,
    /// Lux-goal adjustment per button press.
    pub lux_goal_step: u16,
    /// Upper clamp for the lux goal.
    pub lux_goal_max: u16,

    // --- Automatic LED rule ---
    /// Brightness applied when the rule switches the LED on (0..=100).
    pub on_brightness: u8,
    /// Threshold source for the rule.
    pub threshold_source: ThresholdSource,
    /// Fixed lux threshold (used when `threshold_source` is `Fixed`).
    pub lux_threshold: f32,

    // --- Timing ---
    /// Control loop tick (milliseconds).
    pub tick_interval_ms: u64,
    /// Sensor sample cadence (seconds), decoupled from the tick rate.
    pub sample_interval_secs: u64,
    /// Telemetry push cadence (seconds).
    pub publish_interval_secs: u64,
    /// Telemetry pull cadence (seconds).
    pub fetch_interval_secs: u64,

    // --- Remote service ---
    pub telemetry: TelemetryConfig,

    // --- Wire field mapping ---
    /// Logical value → `fieldN` wire slot. Positional and
    /// configuration-defined; see [`FieldMapping`].
    pub fields: FieldMapping,
}

/// Credentials and endpoints for the ThingSpeak-compatible service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub mqtt_host: String,
    pub mqtt_port: u16,
    /// Channel the device publishes to and fetches from.
    pub channel_id: String,
    pub client_id: String,
    pub username: String,
    pub password: String,
    /// Read API key for the last-feed fetch.
    pub read_api_key: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // GPIO
            led_pin: 2,
            button_dec_pin: 3,
            button_inc_pin: 4,
            button_toggle_pin: 6,

            // Goals
            lux_goal: 100,
            temperature_goal: 25,
            brightness: 50,
            lux_goal_step: 20,
            lux_goal_max: 1000,

            // Automatic rule
            on_brightness: 100,
            threshold_source: ThresholdSource::Fixed,
            lux_threshold: 40.0,

            // Timing
            tick_interval_ms: 100,        // 10 Hz loop
            sample_interval_secs: 15,     // bus-friendly sample rate
            publish_interval_secs: 15,
            fetch_interval_secs: 15,

            telemetry: TelemetryConfig::default(),
            fields: FieldMapping::default(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            mqtt_host: "mqtt3.thingspeak.com".into(),
            mqtt_port: 1883,
            channel_id: String::new(),
            client_id: String::new(),
            username: String::new(),
            password: String::new(),
            read_api_key: String::new(),
        }
    }
}

impl SystemConfig {
    /// Parse a TOML document, falling back to defaults for missing keys.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|_| Error::Config("invalid TOML"))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every parameter. Invalid configuration is fatal at
    /// startup, not silently clamped.
    pub fn validate(&self) -> Result<()> {
        let pins = [
            self.led_pin,
            self.button_dec_pin,
            self.button_inc_pin,
            self.button_toggle_pin,
        ];
        for (i, a) in pins.iter().enumerate() {
            if pins[i + 1..].contains(a) {
                return Err(Error::Config("duplicate GPIO pin assignment"));
            }
        }
        if self.brightness > 100 || self.on_brightness > 100 {
            return Err(Error::Config("brightness out of 0..=100"));
        }
        if self.lux_goal_step == 0 {
            return Err(Error::Config("lux_goal_step must be non-zero"));
        }
        if self.lux_goal > self.lux_goal_max {
            return Err(Error::Config("lux_goal above lux_goal_max"));
        }
        if self.lux_threshold < 0.0 {
            return Err(Error::Config("lux_threshold must be non-negative"));
        }
        if self.tick_interval_ms == 0
            || self.sample_interval_secs == 0
            || self.publish_interval_secs == 0
            || self.fetch_interval_secs == 0
        {
            return Err(Error::Config("intervals must be non-zero"));
        }
        self.fields.validate()?;
        Ok(())
    }
}

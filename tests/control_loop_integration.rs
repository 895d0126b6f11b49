//! Integration tests: ControlService → state machine → ports.

use std::collections::HashMap;
use std::time::Duration;

use roomlux::app::events::AppEvent;
use roomlux::app::ports::{EventSink, GpioPort, Level, SensorPort, TelemetryPort};
use roomlux::app::service::ControlService;
use roomlux::config::SystemConfig;
use roomlux::control::state::OverrideMode;
use roomlux::error::{SensorError, TransportError};
use roomlux::telemetry::fields::FieldSet;

// ── Mock implementations ──────────────────────────────────────

struct MockHw {
    levels: HashMap<u8, Level>,
    lux: Result<f32, SensorError>,
    climate: Result<(f32, f32), SensorError>,
    led_writes: Vec<u8>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            levels: HashMap::new(),
            lux: Ok(100.0),
            climate: Ok((21.0, 1013.0)),
            led_writes: Vec::new(),
        }
    }

    fn set_level(&mut self, pin: u8, level: Level) {
        self.levels.insert(pin, level);
    }
}

impl GpioPort for MockHw {
    fn read_pin(&mut self, pin: u8) -> Level {
        *self.levels.get(&pin).unwrap_or(&Level::High)
    }
    fn set_brightness(&mut self, _pin: u8, percent: u8) {
        self.led_writes.push(percent);
    }
}

impl SensorPort for MockHw {
    fn read_lux(&mut self) -> Result<f32, SensorError> {
        self.lux
    }
    fn read_temperature_pressure(&mut self) -> Result<(f32, f32), SensorError> {
        self.climate
    }
}

struct MockNet {
    publish_ok: bool,
    attempts: Vec<String>,
    fetch_result: Result<FieldSet, TransportError>,
    reconnects: u32,
}

impl MockNet {
    fn new() -> Self {
        Self {
            publish_ok: true,
            attempts: Vec::new(),
            fetch_result: Ok(FieldSet::new()),
            reconnects: 0,
        }
    }
}

impl TelemetryPort for MockNet {
    fn publish(&mut self, payload: &str) -> Result<(), TransportError> {
        self.attempts.push(payload.to_string());
        if self.publish_ok {
            Ok(())
        } else {
            Err(TransportError::PublishFailed)
        }
    }
    fn fetch_last(&mut self) -> Result<FieldSet, TransportError> {
        self.fetch_result.clone()
    }
    fn reconnect(&mut self) -> Result<(), TransportError> {
        self.reconnects += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink(Vec<AppEvent>);

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.push(*event);
    }
}

// ── Helpers ───────────────────────────────────────────────────

const TOGGLE: u8 = 6;
const INC: u8 = 4;
const DEC: u8 = 3;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn make_service() -> (ControlService, MockHw, MockNet, RecordingSink) {
    let config = SystemConfig::default();
    let mut hw = MockHw::new();
    let service = ControlService::new(&config, &mut hw, Duration::ZERO);
    (service, hw, MockNet::new(), RecordingSink::default())
}

fn press(
    service: &mut ControlService,
    hw: &mut MockHw,
    net: &mut MockNet,
    sink: &mut RecordingSink,
    pin: u8,
    now: Duration,
) {
    hw.set_level(pin, Level::Low);
    service.tick(now, hw, net, sink);
    hw.set_level(pin, Level::High);
    service.tick(now + Duration::from_millis(100), hw, net, sink);
}

fn led_events(sink: &RecordingSink) -> Vec<u8> {
    sink.0
        .iter()
        .filter_map(|e| match e {
            AppEvent::LedChanged { brightness } => Some(*brightness),
            _ => None,
        })
        .collect()
}

// ── Automatic rule, end to end ────────────────────────────────

#[test]
fn lux_stream_drives_led_with_two_transitions() {
    let (mut service, mut hw, mut net, mut sink) = make_service();

    // Threshold 40; samples due every 15 s.
    for (i, lux) in [60.0, 30.0, 30.0, 60.0].into_iter().enumerate() {
        hw.lux = Ok(lux);
        service.tick(secs(15 * (i as u64 + 1)), &mut hw, &mut net, &mut sink);
    }

    // OFF (silent init), ON, no-op, OFF — two transition events.
    assert_eq!(hw.led_writes, vec![0, 100, 0]);
    assert_eq!(led_events(&sink), vec![100, 0]);
}

#[test]
fn identical_readings_produce_no_duplicate_transitions() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    hw.lux = Ok(10.0);
    for i in 1..=5 {
        service.tick(secs(15 * i), &mut hw, &mut net, &mut sink);
    }
    assert_eq!(hw.led_writes, vec![100]);
    assert!(led_events(&sink).is_empty()); // first application is init
}

#[test]
fn failed_lux_read_defers_rule_to_next_sample() {
    let (mut service, mut hw, mut net, mut sink) = make_service();

    hw.lux = Err(SensorError::BusError);
    service.tick(secs(15), &mut hw, &mut net, &mut sink);
    assert!(hw.led_writes.is_empty());
    assert!(sink
        .0
        .contains(&AppEvent::SampleFailed(SensorError::BusError)));

    hw.lux = Ok(10.0);
    service.tick(secs(30), &mut hw, &mut net, &mut sink);
    assert_eq!(hw.led_writes, vec![100]);
}

// ── Buttons and override ──────────────────────────────────────

#[test]
fn toggle_round_trip_restores_brightness() {
    let (mut service, mut hw, mut net, mut sink) = make_service();

    press(&mut service, &mut hw, &mut net, &mut sink, TOGGLE, secs(1));
    assert_eq!(service.mode(), OverrideMode::Manual);
    assert_eq!(hw.led_writes, vec![0]);

    press(&mut service, &mut hw, &mut net, &mut sink, TOGGLE, secs(2));
    assert_eq!(service.mode(), OverrideMode::Automatic);
    assert_eq!(hw.led_writes, vec![0, 50]);
    assert_eq!(service.goal().brightness, 50);
}

#[test]
fn held_button_fires_once() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    hw.set_level(INC, Level::Low);
    for i in 0..10 {
        service.tick(Duration::from_millis(100 * i), &mut hw, &mut net, &mut sink);
    }
    let adjusted: Vec<_> = sink
        .0
        .iter()
        .filter(|e| matches!(e, AppEvent::GoalAdjusted { .. }))
        .collect();
    assert_eq!(adjusted.len(), 1);
    assert_eq!(service.goal().lux_goal, 120);
}

#[test]
fn goal_buttons_step_in_either_mode() {
    let (mut service, mut hw, mut net, mut sink) = make_service();

    press(&mut service, &mut hw, &mut net, &mut sink, INC, secs(1));
    assert_eq!(service.goal().lux_goal, 120);

    press(&mut service, &mut hw, &mut net, &mut sink, TOGGLE, secs(2));
    press(&mut service, &mut hw, &mut net, &mut sink, DEC, secs(3));
    press(&mut service, &mut hw, &mut net, &mut sink, DEC, secs(4));
    assert_eq!(service.goal().lux_goal, 80);
    // Manual override untouched by goal steps.
    assert_eq!(service.mode(), OverrideMode::Manual);
    assert_eq!(service.goal().brightness, 0);
}

#[test]
fn toggle_wins_over_same_tick_sample() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    hw.lux = Ok(10.0); // would switch the LED on in Automatic

    // Press lands on the same tick the sample is due.
    hw.set_level(TOGGLE, Level::Low);
    service.tick(secs(15), &mut hw, &mut net, &mut sink);

    assert_eq!(service.mode(), OverrideMode::Manual);
    // Only the toggle's off-write; the suppressed rule wrote nothing.
    assert_eq!(hw.led_writes, vec![0]);
}

// ── Telemetry sync ────────────────────────────────────────────

#[test]
fn publish_carries_reading_and_goals() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    hw.lux = Ok(87.0);
    hw.climate = Ok((21.4, 1013.2));

    service.tick(secs(15), &mut hw, &mut net, &mut sink);

    assert_eq!(
        net.attempts,
        vec!["field1=21&field2=25&field3=87&field4=0&field5=100&field6=1013&status=MQTTPUBLISH"]
    );
    assert!(sink.0.contains(&AppEvent::Published));
}

#[test]
fn failed_publish_leaves_state_and_next_attempt_uses_newer_data() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    net.publish_ok = false;
    hw.lux = Ok(30.0);

    service.tick(secs(15), &mut hw, &mut net, &mut sink);
    let goal_after_failure = service.goal();
    assert!(sink
        .0
        .contains(&AppEvent::PublishFailed(TransportError::PublishFailed)));
    assert_eq!(service.latest_reading().lux, Some(30.0));
    assert_eq!(goal_after_failure.lux_goal, 100);

    // Next scheduled attempt publishes the newer reading.
    net.publish_ok = true;
    hw.lux = Ok(35.0);
    service.tick(secs(30), &mut hw, &mut net, &mut sink);
    assert_eq!(net.attempts.len(), 2);
    assert!(net.attempts[1].contains("field3=35"));
}

#[test]
fn partial_fetch_updates_only_present_fields() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    let mut set = FieldSet::new();
    set.insert(5, 300.0); // lux goal only
    net.fetch_result = Ok(set);

    service.tick(secs(15), &mut hw, &mut net, &mut sink);

    assert_eq!(service.goal().lux_goal, 300);
    assert_eq!(service.goal().temperature_goal, 25);
    assert!(sink.0.contains(&AppEvent::GoalsFetched {
        lux_goal: 300,
        temperature_goal: 25
    }));
}

#[test]
fn failed_fetch_leaves_goals_untouched() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    net.fetch_result = Err(TransportError::FetchFailed);

    service.tick(secs(15), &mut hw, &mut net, &mut sink);

    assert_eq!(service.goal().lux_goal, 100);
    assert_eq!(service.goal().temperature_goal, 25);
    assert!(sink
        .0
        .contains(&AppEvent::FetchFailed(TransportError::FetchFailed)));
}

#[test]
fn start_seeds_goals_from_initial_fetch() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    let mut set = FieldSet::new();
    set.insert(2, 30.0); // temperature goal
    set.insert(5, 500.0); // lux goal
    net.fetch_result = Ok(set);

    service.start(&mut hw, &mut net, &mut sink);

    assert_eq!(service.goal().lux_goal, 500);
    assert_eq!(service.goal().temperature_goal, 30);
    assert!(sink.0.contains(&AppEvent::Started(OverrideMode::Automatic)));
}

#[test]
fn start_tolerates_fetch_failure() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    net.fetch_result = Err(TransportError::Disconnected);

    service.start(&mut hw, &mut net, &mut sink);

    assert_eq!(service.goal().lux_goal, 100);
    assert!(sink.0.contains(&AppEvent::Started(OverrideMode::Automatic)));
}

#[test]
fn remote_brightness_suppressed_while_manual() {
    let (mut service, mut hw, mut net, mut sink) = make_service();
    press(&mut service, &mut hw, &mut net, &mut sink, TOGGLE, secs(1));
    hw.led_writes.clear();

    let mut set = FieldSet::new();
    set.insert(4, 80.0); // brightness
    set.insert(5, 400.0); // lux goal
    net.fetch_result = Ok(set);
    service.tick(secs(15), &mut hw, &mut net, &mut sink);

    // Goal merged, brightness override respected.
    assert_eq!(service.goal().lux_goal, 400);
    assert_eq!(service.goal().brightness, 0);
    assert!(hw.led_writes.is_empty());
}

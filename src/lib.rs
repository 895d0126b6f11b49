//! roomlux control-loop library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. Hardware-specific adapter code is guarded by the `rpi`
//! cargo feature within the adapters module; everything else builds and
//! tests on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod runtime;
pub mod telemetry;
pub mod timer;

pub mod adapters;

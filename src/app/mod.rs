//! The hexagonal core: port traits, outbound events, and the control
//! service that composes the leaf components into one scheduling tick.

pub mod events;
pub mod ports;
pub mod service;

//! Leaf components of the control loop: edge-detected button input, the
//! override state machine, and the cadenced sensor sampler.

pub mod button;
pub mod sampler;
pub mod state;

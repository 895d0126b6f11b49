//! Remote synchronization: the wire field-set format and the two
//! independently-timed push/pull activities.

pub mod fields;
pub mod sync;

//! Frame pacing and the progress state machine.

pub(crate) mod clock;
pub(crate) mod driver;

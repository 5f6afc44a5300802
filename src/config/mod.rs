//! Validated flight configuration supplied by the host application.

pub(crate) mod model;
pub(crate) mod time;

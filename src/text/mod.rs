//! Text shaping (parley) and measurement.

pub(crate) mod engine;
pub(crate) mod measure;

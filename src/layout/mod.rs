//! Deterministic mapping from points to canvas geometry.
//!
//! Everything here is computed once per recording pass and stays frozen while frames are drawn.

pub(crate) mod geometry;
pub(crate) mod labels;
pub(crate) mod metrics;

//! CPU drawing of flight frames.

pub mod cpu;
pub mod frame;
pub mod scene;

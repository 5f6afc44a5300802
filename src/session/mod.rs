//! Recording sessions: the orchestrator plus artifact naming and saving.

pub mod downloads;
pub mod naming;
pub mod recorder;

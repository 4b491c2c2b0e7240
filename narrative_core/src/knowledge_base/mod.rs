//! Knowledge Base module - facts, who knows them, and how they come out.
//!
//! - **graph**: learning, suspicion derivation and fact propagation
//! - **secrets**: scenario-matched secret generation
//! - **revelation**: which fact a character is pushed to disclose, and when

mod graph;
mod revelation;
mod secrets;

pub use graph::*;
pub use revelation::*;
pub use secrets::*;

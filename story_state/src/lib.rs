//! # Story State
//!
//! The canonical state of a narrative playthrough: characters, arcs, facts,
//! knowledge, relationships and the timeline. This crate holds data and pure
//! state transitions only; all generation logic lives in `narrative_core`.

pub mod entities;
pub mod mechanics;
pub mod persist;
pub mod world_state;

pub use entities::*;
pub use mechanics::*;
pub use persist::{deserialize, load_state, serialize, serialize_pretty, PersistError};
pub use world_state::*;

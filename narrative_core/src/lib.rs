//! # Narrative Core
//!
//! The behavioural half of the emergent narrative engine. This crate works on
//! the [`story_state::NarrativeState`] held by the caller: it generates story
//! arcs, tracks who knows what, runs group scenes, plans and applies
//! off-screen time-jumps, and assembles prompt fragments for an external
//! text-completion service.
//!
//! ## Core Components
//!
//! - **knowledge_base**: Fact graph, secret seeding, propagation and revelation pressure
//! - **tension**: Pairwise and group tension from relationship metrics
//! - **arcs**: Template library and arc generation
//! - **group**: Multi-party scenes, agendas and emergent arcs
//! - **simulation**: Directives for time-jumps and folding their results back in
//! - **context_assembler**: Prompt fragments built from the state
//! - **events**: Payload types parsed from the completion service
//!
//! ## Design Philosophy
//!
//! - **State-Driven**: Every decision reads the current state; nothing is cached between calls
//! - **Pure**: Operations take a state and return the next one, the caller owns storage
//! - **Reproducible**: All randomness comes from a caller-supplied RNG

pub mod arcs;
pub mod config;
pub mod context_assembler;
pub mod engine;
pub mod error;
pub mod events;
pub mod group;
pub mod knowledge_base;
pub mod simulation;
pub mod tension;
pub mod text;

pub use arcs::*;
pub use config::*;
pub use context_assembler::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use group::*;
pub use knowledge_base::*;
pub use simulation::*;
pub use tension::*;

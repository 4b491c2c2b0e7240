//! Story arcs - template library and generation.
//!
//! Generation picks a template for the current difficulty, casts the least
//! busy characters into its roles, substitutes names into beats and facts,
//! and links each beat to every beat of the earlier phases.

mod generator;
mod templates;

pub use generator::*;
pub use templates::*;

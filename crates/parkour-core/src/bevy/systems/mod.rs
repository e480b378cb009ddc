//! Systems of the course plugin.
//!
//! - input: keyboard → intent, restart key
//! - simulation: fixed-step ticking and restart handling
//! - entities: course entity spawning and transform write-back

pub mod entities;
pub mod input;
pub mod simulation;

pub use entities::*;
pub use input::*;
pub use simulation::*;

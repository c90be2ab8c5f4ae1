//! Cosmetic visual effects
//!
//! Nothing here feeds back into the simulation.

pub mod ripple;

pub use ripple::{Emitter, Ring, RippleField};

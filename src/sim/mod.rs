//! Deterministic simulation module
//!
//! Shared by every mini-game. This module must stay pure:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod drag;
pub mod entity;
pub mod forces;
pub mod integrate;
pub mod session;
pub mod tick;
pub mod zone;

pub use drag::{DragState, DragTracker, Draggable, Release, ReleasePolicy};
pub use entity::{Electron, Entity, EntityFlags, EntityId, EntityStore};
pub use forces::{ForceParams, accumulate, pair_repulsion};
pub use integrate::{IntegratorParams, PlayField, StepContacts, SupportSurface, rest_on, step, step_held};
pub use session::{Session, SessionEvent, SessionPhase};
pub use tick::{FrameClock, InputEvent, Simulation, TickInput, run_frame, tick};
pub use zone::TargetZone;

//! Maxwell Games - interactive electromagnetism mini-games
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, forces, integration, drag/dock, win state)
//! - `games`: Rules for each mini-game built on top of `sim`
//! - `fx`: Cosmetic effects (ripple emitters)
//! - `renderer`: Frame description and 2D canvas painter
//! - `timers`: Fire-and-forget timers with teardown
//! - `storage` / `progress`: LocalStorage-backed completion flags
//! - `nav`: Routes, menu cards and the explanation video view
//! - `tuning`: Data-driven game constants

pub mod fx;
pub mod games;
pub mod nav;
pub mod progress;
pub mod renderer;
pub mod sim;
pub mod storage;
pub mod timers;
pub mod tuning;

pub use games::GameId;
pub use progress::ProgressStore;
pub use tuning::Tuning;

/// Simulation clock constants
pub mod consts {
    /// Fixed simulation timestep (one tick per display refresh at 60 Hz).
    /// Per-tick physics constants in `tuning` are calibrated to this rate.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Simulation ticks per second
    pub const TICKS_PER_SEC: f64 = 60.0;
}

/// Convert a duration in milliseconds to whole simulation ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: f64) -> u64 {
    if ms <= 0.0 {
        return 0;
    }
    (ms * consts::TICKS_PER_SEC / 1000.0 - 1e-9).ceil() as u64
}

/// Convert a tick count back to milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> f64 {
    ticks as f64 * 1000.0 / consts::TICKS_PER_SEC
}

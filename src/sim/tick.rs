//! Fixed timestep simulation tick
//!
//! Input events are applied in arrival order before the simulation steps,
//! so an event's effect is always visible to the very next tick.

use glam::Vec2;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Discrete input event in play-field coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Vec2 },
    PointerMove { pos: Vec2 },
    PointerUp { pos: Vec2 },
    /// Pointer lost (pointercancel, blur)
    PointerCancel,
    DoubleClick { pos: Vec2 },
    /// Right click / long press
    SecondaryClick { pos: Vec2 },
}

/// Input commands queued for the next tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Anything that consumes input events and advances in fixed steps
pub trait Simulation {
    fn handle(&mut self, event: &InputEvent);
    /// Advance one tick of `dt` seconds
    fn step(&mut self, dt: f32);
}

/// Apply queued input, then advance one tick
pub fn tick<S: Simulation + ?Sized>(sim: &mut S, input: &TickInput, dt: f32) {
    for event in &input.events {
        sim.handle(event);
    }
    sim.step(dt);
}

/// Converts variable display frame times into fixed ticks
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ticks due at `now_ms` (capped at `MAX_SUBSTEPS`)
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time = Some(now_ms);

        // Long stalls (hidden tab) must not fast-forward the game
        self.accumulator += dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        substeps
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}

/// Run one display frame: drain the queued input, then step every due tick
pub fn run_frame<S: Simulation + ?Sized>(
    sim: &mut S,
    clock: &mut FrameClock,
    input: &mut TickInput,
    now_ms: f64,
) -> u32 {
    for event in input.events.drain(..) {
        sim.handle(&event);
    }
    let ticks = clock.advance(now_ms);
    for _ in 0..ticks {
        sim.step(SIM_DT);
    }
    ticks
}

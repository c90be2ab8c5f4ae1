//! Expanding ring emitters anchored to named points
//!
//! Purely cosmetic. Rings are a function of wall-clock phase, so an emitter
//! owns no per-ring state; the animation loop only needs to know whether any
//! emitter is still active.

use std::collections::BTreeMap;

use glam::Vec2;

use crate::tuning::RippleTuning;

/// Default hue for emitters (sky blue)
pub const DEFAULT_HUE: f32 = 205.0;

/// A named ring source
#[derive(Debug, Clone, PartialEq)]
pub struct Emitter {
    pub key: String,
    pub pos: Vec2,
    /// HSL hue in degrees
    pub hue: f32,
}

/// One ring to stroke this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
    pub alpha: f32,
    pub hue: f32,
}

/// Active emitters keyed by name (sorted for stable draw order)
#[derive(Debug, Clone, Default)]
pub struct RippleField {
    emitters: BTreeMap<String, Emitter>,
}

impl RippleField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move an emitter. Returns true if the key is new.
    pub fn add(&mut self, key: &str, pos: Vec2, hue: f32) -> bool {
        let is_new = !self.emitters.contains_key(key);
        self.emitters.insert(
            key.to_string(),
            Emitter {
                key: key.to_string(),
                pos,
                hue,
            },
        );
        if is_new {
            log::debug!("ripple emitter '{key}' started");
        }
        is_new
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.emitters.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.emitters.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.emitters.contains_key(key)
    }

    /// The render loop keeps rescheduling itself only while this is true
    pub fn is_active(&self) -> bool {
        !self.emitters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.emitters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitters.is_empty()
    }

    pub fn emitters(&self) -> impl Iterator<Item = &Emitter> {
        self.emitters.values()
    }

    /// Rings of every emitter at wall-clock time `now_ms`
    pub fn rings(&self, now_ms: f64, tuning: &RippleTuning) -> Vec<Ring> {
        let mut out = Vec::new();
        for em in self.emitters.values() {
            out.extend(emitter_rings(em, now_ms, tuning));
        }
        out
    }
}

/// Rings of one emitter; radius sweeps with period phase, alpha fades with radius
pub fn emitter_rings(em: &Emitter, now_ms: f64, tuning: &RippleTuning) -> Vec<Ring> {
    let t = (now_ms.rem_euclid(tuning.period_ms) / tuning.period_ms) as f32;
    let base = t * tuning.max_radius;
    (0..tuning.rings)
        .filter_map(|k| {
            let r = base - k as f32 * tuning.ring_gap;
            if r <= tuning.min_radius || r >= tuning.max_radius {
                return None;
            }
            let alpha = tuning.base_alpha
                * (0.65 + 0.35 * ((r / tuning.ring_gap) * std::f32::consts::PI).sin());
            Some(Ring {
                center: em.pos,
                radius: r,
                alpha,
                hue: em.hue,
            })
        })
        .collect()
}

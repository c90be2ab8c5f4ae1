//! Target zones for snap-to-dock tests
//!
//! Zone tests are pure functions of positions, so repeating a test against
//! unchanged positions always gives the same verdict.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A region an entity's reference point is tested against
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetZone {
    /// Point target with a tolerance radius
    Circle { center: Vec2, radius: f32 },
    /// Axis-aligned rectangle
    Rect { min: Vec2, max: Vec2 },
}

impl TargetZone {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        TargetZone::Circle { center, radius }
    }

    /// Rectangle from top-left corner and size
    pub fn rect(pos: Vec2, size: Vec2) -> Self {
        TargetZone::Rect {
            min: pos,
            max: pos + size,
        }
    }

    /// Whether a point lies inside the zone (edges inclusive)
    pub fn contains(&self, p: Vec2) -> bool {
        match *self {
            TargetZone::Circle { radius, .. } => self.snap_distance(p) < radius,
            TargetZone::Rect { min, max } => {
                p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
            }
        }
    }

    /// Position a docked reference point is hard-set to
    pub fn canonical(&self) -> Vec2 {
        match *self {
            TargetZone::Circle { center, .. } => center,
            TargetZone::Rect { min, max } => (min + max) / 2.0,
        }
    }

    /// Distance from a point to the canonical position
    pub fn snap_distance(&self, p: Vec2) -> f32 {
        p.distance(self.canonical())
    }
}

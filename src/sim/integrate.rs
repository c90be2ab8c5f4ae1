//! Semi-implicit Euler integration with boundary and resting-surface contact
//!
//! Positions are the entity's top-left corner; the play field bounds that
//! corner, so the entity always stays fully inside the visible area.

use glam::Vec2;

use super::entity::Entity;

/// Rectangle the entity's top-left corner is confined to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayField {
    pub min: Vec2,
    pub max: Vec2,
}

impl PlayField {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

/// Horizontal surface an entity can come to rest on (a table top)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportSurface {
    pub x: f32,
    pub y: f32,
    pub w: f32,
}

impl SupportSurface {
    /// Whether an entity's horizontal extent overlaps the surface
    pub fn overlaps_x(&self, entity: &Entity) -> bool {
        entity.pos.x + entity.size.x > self.x && entity.pos.x < self.x + self.w
    }

    /// Discrete "sitting on top" test: bottom within `tolerance` of the top
    pub fn supports(&self, entity: &Entity, tolerance: f32) -> bool {
        (entity.bottom() - self.y).abs() <= tolerance && self.overlaps_x(entity)
    }
}

/// Integrator constants (per tick)
#[derive(Debug, Clone, Copy)]
pub struct IntegratorParams {
    pub friction: f32,
    pub restitution_floor: f32,
    pub restitution_wall: f32,
    /// Gap for the per-tick "still on the surface" check
    pub rest_tolerance: f32,
    /// Depth below the surface top still counted as landing
    pub contact_band: f32,
    pub surface_damping: f32,
    /// Floor bounce speed under which the entity stops
    pub floor_rest_speed: f32,
    pub rope_limit: f32,
    pub rope_smoothing: f32,
}

/// Which edges were hit during a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepContacts {
    pub landed: bool,
    pub floor: bool,
    pub ceiling: bool,
    pub wall: bool,
}

/// Advance one entity by one tick under acceleration `accel`
pub fn step(
    entity: &mut Entity,
    accel: Vec2,
    field: &PlayField,
    surface: Option<&SupportSurface>,
    params: &IntegratorParams,
    frame: u64,
) -> StepContacts {
    let mut contacts = StepContacts::default();

    let supported = surface.is_some_and(|s| s.supports(entity, params.rest_tolerance));
    if !supported && entity.pos.y < field.max.y {
        entity.flags.falling = true;
    }

    let prev_bottom = entity.bottom();
    entity.vel += accel;
    entity.pos += entity.vel;
    let approach = entity.vel;
    entity.vel *= params.friction;

    // Landing on the support surface (swept, so fast falls cannot tunnel)
    if let Some(s) = surface {
        if entity.vel.y > 0.0 && s.overlaps_x(entity) {
            let bottom = entity.bottom();
            let crossed = prev_bottom <= s.y;
            if bottom >= s.y && (bottom <= s.y + params.contact_band || crossed) {
                entity.pos.y = s.y - entity.size.y;
                entity.vel.y = 0.0;
                entity.vel.x *= params.surface_damping;
                entity.flags.falling = false;
                contacts.landed = true;
            }
        }
    }

    if entity.pos.y >= field.max.y {
        entity.pos.y = field.max.y;
        entity.vel.y = -approach.y * params.restitution_floor;
        if entity.vel.y.abs() < params.floor_rest_speed {
            entity.vel.y = 0.0;
        }
        if entity.vel.x.abs() < 0.1 {
            entity.vel.x = 0.0;
        }
        contacts.floor = true;
    }
    if entity.pos.x <= field.min.x {
        entity.pos.x = field.min.x;
        entity.vel.x = -approach.x * params.restitution_wall;
        contacts.wall = true;
    }
    if entity.pos.x >= field.max.x {
        entity.pos.x = field.max.x;
        entity.vel.x = -approach.x * params.restitution_wall;
        contacts.wall = true;
    }
    if entity.pos.y < field.min.y {
        entity.pos.y = field.min.y;
        entity.vel.y = -approach.y * params.restitution_floor;
        contacts.ceiling = true;
    }

    let t = frame as f32;
    let target = (-0.9 * entity.vel.x + 1.2 * (t * 0.08 + entity.id.0 as f32).sin())
        .clamp(-params.rope_limit, params.rope_limit);
    smooth_rope(entity, target, params.rope_smoothing);

    contacts
}

/// Held entities only update their cosmetic rope
pub fn step_held(entity: &mut Entity) {
    let target = (-0.6 * entity.vel.x).clamp(-10.0, 10.0);
    smooth_rope(entity, target, 0.2);
}

/// Exponential smoothing toward `target`
fn smooth_rope(entity: &mut Entity, target: f32, gain: f32) {
    entity.rope += (target - entity.rope) * gain;
}

/// Resolve a release: rest on the surface if close enough, otherwise fall.
/// Velocity is zeroed either way. Returns true if the entity now rests.
pub fn rest_on(entity: &mut Entity, surface: Option<&SupportSurface>, tolerance: f32) -> bool {
    entity.vel = Vec2::ZERO;
    match surface {
        Some(s) if s.supports(entity, tolerance) => {
            entity.pos.y = s.y - entity.size.y;
            entity.flags.falling = false;
            true
        }
        _ => {
            entity.flags.falling = true;
            false
        }
    }
}

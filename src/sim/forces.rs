//! Per-tick force accumulation
//!
//! Pairwise charge repulsion, state-dependent gravity and a small
//! deterministic jitter. Results are accelerations in px/tick² (unit mass).

use glam::Vec2;

use super::entity::{Entity, EntityId, EntityStore};

/// Force model constants
#[derive(Debug, Clone, Copy)]
pub struct ForceParams {
    pub k_repel: f32,
    /// Added to squared distance to keep the force finite at zero distance
    pub softening: f32,
    /// Cap on repulsion magnitude per pair per tick
    pub max_repel_step: f32,
    pub gravity_base: f32,
    pub gravity_charged: f32,
    pub jitter_x: f32,
    pub jitter_y: f32,
}

/// Repulsion exerted on `a` by `b`, with `a`/`b` the two reference points.
///
/// `pair_repulsion(b, a) == -pair_repulsion(a, b)` for every pair.
pub fn pair_repulsion(a: Vec2, b: Vec2, params: &ForceParams) -> Vec2 {
    let d = a - b;
    let d2 = d.length_squared() + params.softening;
    let dist = d2.sqrt();
    let f = (params.k_repel / d2).min(params.max_repel_step);
    d / dist * f
}

/// Oscillatory perturbation keyed by entity id and frame counter
pub fn jitter(id: EntityId, frame: u64, params: &ForceParams) -> Vec2 {
    let t = frame as f32;
    let k = id.0 as f32;
    Vec2::new(
        params.jitter_x * (t * 0.12 + k * 1.7).cos(),
        -params.jitter_y * (t * 0.15 + k * 2.1).sin(),
    )
}

/// Gravity for an entity (+y is down)
pub fn gravity(entity: &Entity, params: &ForceParams) -> Vec2 {
    let g = if entity.flags.charged {
        params.gravity_charged
    } else {
        params.gravity_base
    };
    Vec2::new(0.0, g)
}

/// Net acceleration for every entity, aligned with store iteration order.
///
/// Only charged entities repel each other and jitter. Every entity takes part
/// in the pair sum, including held ones, so the integrator can skip them
/// without breaking symmetry for the rest.
pub fn accumulate(store: &EntityStore, params: &ForceParams, frame: u64) -> Vec<Vec2> {
    let entities = store.as_slice();
    let mut acc = vec![Vec2::ZERO; entities.len()];

    for i in 0..entities.len() {
        if !entities[i].flags.charged {
            continue;
        }
        for j in (i + 1)..entities.len() {
            if !entities[j].flags.charged {
                continue;
            }
            let f = pair_repulsion(entities[i].pos, entities[j].pos, params);
            acc[i] += f;
            acc[j] -= f;
        }
    }

    for (a, e) in acc.iter_mut().zip(entities) {
        *a += gravity(e, params);
        if e.flags.charged {
            *a += jitter(e.id, frame, params);
        }
    }

    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params() -> ForceParams {
        ForceParams {
            k_repel: 900.0,
            softening: 60.0,
            max_repel_step: 0.45,
            gravity_base: 0.55,
            gravity_charged: 0.38,
            jitter_x: 0.02,
            jitter_y: 0.015,
        }
    }

    #[test]
    fn test_repulsion_finite_at_zero_distance() {
        let f = pair_repulsion(Vec2::ZERO, Vec2::ZERO, &params());
        assert!(f.is_finite());
        assert_eq!(f, Vec2::ZERO);
    }

    #[test]
    fn test_repulsion_capped() {
        let f = pair_repulsion(Vec2::new(1.0, 0.0), Vec2::ZERO, &params());
        assert!(f.length() <= 0.45 + 1e-6);
        assert!(f.x > 0.0);
    }

    #[test]
    fn test_repulsion_decays_with_distance() {
        let near = pair_repulsion(Vec2::new(80.0, 0.0), Vec2::ZERO, &params());
        let far = pair_repulsion(Vec2::new(200.0, 0.0), Vec2::ZERO, &params());
        assert!(far.length() < near.length());
    }

    #[test]
    fn test_uncharged_feel_only_gravity() {
        let mut store = EntityStore::new();
        store.insert(Entity::new(1, Vec2::ZERO, Vec2::ONE));
        store.insert(Entity::new(2, Vec2::new(1.0, 0.0), Vec2::ONE));
        let acc = accumulate(&store, &params(), 10);
        assert_eq!(acc, vec![Vec2::new(0.0, 0.55), Vec2::new(0.0, 0.55)]);
    }

    #[test]
    fn test_charged_have_reduced_gravity() {
        let p = params();
        let mut e = Entity::new(1, Vec2::ZERO, Vec2::ONE);
        e.flags.charged = true;
        assert!(gravity(&e, &p).y < p.gravity_base);
    }

    proptest! {
        #[test]
        fn prop_repulsion_symmetric(ax in -500.0f32..500.0, ay in -500.0f32..500.0,
                                    bx in -500.0f32..500.0, by in -500.0f32..500.0) {
            let p = params();
            let a = Vec2::new(ax, ay);
            let b = Vec2::new(bx, by);
            let fab = pair_repulsion(a, b, &p);
            let fba = pair_repulsion(b, a, &p);
            prop_assert!((fab + fba).length() < 1e-5);
        }

        #[test]
        fn prop_accumulated_repulsion_cancels(xs in proptest::collection::vec((-300.0f32..300.0, -300.0f32..300.0), 2..6)) {
            let mut p = params();
            p.gravity_charged = 0.0;
            p.jitter_x = 0.0;
            p.jitter_y = 0.0;
            let mut store = EntityStore::new();
            for (i, (x, y)) in xs.iter().enumerate() {
                let mut e = Entity::new(i as u32 + 1, Vec2::new(*x, *y), Vec2::ONE);
                e.flags.charged = true;
                store.insert(e);
            }
            let total: Vec2 = accumulate(&store, &p, 0).into_iter().sum();
            prop_assert!(total.length() < 1e-4);
        }
    }
}

//! Entity state and the per-game entity store
//!
//! Games have a small fixed set of entities created at reset and never
//! destroyed mid-session. The store keeps them sorted by id so every pass
//! iterates in the same order.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Unique id of an entity within one game instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Boolean state flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityFlags {
    /// Carries static charge (balloons)
    pub charged: bool,
    /// Under gravity and not supported by a surface
    pub falling: bool,
    /// Docked onto a target zone (wheels, dynamo)
    pub mounted: bool,
    /// Electrically connected (wire leads)
    pub connected: bool,
}

/// An orbiting particle drawn inside a charged entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Electron {
    /// Orbit angle (radians)
    pub angle: f32,
    /// Orbit scale relative to the entity's ellipse (0..1)
    pub radius: f32,
    /// Angular speed (radians per tick, signed)
    pub speed: f32,
    /// Dot size (px)
    pub size: f32,
}

/// Number of particles in a freshly generated cloud is `CLOUD_MIN..CLOUD_MIN + CLOUD_SPREAD`
pub const CLOUD_MIN: usize = 14;
pub const CLOUD_SPREAD: usize = 6;

impl Electron {
    /// Position relative to the entity's top-left corner
    pub fn offset(&self, size: Vec2) -> Vec2 {
        let rx = size.x * 0.32;
        let ry = size.y * 0.38;
        Vec2::new(
            size.x / 2.0 + self.angle.cos() * rx * self.radius,
            size.y / 2.0 + self.angle.sin() * ry * self.radius,
        )
    }
}

/// Generate a fresh electron cloud
pub fn make_cloud(rng: &mut impl Rng) -> Vec<Electron> {
    let n = CLOUD_MIN + rng.random_range(0..CLOUD_SPREAD);
    (0..n)
        .map(|_| {
            let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            Electron {
                angle: rng.random_range(0.0..std::f32::consts::TAU),
                radius: 0.35 + rng.random::<f32>() * 0.6,
                speed: (0.015 + rng.random::<f32>() * 0.02) * sign,
                size: 2.6 + rng.random::<f32>() * 1.8,
            }
        })
        .collect()
}

/// A positioned game object with physics or interaction state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Top-left corner in play-field coordinates (+y is down)
    pub pos: Vec2,
    /// Velocity (px per tick)
    pub vel: Vec2,
    /// Width and height
    pub size: Vec2,
    pub flags: EntityFlags,
    /// Cosmetic rope sway, smoothed toward a velocity-derived target
    pub rope: f32,
    /// Orbiting particles, only populated while charged
    #[serde(default)]
    pub cloud: Vec<Electron>,
}

impl Entity {
    pub fn new(id: u32, pos: Vec2, size: Vec2) -> Self {
        Self {
            id: EntityId(id),
            pos,
            vel: Vec2::ZERO,
            size,
            flags: EntityFlags::default(),
            rope: 0.0,
            cloud: Vec::new(),
        }
    }

    /// Centre of the bounding box
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Set the charged flag. The cloud is regenerated only on a false -> true
    /// transition. Returns true if the flag changed.
    pub fn set_charged(&mut self, charged: bool, rng: &mut impl Rng) -> bool {
        if self.flags.charged == charged {
            return false;
        }
        self.flags.charged = charged;
        if charged {
            self.cloud = make_cloud(rng);
        } else {
            self.cloud.clear();
        }
        true
    }

    /// Rotate every orbiting particle by its speed
    pub fn advance_cloud(&mut self, rng: &mut impl Rng) {
        if !self.flags.charged {
            return;
        }
        if self.cloud.is_empty() {
            self.cloud = make_cloud(rng);
        }
        for e in &mut self.cloud {
            e.angle += e.speed;
        }
    }
}

/// All entities of a game instance, sorted by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    entities: Vec<Entity>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
        }
    }

    /// Insert an entity, keeping id order. Replaces an existing entity with the same id.
    pub fn insert(&mut self, entity: Entity) {
        match self.entities.binary_search_by_key(&entity.id, |e| e.id) {
            Ok(i) => self.entities[i] = entity,
            Err(i) => self.entities.insert(i, entity),
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i])
    }

    /// Swap in a whole new state for an existing entity.
    /// Returns false (and stores nothing) for an unknown id.
    pub fn replace(&mut self, entity: Entity) -> bool {
        match self.index_of(entity.id) {
            Some(i) => {
                self.entities[i] = entity;
                true
            }
            None => false,
        }
    }

    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_store_keeps_id_order() {
        let mut store = EntityStore::new();
        for id in [3, 1, 4, 2] {
            store.insert(Entity::new(id, Vec2::ZERO, Vec2::ONE));
        }
        let ids: Vec<u32> = store.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_replace_unknown_id_is_rejected() {
        let mut store = EntityStore::new();
        store.insert(Entity::new(1, Vec2::ZERO, Vec2::ONE));
        assert!(!store.replace(Entity::new(9, Vec2::ONE, Vec2::ONE)));
        assert_eq!(store.len(), 1);

        let mut moved = store.get(EntityId(1)).unwrap().clone();
        moved.pos = Vec2::new(5.0, 6.0);
        assert!(store.replace(moved));
        assert_eq!(store.get(EntityId(1)).unwrap().pos, Vec2::new(5.0, 6.0));
    }

    #[test]
    fn test_cloud_regenerated_only_on_charge_transition() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut e = Entity::new(1, Vec2::ZERO, Vec2::new(48.0, 66.0));
        assert!(e.set_charged(true, &mut rng));
        let n = e.cloud.len();
        assert!((CLOUD_MIN..CLOUD_MIN + CLOUD_SPREAD).contains(&n));

        let before = e.cloud.clone();
        assert!(!e.set_charged(true, &mut rng));
        assert_eq!(e.cloud, before);

        assert!(e.set_charged(false, &mut rng));
        assert!(e.cloud.is_empty());
    }

    #[test]
    fn test_electrons_stay_inside_entity() {
        let mut rng = Pcg32::seed_from_u64(11);
        let size = Vec2::new(48.0, 66.0);
        let mut e = Entity::new(1, Vec2::ZERO, size);
        e.set_charged(true, &mut rng);
        for _ in 0..100 {
            e.advance_cloud(&mut rng);
        }
        for el in &e.cloud {
            let p = el.offset(size);
            assert!(p.x > 0.0 && p.x < size.x);
            assert!(p.y > 0.0 && p.y < size.y);
        }
    }
}

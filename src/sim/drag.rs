//! Drag-and-dock interaction
//!
//! One automaton shared by every draggable object (balloons, wheels, the
//! dynamo, wire leads):
//!
//! ```text
//! Idle --down--> Dragging --up--> Docked { zone }   (reference point inside a zone)
//!                         \-up--> Idle               (physical release or revert)
//! Docked --down--> Dragging                           (only if the object allows it)
//! ```
//!
//! Objects plug in through [`Draggable`]; each game builds small adapters that
//! expose a position, a zone list and dock callbacks.

use glam::Vec2;

use super::zone::TargetZone;

/// What happens to an object released outside every zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleasePolicy {
    /// Stay where dropped; physics (if any) takes over
    #[default]
    Physical,
    /// Jump back to where the drag started
    Revert,
}

/// Capability interface of a draggable object
pub trait Draggable {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);

    /// Offset from `position()` to the point tested against zones
    fn anchor_offset(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Zones tested on release, in priority order
    fn zones(&self) -> Vec<TargetZone>;

    /// Position to hard-set when docking into `zones()[index]`
    fn docked_position(&self, _index: usize, zone: &TargetZone) -> Vec2 {
        zone.canonical() - self.anchor_offset()
    }

    fn release_policy(&self) -> ReleasePolicy {
        ReleasePolicy::Physical
    }

    /// Whether a docked object may be picked up again
    fn grab_docked(&self) -> bool {
        false
    }

    /// Called when a drag starts (zero velocity, raise z-order...)
    fn on_grab(&mut self) {}
    fn on_dock(&mut self, index: usize);
    fn on_undock(&mut self) {}
    fn on_release_free(&mut self) {}
}

/// Per-object drag state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer minus object position at grab time
        grab_offset: Vec2,
        /// Object position at grab time
        origin: Vec2,
        last_pointer: Vec2,
    },
    Docked {
        zone: usize,
    },
}

/// Outcome of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Docked(usize),
    Free,
    Reverted,
    /// Nothing was being dragged
    Ignored,
}

/// Drag state machine for one object
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    state: DragState,
}

impl DragTracker {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn docked_zone(&self) -> Option<usize> {
        match self.state {
            DragState::Docked { zone } => Some(zone),
            _ => None,
        }
    }

    /// Start a drag. Returns false if already dragging or docked and locked.
    pub fn pointer_down<D: Draggable + ?Sized>(&mut self, target: &mut D, pointer: Vec2) -> bool {
        match self.state {
            DragState::Dragging { .. } => return false,
            DragState::Docked { .. } => {
                if !target.grab_docked() {
                    return false;
                }
                self.undock(target);
            }
            DragState::Idle => {}
        }
        let origin = target.position();
        self.state = DragState::Dragging {
            grab_offset: pointer - origin,
            origin,
            last_pointer: pointer,
        };
        target.on_grab();
        log::debug!("drag start at ({:.1}, {:.1})", pointer.x, pointer.y);
        true
    }

    /// Follow the pointer, preserving the grab point. Returns the new position.
    pub fn pointer_move<D: Draggable + ?Sized>(&mut self, target: &mut D, pointer: Vec2) -> Option<Vec2> {
        if let DragState::Dragging {
            grab_offset,
            last_pointer,
            ..
        } = &mut self.state
        {
            *last_pointer = pointer;
            let pos = pointer - *grab_offset;
            target.set_position(pos);
            Some(pos)
        } else {
            None
        }
    }

    /// Finish a drag and run the dock test
    pub fn pointer_up<D: Draggable + ?Sized>(&mut self, target: &mut D, pointer: Vec2) -> Release {
        let DragState::Dragging {
            grab_offset,
            origin,
            ..
        } = self.state
        else {
            return Release::Ignored;
        };

        target.set_position(pointer - grab_offset);
        let anchor = target.position() + target.anchor_offset();
        let zones = target.zones();

        if let Some((index, zone)) = zones.iter().enumerate().find(|(_, z)| z.contains(anchor)) {
            let docked = target.docked_position(index, zone);
            target.set_position(docked);
            target.on_dock(index);
            self.state = DragState::Docked { zone: index };
            log::debug!("docked into zone {index}");
            return Release::Docked(index);
        }

        self.state = DragState::Idle;
        match target.release_policy() {
            ReleasePolicy::Physical => {
                target.on_release_free();
                Release::Free
            }
            ReleasePolicy::Revert => {
                target.set_position(origin);
                target.on_release_free();
                Release::Reverted
            }
        }
    }

    /// Pointer lost (pointercancel, window blur): release where last seen
    pub fn cancel<D: Draggable + ?Sized>(&mut self, target: &mut D) -> Release {
        match self.state {
            DragState::Dragging { last_pointer, .. } => self.pointer_up(target, last_pointer),
            _ => Release::Ignored,
        }
    }

    /// Explicit un-dock; the object stays where it is
    pub fn undock<D: Draggable + ?Sized>(&mut self, target: &mut D) -> bool {
        if let DragState::Docked { .. } = self.state {
            self.state = DragState::Idle;
            target.on_undock();
            true
        } else {
            false
        }
    }

    /// Force a state without callbacks (used on game reset)
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Minimal draggable used to exercise the automaton
    struct Puck {
        pos: Vec2,
        zones: Vec<TargetZone>,
        policy: ReleasePolicy,
        regrab: bool,
        docked: Option<usize>,
        grabs: u32,
        undocks: u32,
    }

    impl Puck {
        fn new(pos: Vec2) -> Self {
            Self {
                pos,
                zones: vec![TargetZone::circle(Vec2::new(100.0, 100.0), 16.0)],
                policy: ReleasePolicy::Physical,
                regrab: true,
                docked: None,
                grabs: 0,
                undocks: 0,
            }
        }
    }

    impl Draggable for Puck {
        fn position(&self) -> Vec2 {
            self.pos
        }
        fn set_position(&mut self, pos: Vec2) {
            self.pos = pos;
        }
        fn zones(&self) -> Vec<TargetZone> {
            self.zones.clone()
        }
        fn release_policy(&self) -> ReleasePolicy {
            self.policy
        }
        fn grab_docked(&self) -> bool {
            self.regrab
        }
        fn on_grab(&mut self) {
            self.grabs += 1;
        }
        fn on_dock(&mut self, index: usize) {
            self.docked = Some(index);
        }
        fn on_undock(&mut self) {
            self.docked = None;
            self.undocks += 1;
        }
    }

    #[test]
    fn test_grab_point_preserved() {
        let mut puck = Puck::new(Vec2::new(10.0, 10.0));
        let mut t = DragTracker::new();
        assert!(t.pointer_down(&mut puck, Vec2::new(15.0, 12.0)));
        assert_eq!(puck.grabs, 1);
        t.pointer_move(&mut puck, Vec2::new(25.0, 22.0));
        assert_eq!(puck.pos, Vec2::new(20.0, 20.0));
    }

    #[test]
    fn test_second_down_ignored_while_dragging() {
        let mut puck = Puck::new(Vec2::ZERO);
        let mut t = DragTracker::new();
        assert!(t.pointer_down(&mut puck, Vec2::ZERO));
        assert!(!t.pointer_down(&mut puck, Vec2::ONE));
    }

    #[test]
    fn test_dock_snaps_to_canonical() {
        let mut puck = Puck::new(Vec2::ZERO);
        let mut t = DragTracker::new();
        t.pointer_down(&mut puck, Vec2::ZERO);
        t.pointer_move(&mut puck, Vec2::new(90.0, 95.0));
        assert_eq!(t.pointer_up(&mut puck, Vec2::new(92.0, 95.0)), Release::Docked(0));
        assert_eq!(puck.pos, Vec2::new(100.0, 100.0));
        assert_eq!(puck.docked, Some(0));
        assert_eq!(t.docked_zone(), Some(0));
    }

    #[test]
    fn test_physical_release_stays() {
        let mut puck = Puck::new(Vec2::ZERO);
        let mut t = DragTracker::new();
        t.pointer_down(&mut puck, Vec2::ZERO);
        assert_eq!(t.pointer_up(&mut puck, Vec2::new(40.0, 40.0)), Release::Free);
        assert_eq!(puck.pos, Vec2::new(40.0, 40.0));
        assert_eq!(t.state(), DragState::Idle);
    }

    #[test]
    fn test_revert_release_restores_origin() {
        let mut puck = Puck::new(Vec2::new(5.0, 5.0));
        puck.policy = ReleasePolicy::Revert;
        let mut t = DragTracker::new();
        t.pointer_down(&mut puck, Vec2::new(5.0, 5.0));
        assert_eq!(t.pointer_up(&mut puck, Vec2::new(40.0, 40.0)), Release::Reverted);
        assert_eq!(puck.pos, Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_locked_dock_rejects_grab() {
        let mut puck = Puck::new(Vec2::new(100.0, 100.0));
        puck.regrab = false;
        let mut t = DragTracker::new();
        t.pointer_down(&mut puck, Vec2::new(100.0, 100.0));
        t.pointer_up(&mut puck, Vec2::new(100.0, 100.0));
        assert!(!t.pointer_down(&mut puck, Vec2::new(100.0, 100.0)));
        assert!(t.undock(&mut puck));
        assert_eq!(puck.docked, None);
        assert_eq!(puck.undocks, 1);
        assert!(t.pointer_down(&mut puck, Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_cancel_releases_at_last_pointer() {
        let mut puck = Puck::new(Vec2::ZERO);
        let mut t = DragTracker::new();
        t.pointer_down(&mut puck, Vec2::ZERO);
        t.pointer_move(&mut puck, Vec2::new(99.0, 101.0));
        assert_eq!(t.cancel(&mut puck), Release::Docked(0));
        assert_eq!(t.cancel(&mut puck), Release::Ignored);
    }

    proptest! {
        #[test]
        fn prop_redock_without_moving_is_idempotent(dx in -10.0f32..10.0, dy in -10.0f32..10.0,
                                                    gx in -20.0f32..20.0, gy in -20.0f32..20.0) {
            let mut puck = Puck::new(Vec2::ZERO);
            let mut t = DragTracker::new();
            t.pointer_down(&mut puck, Vec2::ZERO);
            let first = t.pointer_up(&mut puck, Vec2::new(100.0 + dx, 100.0 + dy));
            prop_assert_eq!(first, Release::Docked(0));
            let docked_pos = puck.pos;

            let grab = docked_pos + Vec2::new(gx, gy);
            prop_assert!(t.pointer_down(&mut puck, grab));
            let second = t.pointer_up(&mut puck, grab);
            prop_assert_eq!(second, first);
            prop_assert_eq!(puck.pos, docked_pos);
            prop_assert_eq!(t.docked_zone(), Some(0));
        }
    }
}

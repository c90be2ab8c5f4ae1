//! Bicycle dynamo assembly ("cicla con dínamo")
//!
//! Mount both wheels on their axles, press the dynamo roller against the rear
//! wheel, wire the dynamo to the bulb (red to +, black to –) and pedal until
//! the bulb stays lit.

use glam::Vec2;

use super::{Button, GameId, MiniGame, Modal, Toast, UiAction};
use crate::ms_to_ticks;
use crate::renderer::frame::with_alpha;
use crate::renderer::{Color, DrawCmd, Frame, colors, shapes};
use crate::sim::{
    DragTracker, Draggable, Entity, EntityId, EntityStore, InputEvent, ReleasePolicy, Session,
    SessionEvent, Simulation, TargetZone,
};
use crate::timers::{TimerHandle, TimerQueue};
use crate::tuning::DynamoTuning;

pub const FIELD: Vec2 = Vec2::new(900.0, 520.0);

pub const AXLE_FRONT: Vec2 = Vec2::new(260.0, 375.0);
pub const AXLE_REAR: Vec2 = Vec2::new(465.0, 375.0);
pub const WHEEL_R: f32 = 60.0;
/// Roller contact point relative to the rear wheel centre
const REAR_CONTACT: Vec2 = Vec2::new(-70.0, 0.0);

/// Offsets from the dynamo centre
const DYN_SIZE: Vec2 = Vec2::new(110.0, 70.0);
const DYN_ROLLER: Vec2 = Vec2::new(48.0, 0.0);
const DYN_PLUS: Vec2 = Vec2::new(-28.0, -30.0);
const DYN_MINUS: Vec2 = Vec2::new(28.0, -30.0);
/// Docked roller sits this far left of the contact point
const DYN_NUDGE: Vec2 = Vec2::new(-2.0, 0.0);

pub const START_FRONT: Vec2 = Vec2::new(640.0, 330.0);
pub const START_REAR: Vec2 = Vec2::new(160.0, 430.0);
pub const START_DYNAMO: Vec2 = Vec2::new(110.0, 320.0);

pub const BULB: Vec2 = Vec2::new(700.0, 180.0);
pub const BULB_PLUS: Vec2 = Vec2::new(688.0, 258.0);
pub const BULB_MINUS: Vec2 = Vec2::new(712.0, 258.0);

const LEAD_SIZE: Vec2 = Vec2::new(20.0, 20.0);
const LEAD_HIT: f32 = 12.0;
const PLUS_B_START: Vec2 = Vec2::new(140.0, 296.0);
const MINUS_B_START: Vec2 = Vec2::new(200.0, 328.0);

pub const FRONT: EntityId = EntityId(1);
pub const REAR: EntityId = EntityId(2);
pub const DYNAMO: EntityId = EntityId(3);
pub const PLUS_A: EntityId = EntityId(4);
pub const PLUS_B: EntityId = EntityId(5);
pub const MINUS_A: EntityId = EntityId(6);
pub const MINUS_B: EntityId = EntityId(7);

const HINT_WHEELS: &str = "Encaja las dos ruedas en los ejes verdes.";
const HINT_DYNAMO: &str = "Apoya la dínamo: su rodillo debe tocar la rueda trasera (izquierda).";
const HINT_WIRES: &str = "Conecta cables: rojo al + y negro al – (en la dínamo y el bombillo).";
const HINT_PEDAL: &str = "¡Listo! Pedalea y mantén la potencia > 60%.";
const HELP_TOAST: &str = "Encaja ruedas → dínamo → cables → pedalea.";
const INFO_TOAST: &str = "Faraday: ε = -dΦ/dt";
const WIN_TITLE: &str = "¡Felicitaciones! 🎉";
const WIN_BODY: &str = "Encendiste el bombillo con la dínamo.\n\nPulsa «Aceptar» y se habilitará el botón «Explicación».";

/// Terminal polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Plus,
    Minus,
}

impl Terminal {
    fn of(id: EntityId) -> Option<Self> {
        match id {
            PLUS_A | PLUS_B => Some(Terminal::Plus),
            MINUS_A | MINUS_B => Some(Terminal::Minus),
            _ => None,
        }
    }

    fn dynamo_offset(&self) -> Vec2 {
        match self {
            Terminal::Plus => DYN_PLUS,
            Terminal::Minus => DYN_MINUS,
        }
    }

    fn bulb(&self) -> Vec2 {
        match self {
            Terminal::Plus => BULB_PLUS,
            Terminal::Minus => BULB_MINUS,
        }
    }

    fn color(&self) -> Color {
        match self {
            Terminal::Plus => colors::WIRE_PLUS,
            Terminal::Minus => colors::WIRE_MINUS,
        }
    }
}

/// Assembly progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Wheels,
    Dynamo,
    Wires,
    Ready,
}

/// Whether a wire with ends `a`, `b` joins terminals `t1`, `t2` (either way round)
pub fn wire_joins(a: Vec2, b: Vec2, t1: Vec2, t2: Vec2, tolerance: f32) -> bool {
    let near = |p: Vec2, q: Vec2| p.distance(q) < tolerance;
    (near(a, t1) && near(b, t2)) || (near(b, t1) && near(a, t2))
}

/// How a part is dragged and where it may dock
struct DragSetup {
    anchor: Vec2,
    zones: Vec<TargetZone>,
    nudge: Vec2,
    regrab: bool,
    policy: ReleasePolicy,
}

struct PartDrag<'a> {
    entity: &'a mut Entity,
    setup: DragSetup,
}

impl Draggable for PartDrag<'_> {
    fn position(&self) -> Vec2 {
        self.entity.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.entity.pos = pos;
    }

    fn anchor_offset(&self) -> Vec2 {
        self.setup.anchor
    }

    fn zones(&self) -> Vec<TargetZone> {
        self.setup.zones.clone()
    }

    fn docked_position(&self, _index: usize, zone: &TargetZone) -> Vec2 {
        zone.canonical() - self.setup.anchor + self.setup.nudge
    }

    fn release_policy(&self) -> ReleasePolicy {
        self.setup.policy
    }

    fn grab_docked(&self) -> bool {
        self.setup.regrab
    }

    fn on_dock(&mut self, _index: usize) {
        self.entity.flags.mounted = true;
    }

    fn on_undock(&mut self) {
        self.entity.flags.mounted = false;
    }
}

#[derive(Debug, Clone, Copy)]
enum DynamoTimer {
    Pedal,
}

pub struct DynamoGame {
    tuning: DynamoTuning,
    store: EntityStore,
    trackers: Vec<DragTracker>,
    held: Option<EntityId>,
    pedaling: bool,
    cadence: f32,
    power: f32,
    spin: f32,
    pedal_timer: Option<TimerHandle>,
    timers: TimerQueue<DynamoTimer>,
    toast: Toast,
    session: Session,
    modal: Option<Modal>,
    clock_ms: f64,
    tick: u64,
}

fn centered(id: EntityId, center: Vec2, size: Vec2) -> Entity {
    Entity::new(id.0, center - size / 2.0, size)
}

impl DynamoGame {
    pub fn new(tuning: DynamoTuning) -> Self {
        let session = Session::new(ms_to_ticks(tuning.win_confirm_ms));
        let mut game = Self {
            tuning,
            store: EntityStore::new(),
            trackers: Vec::new(),
            held: None,
            pedaling: false,
            cadence: 0.0,
            power: 0.0,
            spin: 0.0,
            pedal_timer: None,
            timers: TimerQueue::new(),
            toast: Toast::default(),
            session,
            modal: None,
            clock_ms: 0.0,
            tick: 0,
        };
        game.restart();
        game
    }

    fn restart(&mut self) {
        let wheel = Vec2::splat(WHEEL_R * 2.0);
        self.store = EntityStore::new();
        self.store.insert(centered(FRONT, START_FRONT, wheel));
        self.store.insert(centered(REAR, START_REAR, wheel));
        self.store.insert(centered(DYNAMO, START_DYNAMO, DYN_SIZE));
        self.store
            .insert(centered(PLUS_A, START_DYNAMO + DYN_PLUS, LEAD_SIZE));
        self.store.insert(centered(PLUS_B, PLUS_B_START, LEAD_SIZE));
        self.store
            .insert(centered(MINUS_A, START_DYNAMO + DYN_MINUS, LEAD_SIZE));
        self.store.insert(centered(MINUS_B, MINUS_B_START, LEAD_SIZE));
        self.trackers = vec![DragTracker::new(); self.store.len()];
        self.held = None;
        self.pedaling = false;
        self.cadence = 0.0;
        self.power = 0.0;
        self.spin = 0.0;
        self.pedal_timer = None;
        self.timers.clear();
        self.toast.clear();
        self.session.reset();
        self.modal = None;
        self.clock_ms = 0.0;
        self.tick = 0;
        self.check_connections();
    }

    fn center_of(&self, id: EntityId) -> Vec2 {
        self.store.get(id).map(Entity::center).unwrap_or_default()
    }

    fn is_mounted(&self, id: EntityId) -> bool {
        self.store.get(id).is_some_and(|e| e.flags.mounted)
    }

    fn is_connected(&self, id: EntityId) -> bool {
        self.store.get(id).is_some_and(|e| e.flags.connected)
    }

    pub fn part(&self, id: EntityId) -> Option<&Entity> {
        self.store.get(id)
    }

    /// Dynamo terminal position for the current dynamo placement
    pub fn dynamo_terminal(&self, t: Terminal) -> Vec2 {
        self.center_of(DYNAMO) + t.dynamo_offset()
    }

    pub fn connections(&self) -> (bool, bool) {
        (self.is_connected(PLUS_A), self.is_connected(MINUS_A))
    }

    pub fn stage(&self) -> Stage {
        if !(self.is_mounted(FRONT) && self.is_mounted(REAR)) {
            Stage::Wheels
        } else if !self.is_mounted(DYNAMO) {
            Stage::Dynamo
        } else if self.connections() != (true, true) {
            Stage::Wires
        } else {
            Stage::Ready
        }
    }

    pub fn hint(&self) -> &'static str {
        match self.stage() {
            Stage::Wheels => HINT_WHEELS,
            Stage::Dynamo => HINT_DYNAMO,
            Stage::Wires => HINT_WIRES,
            Stage::Ready => HINT_PEDAL,
        }
    }

    pub fn is_pedaling(&self) -> bool {
        self.pedaling
    }

    pub fn cadence(&self) -> f32 {
        self.cadence
    }

    /// Percent
    pub fn power(&self) -> f32 {
        self.power
    }

    pub fn bulb_lit(&self) -> bool {
        self.stage() == Stage::Ready && self.power >= self.tuning.lit_threshold
    }

    fn drag_setup(&self, id: EntityId) -> DragSetup {
        let snap = self.tuning.snap;
        let half = |size: Vec2| size / 2.0;
        match id {
            FRONT | REAR => {
                let axle = if id == FRONT { AXLE_FRONT } else { AXLE_REAR };
                DragSetup {
                    anchor: half(Vec2::splat(WHEEL_R * 2.0)),
                    zones: vec![TargetZone::circle(axle, snap)],
                    nudge: Vec2::ZERO,
                    regrab: false,
                    policy: ReleasePolicy::Physical,
                }
            }
            DYNAMO => DragSetup {
                anchor: half(DYN_SIZE) + DYN_ROLLER,
                zones: vec![TargetZone::circle(
                    self.center_of(REAR) + REAR_CONTACT,
                    snap,
                )],
                nudge: DYN_NUDGE,
                regrab: false,
                policy: ReleasePolicy::Physical,
            },
            _ => {
                let t = Terminal::of(id).unwrap_or(Terminal::Plus);
                DragSetup {
                    anchor: half(LEAD_SIZE),
                    zones: vec![
                        TargetZone::circle(self.dynamo_terminal(t), snap),
                        TargetZone::circle(t.bulb(), snap),
                    ],
                    nudge: Vec2::ZERO,
                    regrab: true,
                    policy: ReleasePolicy::Revert,
                }
            }
        }
    }

    fn with_drag<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut DragTracker, &mut PartDrag<'_>) -> R,
    ) -> Option<R> {
        let setup = self.drag_setup(id);
        let index = self.store.index_of(id)?;
        let entity = self.store.get_mut(id)?;
        let mut adapter = PartDrag { entity, setup };
        Some(f(&mut self.trackers[index], &mut adapter))
    }

    /// Lead ends first (nearest wins), then the dynamo body, then the wheels
    fn hit(&self, p: Vec2) -> Option<EntityId> {
        let lead = [PLUS_A, PLUS_B, MINUS_A, MINUS_B]
            .into_iter()
            .map(|id| (id, self.center_of(id).distance(p)))
            .filter(|(_, d)| *d < LEAD_HIT)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id);
        if lead.is_some() {
            return lead;
        }
        if self
            .store
            .get(DYNAMO)
            .is_some_and(|e| TargetZone::rect(e.pos, e.size).contains(p))
        {
            return Some(DYNAMO);
        }
        [REAR, FRONT]
            .into_iter()
            .find(|id| self.center_of(*id).distance(p) < WHEEL_R)
    }

    fn grab(&mut self, pointer: Vec2) {
        if self.held.is_some() {
            return;
        }
        let Some(id) = self.hit(pointer) else {
            return;
        };
        if self.with_drag(id, |t, d| t.pointer_down(d, pointer)) == Some(true) {
            self.held = Some(id);
        }
    }

    fn release(&mut self, pointer: Option<Vec2>) {
        let Some(id) = self.held.take() else {
            return;
        };
        let outcome = match pointer {
            Some(p) => self.with_drag(id, |t, d| t.pointer_up(d, p)),
            None => self.with_drag(id, |t, d| t.cancel(d)),
        };
        log::debug!("Part {} released: {outcome:?}", id.0);
        let before = self.stage();
        self.check_connections();
        let after = self.stage();
        if after != before {
            log::info!("Assembly stage {before:?} -> {after:?}");
        }
    }

    /// Re-derive both circuit halves from lead positions
    fn check_connections(&mut self) {
        let tol = self.tuning.connect_tolerance;
        for (a, b, t) in [
            (PLUS_A, PLUS_B, Terminal::Plus),
            (MINUS_A, MINUS_B, Terminal::Minus),
        ] {
            let ok = wire_joins(
                self.center_of(a),
                self.center_of(b),
                self.dynamo_terminal(t),
                t.bulb(),
                tol,
            );
            for id in [a, b] {
                if let Some(e) = self.store.get_mut(id) {
                    e.flags.connected = ok;
                }
            }
        }
    }

    fn toggle_pedal(&mut self) {
        if !self.pedaling && self.stage() != Stage::Ready {
            return;
        }
        self.pedaling = !self.pedaling;
        log::info!("Pedaling {}", if self.pedaling { "started" } else { "stopped" });
        if let Some(handle) = self.pedal_timer.take() {
            self.timers.cancel(handle);
        }
        self.pedal_update();
    }

    /// One cadence/power update; reschedules itself while anything is moving
    fn pedal_update(&mut self) {
        let t = &self.tuning;
        if self.pedaling {
            let factor = if self.is_mounted(DYNAMO) {
                1.0
            } else {
                t.idle_factor
            };
            self.power =
                (self.power * t.power_decay + factor * self.cadence * t.power_gain).clamp(0.0, 100.0);
            self.cadence = (self.cadence + t.cadence_up).clamp(0.0, 1.0);
        } else {
            self.cadence = (self.cadence - t.cadence_down).max(0.0);
            self.power = (self.power - t.coast_drop).max(0.0);
        }
        let moving = self.pedaling || self.cadence > 0.0 || self.power > 0.0;
        self.pedal_timer = moving.then(|| {
            self.timers
                .schedule(self.clock_ms, self.tuning.pedal_tick_ms, DynamoTimer::Pedal)
        });
    }
}

impl Simulation for DynamoGame {
    fn handle(&mut self, event: &InputEvent) {
        if self.session.is_won() || self.modal.is_some() {
            return;
        }
        match *event {
            InputEvent::PointerDown { pos } => self.grab(pos),
            InputEvent::PointerMove { pos } => {
                if let Some(id) = self.held {
                    self.with_drag(id, |t, d| t.pointer_move(d, pos));
                }
            }
            InputEvent::PointerUp { pos } => self.release(Some(pos)),
            InputEvent::PointerCancel => self.release(None),
            InputEvent::DoubleClick { .. } | InputEvent::SecondaryClick { .. } => {}
        }
    }

    fn step(&mut self, dt: f32) {
        self.clock_ms += dt as f64 * 1000.0;
        self.tick += 1;
        for timer in self.timers.poll(self.clock_ms) {
            match timer {
                DynamoTimer::Pedal => self.pedal_update(),
            }
        }
        self.toast.expire(self.clock_ms);
        self.spin = (self.spin + self.cadence * 0.35) % std::f32::consts::TAU;

        match self.session.update(self.bulb_lit(), self.tick) {
            Some(SessionEvent::Won) => {
                self.modal = Some(Modal::new(WIN_TITLE, WIN_BODY));
            }
            Some(SessionEvent::WinPending) => log::debug!("Bulb lit, confirming win"),
            Some(SessionEvent::WinCancelled) => log::debug!("Bulb dimmed before confirmation"),
            None => {}
        }
    }
}

impl MiniGame for DynamoGame {
    fn id(&self) -> GameId {
        GameId::CiclaDinamo
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.restart();
        log::info!("Dynamo game reset");
    }

    fn frame(&self, _now_ms: f64) -> Frame {
        let mut f = Frame::new();
        f.clear(colors::BACKGROUND);
        f.text(Vec2::new(FIELD.x / 2.0, 30.0), self.hint(), 17.0, colors::INK);

        // Bike frame and axle targets
        let seat = Vec2::new(400.0, 250.0);
        f.line(AXLE_FRONT, seat, 8.0, colors::METAL);
        f.line(AXLE_REAR, seat, 8.0, colors::METAL);
        f.line(AXLE_FRONT, AXLE_REAR, 8.0, colors::METAL);
        f.rounded_rect(seat - Vec2::new(30.0, 8.0), Vec2::new(60.0, 14.0), 6.0, colors::INK);
        for (id, axle) in [(FRONT, AXLE_FRONT), (REAR, AXLE_REAR)] {
            if !self.is_mounted(id) {
                f.ring(axle, self.tuning.snap, 3.0, colors::OK);
            }
        }

        for id in [FRONT, REAR] {
            let spin = if self.is_mounted(id) { self.spin } else { 0.0 };
            f.extend(shapes::wheel(self.center_of(id), WHEEL_R, spin));
        }

        // Dynamo
        if let Some(d) = self.store.get(DYNAMO) {
            f.rounded_rect(d.pos, d.size, 12.0, colors::METAL);
            f.circle(d.center() + DYN_ROLLER, 10.0, colors::TIRE);
            for t in [Terminal::Plus, Terminal::Minus] {
                f.circle(self.dynamo_terminal(t), 6.0, t.color());
            }
            f.text(d.center() + Vec2::new(-10.0, 12.0), "DÍNAMO", 12.0, colors::PAPER);
        }

        // Bulb
        let glow = (self.power / 100.0).clamp(0.0, 1.0);
        let lit = self.bulb_lit();
        if lit {
            f.circle(BULB, 70.0, with_alpha(colors::BULB_ON, 0.35 * glow));
        }
        f.circle(BULB, 40.0, if lit { colors::BULB_ON } else { colors::BULB_OFF });
        f.rect(BULB + Vec2::new(-20.0, 38.0), Vec2::new(40.0, 34.0), colors::METAL);
        for t in [Terminal::Plus, Terminal::Minus] {
            f.circle(t.bulb(), 6.0, t.color());
        }

        // Wires
        for (a, b, t) in [
            (PLUS_A, PLUS_B, Terminal::Plus),
            (MINUS_A, MINUS_B, Terminal::Minus),
        ] {
            let (pa, pb) = (self.center_of(a), self.center_of(b));
            let sag = Vec2::new(0.0, 40.0 + pa.distance(pb) * 0.15);
            f.push(DrawCmd::Quad {
                from: pa,
                ctrl: (pa + pb) / 2.0 + sag,
                to: pb,
                width: 4.0,
                color: t.color(),
            });
            for id in [a, b] {
                let ring = if self.is_connected(id) { colors::OK } else { colors::PAPER };
                f.circle(self.center_of(id), 9.0, ring);
                f.circle(self.center_of(id), 6.0, t.color());
            }
        }

        // Power meter
        let meter = Vec2::new(620.0, 450.0);
        let width = 220.0;
        f.rounded_rect(meter, Vec2::new(width, 18.0), 9.0, colors::SLOT);
        f.rounded_rect(
            meter,
            Vec2::new(width * glow, 18.0),
            9.0,
            if lit { colors::OK } else { colors::SPARK },
        );
        f.text(
            meter + Vec2::new(width / 2.0, -14.0),
            format!("Potencia: {:.0}%", self.power),
            14.0,
            colors::INK,
        );
        f
    }

    fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    fn dismiss_modal(&mut self) {
        if self.modal.take().is_some() && self.session.is_won() {
            self.session.acknowledge();
        }
    }

    fn toast(&self) -> Option<&str> {
        self.toast.text()
    }

    fn act(&mut self, action: UiAction) {
        match action {
            UiAction::Reset => self.reset(),
            UiAction::Help => self.toast.show(HELP_TOAST, self.clock_ms, self.tuning.toast_ms),
            UiAction::Info => self.toast.show(INFO_TOAST, self.clock_ms, self.tuning.toast_ms),
            UiAction::TogglePedal => self.toggle_pedal(),
            UiAction::Explain => {}
        }
    }

    fn buttons(&self) -> Vec<Button> {
        let pedal = if self.pedaling {
            "⏹️ Parar"
        } else {
            "🚴 Pedalear"
        };
        let mut buttons = vec![
            Button::new(UiAction::Reset, "🔄 Reiniciar"),
            Button::new(UiAction::Help, "📖 Ayuda"),
            Button::new(UiAction::TogglePedal, pedal)
                .enabled(self.pedaling || self.stage() == Stage::Ready),
            Button::new(UiAction::Info, "➡️ Siguiente"),
        ];
        if self.session.can_continue() {
            buttons.push(Button::new(UiAction::Explain, "🎬 Explicación"));
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn drag(g: &mut DynamoGame, from: Vec2, to: Vec2) {
        g.handle(&InputEvent::PointerDown { pos: from });
        g.handle(&InputEvent::PointerMove { pos: to });
        g.handle(&InputEvent::PointerUp { pos: to });
    }

    fn run(g: &mut DynamoGame, ticks: u32) {
        for _ in 0..ticks {
            g.step(SIM_DT);
        }
    }

    fn mount_wheels(g: &mut DynamoGame) {
        drag(g, START_FRONT, AXLE_FRONT + Vec2::new(5.0, 5.0));
        drag(g, START_REAR, AXLE_REAR);
    }

    #[test]
    fn test_initial_stage_and_hint() {
        let g = DynamoGame::new(DynamoTuning::default());
        assert_eq!(g.stage(), Stage::Wheels);
        assert_eq!(g.hint(), HINT_WHEELS);
        assert_eq!(g.connections(), (false, false));
        // Lead A starts on its dynamo terminal
        assert_eq!(g.part(PLUS_A).unwrap().center(), g.dynamo_terminal(Terminal::Plus));
    }

    #[test]
    fn test_wheel_snaps_to_axle_and_locks() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        drag(&mut g, START_FRONT, AXLE_FRONT + Vec2::new(5.0, 5.0));
        let front = g.part(FRONT).unwrap();
        assert_eq!(front.center(), AXLE_FRONT);
        assert!(front.flags.mounted);

        // Locked once mounted
        drag(&mut g, AXLE_FRONT, Vec2::new(700.0, 100.0));
        assert_eq!(g.part(FRONT).unwrap().center(), AXLE_FRONT);
    }

    #[test]
    fn test_wheel_far_from_axle_stays_put() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        let drop = AXLE_FRONT + Vec2::new(40.0, 0.0);
        drag(&mut g, START_FRONT, drop);
        let front = g.part(FRONT).unwrap();
        assert_eq!(front.center(), drop);
        assert!(!front.flags.mounted);
    }

    #[test]
    fn test_dynamo_docks_against_rear_wheel() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        mount_wheels(&mut g);
        assert_eq!(g.stage(), Stage::Dynamo);
        let contact = AXLE_REAR + REAR_CONTACT;
        drag(&mut g, START_DYNAMO, contact - DYN_ROLLER + Vec2::new(3.0, -4.0));
        let d = g.part(DYNAMO).unwrap();
        assert!(d.flags.mounted);
        assert_eq!(d.center() + DYN_ROLLER, contact + DYN_NUDGE);
        assert_eq!(g.stage(), Stage::Wires);
    }

    #[test]
    fn test_lead_reverts_when_dropped_nowhere() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        drag(&mut g, PLUS_B_START, Vec2::new(500.0, 100.0));
        assert_eq!(g.part(PLUS_B).unwrap().center(), PLUS_B_START);
    }

    #[test]
    fn test_wire_joins_either_orientation() {
        let (t1, t2) = (Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0));
        assert!(wire_joins(t1, t2, t1, t2, 14.0));
        assert!(wire_joins(t2 + Vec2::new(5.0, 5.0), t1, t1, t2, 14.0));
        assert!(!wire_joins(t1, t1, t1, t2, 14.0));
    }

    #[test]
    fn test_pedal_disabled_until_ready() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        g.act(UiAction::TogglePedal);
        assert!(!g.is_pedaling());
        let pedal = g
            .buttons()
            .into_iter()
            .find(|b| b.action == UiAction::TogglePedal)
            .unwrap();
        assert!(!pedal.enabled);
    }

    #[test]
    fn test_coasting_decays_to_zero() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        g.pedaling = true;
        g.pedal_update();
        run(&mut g, 120);
        assert!(g.power() > 0.0);
        g.pedaling = false;
        if let Some(h) = g.pedal_timer.take() {
            g.timers.cancel(h);
        }
        g.pedal_update();
        run(&mut g, 600);
        assert_eq!(g.power(), 0.0);
        assert_eq!(g.cadence(), 0.0);
        assert!(g.timers.is_empty());
    }

    #[test]
    fn test_idle_dynamo_makes_less_power() {
        let mut off = DynamoGame::new(DynamoTuning::default());
        let mut on = DynamoGame::new(DynamoTuning::default());
        if let Some(e) = on.store.get_mut(DYNAMO) {
            e.flags.mounted = true;
        }
        for g in [&mut off, &mut on] {
            g.pedaling = true;
            g.pedal_update();
            run(g, 60);
        }
        assert!(on.power() > off.power());
    }

    #[test]
    fn test_docked_lead_can_be_picked_up_again() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        drag(&mut g, PLUS_B_START, BULB_PLUS);
        let lead = g.part(PLUS_B).unwrap();
        assert!(lead.flags.mounted);
        assert_eq!(lead.center(), BULB_PLUS);

        // Picking it up un-docks it; dropped nowhere it returns to the bulb
        drag(&mut g, BULB_PLUS, Vec2::new(500.0, 60.0));
        let lead = g.part(PLUS_B).unwrap();
        assert!(!lead.flags.mounted);
        assert_eq!(lead.center(), BULB_PLUS);
    }

    #[test]
    fn test_reset_stops_the_pedal_timer() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        g.pedaling = true;
        g.pedal_update();
        run(&mut g, 60);
        assert!(g.cadence() > 0.0);
        assert!(!g.timers.is_empty());

        g.act(UiAction::Reset);
        assert!(g.timers.is_empty());
        run(&mut g, 120);
        assert!(!g.is_pedaling());
        assert_eq!(g.cadence(), 0.0);
        assert_eq!(g.power(), 0.0);
        assert!(g.timers.is_empty());
    }

    #[test]
    fn test_help_and_info_toasts() {
        let mut g = DynamoGame::new(DynamoTuning::default());
        g.act(UiAction::Info);
        assert_eq!(g.toast(), Some(INFO_TOAST));
        run(&mut g, 300);
        assert_eq!(g.toast(), None);
        g.act(UiAction::Help);
        assert_eq!(g.toast(), Some(HELP_TOAST));
    }
}

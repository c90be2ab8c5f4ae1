//! Magnetic train coupling ("gauss magnético")
//!
//! Seven reversible magnet cars wait in a bank. Each of the four slots behind
//! the locomotive accepts a car only if the facing poles are opposite. Every
//! coupler that turns valid starts a ripple emitter; a full, gap-free train
//! with valid couplers wins immediately.

use glam::Vec2;

use super::{Button, GameId, MiniGame, Modal, Toast, UiAction};
use crate::fx::RippleField;
use crate::fx::ripple::DEFAULT_HUE;
use crate::renderer::frame::with_alpha;
use crate::renderer::{Color, Frame, colors, shapes};
use crate::sim::{
    DragTracker, Draggable, InputEvent, Release, ReleasePolicy, Session, SessionEvent, Simulation,
    TargetZone,
};
use crate::timers::TimerQueue;
use crate::tuning::{RippleTuning, TrainTuning};

pub const SLOTS: usize = 4;

/// Magnetic pole on one end of a car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pole {
    N,
    S,
}

impl Pole {
    pub fn label(&self) -> &'static str {
        match self {
            Pole::N => "N",
            Pole::S => "S",
        }
    }

    fn color(&self) -> Color {
        match self {
            Pole::N => colors::POLE_N,
            Pole::S => colors::POLE_S,
        }
    }
}

/// A reversible two-pole car
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Car {
    pub left: Pole,
    pub right: Pole,
}

impl Car {
    pub const fn new(left: Pole, right: Pole) -> Self {
        Self { left, right }
    }

    /// Turn the car around
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }
}

/// The locomotive is fixed S–N (left to right)
pub const LOCO: Car = Car::new(Pole::S, Pole::N);

const INITIAL_BANK: [Car; 7] = [
    Car::new(Pole::S, Pole::N),
    Car::new(Pole::S, Pole::N),
    Car::new(Pole::N, Pole::S),
    Car::new(Pole::S, Pole::N),
    Car::new(Pole::N, Pole::S),
    Car::new(Pole::S, Pole::N),
    Car::new(Pole::N, Pole::S),
];

/// State of one coupler (0 = locomotive/slot 0, k = slot k-1/slot k)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coupler {
    Open,
    Ok,
    Bad,
}

/// The four slots behind the locomotive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Consist {
    slots: [Option<Car>; SLOTS],
}

impl Consist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: usize) -> Option<Car> {
        self.slots.get(slot).copied().flatten()
    }

    /// Drop validation: only the left neighbour (locomotive for slot 0) is checked
    pub fn fits(&self, car: &Car, slot: usize) -> bool {
        if slot == 0 {
            return car.left != LOCO.right;
        }
        match self.get(slot - 1) {
            Some(neighbour) => car.left != neighbour.right,
            None => true,
        }
    }

    /// Put `car` into `slot`, returning the car it displaced
    pub fn place(&mut self, slot: usize, car: Car) -> Option<Car> {
        self.slots.get_mut(slot).and_then(|s| s.replace(car))
    }

    pub fn take(&mut self, slot: usize) -> Option<Car> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Flip the car in `slot` in place. Returns false if the slot is empty.
    pub fn flip(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(Some(car)) => {
                car.flip();
                true
            }
            _ => false,
        }
    }

    pub fn couplers(&self) -> [Coupler; SLOTS] {
        let judge = |left: Option<Car>, right: Option<Car>| match (left, right) {
            (Some(l), Some(r)) if r.left != l.right => Coupler::Ok,
            (Some(_), Some(_)) => Coupler::Bad,
            _ => Coupler::Open,
        };
        let mut out = [Coupler::Open; SLOTS];
        out[0] = judge(Some(LOCO), self.get(0));
        for (k, c) in out.iter_mut().enumerate().skip(1) {
            *c = judge(self.get(k - 1), self.get(k));
        }
        out
    }

    pub fn count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Filled slots form a prefix starting next to the locomotive
    pub fn no_gaps(&self) -> bool {
        let mut gap = false;
        for s in &self.slots {
            match s {
                None => gap = true,
                Some(_) if gap => return false,
                Some(_) => {}
            }
        }
        true
    }

    pub fn is_complete(&self) -> bool {
        self.count() == SLOTS
            && self.no_gaps()
            && self.couplers().iter().all(|c| *c == Coupler::Ok)
    }

    /// Empty every slot, returning the cars in slot order
    pub fn clear(&mut self) -> Vec<Car> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

// Layout
pub const FIELD: Vec2 = Vec2::new(900.0, 520.0);
pub const CAR_SIZE: Vec2 = Vec2::new(96.0, 52.0);
const BANK_ORIGIN: Vec2 = Vec2::new(40.0, 40.0);
const BANK_STEP: f32 = 60.0;
const LOCO_POS: Vec2 = Vec2::new(200.0, 330.0);
const LOCO_SIZE: Vec2 = Vec2::new(110.0, 60.0);
const SLOT_SIZE: Vec2 = Vec2::new(104.0, 60.0);
const SLOT_X0: f32 = 340.0;
const SLOT_PITCH: f32 = 134.0;
const COUPLER_Y: f32 = 360.0;
const RAIL_Y: f32 = 400.0;
const LOCO_HUE: f32 = 15.0;

pub fn bank_pos(index: usize) -> Vec2 {
    BANK_ORIGIN + Vec2::new(0.0, index as f32 * BANK_STEP)
}

pub fn slot_pos(slot: usize) -> Vec2 {
    Vec2::new(SLOT_X0 + slot as f32 * SLOT_PITCH, LOCO_POS.y)
}

fn slot_zone(slot: usize) -> TargetZone {
    TargetZone::rect(slot_pos(slot), SLOT_SIZE)
}

/// Centre of coupler `k`
pub fn coupler_pos(k: usize) -> Vec2 {
    let left_end = if k == 0 {
        LOCO_POS.x + LOCO_SIZE.x
    } else {
        slot_pos(k - 1).x + SLOT_SIZE.x
    };
    Vec2::new((left_end + slot_pos(k).x) / 2.0, COUPLER_Y)
}

fn coupler_key(k: usize) -> String {
    if k == 0 {
        "cpl-loco".to_string()
    } else {
        format!("cpl-{}", k - 1)
    }
}

const INVALID_TOAST: &str = "❌ Acople inválido: deben juntarse polos opuestos (N–S).";
const RESET_TOAST: &str = "🔄 Juego reiniciado.";
const READY_TOAST: &str = "🎉 ¡Listo! Pulsa «Explicación» para ver el video.";
const HELP_TOAST: &str = "📖 Manual\n1) La locomotora es S–N (izq–der).\n2) Los vagones encajan solo con polos opuestos (N–S).\n3) Doble clic en el menú para girar un vagón.\n4) Clic derecho sobre un vagón en el tren para girarlo ahí mismo.\n5) Doble clic en una casilla para quitar el vagón.\n6) Completa de izquierda a derecha (4 → 1).";
const WIN_TITLE: &str = "¡Felicitaciones! 🎉";
const WIN_BODY: &str = "Lo completaste. Pulsa “Aceptar” y se habilitará el botón “Explicación”.";

/// Drag adapter for a car lifted out of the bank
struct CarDrag {
    pos: Vec2,
}

impl Draggable for CarDrag {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn anchor_offset(&self) -> Vec2 {
        CAR_SIZE / 2.0
    }

    fn zones(&self) -> Vec<TargetZone> {
        (0..SLOTS).map(slot_zone).collect()
    }

    fn release_policy(&self) -> ReleasePolicy {
        ReleasePolicy::Revert
    }

    fn on_dock(&mut self, _index: usize) {}
}

struct CarDragState {
    bank_index: usize,
    tracker: DragTracker,
    adapter: CarDrag,
}

/// Result of dropping a bank car on a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Placed { displaced: Option<Car> },
    Rejected,
    Invalid,
}

#[derive(Debug, Clone, Copy)]
enum TrainTimer {
    FlashEnd(usize),
}

pub struct TrainGame {
    tuning: TrainTuning,
    ripple: RippleTuning,
    bank: Vec<Car>,
    consist: Consist,
    prev_ok: [bool; SLOTS],
    ripples: RippleField,
    drag: Option<CarDragState>,
    /// Slot under the dragged car and whether it would fit
    hover: Option<(usize, bool)>,
    bad_flash: Option<usize>,
    timers: TimerQueue<TrainTimer>,
    toast: Toast,
    session: Session,
    modal: Option<Modal>,
    departed_at: Option<f64>,
    clock_ms: f64,
    tick: u64,
}

impl TrainGame {
    pub fn new(tuning: TrainTuning, ripple: RippleTuning) -> Self {
        Self {
            tuning,
            ripple,
            bank: INITIAL_BANK.to_vec(),
            consist: Consist::new(),
            prev_ok: [false; SLOTS],
            ripples: RippleField::new(),
            drag: None,
            hover: None,
            bad_flash: None,
            timers: TimerQueue::new(),
            toast: Toast::default(),
            session: Session::new(0),
            modal: None,
            departed_at: None,
            clock_ms: 0.0,
            tick: 0,
        }
    }

    pub fn bank(&self) -> &[Car] {
        &self.bank
    }

    pub fn consist(&self) -> &Consist {
        &self.consist
    }

    pub fn ripples(&self) -> &RippleField {
        &self.ripples
    }

    /// Move bank car `index` into `slot` if the poles allow it
    pub fn drop_car(&mut self, index: usize, slot: usize) -> DropOutcome {
        let Some(car) = self.bank.get(index).copied() else {
            return DropOutcome::Invalid;
        };
        if slot >= SLOTS {
            return DropOutcome::Invalid;
        }
        if !self.consist.fits(&car, slot) {
            log::debug!("Rejected car {index} in slot {slot}");
            self.toast
                .show(INVALID_TOAST, self.clock_ms, self.tuning.invalid_toast_ms);
            self.bad_flash = Some(slot);
            self.timers
                .schedule(self.clock_ms, self.tuning.bad_flash_ms, TrainTimer::FlashEnd(slot));
            return DropOutcome::Rejected;
        }
        self.bank.remove(index);
        let displaced = self.consist.place(slot, car);
        if let Some(prev) = displaced {
            self.bank.push(prev);
        }
        self.refresh_couplers();
        self.maybe_win();
        DropOutcome::Placed { displaced }
    }

    pub fn flip_in_bank(&mut self, index: usize) -> bool {
        match self.bank.get_mut(index) {
            Some(car) => {
                car.flip();
                true
            }
            None => false,
        }
    }

    /// Flip a car already on the train and re-evaluate the couplers
    pub fn flip_in_slot(&mut self, slot: usize) -> bool {
        if !self.consist.flip(slot) {
            return false;
        }
        self.refresh_couplers();
        self.maybe_win();
        true
    }

    /// Send the car in `slot` back to the bank
    pub fn remove_from_slot(&mut self, slot: usize) -> bool {
        match self.consist.take(slot) {
            Some(car) => {
                self.bank.push(car);
                self.refresh_couplers();
                true
            }
            None => false,
        }
    }

    /// Start or stop ripple emitters on couplers that changed validity
    fn refresh_couplers(&mut self) {
        for (k, state) in self.consist.couplers().into_iter().enumerate() {
            let ok = state == Coupler::Ok;
            let key = coupler_key(k);
            if ok && !self.prev_ok[k] {
                let hue = if k == 0 { LOCO_HUE } else { DEFAULT_HUE };
                self.ripples.add(&key, coupler_pos(k), hue);
            } else if !ok && self.prev_ok[k] {
                self.ripples.remove(&key);
            }
            self.prev_ok[k] = ok;
        }
    }

    fn maybe_win(&mut self) {
        if self.session.update(self.consist.is_complete(), self.tick) == Some(SessionEvent::Won) {
            log::info!("Train complete");
            self.ripples.clear();
            self.refresh_couplers();
            self.drag = None;
            self.hover = None;
            self.departed_at = Some(self.clock_ms);
            self.modal = Some(Modal::new(WIN_TITLE, WIN_BODY));
        }
    }

    fn clear_slots(&mut self) {
        let cars = self.consist.clear();
        self.bank.extend(cars);
        self.ripples.clear();
        self.prev_ok = [false; SLOTS];
        self.drag = None;
        self.hover = None;
        self.bad_flash = None;
        self.timers.clear();
        self.session.reset();
        self.modal = None;
        self.departed_at = None;
    }

    fn bank_hit(&self, p: Vec2) -> Option<usize> {
        (0..self.bank.len()).find(|&i| TargetZone::rect(bank_pos(i), CAR_SIZE).contains(p))
    }

    fn slot_hit(&self, p: Vec2) -> Option<usize> {
        (0..SLOTS).find(|&s| slot_zone(s).contains(p))
    }

    fn grab(&mut self, pointer: Vec2) {
        if self.drag.is_some() {
            return;
        }
        let Some(index) = self.bank_hit(pointer) else {
            return;
        };
        let mut state = CarDragState {
            bank_index: index,
            tracker: DragTracker::new(),
            adapter: CarDrag {
                pos: bank_pos(index),
            },
        };
        if state.tracker.pointer_down(&mut state.adapter, pointer) {
            self.drag = Some(state);
        }
    }

    fn drag_to(&mut self, pointer: Vec2) {
        let Some(state) = self.drag.as_mut() else {
            return;
        };
        state.tracker.pointer_move(&mut state.adapter, pointer);
        let anchor = state.adapter.pos + state.adapter.anchor_offset();
        let index = state.bank_index;
        self.hover = self.slot_hit(anchor).and_then(|slot| {
            let car = self.bank.get(index)?;
            Some((slot, self.consist.fits(car, slot)))
        });
    }

    fn release(&mut self, pointer: Vec2) {
        self.hover = None;
        let Some(mut state) = self.drag.take() else {
            return;
        };
        if let Release::Docked(slot) = state.tracker.pointer_up(&mut state.adapter, pointer) {
            let outcome = self.drop_car(state.bank_index, slot);
            log::debug!("Dropped car {} on slot {slot}: {outcome:?}", state.bank_index);
        }
    }

    fn departure(&self) -> f32 {
        match self.departed_at {
            Some(t) => ((self.clock_ms - t) / 2500.0).clamp(0.0, 1.0) as f32,
            None => 0.0,
        }
    }

    fn draw_car(f: &mut Frame, pos: Vec2, car: &Car, label: &str, body: Color) {
        f.rounded_rect(pos, CAR_SIZE, 8.0, body);
        let pole_w = 24.0;
        f.rounded_rect(pos, Vec2::new(pole_w, CAR_SIZE.y), 8.0, car.left.color());
        f.rounded_rect(
            pos + Vec2::new(CAR_SIZE.x - pole_w, 0.0),
            Vec2::new(pole_w, CAR_SIZE.y),
            8.0,
            car.right.color(),
        );
        let mid = CAR_SIZE.y / 2.0;
        f.text(pos + Vec2::new(pole_w / 2.0, mid), car.left.label(), 15.0, colors::PAPER);
        f.text(
            pos + Vec2::new(CAR_SIZE.x - pole_w / 2.0, mid),
            car.right.label(),
            15.0,
            colors::PAPER,
        );
        f.text(pos + Vec2::new(CAR_SIZE.x / 2.0, mid), label, 14.0, colors::PAPER);
    }
}

impl Simulation for TrainGame {
    fn handle(&mut self, event: &InputEvent) {
        if self.session.is_won() || self.modal.is_some() {
            return;
        }
        match *event {
            InputEvent::PointerDown { pos } => self.grab(pos),
            InputEvent::PointerMove { pos } => self.drag_to(pos),
            InputEvent::PointerUp { pos } => self.release(pos),
            InputEvent::PointerCancel => {
                self.drag = None;
                self.hover = None;
            }
            InputEvent::DoubleClick { pos } => {
                if let Some(i) = self.bank_hit(pos) {
                    self.flip_in_bank(i);
                } else if let Some(slot) = self.slot_hit(pos) {
                    self.remove_from_slot(slot);
                }
            }
            InputEvent::SecondaryClick { pos } => {
                if let Some(i) = self.bank_hit(pos) {
                    self.flip_in_bank(i);
                } else if let Some(slot) = self.slot_hit(pos) {
                    self.flip_in_slot(slot);
                }
            }
        }
    }

    fn step(&mut self, dt: f32) {
        self.clock_ms += dt as f64 * 1000.0;
        self.tick += 1;
        for timer in self.timers.poll(self.clock_ms) {
            match timer {
                TrainTimer::FlashEnd(slot) => {
                    if self.bad_flash == Some(slot) {
                        self.bad_flash = None;
                    }
                }
            }
        }
        self.toast.expire(self.clock_ms);
    }
}

impl MiniGame for TrainGame {
    fn id(&self) -> GameId {
        GameId::GaussMagnetico
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.clear_slots();
        log::info!("Train game reset");
    }

    fn frame(&self, now_ms: f64) -> Frame {
        let mut f = Frame::new();
        f.clear(colors::BACKGROUND);
        f.text(
            Vec2::new(FIELD.x / 2.0 + 60.0, 40.0),
            "Conecta los vagones: polos opuestos se atraen (N–S)",
            18.0,
            colors::INK,
        );

        // Bank panel
        f.rounded_rect(
            BANK_ORIGIN - Vec2::splat(12.0),
            Vec2::new(CAR_SIZE.x + 24.0, 7.0 * BANK_STEP + 16.0),
            12.0,
            with_alpha(colors::SLOT, 0.6),
        );
        let dragged = self.drag.as_ref().map(|d| d.bank_index);
        for (i, car) in self.bank.iter().enumerate() {
            if Some(i) != dragged {
                Self::draw_car(&mut f, bank_pos(i), car, "V", colors::MUTED);
            }
        }

        // Track
        f.rect(Vec2::new(0.0, RAIL_Y), Vec2::new(FIELD.x, 6.0), colors::METAL);
        for k in 0..30 {
            f.rect(
                Vec2::new(k as f32 * 30.0 + 4.0, RAIL_Y + 6.0),
                Vec2::new(14.0, 8.0),
                colors::TABLE,
            );
        }

        let shift = Vec2::new(self.departure() * FIELD.x, 0.0);
        Self::draw_car(&mut f, LOCO_POS + shift + Vec2::new(7.0, 4.0), &LOCO, "LOCO", colors::INK);

        for slot in 0..SLOTS {
            let pos = slot_pos(slot) + shift;
            let tint = match (self.hover, self.bad_flash) {
                (_, Some(s)) if s == slot => colors::BAD,
                (Some((s, true)), _) if s == slot => colors::OK,
                (Some((s, false)), _) if s == slot => colors::BAD,
                _ => colors::SLOT,
            };
            f.rounded_rect(pos, SLOT_SIZE, 10.0, with_alpha(tint, 0.7));
            match self.consist.get(slot) {
                Some(car) => Self::draw_car(&mut f, pos + Vec2::new(4.0, 4.0), &car, "V", colors::MUTED),
                None => f.text(
                    pos + SLOT_SIZE / 2.0,
                    (SLOTS - slot).to_string(),
                    22.0,
                    colors::MUTED,
                ),
            }
        }

        for (k, state) in self.consist.couplers().into_iter().enumerate() {
            let (mark, color) = match state {
                Coupler::Open => ("•", colors::MUTED),
                Coupler::Ok => ("✔", colors::OK),
                Coupler::Bad => ("✖", colors::BAD),
            };
            f.text(coupler_pos(k) + shift, mark, 18.0, color);
        }

        f.extend(shapes::ripple_rings(
            &self.ripples.rings(now_ms, &self.ripple),
            self.ripple.line_width,
        ));

        if let Some(d) = &self.drag {
            let car = self.bank[d.bank_index];
            Self::draw_car(&mut f, d.adapter.pos, &car, "V", colors::INK);
        }
        f
    }

    fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    fn dismiss_modal(&mut self) {
        if self.modal.take().is_some() && self.session.is_won() {
            self.session.acknowledge();
            self.toast.show(READY_TOAST, self.clock_ms, self.tuning.toast_ms);
        }
    }

    fn toast(&self) -> Option<&str> {
        self.toast.text()
    }

    fn act(&mut self, action: UiAction) {
        match action {
            UiAction::Reset => {
                self.reset();
                self.toast.show(RESET_TOAST, self.clock_ms, self.tuning.toast_ms);
            }
            UiAction::Help => {
                self.toast
                    .show(HELP_TOAST, self.clock_ms, self.tuning.help_toast_ms);
            }
            UiAction::Explain | UiAction::TogglePedal | UiAction::Info => {}
        }
    }

    fn buttons(&self) -> Vec<Button> {
        let mut buttons = vec![
            Button::new(UiAction::Reset, "🔄 Reiniciar"),
            Button::new(UiAction::Help, "📖 Manual"),
        ];
        if self.session.can_continue() {
            buttons.push(Button::new(UiAction::Explain, "🎬 Explicación"));
        }
        buttons
    }

    fn is_animating(&self) -> bool {
        self.ripples.is_active()
            || self.drag.is_some()
            || self.toast.is_visible()
            || !self.timers.is_empty()
            || (self.departed_at.is_some() && self.departure() < 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn game() -> TrainGame {
        TrainGame::new(TrainTuning::default(), RippleTuning::default())
    }

    fn sn() -> Car {
        Car::new(Pole::S, Pole::N)
    }

    fn ns() -> Car {
        Car::new(Pole::N, Pole::S)
    }

    fn index_of(g: &TrainGame, car: Car) -> usize {
        g.bank().iter().position(|c| *c == car).unwrap()
    }

    #[test]
    fn test_slot0_checks_loco() {
        let c = Consist::new();
        // Loco right pole is N
        assert!(c.fits(&sn(), 0));
        assert!(!c.fits(&ns(), 0));
    }

    #[test]
    fn test_fits_only_checks_left_neighbour() {
        let mut c = Consist::new();
        assert!(c.fits(&ns(), 2));
        c.place(1, sn());
        assert!(!c.fits(&ns(), 2));
        assert!(c.fits(&sn(), 2));
    }

    #[test]
    fn test_couplers_and_gaps() {
        let mut c = Consist::new();
        c.place(0, sn());
        c.place(2, sn());
        assert_eq!(
            c.couplers(),
            [Coupler::Ok, Coupler::Open, Coupler::Open, Coupler::Open]
        );
        assert!(!c.no_gaps());
        c.place(1, ns());
        assert_eq!(c.couplers()[1], Coupler::Bad);
        assert!(c.no_gaps());
        assert!(!c.is_complete());
    }

    #[test]
    fn test_rejected_drop_flashes_and_toasts() {
        let mut g = game();
        let i = index_of(&g, ns());
        assert_eq!(g.drop_car(i, 0), DropOutcome::Rejected);
        assert_eq!(g.bank().len(), 7);
        assert_eq!(g.toast(), Some(INVALID_TOAST));
        assert_eq!(g.bad_flash, Some(0));
        for _ in 0..30 {
            g.step(SIM_DT);
        }
        assert_eq!(g.bad_flash, None);
        for _ in 0..80 {
            g.step(SIM_DT);
        }
        assert_eq!(g.toast(), None);
    }

    #[test]
    fn test_placing_starts_emitter_and_removing_stops_it() {
        let mut g = game();
        let i = index_of(&g, sn());
        assert_eq!(g.drop_car(i, 0), DropOutcome::Placed { displaced: None });
        assert!(g.ripples().contains("cpl-loco"));
        assert!(g.remove_from_slot(0));
        assert!(!g.ripples().contains("cpl-loco"));
        assert_eq!(g.bank().len(), 7);
    }

    #[test]
    fn test_occupied_slot_returns_previous_car() {
        let mut g = game();
        let i = index_of(&g, sn());
        g.drop_car(i, 0);
        let j = index_of(&g, sn());
        assert_eq!(
            g.drop_car(j, 0),
            DropOutcome::Placed {
                displaced: Some(sn())
            }
        );
        assert_eq!(g.bank().len(), 6);
        assert_eq!(g.consist().count(), 1);
    }

    #[test]
    fn test_flip_in_slot_revalidates() {
        let mut g = game();
        g.drop_car(index_of(&g, sn()), 0);
        g.drop_car(index_of(&g, sn()), 1);
        assert!(g.ripples().contains("cpl-0"));
        assert!(g.flip_in_slot(1));
        assert_eq!(g.consist().couplers()[1], Coupler::Bad);
        assert!(!g.ripples().contains("cpl-0"));
        assert!(!g.flip_in_slot(3));
    }

    #[test]
    fn test_full_train_wins_and_clears_ripples() {
        let mut g = game();
        for slot in 0..SLOTS {
            let i = index_of(&g, sn());
            assert!(matches!(g.drop_car(i, slot), DropOutcome::Placed { .. }));
        }
        assert!(g.session().is_won());
        assert!(g.ripples().is_empty());
        assert!(g.modal().is_some());
        assert_eq!(g.explanation_route(), None);
        g.dismiss_modal();
        assert!(g.session().can_continue());
        assert_eq!(g.toast(), Some(READY_TOAST));
        assert!(g.buttons().iter().any(|b| b.action == UiAction::Explain));
    }

    #[test]
    fn test_drag_and_drop_through_pointer_events() {
        let mut g = game();
        let i = index_of(&g, sn());
        let grab = bank_pos(i) + CAR_SIZE / 2.0;
        let target = slot_pos(0) + SLOT_SIZE / 2.0;
        g.handle(&InputEvent::PointerDown { pos: grab });
        g.handle(&InputEvent::PointerMove { pos: target });
        assert_eq!(g.hover, Some((0, true)));
        g.handle(&InputEvent::PointerUp { pos: target });
        assert_eq!(g.consist().get(0), Some(sn()));
        assert_eq!(g.hover, None);
        assert!(g.drag.is_none());
    }

    #[test]
    fn test_release_outside_slots_leaves_bank_untouched() {
        let mut g = game();
        let grab = bank_pos(0) + CAR_SIZE / 2.0;
        g.handle(&InputEvent::PointerDown { pos: grab });
        g.handle(&InputEvent::PointerUp {
            pos: Vec2::new(600.0, 100.0),
        });
        assert_eq!(g.bank(), INITIAL_BANK.as_slice());
        assert_eq!(g.consist().count(), 0);
    }

    #[test]
    fn test_double_click_flips_bank_car_and_clears_slot() {
        let mut g = game();
        g.handle(&InputEvent::DoubleClick {
            pos: bank_pos(2) + CAR_SIZE / 2.0,
        });
        assert_eq!(g.bank()[2], sn());

        g.drop_car(0, 0);
        g.handle(&InputEvent::DoubleClick {
            pos: slot_pos(0) + SLOT_SIZE / 2.0,
        });
        assert_eq!(g.consist().count(), 0);
        assert_eq!(g.bank().len(), 7);
    }

    #[test]
    fn test_reset_returns_cars_and_toasts() {
        let mut g = game();
        g.drop_car(index_of(&g, sn()), 0);
        g.act(UiAction::Reset);
        assert_eq!(g.consist().count(), 0);
        assert_eq!(g.bank().len(), 7);
        assert!(g.ripples().is_empty());
        assert_eq!(g.toast(), Some(RESET_TOAST));
    }

    #[test]
    fn test_idle_train_stops_animating() {
        let g = game();
        assert!(!g.is_animating());
    }

    proptest! {
        #[test]
        fn prop_valid_couplers_match_emitters(ops in proptest::collection::vec((0usize..3, 0usize..7, 0usize..SLOTS), 0..40)) {
            let mut g = game();
            for (kind, i, slot) in ops {
                match kind {
                    0 => { g.drop_car(i.min(g.bank().len().saturating_sub(1)), slot); }
                    1 => { g.flip_in_slot(slot); }
                    _ => { g.remove_from_slot(slot); }
                }
                if g.session().is_won() {
                    break;
                }
                for (k, c) in g.consist().couplers().into_iter().enumerate() {
                    prop_assert_eq!(c == Coupler::Ok, g.ripples().contains(&coupler_key(k)));
                }
                prop_assert_eq!(g.bank().len() + g.consist().count(), 7);
            }
        }
    }
}

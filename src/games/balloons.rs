//! Static charge by friction ("carga eléctrica")
//!
//! Four balloons rest on a table. Rubbing one against the hair charges it;
//! charged balloons repel each other, feel weaker gravity and pull the paper
//! bits on the side table. The game is won once a charged balloon has kept
//! the papers attracted for the confirmation delay.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::{Button, GameId, MiniGame, Modal, UiAction};
use crate::ms_to_ticks;
use crate::renderer::frame::with_alpha;
use crate::renderer::{Color, Frame, colors, shapes};
use crate::sim::{
    DragTracker, Draggable, Entity, EntityId, EntityStore, ForceParams, InputEvent,
    IntegratorParams, PlayField, Release, Session, SessionEvent, Simulation, SupportSurface,
    TargetZone, accumulate, rest_on, step, step_held,
};
use crate::timers::TimerQueue;
use crate::tuning::BalloonTuning;

/// Play-field size
pub const FIELD: Vec2 = Vec2::new(900.0, 520.0);
/// Rubbing area (top-left, size)
pub const HAIR: (Vec2, Vec2) = (Vec2::new(40.0, 60.0), Vec2::new(160.0, 120.0));
/// Side table holding the paper bits (top-left, size)
pub const PAPER_TABLE: (Vec2, Vec2) = (Vec2::new(620.0, 110.0), Vec2::new(240.0, 60.0));
/// Table the balloons start on
pub const CENTER_TABLE: SupportSurface = SupportSurface {
    x: 60.0,
    y: 400.0,
    w: 780.0,
};

const BALLOON_COLORS: [Color; 4] = [
    [0.271, 0.761, 0.659, 1.0],
    [0.910, 0.365, 0.365, 1.0],
    [0.969, 0.498, 0.0, 1.0],
    [0.988, 0.749, 0.286, 1.0],
];
const SKIN: Color = [0.96, 0.8, 0.65, 1.0];

const PAPER_COLS: usize = 10;
const PAPER_SIZE: f32 = 15.0;
const PAPER_GAP: f32 = 4.0;

const INTRO_TITLE: &str = "👋 ¡Bienvenido!";
const INTRO_BODY: &str = "Objetivo: demostrar la atracción eléctrica.\n\n1) Toma un globo.\n2) Frótalo con el cabello del personaje.\n3) Acércalo a los papelitos.";
const MANUAL_TITLE: &str = "📖 Manual";
const MANUAL_BODY: &str = "1) Frota el globo con el cabello para cargarlo.\n2) Acércalo a los papelitos para ver la atracción.";
const WIN_TITLE: &str = "¡Felicitaciones! 🎉";
const WIN_BODY: &str = "Cargaste un globo por fricción y lograste atraer los papelitos.\n\nCuando estés listo, pulsa «Continuar». Luego verás el botón «Explicación».";

fn hair_contains(p: Vec2) -> bool {
    TargetZone::rect(HAIR.0, HAIR.1).contains(p)
}

fn paper_table_center() -> Vec2 {
    PAPER_TABLE.0 + PAPER_TABLE.1 / 2.0
}

/// Displacement of one paper bit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaperPose {
    pub offset: Vec2,
    /// Degrees
    pub rotation: f32,
    pub scale: f32,
}

impl Default for PaperPose {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Paper {
    /// Centre at rest
    pub home: Vec2,
    /// Per-piece random in [0, 1)
    pub rand: f32,
    pub pose: PaperPose,
}

/// Pose of a paper bit pulled toward a charged balloon at `pointer`
pub fn paper_pose(pointer: Vec2, home: Vec2, rand: f32, t: &BalloonTuning) -> PaperPose {
    let delta = pointer - home;
    let mut d = delta.length();
    if d == 0.0 {
        d = 1.0;
    }
    let pull = ((1.0 - d / t.paper_pull_radius) * t.paper_max_pull).min(t.paper_max_pull);
    let toward = delta / d * pull * t.paper_pull_smooth;
    let jitter = (rand - 0.5) * 10.0;
    PaperPose {
        offset: Vec2::new(toward.x + jitter, toward.y),
        rotation: (rand - 0.5) * t.paper_max_rot,
        scale: 1.0 + (1.0 - (d / t.paper_pull_radius).min(1.0)) * (t.paper_max_scale - 1.0) * 0.7,
    }
}

fn make_papers(count: usize, rng: &mut Pcg32) -> Vec<Paper> {
    let rows = count.div_ceil(PAPER_COLS);
    let cell = PAPER_SIZE + PAPER_GAP;
    let grid_w = PAPER_COLS as f32 * cell - PAPER_GAP;
    let grid_h = rows as f32 * cell - PAPER_GAP;
    let origin = Vec2::new(
        PAPER_TABLE.0.x + (PAPER_TABLE.1.x - grid_w) / 2.0,
        PAPER_TABLE.0.y - grid_h,
    );
    (0..count)
        .map(|i| {
            let col = (i % PAPER_COLS) as f32;
            let row = (i / PAPER_COLS) as f32;
            Paper {
                home: origin + Vec2::new(col * cell, row * cell) + Vec2::splat(PAPER_SIZE / 2.0),
                rand: rng.random::<f32>(),
                pose: PaperPose::default(),
            }
        })
        .collect()
}

/// Drag adapter: a balloon docks when released with its bottom edge at the table top
struct BalloonDrag<'a> {
    entity: &'a mut Entity,
    tolerance: f32,
}

impl Draggable for BalloonDrag<'_> {
    fn position(&self) -> Vec2 {
        self.entity.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.entity.pos = pos;
    }

    fn anchor_offset(&self) -> Vec2 {
        Vec2::new(0.0, self.entity.size.y)
    }

    fn zones(&self) -> Vec<TargetZone> {
        let t = &CENTER_TABLE;
        // Strictly inside the horizontal overlap so the discrete support test agrees
        vec![TargetZone::Rect {
            min: Vec2::new(t.x - self.entity.size.x + 0.5, t.y - self.tolerance),
            max: Vec2::new(t.x + t.w - 0.5, t.y + self.tolerance),
        }]
    }

    fn docked_position(&self, _index: usize, _zone: &TargetZone) -> Vec2 {
        Vec2::new(self.entity.pos.x, CENTER_TABLE.y - self.entity.size.y)
    }

    fn grab_docked(&self) -> bool {
        true
    }

    fn on_grab(&mut self) {
        self.entity.vel = Vec2::ZERO;
        self.entity.rope = 0.0;
        self.entity.flags.falling = false;
    }

    fn on_dock(&mut self, _index: usize) {
        rest_on(self.entity, Some(&CENTER_TABLE), self.tolerance);
    }

    fn on_release_free(&mut self) {
        rest_on(self.entity, None, self.tolerance);
    }
}

#[derive(Debug, Clone, Copy)]
enum BalloonTimer {
    Intro,
    Spark(Vec2),
}

#[derive(Debug, Clone, Copy)]
struct Spark {
    pos: Vec2,
    born_ms: f64,
}

pub struct BalloonGame {
    tuning: BalloonTuning,
    seed: u64,
    rng: Pcg32,
    store: EntityStore,
    /// Aligned with store order
    trackers: Vec<DragTracker>,
    held: Option<EntityId>,
    papers: Vec<Paper>,
    attracted: bool,
    sparks: Vec<Spark>,
    wiggle_until: f64,
    timers: TimerQueue<BalloonTimer>,
    session: Session,
    modal: Option<Modal>,
    clock_ms: f64,
    tick: u64,
}

impl BalloonGame {
    pub fn new(tuning: BalloonTuning, seed: u64) -> Self {
        let session = Session::new(ms_to_ticks(tuning.win_confirm_ms));
        let mut game = Self {
            tuning,
            seed,
            rng: Pcg32::seed_from_u64(seed),
            store: EntityStore::new(),
            trackers: Vec::new(),
            held: None,
            papers: Vec::new(),
            attracted: false,
            sparks: Vec::new(),
            wiggle_until: 0.0,
            timers: TimerQueue::new(),
            session,
            modal: None,
            clock_ms: 0.0,
            tick: 0,
        };
        game.restart();
        let delay = game.tuning.intro_delay_ms;
        game.timers.schedule(0.0, delay, BalloonTimer::Intro);
        game
    }

    fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        let t = &self.tuning;
        let size = Vec2::new(t.balloon_w, t.balloon_h);
        let spacing = CENTER_TABLE.w / 5.0;

        self.store = EntityStore::new();
        for i in 0..BALLOON_COLORS.len() {
            let x = CENTER_TABLE.x + spacing * (i as f32 + 1.0) - size.x / 2.0;
            let y = CENTER_TABLE.y - size.y - 2.0;
            self.store.insert(Entity::new(i as u32 + 1, Vec2::new(x, y), size));
        }
        self.trackers = vec![DragTracker::new(); self.store.len()];
        self.held = None;
        self.papers = make_papers(self.tuning.paper_count, &mut self.rng);
        self.attracted = false;
        self.sparks.clear();
        self.wiggle_until = 0.0;
        self.timers.clear();
        self.session.reset();
        self.modal = None;
        self.clock_ms = 0.0;
        self.tick = 0;
    }

    pub fn balloons(&self) -> &[Entity] {
        self.store.as_slice()
    }

    pub fn papers(&self) -> &[Paper] {
        &self.papers
    }

    pub fn papers_attracted(&self) -> bool {
        self.attracted
    }

    pub fn held(&self) -> Option<EntityId> {
        self.held
    }

    pub fn spark_count(&self) -> usize {
        self.sparks.len()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    fn force_params(&self) -> ForceParams {
        let t = &self.tuning;
        ForceParams {
            k_repel: t.k_repel,
            softening: t.repel_softening,
            max_repel_step: t.max_repel_step,
            gravity_base: t.gravity_base,
            gravity_charged: t.gravity_charged,
            jitter_x: t.jitter_x,
            jitter_y: t.jitter_y,
        }
    }

    fn integrator_params(&self) -> IntegratorParams {
        let t = &self.tuning;
        IntegratorParams {
            friction: t.air_friction,
            restitution_floor: t.bounce,
            restitution_wall: t.wall_bounce,
            rest_tolerance: t.rest_tolerance,
            contact_band: t.contact_band,
            surface_damping: t.surface_damping,
            floor_rest_speed: t.floor_rest_speed,
            rope_limit: t.rope_limit,
            rope_smoothing: t.rope_smoothing,
        }
    }

    fn field(&self) -> PlayField {
        PlayField::new(
            Vec2::ZERO,
            FIELD - Vec2::new(self.tuning.balloon_w, self.tuning.balloon_h),
        )
    }

    /// Run `f` with the tracker and drag adapter of balloon `id`
    fn with_drag<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut DragTracker, &mut BalloonDrag<'_>) -> R,
    ) -> Option<R> {
        let index = self.store.index_of(id)?;
        let tolerance = self.tuning.release_tolerance;
        let entity = self.store.get_mut(id)?;
        let mut adapter = BalloonDrag { entity, tolerance };
        Some(f(&mut self.trackers[index], &mut adapter))
    }

    /// Topmost balloon under the pointer
    fn hit(&self, p: Vec2) -> Option<EntityId> {
        self.store
            .iter()
            .rev()
            .find(|e| TargetZone::rect(e.pos, e.size).contains(p))
            .map(|e| e.id)
    }

    fn is_charged(&self, id: EntityId) -> bool {
        self.store.get(id).is_some_and(|e| e.flags.charged)
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

    fn drag_to(&mut self, pointer: Vec2) {
        let Some(id) = self.held else {
            return;
        };
        self.with_drag(id, |t, d| t.pointer_move(d, pointer));
        if hair_contains(pointer) {
            self.rub(id, pointer);
        }
        self.update_attraction(pointer, self.is_charged(id));
    }

    fn release(&mut self, pointer: Vec2) {
        let Some(id) = self.held.take() else {
            return;
        };
        let outcome = self.with_drag(id, |t, d| t.pointer_up(d, pointer));
        log::debug!("Balloon {} released: {outcome:?}", id.0);
        self.update_attraction(pointer, self.is_charged(id));
    }

    fn drop_held(&mut self) {
        if let Some(id) = self.held.take() {
            let outcome = self.with_drag(id, |t, d| t.cancel(d));
            if outcome == Some(Release::Ignored) {
                log::warn!("Balloon {} was held without an active drag", id.0);
            }
        }
    }

    /// Friction against the hair: charge, wiggle the hair, throw sparks
    fn rub(&mut self, id: EntityId, pointer: Vec2) {
        if let Some(e) = self.store.get_mut(id) {
            if e.set_charged(true, &mut self.rng) {
                log::info!("Balloon {} charged", id.0);
            }
        }
        if self.clock_ms < self.wiggle_until {
            return;
        }
        self.wiggle_until = self.clock_ms + self.tuning.wiggle_ms;
        for k in 0..self.tuning.spark_count {
            let jitter = Vec2::new(
                self.rng.random_range(-12.0..12.0),
                self.rng.random_range(-12.0..12.0),
            );
            let delay = k as f64 * self.tuning.spark_interval_ms;
            self.timers
                .schedule(self.clock_ms, delay, BalloonTimer::Spark(pointer + jitter));
        }
    }

    fn update_attraction(&mut self, pointer: Vec2, charged: bool) {
        let near = pointer.distance(paper_table_center()) < self.tuning.paper_pull_radius;
        if !(charged && near) {
            if self.attracted {
                log::debug!("Papers released");
            }
            self.attracted = false;
            for p in &mut self.papers {
                p.pose = PaperPose::default();
            }
            return;
        }
        self.attracted = true;
        for (i, p) in self.papers.iter_mut().enumerate() {
            if i % 2 == 0 {
                p.pose = paper_pose(pointer, p.home, p.rand, &self.tuning);
            }
        }
    }

    fn win_predicate(&self) -> bool {
        self.attracted && self.store.iter().any(|e| e.flags.charged)
    }

    fn physics(&mut self) {
        let forces = self.force_params();
        let params = self.integrator_params();
        let field = self.field();
        let acc = accumulate(&self.store, &forces, self.tick);
        let held = self.held;
        let frame = self.tick;
        // Everything stays put once the game is won
        let frozen = self.session.is_won();
        for (e, a) in self.store.iter_mut().zip(acc) {
            if frozen || Some(e.id) == held {
                step_held(e);
            } else {
                step(e, a, &field, Some(&CENTER_TABLE), &params, frame);
            }
            e.advance_cloud(&mut self.rng);
        }
    }
}

impl Simulation for BalloonGame {
    fn handle(&mut self, event: &InputEvent) {
        if self.session.is_won() || self.modal.is_some() {
            return;
        }
        match *event {
            InputEvent::PointerDown { pos } => self.grab(pos),
            InputEvent::PointerMove { pos } => self.drag_to(pos),
            InputEvent::PointerUp { pos } => self.release(pos),
            InputEvent::PointerCancel => self.drop_held(),
            InputEvent::DoubleClick { .. } | InputEvent::SecondaryClick { .. } => {}
        }
    }

    fn step(&mut self, dt: f32) {
        self.clock_ms += dt as f64 * 1000.0;
        self.tick += 1;

        for timer in self.timers.poll(self.clock_ms) {
            match timer {
                BalloonTimer::Intro => {
                    if self.modal.is_none() {
                        self.drop_held();
                        self.modal = Some(Modal::new(INTRO_TITLE, INTRO_BODY));
                    }
                }
                BalloonTimer::Spark(pos) => self.sparks.push(Spark {
                    pos,
                    born_ms: self.clock_ms,
                }),
            }
        }
        let (now, life) = (self.clock_ms, self.tuning.spark_life_ms);
        self.sparks.retain(|s| now - s.born_ms < life);

        self.physics();

        match self.session.update(self.win_predicate(), self.tick) {
            Some(SessionEvent::Won) => {
                self.drop_held();
                self.modal = Some(Modal::new(WIN_TITLE, WIN_BODY));
            }
            Some(SessionEvent::WinPending) => log::debug!("Papers attracted, confirming win"),
            Some(SessionEvent::WinCancelled) => log::debug!("Attraction lost before confirmation"),
            None => {}
        }
    }
}

impl MiniGame for BalloonGame {
    fn id(&self) -> GameId {
        GameId::CargaElectrica
    }

    fn session(&self) -> &Session {
        &self.session
    }

    fn reset(&mut self) {
        self.restart();
        log::info!("Balloon game reset");
    }

    fn frame(&self, _now_ms: f64) -> Frame {
        let mut f = Frame::new();
        f.clear(colors::BACKGROUND);

        // Person: head, then the hair on top (it shakes while being rubbed)
        let shake = if self.clock_ms < self.wiggle_until {
            Vec2::new((self.clock_ms as f32 * 0.06).sin() * 3.0, 0.0)
        } else {
            Vec2::ZERO
        };
        f.circle(HAIR.0 + Vec2::new(HAIR.1.x / 2.0, HAIR.1.y + 40.0), 70.0, SKIN);
        f.rounded_rect(HAIR.0 + shake, HAIR.1, 40.0, colors::HAIR);
        f.text(
            HAIR.0 + Vec2::new(HAIR.1.x / 2.0, -16.0),
            "Cabello",
            14.0,
            colors::MUTED,
        );

        // Side table and papers
        f.rect(PAPER_TABLE.0, PAPER_TABLE.1, colors::TABLE);
        for p in &self.papers {
            f.push(crate::renderer::DrawCmd::Ellipse {
                center: p.home + p.pose.offset,
                radii: Vec2::new(PAPER_SIZE / 2.0, PAPER_SIZE / 3.0) * p.pose.scale,
                rotation: p.pose.rotation.to_radians(),
                color: colors::PAPER,
            });
        }

        // Centre table
        let top = Vec2::new(CENTER_TABLE.x, CENTER_TABLE.y);
        f.rect(top, Vec2::new(CENTER_TABLE.w, 16.0), colors::TABLE);
        for leg_x in [CENTER_TABLE.x + 20.0, CENTER_TABLE.x + CENTER_TABLE.w - 36.0] {
            f.rect(Vec2::new(leg_x, CENTER_TABLE.y + 16.0), Vec2::new(16.0, 90.0), colors::TABLE);
        }

        for (i, e) in self.store.iter().enumerate() {
            let color = BALLOON_COLORS[i % BALLOON_COLORS.len()];
            f.extend(shapes::balloon(e, self.tuning.rope_len, color));
        }

        for s in &self.sparks {
            let life = 1.0 - ((self.clock_ms - s.born_ms) / self.tuning.spark_life_ms) as f32;
            f.push(shapes::spark(s.pos, life));
        }

        let charged = self.store.iter().filter(|e| e.flags.charged).count();
        f.text(
            Vec2::new(FIELD.x - 120.0, FIELD.y - 24.0),
            format!("Globos cargados: {charged}"),
            15.0,
            if self.attracted {
                colors::OK
            } else {
                with_alpha(colors::INK, 0.8)
            },
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
        None
    }

    fn act(&mut self, action: UiAction) {
        match action {
            UiAction::Reset => self.reset(),
            UiAction::Help => {
                if self.modal.is_none() {
                    self.drop_held();
                    self.modal = Some(Modal::new(MANUAL_TITLE, MANUAL_BODY));
                }
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
            buttons.push(Button::new(UiAction::Explain, "▶️ Explicación"));
        }
        buttons
    }
}

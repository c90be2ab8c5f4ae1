//! Maxwell Games entry point
//!
//! Handles platform-specific initialization, routing and the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlVideoElement, MouseEvent, PointerEvent};

    use maxwell_games::games::{self, Button, MiniGame, UiAction};
    use maxwell_games::nav::{ExplanationView, Route, menu_cards};
    use maxwell_games::renderer::CanvasPainter;
    use maxwell_games::sim::{FrameClock, InputEvent, TickInput, run_frame};
    use maxwell_games::storage::{KvStore, LocalStore, MemoryStore};
    use maxwell_games::{GameId, ProgressStore, Tuning};

    /// Page state shared by every callback
    struct App {
        document: Document,
        route: Route,
        game: Option<Box<dyn MiniGame>>,
        explanation: Option<ExplanationView>,
        clock: FrameClock,
        input: TickInput,
        painter: Option<CanvasPainter>,
        progress: ProgressStore<Box<dyn KvStore>>,
        tuning: Tuning,
        loop_running: bool,
        shown_buttons: Vec<Button>,
    }

    impl App {
        fn new(document: Document) -> Self {
            let backend: Box<dyn KvStore> = match LocalStore::open() {
                Ok(store) => Box::new(store),
                Err(err) => {
                    log::warn!("localStorage unavailable ({err}), progress will not persist");
                    Box::new(MemoryStore::new())
                }
            };
            let painter = document
                .get_element_by_id("canvas")
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
                .and_then(|canvas| {
                    let field = games::balloons::FIELD;
                    CanvasPainter::new(canvas, field.x, field.y)
                });
            if painter.is_none() {
                log::error!("Canvas 2D context unavailable");
            }
            // Optional <script type="application/json" id="tuning"> overrides
            let overrides = document
                .get_element_by_id("tuning")
                .and_then(|el| el.text_content());
            let tuning = Tuning::load_or_default(overrides.as_deref());
            Self {
                document,
                route: Route::Menu,
                game: None,
                explanation: None,
                clock: FrameClock::new(),
                input: TickInput::default(),
                painter,
                progress: ProgressStore::new(backend),
                tuning,
                loop_running: false,
                shown_buttons: Vec::new(),
            }
        }

        fn element(&self, id: &str) -> Option<Element> {
            self.document.get_element_by_id(id)
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.element(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.element(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Switch screens. Completed or unavailable games fall back to the menu.
        fn enter(&mut self, route: Route) -> Route {
            let route = match route {
                Route::Game(id) if self.progress.is_completed(id) => {
                    log::info!("'{id}' already completed, back to the menu");
                    Route::Menu
                }
                other => other,
            };

            self.game = None;
            self.explanation = None;
            self.input.clear();
            self.clock.reset();
            self.shown_buttons.clear();

            let route = match route {
                Route::Game(id) => {
                    let seed = js_sys::Date::now() as u64;
                    match games::create(id, &self.tuning, seed) {
                        Some(game) => {
                            self.game = Some(game);
                            Route::Game(id)
                        }
                        None => Route::Menu,
                    }
                }
                Route::Explanation { video, game } => {
                    let view = ExplanationView {
                        video: video.clone(),
                        game,
                    };
                    if let Some(el) = self
                        .element("explanation-video")
                        .and_then(|el| el.dyn_into::<HtmlVideoElement>().ok())
                    {
                        el.set_src(&view.video);
                        let _ = el.play();
                    }
                    self.explanation = Some(view);
                    Route::Explanation { video, game }
                }
                Route::Menu => Route::Menu,
            };

            self.set_hidden("menu", route != Route::Menu);
            self.set_hidden("game", !matches!(route, Route::Game(_)));
            self.set_hidden("explanation", !matches!(route, Route::Explanation { .. }));
            if route == Route::Menu {
                self.render_menu();
            }
            if let Route::Game(id) = route {
                self.set_text("game-title", id.title());
            }
            self.route = route.clone();
            route
        }

        fn render_menu(&self) {
            let Some(list) = self.element("menu-cards") else {
                return;
            };
            let mut html = String::new();
            for card in menu_cards(&self.progress) {
                let badge = card
                    .badge()
                    .map(|b| format!("<span class=\"badge\">{b}</span>"))
                    .unwrap_or_default();
                html.push_str(&format!(
                    "<button class=\"card\" data-game=\"{id}\"{disabled}>\
                     <span class=\"num\">{num}</span><span class=\"icon\">{icon}</span>\
                     <h3>{title}</h3><p>{desc}</p><code>{formula}</code>{badge}</button>",
                    id = card.id,
                    disabled = if card.is_available() { "" } else { " disabled" },
                    num = card.number,
                    icon = card.icon,
                    title = card.title,
                    desc = card.description,
                    formula = card.formula,
                ));
            }
            list.set_inner_html(&html);
        }

        /// Mirror modal, toast and toolbar state into the DOM
        fn sync_dom(&mut self) {
            let Some(game) = self.game.as_ref() else {
                return;
            };
            match game.modal() {
                Some(modal) => {
                    self.set_text("modal-title", &modal.title);
                    self.set_text("modal-body", &modal.body);
                    self.set_hidden("modal", false);
                }
                None => self.set_hidden("modal", true),
            }
            match game.toast() {
                Some(text) => {
                    self.set_text("toast", text);
                    self.set_hidden("toast", false);
                }
                None => self.set_hidden("toast", true),
            }

            let buttons = game.buttons();
            if buttons != self.shown_buttons {
                if let Some(bar) = self.element("controls") {
                    let html: String = buttons
                        .iter()
                        .map(|b| {
                            format!(
                                "<button data-action=\"{}\"{}>{}</button>",
                                b.action.as_str(),
                                if b.enabled { "" } else { " disabled" },
                                b.label
                            )
                        })
                        .collect();
                    bar.set_inner_html(&html);
                }
                self.shown_buttons = buttons;
            }
        }

        fn paint(&self, now_ms: f64) {
            if let (Some(game), Some(painter)) = (self.game.as_ref(), self.painter.as_ref()) {
                painter.paint(&game.frame(now_ms));
            }
        }
    }

    fn navigate(app: &Rc<RefCell<App>>, route: Route, push: bool) {
        let landed = app.borrow_mut().enter(route);
        if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
            let path = landed.path();
            let result = if push {
                history.push_state_with_url(&JsValue::NULL, "", Some(&path))
            } else {
                history.replace_state_with_url(&JsValue::NULL, "", Some(&path))
            };
            if let Err(err) = result {
                log::warn!("History update failed: {err:?}");
            }
        }
        kick(app);
    }

    /// Start the animation loop if it is idle
    fn kick(app: &Rc<RefCell<App>>) {
        {
            let mut a = app.borrow_mut();
            if a.loop_running || a.game.is_none() {
                return;
            }
            a.loop_running = true;
        }
        request_animation_frame(app.clone());
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        let keep_going = {
            let mut guard = app.borrow_mut();
            let a = &mut *guard;
            match a.game.as_mut() {
                Some(game) => {
                    run_frame(game.as_mut(), &mut a.clock, &mut a.input, time);
                    let animating = game.is_animating();
                    a.paint(time);
                    a.sync_dom();
                    animating
                }
                None => false,
            }
        };

        if keep_going {
            request_animation_frame(app);
        } else {
            let mut a = app.borrow_mut();
            a.loop_running = false;
            a.clock.reset();
        }
    }

    fn push_input(app: &Rc<RefCell<App>>, event: InputEvent) {
        app.borrow_mut().input.push(event);
        kick(app);
    }

    fn field_pos(app: &Rc<RefCell<App>>, event: &MouseEvent) -> Option<glam::Vec2> {
        let a = app.borrow();
        a.painter
            .as_ref()
            .map(|p| p.to_field(event.client_x() as f64, event.client_y() as f64))
    }

    fn setup_canvas_input(app: Rc<RefCell<App>>, canvas: &HtmlCanvasElement) {
        type Make = fn(glam::Vec2) -> InputEvent;
        let pointer: [(&str, Make); 3] = [
            ("pointerdown", |pos| InputEvent::PointerDown { pos }),
            ("pointermove", |pos| InputEvent::PointerMove { pos }),
            ("pointerup", |pos| InputEvent::PointerUp { pos }),
        ];
        for (name, make) in pointer {
            let app = app.clone();
            let target = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if event.type_() == "pointerdown" {
                    let _ = target.set_pointer_capture(event.pointer_id());
                }
                if let Some(pos) = field_pos(&app, &event) {
                    push_input(&app, make(pos));
                }
            });
            let _ = canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
                push_input(&app, InputEvent::PointerCancel);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(pos) = field_pos(&app, &event) {
                    push_input(&app, InputEvent::DoubleClick { pos });
                }
            });
            let _ = canvas.add_event_listener_with_callback("dblclick", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                if let Some(pos) = field_pos(&app, &event) {
                    push_input(&app, InputEvent::SecondaryClick { pos });
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// `data-*` attribute of the closest ancestor of the event target carrying it
    fn delegated(event: &MouseEvent, attr: &str) -> Option<String> {
        let target = event.target()?.dyn_into::<Element>().ok()?;
        let el = target.closest(&format!("[{attr}]")).ok()??;
        el.get_attribute(attr)
    }

    fn on_click(app: &Rc<RefCell<App>>, id: &str, handler: impl FnMut(MouseEvent) + 'static) {
        let Some(el) = app.borrow().element(id) else {
            log::warn!("Missing element #{id}");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(handler);
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_ui(app: Rc<RefCell<App>>) {
        // Toolbar
        {
            let app_ref = app.clone();
            on_click(&app, "controls", move |event| {
                let Some(action) = delegated(&event, "data-action").and_then(|a| a.parse::<UiAction>().ok())
                else {
                    return;
                };
                let next = {
                    let mut a = app_ref.borrow_mut();
                    let Some(game) = a.game.as_mut() else {
                        return;
                    };
                    if action == UiAction::Explain {
                        game.explanation_route()
                    } else {
                        game.act(action);
                        None
                    }
                };
                match next {
                    Some(route) => navigate(&app_ref, route, true),
                    None => kick(&app_ref),
                }
            });
        }

        // Menu cards
        {
            let app_ref = app.clone();
            on_click(&app, "menu-cards", move |event| {
                let Some(id) = delegated(&event, "data-game").and_then(|g| g.parse::<GameId>().ok()) else {
                    return;
                };
                let available = menu_cards(&app_ref.borrow().progress)
                    .iter()
                    .any(|c| c.id == id && c.is_available());
                if available {
                    navigate(&app_ref, Route::Game(id), true);
                }
            });
        }

        {
            let app_ref = app.clone();
            on_click(&app, "modal-ok", move |_event| {
                if let Some(game) = app_ref.borrow_mut().game.as_mut() {
                    game.dismiss_modal();
                }
                kick(&app_ref);
            });
        }

        {
            let app_ref = app.clone();
            on_click(&app, "btn-menu", move |_event| {
                navigate(&app_ref, Route::Menu, true);
            });
        }

        {
            let app_ref = app.clone();
            on_click(&app, "btn-video-back", move |_event| {
                let next = {
                    let mut guard = app_ref.borrow_mut();
                    let a = &mut *guard;
                    a.explanation.as_ref().map(|v| v.dismiss(&mut a.progress))
                };
                if let Some(route) = next {
                    navigate(&app_ref, route, false);
                }
            });
        }

        {
            let app_ref = app.clone();
            on_click(&app, "btn-reset-progress", move |_event| {
                let mut a = app_ref.borrow_mut();
                a.progress.reset_all();
                a.render_menu();
            });
        }

        // Watching the video to the end completes the game
        let video = app.borrow().element("explanation-video");
        if let Some(video) = video {
            let app_ref = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let next = {
                    let mut guard = app_ref.borrow_mut();
                    let a = &mut *guard;
                    a.explanation.as_ref().map(|v| v.on_ended(&mut a.progress))
                };
                if let Some(route) = next {
                    navigate(&app_ref, route, false);
                }
            });
            let _ = video.add_event_listener_with_callback("ended", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let route = current_route();
                if app.borrow().route == route {
                    return;
                }
                app.borrow_mut().enter(route);
                kick(&app);
            });
            let _ = window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(painter) = app.borrow_mut().painter.as_mut() {
                    painter.resize();
                }
                kick(&app);
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Losing focus mid-drag must not leave a part glued to the pointer
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                push_input(&app, InputEvent::PointerCancel);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn current_route() -> Route {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return Route::Menu;
        };
        let path = location.pathname().unwrap_or_default();
        let search = location.search().unwrap_or_default();
        Route::parse(&format!("{path}{search}"))
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Maxwell Games starting...");

        let window = web_sys::window().expect("No window");
        let document = window.document().expect("No document");

        let app = Rc::new(RefCell::new(App::new(document)));

        let canvas = app.borrow().painter.as_ref().map(|p| p.canvas().clone());
        if let Some(canvas) = canvas {
            setup_canvas_input(app.clone(), &canvas);
        }
        setup_ui(app.clone());
        setup_window(app.clone());

        navigate(&app, current_route(), false);
        log::info!("Ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    web_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Maxwell Games (native) starting...");
    log::info!("The games run in the browser - use `trunk serve` for the web version");

    // MAXWELL_TUNING=path/to/tuning.json overrides the game constants
    let overrides = std::env::var("MAXWELL_TUNING").ok().and_then(|path| {
        std::fs::read_to_string(&path)
            .map_err(|err| log::warn!("Cannot read tuning file {path}: {err}"))
            .ok()
    });
    let tuning = maxwell_games::Tuning::load_or_default(overrides.as_deref());

    println!("\nPlaying a scripted balloon session...");
    demo::balloon_session(&tuning);
}

/// Headless walk-through of one game and the progress flow
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use maxwell_games::consts::SIM_DT;
    use maxwell_games::games::balloons::{BalloonGame, HAIR, PAPER_TABLE};
    use maxwell_games::games::MiniGame;
    use maxwell_games::nav::{ExplanationView, menu_cards};
    use maxwell_games::sim::{InputEvent, Simulation};
    use maxwell_games::storage::MemoryStore;
    use maxwell_games::{ProgressStore, Tuning};

    fn run(game: &mut BalloonGame, ticks: u32) {
        for _ in 0..ticks {
            game.step(SIM_DT);
        }
    }

    pub fn balloon_session(tuning: &Tuning) {
        let mut game = BalloonGame::new(tuning.balloons.clone(), 7);

        run(&mut game, 10);
        if let Some(modal) = game.modal() {
            println!("  modal: {}", modal.title);
        }
        game.dismiss_modal();
        run(&mut game, 30);

        let balloon = &game.balloons()[0];
        let grab = balloon.pos + balloon.size / 2.0;
        game.handle(&InputEvent::PointerDown { pos: grab });
        for i in 0..6 {
            let x = HAIR.0.x + 20.0 + (i % 2) as f32 * 100.0;
            game.handle(&InputEvent::PointerMove {
                pos: Vec2::new(x, HAIR.0.y + 60.0),
            });
            run(&mut game, 2);
        }
        println!("  sparks flying: {}", game.spark_count());

        let papers = PAPER_TABLE.0 + PAPER_TABLE.1 / 2.0 + Vec2::new(0.0, 90.0);
        game.handle(&InputEvent::PointerMove { pos: papers });
        let mut ticks = 0;
        while !game.session().is_won() && ticks < 600 {
            run(&mut game, 1);
            ticks += 1;
        }
        println!(
            "  attracted: {}, won: {} after {} ticks",
            game.papers_attracted(),
            game.session().is_won(),
            ticks
        );
        game.dismiss_modal();

        let mut progress = ProgressStore::new(MemoryStore::new());
        if let Some(route) = game.explanation_route() {
            println!("  continue to {}", route.path());
            if let Some(view) = ExplanationView::from_route(&route) {
                view.on_ended(&mut progress);
            }
        }
        for card in menu_cards(&progress) {
            println!(
                "  {}. {} {}",
                card.number,
                card.title,
                card.badge().unwrap_or("")
            );
        }
        println!("✓ Done");
    }
}

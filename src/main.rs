//! Space Explorer entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use space_explorer::audio::AudioSystem;
    use space_explorer::consts::MAX_FRAME_DT;
    use space_explorer::renderer::{RenderState, Tessellator};
    use space_explorer::sim::{ControlScheme, GameMode, GameState};
    use space_explorer::{HighScores, Hud, Session, Settings, Ui};

    /// Deferred-task pump period; keeps timers running while frames stall
    const PUMP_INTERVAL_MS: i32 = 50;

    const SCREENS: [&str; 5] = [
        "startScreen",
        "playerCountScreen",
        "playerSelectionScreen",
        "gameOverScreen",
        "winnerScreen",
    ];

    /// DOM overlays and HUD
    struct DomUi {
        document: Document,
    }

    impl DomUi {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        /// Hide every overlay, then reveal `visible` if given
        fn show_only(&self, visible: Option<&str>) {
            for id in SCREENS {
                if let Some(el) = self.document.get_element_by_id(id) {
                    let _ = if Some(id) == visible {
                        el.class_list().remove_1("hidden")
                    } else {
                        el.class_list().add_1("hidden")
                    };
                }
            }
        }
    }

    fn mode_button(id: &str, title: &str, desc: &str, best: u64) -> String {
        format!(
            r#"<button id="{id}" class="mode-btn">
                <div class="mode-title">{title}</div>
                <div class="mode-desc">{desc}<br/><span class="high-score-text">High Score: {best}</span></div>
            </button>"#
        )
    }

    impl Ui for DomUi {
        fn show_menu(&mut self) {
            self.show_only(Some("startScreen"));
        }

        fn show_player_count(&mut self) {
            self.show_only(Some("playerCountScreen"));
        }

        fn show_mode_selection(&mut self, player_count: usize, best: &[(GameMode, u64)]) {
            let best_of = |mode| best.iter().find(|(m, _)| *m == mode).map_or(0, |(_, s)| *s);
            let (title, desc, buttons) = if player_count == 1 {
                let single = best_of(GameMode::Single);
                (
                    "Single Player Mode",
                    "Choose your control scheme",
                    mode_button("singlePlayerBtn", "WASD Controls", "Use W/A/S/D keys to move<br/>3 Lives", single)
                        + &mode_button("singleArrowBtn", "Arrow Controls", "Use Arrow keys to move<br/>3 Lives", single),
                )
            } else {
                (
                    "Two Player Mode",
                    "Choose your game style",
                    mode_button(
                        "vsPlayerBtn",
                        "VS Mode",
                        "P1: WASD, P2: Arrow keys<br/>3 Lives each - Last player standing wins!",
                        best_of(GameMode::Vs),
                    ) + &mode_button(
                        "coopPlayerBtn",
                        "Co-op Mode",
                        "P1: WASD, P2: Arrow keys<br/>5 Shared Lives - Work together!",
                        best_of(GameMode::Coop),
                    ),
                )
            };
            self.set_text("modeSelectionTitle", title);
            self.set_text("modeSelectionDesc", desc);
            if let Some(el) = self.document.get_element_by_id("modeButtons") {
                el.set_inner_html(&buttons);
            }
            self.show_only(Some("playerSelectionScreen"));
        }

        fn show_game(&mut self) {
            self.show_only(None);
        }

        fn update_hud(&mut self, hud: &Hud) {
            self.set_text("scoreValue", &hud.score.to_string());
            self.set_text("livesValue", &hud.lives);
            self.set_text("levelValue", &hud.level.to_string());
            self.set_text("highScoreValue", &hud.high_score.to_string());
        }

        fn show_game_over(&mut self, score: u64, high_score: u64, new_high_score: bool) {
            self.set_text("finalScore", &score.to_string());
            self.set_text("finalHighScore", &high_score.to_string());
            if let Ok(Some(title)) = self.document.query_selector("#gameOverScreen h2") {
                if new_high_score {
                    title.set_inner_html(
                        r#"NEW HIGH SCORE!<br><span style="font-size: 0.7em; color: #ffeaa7;">Game Over</span>"#,
                    );
                } else {
                    title.set_text_content(Some("Game Over"));
                }
            }
            self.show_only(Some("gameOverScreen"));
        }

        fn show_winner(&mut self, winner: &str, score: u64, high_score: u64) {
            self.set_text("winnerTitle", &format!("{winner} Wins!"));
            self.set_text("winnerFinalScore", &score.to_string());
            self.set_text("winnerHighScore", &high_score.to_string());
            self.show_only(Some("winnerScreen"));
        }

        fn set_audio_enabled(&mut self, enabled: bool) {
            self.set_text("audioToggle", if enabled { "🔊" } else { "🔇" });
        }
    }

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        tessellator: Tessellator,
        last_time: Option<f64>,
    }

    impl Game {
        fn frame(&mut self, time: f64) {
            let dt = match self.last_time {
                Some(last) => (((time - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
                None => 0.0,
            };
            self.last_time = Some(time);

            let now = time / 1000.0;
            self.session.pump(now);
            self.session.update(dt);

            self.tessellator.clear();
            self.session.render(&mut self.tessellator, now);

            if let Some(render_state) = self.render_state.as_mut() {
                match render_state.render(self.tessellator.vertices()) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let (w, h) = render_state.size;
                        let area = render_state.play_area;
                        render_state.resize(w, h, area);
                    }
                    Err(e) => log::warn!("Frame skipped: {e:?}"),
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Space Explorer starting...");

        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        let Some(canvas) = document
            .get_element_by_id("gameCanvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #gameCanvas element");
            return;
        };

        // Play area in CSS pixels, surface in device pixels
        let dpr = window.device_pixel_ratio();
        let play_area = (canvas.client_width() as f32, canvas.client_height() as f32);
        let width = (play_area.0 as f64 * dpr) as u32;
        let height = (play_area.1 as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        let session = Session::new(
            GameState::new(seed, play_area.0, play_area.1),
            AudioSystem::platform_default(),
            HighScores::load(),
            settings,
            Box::new(DomUi {
                document: document.clone(),
            }),
        );
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state: None,
            tessellator: Tessellator::new(),
            last_time: None,
        }));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height, play_area).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {e}"),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        setup_keyboard(&document, game.clone());
        setup_buttons(&document, game.clone());

        start_pump_timer(&window, game.clone());
        request_animation_frame(game);

        log::info!("Space Explorer running!");
    }

    fn setup_keyboard(document: &Document, game: Rc<RefCell<Game>>) {
        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                let bound = game.borrow_mut().session.key_event(&code, pressed);
                // Keep arrow keys from scrolling the page
                if bound && code.starts_with("Arrow") {
                    event.prevent_default();
                }
            });
            let _ = document
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, game: Rc<RefCell<Game>>, action: fn(&mut Game, &MouseEvent)) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                action(&mut game.borrow_mut(), &event);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        on_click(document, "startBtn", game.clone(), |g, _| g.session.show_player_count());
        on_click(document, "onePlayerBtn", game.clone(), |g, _| g.session.show_mode_selection(1));
        on_click(document, "twoPlayerBtn", game.clone(), |g, _| g.session.show_mode_selection(2));
        on_click(document, "restartBtn", game.clone(), |g, _| g.session.restart());
        on_click(document, "winnerRestartBtn", game.clone(), |g, _| g.session.restart());
        on_click(document, "menuBtn", game.clone(), |g, _| g.session.show_menu());
        on_click(document, "audioToggle", game.clone(), |g, _| {
            g.session.toggle_audio();
        });

        // Mode buttons are rebuilt on every visit, so listen on their container
        on_click(document, "modeButtons", game, |g, event| {
            let button = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest("button").ok().flatten());
            let choice = match button.map(|b| b.id()).as_deref() {
                Some("singlePlayerBtn") => Some((GameMode::Single, ControlScheme::Wasd)),
                Some("singleArrowBtn") => Some((GameMode::Single, ControlScheme::Arrows)),
                Some("vsPlayerBtn") => Some((GameMode::Vs, ControlScheme::Wasd)),
                Some("coopPlayerBtn") => Some((GameMode::Coop, ControlScheme::Wasd)),
                _ => None,
            };
            if let Some((mode, scheme)) = choice {
                g.session.start(mode, scheme);
            }
        });
    }

    /// Hidden tabs stop animation frames but still run (throttled) intervals.
    /// Both clocks are `performance.now()` based.
    fn start_pump_timer(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let Some(performance) = window.performance() else {
            log::warn!("No performance clock - timers only advance with frames");
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().session.pump(performance.now() / 1000.0);
        });
        if let Err(e) = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            PUMP_INTERVAL_MS,
        ) {
            log::warn!("Failed to start timer pump: {e:?}");
        }
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use space_explorer::audio::AudioSystem;
    use space_explorer::consts::MAX_FRAME_DT;
    use space_explorer::renderer::Tessellator;
    use space_explorer::sim::{ControlScheme, GameMode, GameState};
    use space_explorer::{HighScores, Hud, MemoryStore, Session, Settings, Ui};

    /// Ui that narrates through the log
    struct LogUi;

    impl Ui for LogUi {
        fn show_menu(&mut self) {
            log::info!("[ui] menu");
        }
        fn show_player_count(&mut self) {
            log::info!("[ui] player count");
        }
        fn show_mode_selection(&mut self, player_count: usize, best: &[(GameMode, u64)]) {
            log::info!("[ui] {player_count}-player modes: {best:?}");
        }
        fn show_game(&mut self) {
            log::info!("[ui] game");
        }
        fn update_hud(&mut self, hud: &Hud) {
            log::trace!("[ui] hud {hud:?}");
        }
        fn show_game_over(&mut self, score: u64, high_score: u64, new_high_score: bool) {
            log::info!("[ui] game over: score={score} best={high_score} new={new_high_score}");
        }
        fn show_winner(&mut self, winner: &str, score: u64, _high_score: u64) {
            log::info!("[ui] {winner} wins with {score}");
        }
        fn set_audio_enabled(&mut self, enabled: bool) {
            log::info!("[ui] audio {}", if enabled { "on" } else { "off" });
        }
    }

    /// Weave left and right until the session ends or time runs out
    pub fn run(seed: u64, mode: GameMode, max_secs: f32) {
        let mut session = Session::new(
            GameState::new(seed, 800.0, 600.0),
            AudioSystem::disabled(),
            HighScores::new(Box::new(MemoryStore::new())),
            Settings::default(),
            Box::new(LogUi),
        );
        session.show_player_count();
        session.show_mode_selection(mode.player_count());
        session.start(mode, ControlScheme::Wasd);

        let frames = (max_secs / MAX_FRAME_DT) as u32;
        let mut now = 0.0;
        for frame in 0..frames {
            // Switch direction every two seconds
            let left = (frame / 125) % 2 == 0;
            session.key_event("KeyA", left);
            session.key_event("KeyD", !left);
            session.key_event("ArrowLeft", !left);
            session.key_event("ArrowRight", left);

            now += f64::from(MAX_FRAME_DT);
            session.pump(now);
            session.update(MAX_FRAME_DT);
            if !session.state().is_playing() {
                break;
            }
        }

        let mut tessellator = Tessellator::new();
        session.render(&mut tessellator, now);
        log::info!(
            "{mode:?} run finished after {now:.1}s: {:?}, {} particles, last frame {} triangles",
            session.hud(),
            session.state().particles.len(),
            tessellator.triangle_count()
        );
    }

    pub fn main() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Space Explorer (native) starting...");
        log::info!("Native mode runs a headless demo - build for wasm32 to play in a browser");

        let seed = std::env::args()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0x5eed);
        for mode in GameMode::ALL {
            run(seed, mode, 120.0);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    headless::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

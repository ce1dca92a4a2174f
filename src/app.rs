//! Window-independent application shell: screen selection, input routing,
//! exports and per-frame layout.

use log::{info, warn};
use thiserror::Error;

use crate::assistant::dispatcher::Dispatcher;
use crate::assistant::{Assistant, AssistantError};
use crate::core::config::{self, AppConfig};
use crate::core::navigation::Action;
use crate::core::site_context::SiteContext;
use crate::core::tree::{Bundle, Locale};
use crate::core::types::{Bounds, Color, Key, KeyEvent, PointerEvent, Vec2};
use crate::graph::graph_view::GraphView;
use crate::panels::chat_panel::ChatPanel;
use crate::panels::evaluation_panel::EvaluationPanel;
use crate::panels::path_panel::PathPanel;
use crate::panels::tutorial::TutorialOverlay;
use crate::panels::{render_data_unavailable, render_language_select};
use crate::platform::export::{export_png, export_text, FileSink};
use crate::platform::renderer::Renderer;
use crate::report::text_report::{chat_filename, network_filename, report_filename, today};
use crate::session::Session;
use crate::store::settings::SettingsStore;

const HEADER_H: f64 = 56.0;
const OVERLAY_W: f64 = 460.0;
const OVERLAY_H: f64 = 380.0;
const STATUS_MS: f64 = 4000.0;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid markup pattern: {0}")]
    Markup(#[from] regex::Error),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
}

enum Screen {
    SelectLanguage,
    Unavailable(String),
    Diagnostic(Box<Session>),
}

struct Layout {
    graph: Bounds,
    sidebar: Bounds,
    chat: Bounds,
    overlay: Bounds,
}

fn layout(width: f64, height: f64) -> Layout {
    let main_w = (width - config::SIDEBAR_W).max(0.0);
    let graph_h = (height - HEADER_H - config::CHAT_H).max(0.0);
    let graph = Bounds {
        min_x: 0.0,
        min_y: HEADER_H,
        width: main_w,
        height: graph_h,
    };
    Layout {
        graph,
        sidebar: Bounds {
            min_x: main_w,
            min_y: HEADER_H,
            width: config::SIDEBAR_W.min(width),
            height: (height - HEADER_H).max(0.0),
        },
        chat: Bounds {
            min_x: 0.0,
            min_y: HEADER_H + graph_h,
            width: main_w,
            height: config::CHAT_H,
        },
        overlay: Bounds {
            min_x: graph.min_x + 16.0,
            min_y: graph.min_y + 16.0,
            width: OVERLAY_W.min(main_w - 32.0).max(0.0),
            height: OVERLAY_H.min(graph_h - 32.0).max(0.0),
        },
    }
}

pub struct App {
    screen: Screen,
    site: SiteContext,
    width: f64,
    height: f64,

    graph_view: GraphView,
    evaluation: EvaluationPanel,
    chat: ChatPanel,
    tutorial: TutorialOverlay,

    dispatcher: Dispatcher,
    sink: Box<dyn FileSink>,
    settings: SettingsStore,
    status: Option<(String, f64)>,
}

impl App {
    pub fn new(
        config: &AppConfig,
        assistant: Assistant,
        sink: Box<dyn FileSink>,
        settings: SettingsStore,
    ) -> Result<Self, AppError> {
        let mut app = Self {
            screen: Screen::SelectLanguage,
            site: config.site.clone(),
            width: config::WINDOW_W as f64,
            height: config::WINDOW_H as f64,
            graph_view: GraphView::new(),
            evaluation: EvaluationPanel::new(),
            chat: ChatPanel::new()?,
            tutorial: TutorialOverlay::new(),
            dispatcher: Dispatcher::new(assistant)?,
            sink,
            settings,
            status: None,
        };
        if let Some(locale) = config.locale {
            app.select_language(locale);
        }
        Ok(app)
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.screen {
            Screen::Diagnostic(s) => Some(s),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(s, _)| s.as_str())
    }

    pub fn select_language(&mut self, locale: Locale) {
        let bundle = match Bundle::load(locale) {
            Ok(b) => b,
            Err(e) => {
                warn!("{e}");
                self.screen = Screen::Unavailable(e.to_string());
                return;
            }
        };
        let fallback = bundle.strings.data_unavailable.clone();
        match Session::start(bundle, self.site.clone()) {
            Ok(session) => {
                self.screen = Screen::Diagnostic(Box::new(session));
                self.fit_graph();
                if !self.settings.tutorial_seen() {
                    self.tutorial.open();
                }
            }
            Err(e) => {
                warn!("{e}");
                self.screen = Screen::Unavailable(fallback);
            }
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        if changed {
            self.fit_graph();
        }
    }

    fn fit_graph(&mut self) {
        let area = layout(self.width, self.height).graph;
        if let Screen::Diagnostic(session) = &self.screen {
            let graph = session.projection(None);
            self.graph_view.fit(&graph, area.width, area.height);
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!("{message}");
        self.status = Some((message, STATUS_MS));
    }

    /// Advance timers and fold finished assistant replies into the session.
    pub fn update(&mut self, dt_ms: f64) {
        if let Some((_, left)) = &mut self.status {
            *left -= dt_ms;
            if *left <= 0.0 {
                self.status = None;
            }
        }
        let Screen::Diagnostic(session) = &mut self.screen else {
            return;
        };
        for done in self.dispatcher.drain() {
            session.complete(done);
        }
        self.evaluation.sync(&session.state().current_node_id);
        let graph = session.projection(self.graph_view.hovered());
        self.graph_view.update(dt_ms, &graph);
    }

    pub fn handle_key(&mut self, e: &KeyEvent) {
        if matches!(self.screen, Screen::SelectLanguage) {
            let picked = match e.key {
                Key::Char(c) => c
                    .to_digit(10)
                    .and_then(|d| (d as usize).checked_sub(1))
                    .and_then(|i| Locale::ALL.get(i).copied()),
                _ => None,
            };
            if let Some(locale) = picked {
                self.select_language(locale);
            }
            return;
        }
        let Screen::Diagnostic(session) = &mut self.screen else {
            return;
        };

        if self.tutorial.is_open() {
            let steps = session.strings().tutorial.steps.len();
            if self.tutorial.handle_key(e, steps).is_some() {
                if let Err(e) = self.settings.mark_tutorial_seen() {
                    warn!("{e}");
                }
            }
            return;
        }

        if let Key::F(n) = e.key {
            self.handle_function_key(n);
            return;
        }

        if self.chat.is_focused() {
            if let Some(query) = self.chat.handle_key(e, session.is_loading()) {
                if let Some(job) = session.request_explanation(&query) {
                    self.dispatcher.submit(job);
                }
            }
            return;
        }

        match e.key {
            Key::Tab => self.chat.set_focused(true),
            Key::Char('+') | Key::Char('=') => self.graph_view.viewport_mut().zoom_in(),
            Key::Char('-') => self.graph_view.viewport_mut().zoom_out(),
            Key::Char(' ') => self.fit_graph(),
            Key::Backspace => {
                session.dispatch(Action::StepBack);
            }
            Key::Char('n') | Key::Char('N') => {
                session.dispatch(Action::Restart);
            }
            _ if session.state().overlay_open => {
                let Some(node) = session.current_node().cloned() else {
                    return;
                };
                self.evaluation.sync(&node.id);
                if let Some(action) = self.evaluation.handle_key(e, &node) {
                    session.dispatch(action);
                }
            }
            Key::Enter => {
                // Reopen the overlay on the current node.
                let current = session.state().current_node_id.clone();
                session.dispatch(Action::Select(current));
            }
            _ => {}
        }
    }

    fn handle_function_key(&mut self, n: u8) {
        let Screen::Diagnostic(session) = &mut self.screen else {
            return;
        };
        let outcome = match n {
            1 => {
                self.tutorial.open();
                return;
            }
            2 => export_text(self.sink.as_ref(), &report_filename(today()), &session.text_report()),
            3 => {
                let graph = session.projection(None);
                let callout = start_callout(session);
                export_png(self.sink.as_ref(), &network_filename(today()), &graph, &callout)
            }
            4 => {
                match session.request_summary() {
                    Some(job) => self.dispatcher.submit(job),
                    None => {
                        let msg = session.strings().path.empty.clone();
                        self.set_status(msg);
                    }
                }
                return;
            }
            5 => {
                if session.chat().is_empty() {
                    return;
                }
                export_text(self.sink.as_ref(), &chat_filename(today()), &session.chat_transcript())
            }
            _ => return,
        };
        match outcome {
            Ok(path) => self.set_status(format!("Saved {}", path.display())),
            Err(e) => {
                warn!("export failed: {e}");
                self.set_status(e.to_string());
            }
        }
    }

    /// Pointer input in window coordinates.
    pub fn handle_pointer(&mut self, e: &PointerEvent) {
        if self.tutorial.is_open() {
            return;
        }
        let Screen::Diagnostic(session) = &mut self.screen else {
            return;
        };
        let l = layout(self.width, self.height);
        if let PointerEvent::Down { pos, .. } = e {
            self.chat.set_focused(l.chat.contains(*pos));
            let over_overlay = session.state().overlay_open && l.overlay.contains(*pos);
            if !l.graph.contains(*pos) || over_overlay {
                return;
            }
        }
        if let PointerEvent::Wheel { pos, .. } = e {
            if !l.graph.contains(*pos) {
                return;
            }
        }

        // Outside the canvas only an active drag keeps tracking the pointer.
        let dragging = self.graph_view.viewport().is_dragging();
        let e = match *e {
            PointerEvent::Move { pos, .. } if !dragging && !l.graph.contains(pos) => PointerEvent::Leave,
            PointerEvent::Up { pos, .. } if !l.graph.contains(pos) => PointerEvent::Leave,
            other => other,
        };

        let origin = Vec2::new(l.graph.min_x, l.graph.min_y);
        let local = match e {
            PointerEvent::Down { pos, button } => PointerEvent::Down { pos: pos - origin, button },
            PointerEvent::Up { pos, button } => PointerEvent::Up { pos: pos - origin, button },
            PointerEvent::Move { pos, dragging } => PointerEvent::Move {
                pos: pos - origin,
                dragging,
            },
            PointerEvent::Wheel { pos, delta } => PointerEvent::Wheel {
                pos: pos - origin,
                delta,
            },
            PointerEvent::Leave => PointerEvent::Leave,
        };
        let graph = session.projection(self.graph_view.hovered());
        if let Some(id) = self.graph_view.handle_pointer(&local, &graph) {
            session.dispatch(Action::Select(id));
        }
    }

    pub fn render(&self, renderer: &dyn Renderer) {
        let (w, h) = (self.width, self.height);
        let session = match &self.screen {
            Screen::SelectLanguage => {
                render_language_select(renderer, w, h);
                return;
            }
            Screen::Unavailable(message) => {
                render_data_unavailable(renderer, w, h, message);
                return;
            }
            Screen::Diagnostic(session) => session,
        };
        let strings = session.strings();
        let l = layout(w, h);

        renderer.fill_rect(0.0, 0.0, w, h, Color::from_hex(config::BG_COLOR, 1.0));
        self.render_header(renderer, session);

        let graph = session.projection(self.graph_view.hovered());
        self.graph_view.render(renderer, &graph, l.graph, &start_callout(session));

        let state = session.state();
        if state.overlay_open {
            if let Some(node) = session.current_node() {
                self.evaluation
                    .render(renderer, l.overlay, node, strings, state.can_go_back());
            }
        }

        PathPanel::render(renderer, l.sidebar, &state.history, strings);
        let current_text = session.current_node().map(|n| n.prompt.as_str()).unwrap_or("");
        self.chat.render(
            renderer,
            l.chat,
            session.chat().messages(),
            session.is_loading(),
            current_text,
            strings,
        );

        self.tutorial.render(renderer, w, h, &strings.tutorial);
    }

    fn render_header(&self, renderer: &dyn Renderer, session: &Session) {
        let strings = session.strings();
        renderer.fill_rect(0.0, 0.0, self.width, HEADER_H, Color::from_hex(config::PANEL_BG, 0.8));
        renderer.draw_text(16.0, 8.0, &strings.app_title, 18.0, Color::from_hex(config::HIGHLIGHT, 1.0));
        renderer.draw_text(
            16.0,
            32.0,
            &strings.app_subtitle,
            12.0,
            Color::from_hex(config::TEXT_SECONDARY, 1.0),
        );
        let zoom = format!("{:.0}%  [+/-] [Space]", self.graph_view.viewport().zoom * 100.0);
        let zw = renderer.text_width(&zoom, 12.0);
        renderer.draw_text(self.width - zw - 16.0, 10.0, &zoom, 12.0, Color::from_hex(config::TEXT_SECONDARY, 1.0));
        if let Some(status) = self.status() {
            let sw = renderer.text_width(status, 12.0);
            renderer.draw_text(self.width - sw - 16.0, 32.0, status, 12.0, Color::from_hex(config::TEXT_PRIMARY, 1.0));
        }
    }

    #[cfg(test)]
    fn wait_for_reply(&mut self) -> bool {
        let Some(done) = self.dispatcher.wait(std::time::Duration::from_secs(5)) else {
            return false;
        };
        match &mut self.screen {
            Screen::Diagnostic(session) => session.complete(done),
            _ => false,
        }
    }
}

/// Label for the start node's guidance bubble.
fn start_callout(session: &Session) -> String {
    format!("{}: Click!", session.strings().node_kinds.question)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::assistant::fake::FakeBackend;
    use crate::core::chat::Sender;
    use crate::core::types::PointerButton;
    use crate::platform::export::DiskSink;
    use crate::platform::renderer::recording::RecordingRenderer;

    fn key(k: Key) -> KeyEvent {
        KeyEvent {
            key: k,
            ctrl: false,
            shift: false,
        }
    }

    fn app_with(locale: Option<Locale>, dir: &std::path::Path) -> App {
        let config = AppConfig {
            locale,
            ..AppConfig::default()
        };
        let mut settings = SettingsStore::new();
        settings.open_in_memory().unwrap();
        settings.mark_tutorial_seen().unwrap();
        App::new(
            &config,
            Assistant::new(Arc::new(FakeBackend::text("**Plan** ahead"))),
            Box::new(DiskSink::new(dir)),
            settings,
        )
        .unwrap()
    }

    #[test]
    fn test_language_select_starts_session() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(None, dir.path());
        assert!(app.session().is_none());
        app.handle_key(&key(Key::Char('2')));
        let session = app.session().unwrap();
        assert_eq!(session.locale(), Locale::Es);
        assert_eq!(session.state().current_node_id, "Q1");
    }

    #[test]
    fn test_first_run_opens_tutorial() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = SettingsStore::new();
        settings.open_in_memory().unwrap();
        let config = AppConfig {
            locale: Some(Locale::En),
            ..AppConfig::default()
        };
        let mut app = App::new(
            &config,
            Assistant::new(Arc::new(FakeBackend::text("ok"))),
            Box::new(DiskSink::new(dir.path())),
            settings,
        )
        .unwrap();
        assert!(app.tutorial.is_open());
        app.handle_key(&key(Key::Escape));
        assert!(!app.tutorial.is_open());
        assert!(app.settings.tutorial_seen());
    }

    #[test]
    fn test_keyboard_walk_through_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.update(16.0);
        // First Enter opens the overlay, the second answers Q1 at the default 50.
        app.handle_key(&key(Key::Enter));
        assert!(app.session().unwrap().state().overlay_open);
        app.handle_key(&key(Key::Enter));
        app.update(16.0);
        let state = app.session().unwrap().state();
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].answer_value, Some(50));
        assert_ne!(state.current_node_id, "Q1");

        app.handle_key(&key(Key::Backspace));
        assert_eq!(app.session().unwrap().state().current_node_id, "Q1");
        assert!(app.session().unwrap().state().history.is_empty());
    }

    #[test]
    fn test_slider_keys_reach_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.handle_key(&key(Key::Enter));
        for _ in 0..4 {
            app.handle_key(&key(Key::Left));
        }
        app.handle_key(&key(Key::Enter));
        let step = &app.session().unwrap().state().history[0];
        assert_eq!(step.answer_value, Some(30));
    }

    #[test]
    fn test_escape_then_enter_reopens_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        assert!(!app.session().unwrap().state().overlay_open);
        app.handle_key(&key(Key::Enter));
        app.handle_key(&key(Key::Escape));
        assert!(!app.session().unwrap().state().overlay_open);
        app.handle_key(&key(Key::Enter));
        assert!(app.session().unwrap().state().overlay_open);
        assert!(app.session().unwrap().state().history.is_empty());
    }

    #[test]
    fn test_report_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.handle_key(&key(Key::Enter));
        app.handle_key(&key(Key::Enter));
        app.handle_key(&key(Key::F(2)));
        let path = dir.path().join(report_filename(today()));
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("Conifer Invasion Governance System"));
        assert!(app.status().unwrap().starts_with("Saved"));
    }

    #[test]
    fn test_png_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.handle_key(&key(Key::F(3)));
        assert!(dir.path().join(network_filename(today())).exists());
    }

    #[test]
    fn test_chat_roundtrip_through_dispatcher() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.handle_key(&key(Key::Tab));
        for c in "why?".chars() {
            app.handle_key(&key(Key::Char(c)));
        }
        app.handle_key(&key(Key::Enter));
        assert!(app.session().unwrap().is_loading());
        assert!(app.wait_for_reply());

        let session = app.session().unwrap();
        assert!(!session.is_loading());
        let messages = session.chat().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(messages[0].text, "why?");
        assert_eq!(messages[1].sender, Sender::Assistant);

        // Chat focus swallows navigation keys.
        assert!(app.session().unwrap().state().history.is_empty());

        app.handle_key(&key(Key::F(5)));
        assert!(dir.path().join(chat_filename(today())).exists());
    }

    #[test]
    fn test_summary_needs_history() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());
        app.handle_key(&key(Key::F(4)));
        assert_eq!(app.status(), Some("No steps taken yet."));
        assert!(!app.session().unwrap().is_loading());
    }

    #[test]
    fn test_click_on_node_selects_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());

        let l = layout(app.width, app.height);
        let origin = Vec2::new(l.graph.min_x, l.graph.min_y);
        let graph = app.session().unwrap().projection(None);
        let (id, pos) = graph
            .nodes
            .iter()
            .filter(|n| n.id != "Q1")
            .map(|n| (n.id.clone(), app.graph_view.viewport().graph_to_screen(n.center) + origin))
            .find(|(_, pos)| l.graph.contains(*pos))
            .expect("a node other than the start is visible after fit");
        app.handle_pointer(&PointerEvent::Down {
            pos,
            button: PointerButton::Primary,
        });
        app.handle_pointer(&PointerEvent::Up {
            pos,
            button: PointerButton::Primary,
        });
        let state = app.session().unwrap().state();
        assert_eq!(state.current_node_id, id);
        assert!(state.overlay_open);
    }

    #[test]
    fn test_no_hover_outside_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with(Some(Locale::En), dir.path());

        let l = layout(app.width, app.height);
        let origin = Vec2::new(l.graph.min_x, l.graph.min_y);
        let graph = app.session().unwrap().projection(None);
        let start = graph.node("Q1").unwrap().center;
        let from = app.graph_view.viewport().graph_to_screen(start) + origin;
        assert!(l.graph.contains(from));

        // Drag the start node under the sidebar and release there.
        let to = Vec2::new(l.sidebar.min_x + l.sidebar.width / 2.0, from.y);
        app.handle_pointer(&PointerEvent::Down {
            pos: from,
            button: PointerButton::Primary,
        });
        app.handle_pointer(&PointerEvent::Move { pos: to, dragging: true });
        app.handle_pointer(&PointerEvent::Up {
            pos: to,
            button: PointerButton::Primary,
        });
        assert!(!app.graph_view.viewport().is_dragging());
        assert!(!app.session().unwrap().state().overlay_open);
        assert_eq!(
            app.graph_view.hit_test(&graph, to - origin).as_deref(),
            Some("Q1")
        );

        app.handle_pointer(&PointerEvent::Move { pos: to, dragging: false });
        assert_eq!(app.graph_view.hovered(), None);
    }

    #[test]
    fn test_render_smoke() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(Some(Locale::En), dir.path());
        let r = RecordingRenderer::default();
        app.render(&r);
        let texts = r.texts();
        assert!(texts.iter().any(|t| t == "Conifer Invasion Governance System"));
        assert!(texts.iter().any(|t| t == "Evaluation: Click!"));
    }
}

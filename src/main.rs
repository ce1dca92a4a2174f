mod app;
mod assistant;
mod core;
mod graph;
mod panels;
mod platform;
mod report;
mod session;
mod store;

use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};

use crate::app::App;
use crate::assistant::Assistant;
use crate::core::config::{self, AppConfig};
use crate::core::site_context::SiteContext;
use crate::core::tree::{Bundle, Locale};
use crate::core::types::Key;
use crate::platform::export::DiskSink;
use crate::platform::renderer::Renderer;
use crate::platform::renderer_cairo::RendererCairo;
use crate::platform::window_x11::{WindowEvent, WindowX11};
use crate::session::Session;
use crate::store::settings::SettingsStore;

const WINDOW_TITLE: &str = "Conifer Invasion Governance";

struct Args {
    config: Option<PathBuf>,
    lang: Option<String>,
    export_dir: Option<PathBuf>,
    report_only: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        lang: None,
        export_dir: None,
        report_only: false,
    };

    let argv: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < argv.len() {
        match argv[i].as_str() {
            "--config" if i + 1 < argv.len() => {
                i += 1;
                args.config = Some(PathBuf::from(&argv[i]));
            }
            "--lang" if i + 1 < argv.len() => {
                i += 1;
                args.lang = Some(argv[i].clone());
            }
            "--export-dir" if i + 1 < argv.len() => {
                i += 1;
                args.export_dir = Some(PathBuf::from(&argv[i]));
            }
            "--report-only" => args.report_only = true,
            other => warn!("ignoring unknown argument '{other}'"),
        }
        i += 1;
    }

    args
}

fn load_config(args: &Args) -> AppConfig {
    let mut cfg = match &args.config {
        Some(path) => match AppConfig::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        },
        None => AppConfig::default(),
    };
    if let Some(lang) = &args.lang {
        match lang.parse::<Locale>() {
            Ok(locale) => cfg.locale = Some(locale),
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
    if let Some(dir) = &args.export_dir {
        cfg.export_dir = dir.clone();
    }
    cfg
}

/// Print the report for an empty path, for scripted environments.
fn print_report(locale: Locale, site: SiteContext) {
    let session = Bundle::load(locale)
        .map_err(|e| e.to_string())
        .and_then(|bundle| Session::start(bundle, site).map_err(|e| e.to_string()));
    match session {
        Ok(session) => print!("{}", session.text_report()),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let cfg = load_config(&args);

    if args.report_only {
        print_report(cfg.locale.unwrap_or(Locale::En), cfg.site.clone());
        return;
    }

    // Settings (tutorial flag). Runs without persistence if the database is unavailable.
    let mut settings = SettingsStore::new();
    if let Err(e) = settings.open(&cfg.settings_db) {
        warn!("settings disabled: {e}");
    }

    let assistant = Assistant::from_config(&cfg.assistant);
    let sink = Box::new(DiskSink::new(cfg.export_dir.clone()));
    let mut app = match App::new(&cfg, assistant, sink, settings) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Create window
    let mut window = WindowX11::new();
    if !window.create(config::WINDOW_W, config::WINDOW_H, WINDOW_TITLE) {
        eprintln!("Failed to create X11 window");
        std::process::exit(1);
    }
    info!("exports go to {}", cfg.export_dir.display());

    let mut last_time = Instant::now();

    // Main loop
    'main: loop {
        if !window.poll_events() {
            break;
        }
        app.resize(window.width() as f64, window.height() as f64);

        for event in window.take_events() {
            match event {
                WindowEvent::Pointer(p) => app.handle_pointer(&p),
                WindowEvent::Key(k) => {
                    // Ctrl+Q: quit
                    if k.ctrl && matches!(k.key, Key::Char('q') | Key::Char('Q')) {
                        break 'main;
                    }
                    app.handle_key(&k);
                }
            }
        }

        // Delta time
        let now = Instant::now();
        let dt = now.duration_since(last_time).as_secs_f64() * 1000.0;
        last_time = now;

        app.update(dt);

        // Render
        if let Some(cr) = window.create_cairo_context() {
            let mut renderer = RendererCairo::new(cr);
            renderer.begin_frame(window.width(), window.height());
            app.render(&renderer);
            renderer.end_frame();
        }

        window.flush();

        // Cap at ~60fps
        std::thread::sleep(std::time::Duration::from_millis(16));
    }
}

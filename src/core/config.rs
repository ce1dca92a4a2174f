//! Visual and behavioral constants, plus the runtime TOML configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::site_context::SiteContext;
use super::tree::Locale;

// --- Visual colors (hex) ---
pub const BG_COLOR: u32 = 0x020617;
pub const PANEL_BG: u32 = 0x1E293B;
pub const PANEL_BORDER: u32 = 0x115E59;
pub const NEUTRAL_NODE: u32 = 0x334155;
pub const NEUTRAL_FILL: u32 = 0x0F172A;
pub const NEUTRAL_FILL_ALPHA: f64 = 0.4;
pub const EDGE_IDLE: u32 = 0x1E293B;
pub const HIGHLIGHT: u32 = 0x2DD4BF;
pub const ACCENT: u32 = 0x0D9488;
pub const DANGER: u32 = 0xF43F5E;
pub const TEXT_PRIMARY: u32 = 0xE2E8F0;
pub const TEXT_SECONDARY: u32 = 0x64748B;

// --- Value gradient anchors ---
pub const VALUE_NEGATIVE: u32 = 0xF43F5E;
pub const VALUE_UNCERTAIN: u32 = 0x94A3B8;
pub const VALUE_POSITIVE: u32 = 0x14B8A6;
/// Fill alpha as a byte, appended to the stroke color (`#rrggbb44`).
pub const FILL_ALPHA_BYTE: u8 = 0x44;

// --- Graded answers ---
pub const VALUE_MIN: u8 = 0;
pub const VALUE_MAX: u8 = 100;
/// Values at or above this lean "yes".
pub const YES_THRESHOLD: u8 = 50;
/// Value projected for a visited node whose step carries no graded answer.
pub const UNGRADED_VISIT_VALUE: u8 = 50;
pub const SLIDER_DEFAULT: u8 = 50;
pub const SLIDER_STEP: u8 = 5;

// --- Node geometry ---
pub const NODE_SIZE: f64 = 36.0;
pub const NODE_SIZE_ACTIVE: f64 = 42.0;
pub const NODE_CORNER_RADIUS: f64 = 12.0;
pub const RING_GAP: f64 = 4.0;
pub const RING_WIDTH: f64 = 3.0;
pub const HALO_GROW: f64 = 15.0;
pub const DEFAULT_POSITION_X: f64 = 500.0;
pub const DEFAULT_POSITION_Y: f64 = 300.0;
pub const EDGE_WIDTH: f64 = 2.0;
pub const EDGE_WIDTH_VISITED: f64 = 4.0;
pub const EDGE_OPACITY: f64 = 0.3;
pub const EDGE_OPACITY_VISITED: f64 = 0.7;

// --- Canvas ---
pub const CANVAS_PADDING: f64 = 120.0;
pub const EXPORT_SCALE: f64 = 3.0;

// --- Zoom ---
pub const ZOOM_MIN: f64 = 0.1;
pub const ZOOM_MAX: f64 = 3.0;
pub const ZOOM_WHEEL_OUT: f64 = 0.9;
pub const ZOOM_WHEEL_IN: f64 = 1.1;
pub const ZOOM_BUTTON_IN: f64 = 1.2;
pub const ZOOM_BUTTON_OUT: f64 = 0.8;
/// Pointer travel (screen px) below which a press/release pair is a click.
pub const CLICK_SLOP: f64 = 4.0;

// --- Animation ---
pub const HALO_PULSE_MS: f64 = 1000.0;
pub const HOVER_SMOOTHING: f64 = 12.0;

// --- Window ---
pub const WINDOW_W: i32 = 1280;
pub const WINDOW_H: i32 = 800;
pub const SIDEBAR_W: f64 = 340.0;
pub const CHAT_H: f64 = 220.0;

// --- Persistence ---
pub const TUTORIAL_SEEN_KEY: &str = "hasSeenTutorial";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for the external explanation service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl AssistantConfig {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

/// Runtime configuration, read from an optional TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `None` shows the language selector before the session starts.
    pub locale: Option<Locale>,
    pub export_dir: PathBuf,
    pub settings_db: PathBuf,
    pub assistant: AssistantConfig,
    pub site: SiteContext,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            locale: None,
            export_dir: PathBuf::from("."),
            settings_db: PathBuf::from(".canopy-audit.db"),
            assistant: AssistantConfig::default(),
            site: SiteContext::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

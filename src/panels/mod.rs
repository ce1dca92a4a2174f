//! Screen-space panels drawn around the graph canvas.

pub mod chat_panel;
pub mod evaluation_panel;
pub mod path_panel;
pub mod tutorial;

use crate::core::config;
use crate::core::tree::Locale;
use crate::core::types::{Bounds, Color};
use crate::platform::renderer::Renderer;

pub const PAD: f64 = 16.0;

/// Greedy word wrap. Words wider than `max_w` get a line of their own.
pub fn wrap_text(renderer: &dyn Renderer, text: &str, size: f64, max_w: f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if !line.is_empty() && renderer.text_width(&candidate, size) > max_w {
                lines.push(std::mem::take(&mut line));
                line = word.to_string();
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// Shorten `text` with an ellipsis so it fits in `max_w`.
pub fn truncate_to_width(renderer: &dyn Renderer, text: &str, size: f64, max_w: f64) -> String {
    if renderer.text_width(text, size) <= max_w {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().collect::<String>().trim_end().to_string() + "…";
        if renderer.text_width(&candidate, size) <= max_w {
            return candidate;
        }
    }
    "…".to_string()
}

/// Draw wrapped text and return the y below the last line.
pub fn draw_wrapped(
    renderer: &dyn Renderer,
    x: f64,
    y: f64,
    max_w: f64,
    text: &str,
    size: f64,
    color: Color,
) -> f64 {
    let line_h = size * 1.35;
    let mut y = y;
    for line in wrap_text(renderer, text, size, max_w) {
        renderer.draw_text(x, y, &line, size, color);
        y += line_h;
    }
    y
}

pub fn draw_card(renderer: &dyn Renderer, area: Bounds) {
    renderer.fill_rounded_rect(
        area.min_x,
        area.min_y,
        area.width,
        area.height,
        14.0,
        Color::from_hex(config::PANEL_BG, 0.92),
    );
    renderer.stroke_rounded_rect(
        area.min_x,
        area.min_y,
        area.width,
        area.height,
        14.0,
        Color::from_hex(config::PANEL_BORDER, 1.0),
        1.0,
    );
}

/// A key hint such as `[Enter] Continue`, returning its width.
pub fn draw_hint(renderer: &dyn Renderer, x: f64, y: f64, key: &str, label: &str, accent: bool) -> f64 {
    let text = format!("[{key}] {label}");
    let size = 12.0;
    let w = renderer.text_width(&text, size) + 16.0;
    let bg = if accent {
        Color::from_hex(config::ACCENT, 1.0)
    } else {
        Color::from_hex(config::BG_COLOR, 0.8)
    };
    renderer.fill_rounded_rect(x, y, w, 24.0, 8.0, bg);
    renderer.draw_text(x + 8.0, y + 5.0, &text, size, Color::from_hex(config::TEXT_PRIMARY, 1.0));
    w
}

/// Full-window blocking message shown when the tree cannot be used.
pub fn render_data_unavailable(renderer: &dyn Renderer, width: f64, height: f64, message: &str) {
    renderer.fill_rect(0.0, 0.0, width, height, Color::from_hex(config::BG_COLOR, 1.0));
    let size = 20.0;
    let w = renderer.text_width(message, size);
    renderer.draw_text(
        (width - w) / 2.0,
        height / 2.0 - size,
        message,
        size,
        Color::from_hex(config::DANGER, 1.0),
    );
}

/// Language picker shown before any bundle is loaded, so its text is bilingual.
pub fn render_language_select(renderer: &dyn Renderer, width: f64, height: f64) {
    renderer.fill_rect(0.0, 0.0, width, height, Color::from_hex(config::BG_COLOR, 1.0));
    let card = Bounds {
        min_x: width / 2.0 - 220.0,
        min_y: height / 2.0 - 110.0,
        width: 440.0,
        height: 220.0,
    };
    draw_card(renderer, card);
    let primary = Color::from_hex(config::TEXT_PRIMARY, 1.0);
    renderer.draw_text(
        card.min_x + 32.0,
        card.min_y + 32.0,
        "Select language / Seleccione idioma",
        18.0,
        primary,
    );
    for (i, locale) in Locale::ALL.iter().enumerate() {
        let key = (i + 1).to_string();
        let y = card.min_y + 96.0 + i as f64 * 40.0;
        draw_hint(renderer, card.min_x + 32.0, y, &key, locale.native_name(), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::renderer::recording::RecordingRenderer;

    #[test]
    fn test_wrap_respects_width() {
        // recording renderer: 0.5 * size per char, so 10 chars at size 10 = 50 px
        let r = RecordingRenderer::default();
        let lines = wrap_text(&r, "aaaa bbbb cccc", 10.0, 50.0);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        let r = RecordingRenderer::default();
        let lines = wrap_text(&r, "one\n\ntwo", 10.0, 500.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_truncate_adds_ellipsis() {
        let r = RecordingRenderer::default();
        assert_eq!(truncate_to_width(&r, "short", 10.0, 100.0), "short");
        let t = truncate_to_width(&r, "a fairly long node prompt", 10.0, 50.0);
        assert!(t.ends_with('…'));
        assert!(r.text_width(&t, 10.0) <= 50.0);
    }

    #[test]
    fn test_language_select_lists_locales() {
        let r = RecordingRenderer::default();
        render_language_select(&r, 1280.0, 800.0);
        let texts = r.texts();
        assert!(texts.iter().any(|t| t == "[1] English"));
        assert!(texts.iter().any(|t| t == "[2] Español"));
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let r = RecordingRenderer::default();
        let lines = wrap_text(&r, "a verylongwordhere b", 10.0, 30.0);
        assert_eq!(lines, vec!["a", "verylongwordhere", "b"]);
    }
}

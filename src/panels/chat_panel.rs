//! Assistant conversation: transcript, typing indicator and the input line.

use regex::Regex;

use crate::core::chat::{ChatMessage, Sender};
use crate::core::config;
use crate::core::strings::UiStrings;
use crate::core::types::{Bounds, Color, Key, KeyEvent};
use crate::platform::renderer::Renderer;

use super::{draw_card, draw_hint, truncate_to_width, wrap_text, PAD};

const TEXT_SIZE: f64 = 13.0;
const CONTEXT_CHARS: usize = 100;

/// Strips markdown emphasis so assistant replies read as plain text.
pub struct MarkupStripper {
    emphasis: Regex,
    bullet: Regex,
}

impl MarkupStripper {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            emphasis: Regex::new(r"(?m)^#{1,6}\s*|\*\*|__|`|\*")?,
            bullet: Regex::new(r"(?m)^(\s*)[*-]\s+")?,
        })
    }

    pub fn strip(&self, text: &str) -> String {
        let bulleted = self.bullet.replace_all(text, "$1• ");
        self.emphasis.replace_all(&bulleted, "").into_owned()
    }
}

pub struct ChatPanel {
    input: String,
    focused: bool,
    stripper: MarkupStripper,
}

impl ChatPanel {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            input: String::new(),
            focused: false,
            stripper: MarkupStripper::new()?,
        })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn display_text(&self, message: &ChatMessage) -> String {
        match message.sender {
            Sender::User => message.text.clone(),
            Sender::Assistant => self.stripper.strip(&message.text),
        }
    }

    /// Edit the input line. Returns the trimmed query when Enter submits it.
    /// Nothing is sent while a reply is pending.
    pub fn handle_key(&mut self, e: &KeyEvent, loading: bool) -> Option<String> {
        match e.key {
            Key::Char(c) if !e.ctrl => {
                self.input.push(c);
                None
            }
            Key::Backspace => {
                self.input.pop();
                None
            }
            Key::Escape | Key::Tab => {
                self.focused = false;
                None
            }
            Key::Enter => {
                let query = self.input.trim();
                if loading || query.is_empty() {
                    return None;
                }
                let query = query.to_string();
                self.input.clear();
                Some(query)
            }
            _ => None,
        }
    }

    pub fn render(
        &self,
        renderer: &dyn Renderer,
        area: Bounds,
        messages: &[ChatMessage],
        loading: bool,
        current_text: &str,
        strings: &UiStrings,
    ) {
        draw_card(renderer, area);
        let x = area.min_x + PAD;
        let w = area.width - PAD * 2.0;
        let highlight = Color::from_hex(config::HIGHLIGHT, 1.0);
        let secondary = Color::from_hex(config::TEXT_SECONDARY, 1.0);

        let top = area.min_y + 12.0;
        renderer.draw_text(x, top, &strings.chat.title, 15.0, highlight);
        if !messages.is_empty() {
            let label = &strings.node.export;
            let hw = renderer.text_width(&format!("[F5] {label}"), 12.0) + 16.0;
            draw_hint(renderer, x + w - hw, top - 4.0, "F5", label, false);
        }

        let context = format!("{} \"{}\"", strings.chat.context_label, context_snippet(current_text));
        let context = truncate_to_width(renderer, &context, 12.0, w);
        renderer.draw_text(x, top + 24.0, &context, 12.0, secondary);

        let input_h = 32.0;
        let input_y = area.min_y + area.height - input_h - 10.0;
        let list_top = top + 46.0;
        self.render_messages(renderer, x, w, list_top, input_y - 8.0, messages, loading, strings);
        self.render_input(renderer, x, input_y, w, input_h, loading, strings);
    }

    /// Lay out from the newest message upwards until the space is used.
    #[allow(clippy::too_many_arguments)]
    fn render_messages(
        &self,
        renderer: &dyn Renderer,
        x: f64,
        w: f64,
        top: f64,
        bottom: f64,
        messages: &[ChatMessage],
        loading: bool,
        strings: &UiStrings,
    ) {
        let line_h = TEXT_SIZE * 1.35;
        let bubble_w = w * 0.8;
        let mut y = bottom;

        if loading {
            y -= 26.0;
            let text = format!("{}  {}", strings.chat.ai, strings.chat.typing);
            renderer.draw_text(x, y + 4.0, &text, 12.0, Color::from_hex(config::HIGHLIGHT, 0.7));
        }
        if messages.is_empty() && !loading {
            renderer.draw_text(x, top + 8.0, &strings.chat.placeholder, TEXT_SIZE, Color::from_hex(config::TEXT_SECONDARY, 0.6));
            return;
        }

        renderer.push_clip(x, top, w, bottom - top);
        for message in messages.iter().rev() {
            if y <= top {
                break;
            }
            let lines = wrap_text(renderer, &self.display_text(message), TEXT_SIZE, bubble_w - 20.0);
            let h = 22.0 + lines.len() as f64 * line_h + 8.0;
            y -= h + 6.0;
            let (bx, fill, sender) = match message.sender {
                Sender::User => (x + w - bubble_w, Color::from_hex(config::ACCENT, 1.0), &strings.chat.user),
                Sender::Assistant => (x, Color::from_hex(config::NEUTRAL_NODE, 1.0), &strings.chat.ai),
            };
            renderer.fill_rounded_rect(bx, y, bubble_w, h, 10.0, fill);
            let header = format!("{}  {}", sender.to_uppercase(), message.timestamp.format("%H:%M"));
            renderer.draw_text(bx + 10.0, y + 6.0, &header, 10.0, Color::from_hex(config::TEXT_PRIMARY, 0.7));
            let mut ly = y + 22.0;
            for line in &lines {
                renderer.draw_text(bx + 10.0, ly, line, TEXT_SIZE, Color::from_hex(config::TEXT_PRIMARY, 1.0));
                ly += line_h;
            }
        }
        renderer.pop_clip();
    }

    #[allow(clippy::too_many_arguments)]
    fn render_input(&self, renderer: &dyn Renderer, x: f64, y: f64, w: f64, h: f64, loading: bool, strings: &UiStrings) {
        let border = if self.focused {
            Color::from_hex(config::HIGHLIGHT, 1.0)
        } else {
            Color::from_hex(config::PANEL_BORDER, 1.0)
        };
        renderer.fill_rounded_rect(x, y, w, h, 8.0, Color::from_hex(config::BG_COLOR, 1.0));
        renderer.stroke_rounded_rect(x, y, w, h, 8.0, border, 1.0);

        let ty = y + (h - TEXT_SIZE) / 2.0 - 1.0;
        if self.input.is_empty() && !self.focused {
            let hint = format!("[Tab] {}", strings.chat.placeholder);
            let hint = truncate_to_width(renderer, &hint, TEXT_SIZE, w - 20.0);
            renderer.draw_text(x + 10.0, ty, &hint, TEXT_SIZE, Color::from_hex(config::TEXT_SECONDARY, 1.0));
            return;
        }
        let shown = if self.focused && !loading {
            format!("{}|", self.input)
        } else {
            self.input.clone()
        };
        // Keep the tail of long input visible.
        let mut visible = shown.as_str();
        while !visible.is_empty() && renderer.text_width(visible, TEXT_SIZE) > w - 20.0 {
            let mut chars = visible.chars();
            chars.next();
            visible = chars.as_str();
        }
        renderer.draw_text(x + 10.0, ty, visible, TEXT_SIZE, Color::from_hex(config::TEXT_PRIMARY, 1.0));
    }
}

/// First hundred characters of the node text, with "..." when cut.
pub fn context_snippet(text: &str) -> String {
    if text.chars().count() > CONTEXT_CHARS {
        let head: String = text.chars().take(CONTEXT_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

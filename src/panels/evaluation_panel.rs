//! Overlay for the current node: prompt, details, graded slider and the
//! actions that move through the tree.

use crate::core::config;
use crate::core::navigation::Action;
use crate::core::strings::UiStrings;
use crate::core::tree::NodeDefinition;
use crate::core::types::{Bounds, Color, Key, KeyEvent};
use crate::graph::style::value_rgb;
use crate::platform::renderer::Renderer;

use super::{draw_card, draw_hint, draw_wrapped, PAD};

/// Navigation action for answering `node` with the current slider.
/// Graded nodes branch on the value; the rest follow their single exit.
pub fn answer_action(node: &NodeDefinition, slider: u8) -> Action {
    if node.kind.is_graded() {
        Action::AdvanceWithValue {
            target: node.resolve(slider).map(str::to_string),
            value: slider,
        }
    } else {
        Action::AdvanceDirect {
            target: node.next().map(str::to_string),
        }
    }
}

pub struct EvaluationPanel {
    slider: u8,
    details_visible: bool,
    shown_node: Option<String>,
}

impl EvaluationPanel {
    pub fn new() -> Self {
        Self {
            slider: config::SLIDER_DEFAULT,
            details_visible: false,
            shown_node: None,
        }
    }

    pub fn slider(&self) -> u8 {
        self.slider
    }

    pub fn details_visible(&self) -> bool {
        self.details_visible
    }

    /// Reset the slider and the details toggle whenever a different node is presented.
    pub fn sync(&mut self, current_id: &str) {
        if self.shown_node.as_deref() != Some(current_id) {
            self.shown_node = Some(current_id.to_string());
            self.slider = config::SLIDER_DEFAULT;
            self.details_visible = false;
        }
    }

    /// Keys handled while the overlay is open.
    pub fn handle_key(&mut self, e: &KeyEvent, node: &NodeDefinition) -> Option<Action> {
        match e.key {
            Key::Left if node.kind.is_graded() => {
                self.slider = self
                    .slider
                    .saturating_sub(config::SLIDER_STEP)
                    .max(config::VALUE_MIN);
                None
            }
            Key::Right if node.kind.is_graded() => {
                self.slider = self
                    .slider
                    .saturating_add(config::SLIDER_STEP)
                    .min(config::VALUE_MAX);
                None
            }
            Key::Char('d') | Key::Char('D') => {
                if node.detail.is_some() {
                    self.details_visible = !self.details_visible;
                }
                None
            }
            Key::Enter => Some(answer_action(node, self.slider)),
            Key::Escape => Some(Action::Dismiss),
            _ => None,
        }
    }

    pub fn render(
        &self,
        renderer: &dyn Renderer,
        area: Bounds,
        node: &NodeDefinition,
        strings: &UiStrings,
        can_go_back: bool,
    ) {
        draw_card(renderer, area);
        let x = area.min_x + PAD;
        let max_w = area.width - PAD * 2.0;
        let primary = Color::from_hex(config::TEXT_PRIMARY, 1.0);
        let secondary = Color::from_hex(config::TEXT_SECONDARY, 1.0);
        let highlight = Color::from_hex(config::HIGHLIGHT, 1.0);
        let mut y = area.min_y + PAD;

        let header = format!("{}  |  {}", strings.kind_label(node.kind), node.id);
        renderer.draw_text(x, y, &header, 12.0, highlight);
        y += 24.0;
        y = draw_wrapped(renderer, x, y, max_w, &node.prompt, 17.0, primary) + 6.0;

        if let Some(detail) = &node.detail {
            let label = if self.details_visible {
                &strings.node.hide_details
            } else {
                &strings.node.show_details
            };
            renderer.draw_text(x, y, &format!("[d] {label}"), 12.0, secondary);
            y += 20.0;
            if self.details_visible {
                y = draw_wrapped(renderer, x, y, max_w, detail, 13.0, secondary) + 6.0;
            }
        }

        if node.kind.is_graded() {
            y = self.render_slider(renderer, x, y + 8.0, max_w, strings);
        } else if node.is_terminal() {
            y = draw_wrapped(renderer, x, y + 4.0, max_w, &strings.node.end_node_message, 13.0, highlight);
        }

        let mut hx = x;
        let hy = (y + 12.0).min(area.min_y + area.height - 36.0);
        hx += draw_hint(renderer, hx, hy, "Enter", &strings.node.submit, true) + 8.0;
        if can_go_back {
            hx += draw_hint(renderer, hx, hy, "Backspace", &strings.node.back, false) + 8.0;
        }
        hx += draw_hint(renderer, hx, hy, "n", &strings.node.restart, false) + 8.0;
        draw_hint(renderer, hx, hy, "Esc", "x", false);
    }

    fn render_slider(&self, renderer: &dyn Renderer, x: f64, y: f64, w: f64, strings: &UiStrings) -> f64 {
        let secondary = Color::from_hex(config::TEXT_SECONDARY, 1.0);
        let value_color = value_rgb(self.slider).to_color(1.0);

        renderer.draw_text(x, y, &strings.node.no, 12.0, Color::from_hex(config::DANGER, 1.0));
        let yes_w = renderer.text_width(&strings.node.yes, 12.0);
        renderer.draw_text(
            x + w - yes_w,
            y,
            &strings.node.yes,
            12.0,
            Color::from_hex(config::VALUE_POSITIVE, 1.0),
        );

        let track_y = y + 24.0;
        renderer.fill_rounded_rect(x, track_y, w, 6.0, 3.0, Color::from_hex(config::NEUTRAL_NODE, 1.0));
        let fill_w = w * self.slider as f64 / config::VALUE_MAX as f64;
        renderer.fill_rounded_rect(x, track_y, fill_w, 6.0, 3.0, value_color);
        renderer.fill_circle(x + fill_w, track_y + 3.0, 9.0, value_color);

        let ranking = strings.ranking(self.slider);
        let label = format!("{}%  {}", self.slider, ranking.label);
        renderer.draw_text(x, track_y + 18.0, &label, 14.0, value_color);
        draw_wrapped(renderer, x, track_y + 40.0, w, &ranking.desc, 12.0, secondary)
    }
}

impl Default for EvaluationPanel {
    fn default() -> Self {
        Self::new()
    }
}

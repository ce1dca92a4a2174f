//! Sidebar with the recorded path, the export hints and the node legend.

use crate::core::config;
use crate::core::navigation::HistoryStep;
use crate::core::strings::UiStrings;
use crate::core::tree::NodeKind;
use crate::core::types::{Bounds, Color};
use crate::graph::graph_node::kind_glyph;
use crate::graph::style::value_rgb;
use crate::platform::renderer::Renderer;

use super::{draw_card, draw_hint, truncate_to_width, PAD};

const ROW_H: f64 = 30.0;

fn legend_color(kind: NodeKind) -> u32 {
    match kind {
        NodeKind::Question | NodeKind::Reassessment => config::HIGHLIGHT,
        NodeKind::Alert => config::DANGER,
        NodeKind::Intervention => 0x38BDF8,
        NodeKind::Outcome => config::VALUE_UNCERTAIN,
    }
}

pub struct PathPanel;

impl PathPanel {
    pub fn render(renderer: &dyn Renderer, area: Bounds, history: &[HistoryStep], strings: &UiStrings) {
        draw_card(renderer, area);
        let x = area.min_x + PAD;
        let w = area.width - PAD * 2.0;
        let mut y = area.min_y + PAD;

        renderer.draw_text(x, y, &strings.path.summary, 15.0, Color::from_hex(config::HIGHLIGHT, 1.0));
        y += 28.0;

        let legend_h = 150.0;
        let hints_h = 80.0;
        let list_bottom = area.min_y + area.height - legend_h - hints_h;
        y = Self::render_steps(renderer, x, y, w, list_bottom, history, strings);

        let hy = y.max(list_bottom) + 8.0;
        // Summary is only offered once a step is recorded.
        draw_hint(renderer, x, hy, "F4", &strings.path.view_summary_button, !history.is_empty());
        let mut hx = x;
        hx += draw_hint(renderer, hx, hy + 30.0, "F2", &strings.node.export, false) + 6.0;
        hx += draw_hint(renderer, hx, hy + 30.0, "F3", &strings.legend.export_png, false) + 6.0;
        draw_hint(renderer, hx, hy + 30.0, "F5", &strings.chat.title, false);

        Self::render_legend(renderer, x, area.min_y + area.height - legend_h, w, strings);
    }

    /// Newest steps win when the list overflows.
    fn render_steps(
        renderer: &dyn Renderer,
        x: f64,
        y: f64,
        w: f64,
        bottom: f64,
        history: &[HistoryStep],
        strings: &UiStrings,
    ) -> f64 {
        if history.is_empty() {
            renderer.draw_text(x, y, &strings.path.empty, 13.0, Color::from_hex(config::TEXT_SECONDARY, 1.0));
            return y + ROW_H;
        }
        let capacity = (((bottom - y) / ROW_H).floor().max(1.0)) as usize;
        let skip = history.len().saturating_sub(capacity);
        let mut y = y;
        for step in &history[skip..] {
            renderer.fill_rounded_rect(x, y, w, ROW_H - 4.0, 8.0, Color::from_hex(config::NEUTRAL_FILL, 0.5));
            let score_w = match step.answer_value {
                Some(v) => {
                    let text = format!("{v}%");
                    let tw = renderer.text_width(&text, 13.0);
                    renderer.draw_text(x + w - tw - 8.0, y + 6.0, &text, 13.0, value_rgb(v).to_color(1.0));
                    tw + 16.0
                }
                None => 8.0,
            };
            let label = truncate_to_width(renderer, &step.node_text, 13.0, w - score_w - 8.0);
            renderer.draw_text(x + 8.0, y + 6.0, &label, 13.0, Color::from_hex(config::TEXT_PRIMARY, 1.0));
            y += ROW_H;
        }
        y
    }

    fn render_legend(renderer: &dyn Renderer, x: f64, y: f64, w: f64, strings: &UiStrings) {
        renderer.draw_text(x, y, &strings.legend.title, 13.0, Color::from_hex(config::TEXT_PRIMARY, 1.0));
        let items = [
            (NodeKind::Question, &strings.legend.question),
            (NodeKind::Alert, &strings.legend.alert),
            (NodeKind::Intervention, &strings.legend.intervention),
            (NodeKind::Outcome, &strings.legend.outcome),
        ];
        let mut row_y = y + 24.0;
        for (kind, label) in items {
            let color = Color::from_hex(legend_color(kind), 1.0);
            renderer.fill_rounded_rect(x, row_y, 24.0, 24.0, 6.0, Color::from_hex(legend_color(kind), 0.25));
            renderer.stroke_rounded_rect(x, row_y, 24.0, 24.0, 6.0, color, 1.0);
            let glyph = kind_glyph(kind);
            let gw = renderer.text_width(glyph, 14.0);
            renderer.draw_text(x + 12.0 - gw / 2.0, row_y + 4.0, glyph, 14.0, color);
            let text = truncate_to_width(renderer, label, 12.0, w - 34.0);
            renderer.draw_text(x + 34.0, row_y + 5.0, &text, 12.0, color);
            row_y += 30.0;
        }
    }
}

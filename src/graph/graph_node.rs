//! Node rendering: rounded body, progress ring, start halo and callout.

use crate::core::config;
use crate::core::tree::NodeKind;
use crate::core::types::*;
use crate::graph::animation::lerp;
use crate::graph::projection::VisualNode;
use crate::platform::renderer::Renderer;

const CALLOUT_W: f64 = 120.0;
const CALLOUT_H: f64 = 30.0;

pub struct GraphNodeRenderer;

impl GraphNodeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render one node. `halo_phase` animates the start halo; `None` draws it at rest.
    pub fn render(
        &self,
        renderer: &dyn Renderer,
        node: &VisualNode,
        hover_t: f64,
        halo_phase: Option<f64>,
        callout: &str,
    ) {
        let c = node.center;
        let r = node.radius();
        let highlight = Color::from_hex(config::HIGHLIGHT, 1.0);

        if node.start_affordance {
            let base = r + config::HALO_GROW;
            let (radius, alpha) = match halo_phase {
                Some(t) => (lerp(base, base * 1.6, t), lerp(0.6, 0.0, t)),
                None => (base, 0.35),
            };
            renderer.stroke_circle(c.x, c.y, radius, highlight.with_alpha(alpha), 2.0);
        }

        if node.is_active {
            renderer.draw_shadow(
                c.x - r,
                c.y - r,
                node.size,
                node.size,
                config::NODE_CORNER_RADIUS,
                highlight.with_alpha(0.8),
                10.0,
            );
        }

        if let Some(ring) = &node.ring {
            let (start, end) = ring.arc_angles();
            renderer.stroke_arc(
                c.x,
                c.y,
                ring.radius,
                start,
                end,
                node.style.progress.to_color(1.0),
                config::RING_WIDTH,
            );
        }

        renderer.fill_rounded_rect(
            c.x - r,
            c.y - r,
            node.size,
            node.size,
            config::NODE_CORNER_RADIUS,
            node.style.fill,
        );
        renderer.stroke_rounded_rect(
            c.x - r,
            c.y - r,
            node.size,
            node.size,
            config::NODE_CORNER_RADIUS,
            node.stroke.to_color(1.0),
            2.0 + hover_t,
        );

        let glyph = kind_glyph(node.kind);
        let glyph_size = 16.0;
        let gw = renderer.text_width(glyph, glyph_size);
        renderer.draw_text(
            c.x - gw / 2.0,
            c.y - glyph_size * 0.6,
            glyph,
            glyph_size,
            Color::from_hex(config::TEXT_PRIMARY, 1.0),
        );

        let label_size = 11.0;
        let lw = renderer.text_width(&node.id, label_size);
        let label_color = if node.is_active {
            highlight
        } else {
            Color::from_hex(config::TEXT_SECONDARY, 1.0)
        };
        renderer.draw_text(c.x - lw / 2.0, c.y + r + 8.0, &node.id, label_size, label_color);

        if node.start_affordance {
            let x = c.x + 25.0;
            let y = c.y - 45.0;
            renderer.fill_rounded_rect(
                x,
                y,
                CALLOUT_W,
                CALLOUT_H,
                8.0,
                Color::from_hex(config::ACCENT, 1.0),
            );
            let size = 11.0;
            let tw = renderer.text_width(callout, size);
            renderer.draw_text(
                x + (CALLOUT_W - tw) / 2.0,
                y + (CALLOUT_H - size) / 2.0 - 2.0,
                callout,
                size,
                Color::from_hex(0xFFFFFF, 1.0),
            );
        }
    }
}

impl Default for GraphNodeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Single glyph drawn inside the node body.
pub fn kind_glyph(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Question | NodeKind::Reassessment => "?",
        NodeKind::Alert => "!",
        NodeKind::Intervention => "+",
        NodeKind::Outcome => "#",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::navigation::HistoryStep;
    use crate::core::tree::fixtures::small_tree;
    use crate::graph::projection::project;
    use crate::platform::renderer::recording::{Call, RecordingRenderer};

    #[test]
    fn test_start_node_draws_callout_and_halo() {
        let g = project(&small_tree(), &[], "Q1", "Q1", None);
        let rec = RecordingRenderer::default();
        GraphNodeRenderer::new().render(&rec, g.node("Q1").unwrap(), 0.0, Some(0.0), "Question: Click!");

        assert!(rec.texts().contains(&"Question: Click!".to_string()));
        let calls = rec.calls.borrow();
        // halo at r + 15 for an active (42px) node
        assert!(calls
            .iter()
            .any(|c| matches!(c, Call::Circle { radius, .. } if (*radius - 36.0).abs() < 1e-9)));
        assert!(!calls.iter().any(|c| matches!(c, Call::Arc { .. })));
    }

    #[test]
    fn test_answered_node_draws_ring() {
        let history = vec![HistoryStep {
            node_id: "Q2".into(),
            node_text: "T2".into(),
            node_kind: NodeKind::Question,
            answer_value: Some(50),
        }];
        let g = project(&small_tree(), &history, "O2", "Q1", None);
        let rec = RecordingRenderer::default();
        GraphNodeRenderer::new().render(&rec, g.node("Q2").unwrap(), 0.0, None, "");

        let calls = rec.calls.borrow();
        let arc = calls.iter().find_map(|c| match c {
            Call::Arc { radius, start, end } => Some((*radius, *start, *end)),
            _ => None,
        });
        let (radius, start, end) = arc.unwrap();
        assert!((radius - 22.0).abs() < 1e-9);
        assert!((end - start - std::f64::consts::PI).abs() < 1e-9);
        assert!(!rec.texts().iter().any(|t| t.contains("Click")));
    }
}

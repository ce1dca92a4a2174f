//! Edge rendering: straight connectors colored by the source node's value.

use crate::graph::projection::VisualEdge;
use crate::platform::renderer::Renderer;

pub struct GraphEdgeRenderer;

impl GraphEdgeRenderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, renderer: &dyn Renderer, edge: &VisualEdge) {
        renderer.draw_line(
            edge.from,
            edge.to,
            edge.color.to_color(edge.opacity),
            edge.width,
        );
    }
}

impl Default for GraphEdgeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Rgb, Vec2};
    use crate::platform::renderer::recording::{Call, RecordingRenderer};

    #[test]
    fn test_edge_uses_projected_style() {
        let edge = VisualEdge {
            from_id: "A".into(),
            to_id: "B".into(),
            from: Vec2::new(0.0, 0.0),
            to: Vec2::new(10.0, 0.0),
            visited: true,
            color: Rgb::new(255, 0, 0),
            width: 4.0,
            opacity: 0.7,
        };
        let rec = RecordingRenderer::default();
        GraphEdgeRenderer::new().render(&rec, &edge);
        match &rec.calls.borrow()[0] {
            Call::Line { color, width, .. } => {
                assert_eq!(*width, 4.0);
                assert_eq!(color.a, 0.7);
                assert_eq!(color.r, 1.0);
            }
            other => panic!("unexpected call {other:?}"),
        };
    }
}

//! Interactive graph canvas: camera, hover, click-to-select and rendering.

use std::collections::HashMap;

use crate::core::config;
use crate::core::types::*;
use crate::graph::animation::{smooth_towards, Pulse};
use crate::graph::graph_edge::GraphEdgeRenderer;
use crate::graph::graph_node::GraphNodeRenderer;
use crate::graph::projection::VisualGraph;
use crate::graph::viewport::Viewport;
use crate::panels::wrap_text;
use crate::platform::renderer::Renderer;

const TOOLTIP_MAX_W: f64 = 260.0;

pub struct GraphView {
    viewport: Viewport,

    // Primary press position, to tell a click from a pan
    press: Option<Vec2>,

    hovered: Option<String>,
    hover_values: HashMap<String, f64>, // per-node hover animation value (0..1)
    pulse: Pulse,

    node_renderer: GraphNodeRenderer,
    edge_renderer: GraphEdgeRenderer,
}

impl GraphView {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::new(),
            press: None,
            hovered: None,
            hover_values: HashMap::new(),
            pulse: Pulse::new(config::HALO_PULSE_MS),
            node_renderer: GraphNodeRenderer::new(),
            edge_renderer: GraphEdgeRenderer::new(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Pointer input in canvas-local screen coordinates. Returns the id of
    /// a node the user clicked.
    pub fn handle_pointer(&mut self, e: &PointerEvent, graph: &VisualGraph) -> Option<String> {
        match *e {
            PointerEvent::Wheel { delta, .. } => {
                self.viewport.wheel(delta);
                None
            }
            PointerEvent::Down { pos, button } => {
                if matches!(button, PointerButton::Primary | PointerButton::Middle) {
                    self.viewport.begin_drag(pos);
                }
                if button == PointerButton::Primary {
                    self.press = Some(pos);
                }
                None
            }
            PointerEvent::Move { pos, .. } => {
                self.viewport.drag_to(pos);
                if !self.viewport.is_dragging() {
                    self.hovered = self.hit_test(graph, pos);
                }
                None
            }
            PointerEvent::Up { pos, button } => {
                self.viewport.end_drag();
                if button != PointerButton::Primary {
                    return None;
                }
                let press = self.press.take()?;
                if (pos - press).length() > config::CLICK_SLOP {
                    return None;
                }
                self.hit_test(graph, pos)
            }
            PointerEvent::Leave => {
                self.viewport.end_drag();
                self.press = None;
                self.hovered = None;
                None
            }
        }
    }

    /// Topmost node under a canvas-local screen point.
    pub fn hit_test(&self, graph: &VisualGraph, screen: Vec2) -> Option<String> {
        let p = self.viewport.screen_to_graph(screen);
        graph
            .nodes
            .iter()
            .rev()
            .find(|n| n.contains(p))
            .map(|n| n.id.clone())
    }

    pub fn fit(&mut self, graph: &VisualGraph, view_w: f64, view_h: f64) {
        self.viewport.fit(graph.bounds, view_w, view_h);
    }

    pub fn update(&mut self, dt_ms: f64, graph: &VisualGraph) {
        self.pulse.update(dt_ms);
        for node in &graph.nodes {
            let target = if self.hovered.as_deref() == Some(node.id.as_str()) {
                1.0
            } else {
                0.0
            };
            let v = self.hover_values.entry(node.id.clone()).or_insert(0.0);
            *v = smooth_towards(*v, target, dt_ms, config::HOVER_SMOOTHING);
        }
    }

    /// Draw into the canvas rectangle `area` (screen coordinates).
    pub fn render(&self, renderer: &dyn Renderer, graph: &VisualGraph, area: Bounds, callout: &str) {
        renderer.push_clip(area.min_x, area.min_y, area.width, area.height);
        renderer.fill_rect(
            area.min_x,
            area.min_y,
            area.width,
            area.height,
            Color::from_hex(config::BG_COLOR, 1.0),
        );
        let origin = Vec2::new(area.min_x, area.min_y) + self.viewport.offset;
        renderer.push_transform(origin, self.viewport.zoom);

        for edge in &graph.edges {
            self.edge_renderer.render(renderer, edge);
        }
        let phase = self.pulse.progress();
        for node in &graph.nodes {
            let hover_t = self.hover_values.get(&node.id).copied().unwrap_or(0.0);
            self.node_renderer
                .render(renderer, node, hover_t, Some(phase), callout);
        }

        renderer.pop_transform();
        self.render_tooltip(renderer, graph, area);
        renderer.pop_clip();
    }

    /// Prompt of the hovered node, drawn in screen space beside it.
    fn render_tooltip(&self, renderer: &dyn Renderer, graph: &VisualGraph, area: Bounds) {
        let Some(node) = self.hovered.as_deref().and_then(|id| graph.node(id)) else {
            return;
        };
        let size = 12.0;
        let line_h = size * 1.35;
        let lines = wrap_text(renderer, &node.prompt, size, TOOLTIP_MAX_W);
        let text_w = lines
            .iter()
            .map(|l| renderer.text_width(l, size))
            .fold(0.0, f64::max);
        let w = text_w + 16.0;
        let h = lines.len() as f64 * line_h + 12.0;

        let anchor = self.viewport.graph_to_screen(node.center) + Vec2::new(area.min_x, area.min_y);
        let reach = node.radius() * self.viewport.zoom + 8.0;
        let mut x = anchor.x + reach;
        if x + w > area.min_x + area.width {
            x = anchor.x - reach - w;
        }
        let y = (anchor.y - h / 2.0).max(area.min_y + 4.0);

        renderer.fill_rounded_rect(x, y, w, h, 6.0, Color::from_hex(config::PANEL_BG, 0.95));
        renderer.stroke_rounded_rect(x, y, w, h, 6.0, Color::from_hex(config::HIGHLIGHT, 0.6), 1.0);
        let mut ty = y + 6.0;
        for line in &lines {
            renderer.draw_text(x + 8.0, ty, line, size, Color::from_hex(config::TEXT_PRIMARY, 1.0));
            ty += line_h;
        }
    }

    /// Draw in graph coordinates with no camera and no animation, for export.
    pub fn render_static(renderer: &dyn Renderer, graph: &VisualGraph, callout: &str) {
        let edges = GraphEdgeRenderer::new();
        let nodes = GraphNodeRenderer::new();
        for edge in &graph.edges {
            edges.render(renderer, edge);
        }
        for node in &graph.nodes {
            nodes.render(renderer, node, 0.0, None, callout);
        }
    }
}

impl Default for GraphView {
    fn default() -> Self {
        Self::new()
    }
}

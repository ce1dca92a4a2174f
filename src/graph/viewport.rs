//! Pan and zoom of the graph canvas. Purely presentational: nothing here
//! touches navigation state.

use crate::core::config;
use crate::core::types::{Bounds, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub zoom: f64,
    pub offset: Vec2,
    /// Pointer position minus offset, captured when a drag begins.
    drag_anchor: Option<Vec2>,
}

impl Viewport {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::default(),
            drag_anchor: None,
        }
    }

    pub fn begin_drag(&mut self, pointer: Vec2) {
        self.drag_anchor = Some(pointer - self.offset);
    }

    /// Returns `true` when the offset moved.
    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        match self.drag_anchor {
            Some(anchor) => {
                self.offset = pointer - anchor;
                true
            }
            None => false,
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// One wheel notch. Positive delta zooms out.
    pub fn wheel(&mut self, delta: f64) {
        let factor = if delta > 0.0 {
            config::ZOOM_WHEEL_OUT
        } else {
            config::ZOOM_WHEEL_IN
        };
        self.zoom_by(factor);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(config::ZOOM_BUTTON_IN);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(config::ZOOM_BUTTON_OUT);
    }

    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom = (self.zoom * factor).clamp(config::ZOOM_MIN, config::ZOOM_MAX);
    }

    pub fn screen_to_graph(&self, screen: Vec2) -> Vec2 {
        Vec2 {
            x: (screen.x - self.offset.x) / self.zoom,
            y: (screen.y - self.offset.y) / self.zoom,
        }
    }

    pub fn graph_to_screen(&self, graph: Vec2) -> Vec2 {
        Vec2 {
            x: graph.x * self.zoom + self.offset.x,
            y: graph.y * self.zoom + self.offset.y,
        }
    }

    /// Zoom and center so `bounds` fills a `view_w` x `view_h` area.
    pub fn fit(&mut self, bounds: Bounds, view_w: f64, view_h: f64) {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        self.zoom = (view_w / bounds.width)
            .min(view_h / bounds.height)
            .clamp(config::ZOOM_MIN, config::ZOOM_MAX);
        self.offset = Vec2 {
            x: view_w / 2.0 - (bounds.min_x + bounds.width / 2.0) * self.zoom,
            y: view_h / 2.0 - (bounds.min_y + bounds.height / 2.0) * self.zoom,
        };
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

//! Cairo-based renderer implementation, shared by the window and the PNG export.

use crate::core::types::{Color, Vec2};
use crate::platform::renderer::Renderer;
use cairo::Context;
use std::f64::consts::PI;

const FONT_FACE: &str = "sans-serif";

pub struct RendererCairo {
    cr: Context,
}

impl RendererCairo {
    pub fn new(cr: Context) -> Self {
        Self { cr }
    }

    fn set_color(&self, color: Color) {
        self.cr.set_source_rgba(color.r, color.g, color.b, color.a);
    }

    fn set_font(&self, size: f64) {
        self.cr
            .select_font_face(FONT_FACE, cairo::FontSlant::Normal, cairo::FontWeight::Normal);
        self.cr.set_font_size(size);
    }

    fn rounded_rect_path(&self, x: f64, y: f64, w: f64, h: f64, r: f64) {
        let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
        self.cr.new_path();
        self.cr.arc(x + w - r, y + r, r, -PI / 2.0, 0.0);
        self.cr.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0);
        self.cr.arc(x + r, y + h - r, r, PI / 2.0, PI);
        self.cr.arc(x + r, y + r, r, PI, 3.0 * PI / 2.0);
        self.cr.close_path();
    }
}

impl Renderer for RendererCairo {
    fn begin_frame(&mut self, _width: i32, _height: i32) {
        self.cr.save().ok();
    }

    fn end_frame(&mut self) {
        self.cr.restore().ok();
    }

    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.set_color(color);
        self.cr.rectangle(x, y, w, h);
        self.cr.fill().ok();
    }

    fn fill_rounded_rect(&self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Color) {
        self.set_color(color);
        self.rounded_rect_path(x, y, w, h, radius);
        self.cr.fill().ok();
    }

    fn stroke_rounded_rect(
        &self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        color: Color,
        line_width: f64,
    ) {
        self.set_color(color);
        self.cr.set_line_width(line_width);
        self.rounded_rect_path(x, y, w, h, radius);
        self.cr.stroke().ok();
    }

    fn draw_text(&self, x: f64, y: f64, text: &str, size: f64, color: Color) {
        self.set_color(color);
        self.set_font(size);
        self.cr.move_to(x, y + size);
        self.cr.show_text(text).ok();
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        self.set_font(size);
        match self.cr.text_extents(text) {
            Ok(extents) => extents.x_advance(),
            Err(_) => text.chars().count() as f64 * size * 0.55,
        }
    }

    fn draw_line(&self, from: Vec2, to: Vec2, color: Color, line_width: f64) {
        self.set_color(color);
        self.cr.set_line_width(line_width);
        self.cr.set_line_cap(cairo::LineCap::Round);
        self.cr.new_path();
        self.cr.move_to(from.x, from.y);
        self.cr.line_to(to.x, to.y);
        self.cr.stroke().ok();
    }

    fn fill_circle(&self, cx: f64, cy: f64, radius: f64, color: Color) {
        self.set_color(color);
        self.cr.new_path();
        self.cr.arc(cx, cy, radius, 0.0, 2.0 * PI);
        self.cr.fill().ok();
    }

    fn stroke_circle(&self, cx: f64, cy: f64, radius: f64, color: Color, line_width: f64) {
        self.set_color(color);
        self.cr.set_line_width(line_width);
        self.cr.new_path();
        self.cr.arc(cx, cy, radius, 0.0, 2.0 * PI);
        self.cr.stroke().ok();
    }

    fn stroke_arc(
        &self,
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
        color: Color,
        line_width: f64,
    ) {
        if end <= start {
            return;
        }
        self.set_color(color);
        self.cr.set_line_width(line_width);
        self.cr.set_line_cap(cairo::LineCap::Round);
        self.cr.new_path();
        self.cr.arc(cx, cy, radius, start, end);
        self.cr.stroke().ok();
    }

    fn push_clip(&self, x: f64, y: f64, w: f64, h: f64) {
        self.cr.save().ok();
        self.cr.rectangle(x, y, w, h);
        self.cr.clip();
    }

    fn pop_clip(&self) {
        self.cr.restore().ok();
    }

    fn push_transform(&self, offset: Vec2, scale: f64) {
        self.cr.save().ok();
        self.cr.translate(offset.x, offset.y);
        self.cr.scale(scale, scale);
    }

    fn pop_transform(&self) {
        self.cr.restore().ok();
    }

    fn draw_shadow(
        &self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        color: Color,
        blur: f64,
    ) {
        // Approximate shadow with multiple expanding rounded rects
        let steps = 5;
        for i in 0..steps {
            let expand = blur * (i as f64 + 1.0) / steps as f64;
            let alpha = color.a * (1.0 - i as f64 / steps as f64) * 0.3;
            self.fill_rounded_rect(
                x - expand,
                y - expand,
                w + expand * 2.0,
                h + expand * 2.0,
                radius + expand,
                color.with_alpha(alpha),
            );
        }
    }
}

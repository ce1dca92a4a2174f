//! Abstract rendering interface.

use crate::core::types::{Color, Vec2};

pub trait Renderer {
    fn begin_frame(&mut self, width: i32, height: i32);
    fn end_frame(&mut self);

    // Primitives
    fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, color: Color);
    fn fill_rounded_rect(&self, x: f64, y: f64, w: f64, h: f64, radius: f64, color: Color);
    fn stroke_rounded_rect(
        &self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        color: Color,
        line_width: f64,
    );
    /// `y` is the top of the text box, not the baseline.
    fn draw_text(&self, x: f64, y: f64, text: &str, size: f64, color: Color);
    fn text_width(&self, text: &str, size: f64) -> f64;

    fn draw_line(&self, from: Vec2, to: Vec2, color: Color, line_width: f64);

    // Circles and arcs
    fn fill_circle(&self, cx: f64, cy: f64, radius: f64, color: Color);
    fn stroke_circle(&self, cx: f64, cy: f64, radius: f64, color: Color, line_width: f64);
    /// Clockwise arc from `start` to `end` (radians, 0 = +x axis).
    fn stroke_arc(
        &self,
        cx: f64,
        cy: f64,
        radius: f64,
        start: f64,
        end: f64,
        color: Color,
        line_width: f64,
    );

    // Clipping
    fn push_clip(&self, x: f64, y: f64, w: f64, h: f64);
    fn pop_clip(&self);

    // Transform (camera)
    fn push_transform(&self, offset: Vec2, scale: f64);
    fn pop_transform(&self);

    // Shadow (glow effect)
    fn draw_shadow(
        &self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        radius: f64,
        color: Color,
        blur: f64,
    );
}

#[cfg(test)]
pub(crate) mod recording {
    //! Renderer that records draw calls, for layout tests.

    use std::cell::RefCell;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        Rect { x: f64, y: f64, w: f64, h: f64 },
        Text { x: f64, y: f64, text: String },
        Line { from: Vec2, to: Vec2, color: Color, width: f64 },
        Circle { cx: f64, cy: f64, radius: f64 },
        Arc { radius: f64, start: f64, end: f64 },
        Clip,
        Transform { offset: Vec2, scale: f64 },
        Pop,
    }

    #[derive(Default)]
    pub struct RecordingRenderer {
        pub calls: RefCell<Vec<Call>>,
    }

    impl RecordingRenderer {
        pub fn texts(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| match c {
                    Call::Text { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        fn push(&self, call: Call) {
            self.calls.borrow_mut().push(call);
        }
    }

    impl Renderer for RecordingRenderer {
        fn begin_frame(&mut self, _width: i32, _height: i32) {}
        fn end_frame(&mut self) {}

        fn fill_rect(&self, x: f64, y: f64, w: f64, h: f64, _color: Color) {
            self.push(Call::Rect { x, y, w, h });
        }
        fn fill_rounded_rect(&self, x: f64, y: f64, w: f64, h: f64, _radius: f64, _color: Color) {
            self.push(Call::Rect { x, y, w, h });
        }
        fn stroke_rounded_rect(
            &self,
            x: f64,
            y: f64,
            w: f64,
            h: f64,
            _radius: f64,
            _color: Color,
            _line_width: f64,
        ) {
            self.push(Call::Rect { x, y, w, h });
        }
        fn draw_text(&self, x: f64, y: f64, text: &str, _size: f64, _color: Color) {
            self.push(Call::Text {
                x,
                y,
                text: text.to_string(),
            });
        }
        fn text_width(&self, text: &str, size: f64) -> f64 {
            text.chars().count() as f64 * size * 0.5
        }
        fn draw_line(&self, from: Vec2, to: Vec2, color: Color, line_width: f64) {
            self.push(Call::Line {
                from,
                to,
                color,
                width: line_width,
            });
        }
        fn fill_circle(&self, cx: f64, cy: f64, radius: f64, _color: Color) {
            self.push(Call::Circle { cx, cy, radius });
        }
        fn stroke_circle(&self, cx: f64, cy: f64, radius: f64, _color: Color, _line_width: f64) {
            self.push(Call::Circle { cx, cy, radius });
        }
        fn stroke_arc(
            &self,
            _cx: f64,
            _cy: f64,
            radius: f64,
            start: f64,
            end: f64,
            _color: Color,
            _line_width: f64,
        ) {
            self.push(Call::Arc { radius, start, end });
        }
        fn push_clip(&self, _x: f64, _y: f64, _w: f64, _h: f64) {
            self.push(Call::Clip);
        }
        fn pop_clip(&self) {
            self.push(Call::Pop);
        }
        fn push_transform(&self, offset: Vec2, scale: f64) {
            self.push(Call::Transform { offset, scale });
        }
        fn pop_transform(&self) {
            self.push(Call::Pop);
        }
        fn draw_shadow(
            &self,
            _x: f64,
            _y: f64,
            _w: f64,
            _h: f64,
            _radius: f64,
            _color: Color,
            _blur: f64,
        ) {
        }
    }
}

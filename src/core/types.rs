//! Common geometry, colour and input types shared by the graph, panels and platform layers.

use serde::Deserialize;

/// 2D coordinate vector in logical canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self {
            x: self.x * s,
            y: self.y * s,
        }
    }
}

/// 8-bit RGB triple, used where channel values must be reproduced exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Channel-wise `round(a + (b - a) * ratio)`.
    pub fn lerp(self, other: Rgb, ratio: f64) -> Rgb {
        let mix = |a: u8, b: u8| -> u8 {
            let a = a as f64;
            let b = b as f64;
            (a + (b - a) * ratio).round().clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    pub fn to_color(self, alpha: f64) -> Color {
        Color {
            r: self.r as f64 / 255.0,
            g: self.g as f64 / 255.0,
            b: self.b as f64 / 255.0,
            a: alpha,
        }
    }
}

/// RGBA color with floating point channels, as consumed by the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn from_hex(hex: u32, alpha: f64) -> Self {
        Rgb::from_hex(hex).to_color(alpha)
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { a: alpha, ..self }
    }
}

/// Axis-aligned rectangle in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x
            && p.x <= self.min_x + self.width
            && p.y >= self.min_y
            && p.y <= self.min_y + self.height
    }
}

/// Pointer buttons the shell cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// Pointer input, already decoded from the windowing system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Vec2, button: PointerButton },
    Up { pos: Vec2, button: PointerButton },
    Move { pos: Vec2, dragging: bool },
    /// One discrete wheel notch; positive `delta` scrolls down (zoom out).
    Wheel { pos: Vec2, delta: f64 },
    Leave,
}

/// Keys with a meaning in the shell. Printable input arrives as `Char`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Enter,
    Backspace,
    Escape,
    Tab,
    F(u8),
    Char(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
}

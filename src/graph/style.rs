//! Value-driven node styling: the red/grey/teal heat gradient and the progress ring.

use std::f64::consts::PI;

use crate::core::config;
use crate::core::types::{Color, Rgb};

/// Fill, stroke and ring colors for one node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: Color,
    pub stroke: Rgb,
    pub progress: Rgb,
}

/// Two-segment gradient: negative -> uncertain over [0, 50), uncertain -> positive over [50, 100].
pub fn value_rgb(value: u8) -> Rgb {
    let negative = Rgb::from_hex(config::VALUE_NEGATIVE);
    let uncertain = Rgb::from_hex(config::VALUE_UNCERTAIN);
    let positive = Rgb::from_hex(config::VALUE_POSITIVE);

    let v = value.min(config::VALUE_MAX) as f64;
    let mid = config::YES_THRESHOLD as f64;
    if v < mid {
        negative.lerp(uncertain, v / mid)
    } else {
        uncertain.lerp(positive, (v - mid) / (config::VALUE_MAX as f64 - mid))
    }
}

pub fn node_style(value: Option<u8>) -> NodeStyle {
    match value {
        None => {
            let neutral = Rgb::from_hex(config::NEUTRAL_NODE);
            NodeStyle {
                fill: Color::from_hex(config::NEUTRAL_FILL, config::NEUTRAL_FILL_ALPHA),
                stroke: neutral,
                progress: neutral,
            }
        }
        Some(v) => {
            let color = value_rgb(v);
            NodeStyle {
                fill: color.to_color(config::FILL_ALPHA_BYTE as f64 / 255.0),
                stroke: color,
                progress: color,
            }
        }
    }
}

/// Stroke-dash arc around a node; the filled fraction equals `value / 100`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressRing {
    pub radius: f64,
    pub circumference: f64,
    pub dash_offset: f64,
    /// The arc starts at the top of the node.
    pub rotation_deg: f64,
}

impl ProgressRing {
    pub fn new(node_radius: f64, value: u8) -> Self {
        let radius = node_radius + config::RING_GAP;
        let circumference = 2.0 * PI * radius;
        let fraction = value.min(config::VALUE_MAX) as f64 / 100.0;
        Self {
            radius,
            circumference,
            dash_offset: circumference - fraction * circumference,
            rotation_deg: -90.0,
        }
    }

    pub fn filled_fraction(&self) -> f64 {
        if self.circumference <= 0.0 {
            return 0.0;
        }
        (self.circumference - self.dash_offset) / self.circumference
    }

    /// Start and end angles (radians) of the visible arc.
    pub fn arc_angles(&self) -> (f64, f64) {
        let start = self.rotation_deg.to_radians();
        (start, start + 2.0 * PI * self.filled_fraction())
    }
}

/// No value means no ring.
pub fn progress_ring(node_radius: f64, value: Option<u8>) -> Option<ProgressRing> {
    value.map(|v| ProgressRing::new(node_radius, v))
}

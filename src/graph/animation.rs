//! Animation utilities: the looping start-node pulse and hover smoothing.

/// Repeating 0..1 phase, used for the "ping" halo around the start node.
#[derive(Debug, Clone)]
pub struct Pulse {
    elapsed: f64,
    period: f64,
}

impl Pulse {
    pub fn new(period_ms: f64) -> Self {
        Self {
            elapsed: 0.0,
            period: period_ms,
        }
    }

    pub fn update(&mut self, dt_ms: f64) {
        if self.period <= 0.0 {
            return;
        }
        self.elapsed = (self.elapsed + dt_ms) % self.period;
    }

    /// Eased phase within the current cycle.
    pub fn progress(&self) -> f64 {
        if self.period <= 0.0 {
            return 1.0;
        }
        ease_out((self.elapsed / self.period).clamp(0.0, 1.0))
    }
}

/// Ease-out cubic: 1 - (1 - t)^3
pub fn ease_out(t: f64) -> f64 {
    let inv = 1.0 - t;
    1.0 - inv * inv * inv
}

/// Linear interpolation between two values.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Smooth interpolation for hover effects (approaches target over time).
pub fn smooth_towards(current: f64, target: f64, dt_ms: f64, speed: f64) -> f64 {
    let factor = 1.0 - (-speed * dt_ms / 1000.0).exp();
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_wraps() {
        let mut p = Pulse::new(1000.0);
        p.update(250.0);
        let quarter = p.progress();
        assert!(quarter > 0.25 && quarter < 1.0);
        p.update(1000.0);
        assert!((p.progress() - quarter).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_towards_converges() {
        let mut v = 0.0;
        for _ in 0..120 {
            v = smooth_towards(v, 1.0, 16.0, 12.0);
        }
        assert!(v > 0.99 && v <= 1.0);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}

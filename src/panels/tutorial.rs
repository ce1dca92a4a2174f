//! Modal onboarding walkthrough.

use crate::core::config;
use crate::core::strings::TutorialStrings;
use crate::core::types::{Bounds, Color, Key, KeyEvent};
use crate::platform::renderer::Renderer;

use super::{draw_card, draw_hint, draw_wrapped};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialOutcome {
    /// Walked through to the last step.
    Finished,
    Skipped,
}

pub struct TutorialOverlay {
    step: usize,
    open: bool,
}

impl TutorialOverlay {
    pub fn new() -> Self {
        Self { step: 0, open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn open(&mut self) {
        self.step = 0;
        self.open = true;
    }

    /// Consumes every key while open; returns how it was closed, if it was.
    pub fn handle_key(&mut self, e: &KeyEvent, step_count: usize) -> Option<TutorialOutcome> {
        if !self.open {
            return None;
        }
        match e.key {
            Key::Right | Key::Enter => {
                if self.step + 1 < step_count {
                    self.step += 1;
                    None
                } else {
                    self.open = false;
                    Some(TutorialOutcome::Finished)
                }
            }
            Key::Left => {
                self.step = self.step.saturating_sub(1);
                None
            }
            Key::Escape => {
                self.open = false;
                Some(TutorialOutcome::Skipped)
            }
            _ => None,
        }
    }

    pub fn render(&self, renderer: &dyn Renderer, width: f64, height: f64, strings: &TutorialStrings) {
        if !self.open {
            return;
        }
        let Some(step) = strings.steps.get(self.step) else {
            return;
        };
        renderer.fill_rect(0.0, 0.0, width, height, Color::from_hex(0x000000, 0.6));

        let card_w = 620.0_f64.min(width - 40.0);
        let card = Bounds {
            min_x: (width - card_w) / 2.0,
            min_y: height / 2.0 - 170.0,
            width: card_w,
            height: 340.0,
        };
        draw_card(renderer, card);
        let x = card.min_x + 28.0;
        let w = card.width - 56.0;
        renderer.draw_text(x, card.min_y + 24.0, &step.title, 22.0, Color::from_hex(config::HIGHLIGHT, 1.0));
        draw_wrapped(
            renderer,
            x,
            card.min_y + 66.0,
            w,
            &step.content,
            14.0,
            Color::from_hex(config::TEXT_PRIMARY, 1.0),
        );

        let dots_y = card.min_y + card.height - 80.0;
        let dots_w = strings.steps.len() as f64 * 40.0;
        let mut dx = card.min_x + (card.width - dots_w) / 2.0;
        for i in 0..strings.steps.len() {
            let c = if i == self.step { config::ACCENT } else { config::NEUTRAL_NODE };
            renderer.fill_rounded_rect(dx + 4.0, dots_y, 32.0, 8.0, 4.0, Color::from_hex(c, 1.0));
            dx += 40.0;
        }

        let hy = card.min_y + card.height - 48.0;
        draw_hint(renderer, x, hy, "Esc", &strings.skip, false);
        let last = self.step + 1 == strings.steps.len();
        let next = if last { &strings.finish } else { &strings.next };
        let next_w = renderer.text_width(&format!("[Enter] {next}"), 12.0) + 16.0;
        let right = card.min_x + card.width - 28.0;
        draw_hint(renderer, right - next_w, hy, "Enter", next, true);
        if self.step > 0 {
            let back_w = renderer.text_width(&format!("[Left] {}", strings.back), 12.0) + 16.0;
            draw_hint(renderer, right - next_w - back_w - 8.0, hy, "Left", &strings.back, false);
        }
    }
}

impl Default for TutorialOverlay {
    fn default() -> Self {
        Self::new()
    }
}

use eframe::egui;

use crate::theme::Theme;

/// One twinkling background star, positioned in viewport fractions so the
/// field survives resizes.
struct Star {
    x: f32,
    y: f32,
    size: f32,
    twinkle_offset: f32,
    twinkle_period: f32,
}

pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    /// Generate a deterministic field so positions are stable across frames
    /// and across runs.
    pub fn new(count: usize, seed: u64) -> Self {
        let mut state = seed.max(1);
        let mut next = move || {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f32 / (1u64 << 53) as f32
        };

        let stars = (0..count)
            .map(|_| Star {
                x: next(),
                y: next(),
                size: 0.5 + next() * 1.8,
                twinkle_offset: next() * 8.0,
                twinkle_period: 4.0 + next() * 6.0,
            })
            .collect();

        Self { stars }
    }

    pub fn draw(&self, ui: &egui::Ui, rect: egui::Rect, time: f64, theme: &Theme, scale: f32) {
        for star in &self.stars {
            let t = (time as f32 + star.twinkle_offset) / star.twinkle_period;
            let twinkle = 0.5 + 0.5 * (t * std::f32::consts::TAU).sin();
            let alpha = 0.12 + 0.48 * twinkle;

            let pos = egui::pos2(
                rect.left() + star.x * rect.width(),
                rect.top() + star.y * rect.height(),
            );
            ui.painter().circle_filled(
                pos,
                star.size * scale.max(0.5),
                Theme::with_opacity(theme.star, alpha),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_is_deterministic() {
        let a = Starfield::new(50, 7);
        let b = Starfield::new(50, 7);
        for (sa, sb) in a.stars.iter().zip(&b.stars) {
            assert_eq!(sa.x, sb.x);
            assert_eq!(sa.y, sb.y);
            assert_eq!(sa.size, sb.size);
        }
    }

    #[test]
    fn test_positions_stay_in_unit_square() {
        let field = Starfield::new(200, 42);
        for star in &field.stars {
            assert!((0.0..=1.0).contains(&star.x));
            assert!((0.0..=1.0).contains(&star.y));
        }
    }
}

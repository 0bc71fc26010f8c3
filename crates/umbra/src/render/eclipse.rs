//! Painter for the eclipse itself: corona glow, sun disc, occluding moon
//! disc, and the totality flare.

use eframe::egui;

use crate::theme::Theme;
use crate::visual::{VisualState, VisualTuning};

const GLOW_LAYERS: usize = 14;

/// Smoothed presentation values for the corona and flare.
///
/// The mapper emits hard target values per window; the web original relied on
/// CSS transitions to soften the switches, so here the displayed values ease
/// toward the targets a fraction of the remaining distance per frame.
pub struct GlowAnim {
    pub opacity: f32,
    pub blur: f32,
    pub scale: f32,
    pub flare: f32,
}

impl GlowAnim {
    pub fn resting(tuning: &VisualTuning) -> Self {
        Self {
            opacity: tuning.glow_opacity_rest as f32,
            blur: tuning.glow_blur_rest as f32,
            scale: 1.0,
            flare: 0.0,
        }
    }

    /// Jump straight to the mapper targets, skipping the easing. Used by the
    /// frame exporter, where there is no previous frame to ease from.
    pub fn snapped(state: &VisualState) -> Self {
        Self {
            opacity: state.glow_opacity as f32,
            blur: state.glow_blur as f32,
            scale: state.glow_scale as f32,
            flare: if state.flare_visible { 1.0 } else { 0.0 },
        }
    }

    /// Ease toward the mapper targets. Returns true while still moving, so
    /// the caller knows to keep repainting after playback pauses.
    pub fn advance(&mut self, state: &VisualState) -> bool {
        let mut moving = false;
        let mut ease = |current: &mut f32, target: f32| {
            let diff = target - *current;
            if diff.abs() < 0.005 {
                *current = target;
            } else {
                *current += diff * 0.15;
                moving = true;
            }
        };

        ease(&mut self.opacity, state.glow_opacity as f32);
        ease(&mut self.blur, state.glow_blur as f32);
        ease(&mut self.scale, state.glow_scale as f32);
        ease(&mut self.flare, if state.flare_visible { 1.0 } else { 0.0 });
        moving
    }
}

/// Draw the full eclipse at `center` with the given disc radius.
pub fn draw(
    ui: &egui::Ui,
    center: egui::Pos2,
    radius: f32,
    state: &VisualState,
    glow: &GlowAnim,
    theme: &Theme,
) {
    draw_corona(ui, center, radius, glow, theme);

    // Sun disc with a soft rim.
    ui.painter()
        .circle_filled(center, radius * 1.06, Theme::with_opacity(theme.sun, 0.18));
    ui.painter().circle_filled(center, radius, theme.sun);

    // Moon disc, offset in percent of its own diameter.
    let offset_px = state.shadow_offset_percent as f32 / 100.0 * (radius * 2.0);
    let moon_center = center + egui::vec2(offset_px, 0.0);
    ui.painter().circle_filled(moon_center, radius, theme.moon);
    ui.painter().circle_stroke(
        moon_center,
        radius,
        egui::Stroke::new(1.0, Theme::with_opacity(theme.foreground, 0.1)),
    );

    draw_flare(ui, center, radius, glow, theme);
}

/// Layered translucent circles standing in for a blurred radial gradient.
fn draw_corona(ui: &egui::Ui, center: egui::Pos2, radius: f32, glow: &GlowAnim, theme: &Theme) {
    if glow.opacity <= 0.01 {
        return;
    }
    let spread = glow.blur / 18.0;
    for i in 0..GLOW_LAYERS {
        let t = i as f32 / (GLOW_LAYERS - 1) as f32;
        let layer_radius = radius * glow.scale * (1.05 + t * spread);
        let falloff = (1.0 - t) * (1.0 - t);
        let alpha = glow.opacity * falloff * 0.22;
        if alpha < 0.004 {
            continue;
        }
        let color = Theme::with_opacity(theme.corona(t * 0.8), alpha);
        ui.painter().circle_filled(center, layer_radius, color);
    }
}

/// The diamond-ring spark on the upper-right rim during totality.
fn draw_flare(ui: &egui::Ui, center: egui::Pos2, radius: f32, glow: &GlowAnim, theme: &Theme) {
    if glow.flare <= 0.01 {
        return;
    }
    let angle = -50.0_f32.to_radians();
    let pos = center + radius * 1.02 * egui::vec2(angle.cos(), angle.sin());

    ui.painter().circle_filled(
        pos,
        radius * 0.10,
        Theme::with_opacity(theme.sun, glow.flare * 0.25),
    );
    ui.painter().circle_filled(
        pos,
        radius * 0.045,
        Theme::with_opacity(theme.sun, glow.flare),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visual::{self, VisualTuning};

    #[test]
    fn test_advance_converges_on_targets() {
        let tuning = VisualTuning::default();
        let mut glow = GlowAnim::resting(&tuning);
        let peak = visual::map_progress(0.5, &tuning);

        for _ in 0..500 {
            if !glow.advance(&peak) {
                break;
            }
        }
        assert_eq!(glow.opacity, peak.glow_opacity as f32);
        assert_eq!(glow.scale, peak.glow_scale as f32);
        assert_eq!(glow.flare, 1.0);
    }

    #[test]
    fn test_advance_settles() {
        let tuning = VisualTuning::default();
        let state = visual::map_progress(0.1, &tuning);
        let mut glow = GlowAnim::snapped(&state);
        assert!(!glow.advance(&state));
    }
}

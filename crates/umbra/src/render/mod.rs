pub mod content;
pub mod eclipse;
pub mod starfield;

/// Uniform scale factor for a viewport relative to the reference design size.
pub fn compute_scale(rect: eframe::egui::Rect) -> f32 {
    let ref_w = 1440.0;
    let ref_h = 900.0;
    (rect.width() / ref_w).min(rect.height() / ref_h)
}

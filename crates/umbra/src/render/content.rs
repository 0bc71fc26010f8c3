//! Phase caption rendering: sentence, feeling keywords, reflective question.

use eframe::egui;

use crate::phase::PhaseStory;
use crate::theme::Theme;

/// Draw one phase's caption stack centered in `rect`, top-aligned.
pub fn draw(
    ui: &egui::Ui,
    rect: egui::Rect,
    story: &PhaseStory,
    theme: &Theme,
    opacity: f32,
    scale: f32,
) {
    if opacity < 0.01 {
        return;
    }

    let max_text_width = (rect.width() * 0.8).min(880.0 * scale);
    let mut y = rect.top();

    // Sentence.
    let sentence_color = Theme::with_opacity(theme.heading_color, opacity * 0.95);
    let sentence_galley = ui.painter().layout(
        story.sentence.clone(),
        egui::FontId::proportional(theme.sentence_size * scale),
        sentence_color,
        max_text_width,
    );
    let sentence_pos = egui::pos2(rect.center().x - sentence_galley.rect.width() / 2.0, y);
    ui.painter().galley(sentence_pos, sentence_galley.clone(), sentence_color);
    y += sentence_galley.rect.height() + 36.0 * scale;

    // Feeling keyword chips.
    let chip_font = egui::FontId::proportional(theme.keyword_size * scale);
    let chip_pad = egui::vec2(22.0 * scale, 10.0 * scale);
    let chip_gap = 14.0 * scale;

    let galleys: Vec<_> = story
        .feelings()
        .map(|f| {
            ui.painter().layout_no_wrap(
                f.to_uppercase(),
                chip_font.clone(),
                Theme::with_opacity(theme.accent, opacity * 0.9),
            )
        })
        .collect();

    if !galleys.is_empty() {
        let total_width: f32 = galleys
            .iter()
            .map(|g| g.rect.width() + chip_pad.x * 2.0)
            .sum::<f32>()
            + chip_gap * (galleys.len() as f32 - 1.0);
        let mut x = rect.center().x - total_width / 2.0;
        let chip_height = galleys[0].rect.height() + chip_pad.y * 2.0;

        for galley in galleys {
            let chip_rect = egui::Rect::from_min_size(
                egui::pos2(x, y),
                egui::vec2(galley.rect.width() + chip_pad.x * 2.0, chip_height),
            );
            let rounding = chip_height / 2.0;
            ui.painter().rect_filled(
                chip_rect,
                rounding,
                Theme::with_opacity(theme.foreground, opacity * 0.05),
            );
            ui.painter().rect_stroke(
                chip_rect,
                rounding,
                egui::Stroke::new(1.0, Theme::with_opacity(theme.accent, opacity * 0.12)),
                egui::StrokeKind::Inside,
            );
            let text_color = Theme::with_opacity(theme.accent, opacity * 0.9);
            ui.painter().galley(
                chip_rect.min + chip_pad,
                galley,
                text_color,
            );
            x = chip_rect.right() + chip_gap;
        }
        y += chip_height + 44.0 * scale;
    }

    // Divider above the reflection.
    let divider_half = 130.0 * scale;
    ui.painter().line_segment(
        [
            egui::pos2(rect.center().x - divider_half, y),
            egui::pos2(rect.center().x + divider_half, y),
        ],
        egui::Stroke::new(1.0, Theme::with_opacity(theme.foreground, opacity * 0.06)),
    );
    y += 28.0 * scale;

    // Reflective question.
    let reflection_color = Theme::with_opacity(theme.muted, opacity * 0.8);
    let reflection_galley = ui.painter().layout(
        story.reflection.clone(),
        egui::FontId::proportional(theme.reflection_size * scale),
        reflection_color,
        max_text_width * 0.6,
    );
    let reflection_pos = egui::pos2(rect.center().x - reflection_galley.rect.width() / 2.0, y);
    ui.painter()
        .galley(reflection_pos, reflection_galley, reflection_color);
}

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::config::Config;
use crate::phase::Storyline;
use crate::render::{self, content};
use crate::render::eclipse::{self, GlowAnim};
use crate::render::starfield::Starfield;
use crate::theme::Theme;
use crate::visual::{self, VisualTuning};

const STAR_COUNT: usize = 120;
const STAR_SEED: u64 = 1977;

struct ExportApp {
    storyline: Storyline,
    theme: Theme,
    tuning: VisualTuning,
    stars: Starfield,
    output_dir: PathBuf,
    frames: usize,
    current_frame: usize,
    screenshot_requested: bool,
    done: bool,
}

impl ExportApp {
    fn new(theme: Theme, output_dir: PathBuf, frames: usize) -> Self {
        Self {
            storyline: Storyline::fallback(),
            theme,
            tuning: VisualTuning::default(),
            stars: Starfield::new(STAR_COUNT, STAR_SEED),
            output_dir,
            frames,
            current_frame: 0,
            screenshot_requested: false,
            done: false,
        }
    }

    fn progress_for(&self, frame: usize) -> f64 {
        frame as f64 / (self.frames - 1) as f64
    }
}

impl eframe::App for ExportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.done {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        // Check for screenshot result from previous frame
        let mut got_screenshot = false;
        ctx.input(|i| {
            for event in &i.events {
                if let egui::Event::Screenshot { image, .. } = event {
                    let filename = format!("frame-{:02}.png", self.current_frame + 1);
                    let path = self.output_dir.join(&filename);
                    save_color_image(image, &path);
                    eprintln!("  Saved {filename}");
                    got_screenshot = true;
                }
            }
        });

        if got_screenshot {
            self.screenshot_requested = false;
            self.current_frame += 1;
            if self.current_frame >= self.frames {
                self.done = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        }

        let bg = self.theme.background;
        let progress = self.progress_for(self.current_frame);

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);

                let scale = render::compute_scale(rect);

                // Deterministic twinkle: derive the clock from the frame.
                self.stars
                    .draw(ui, rect, progress * 40.0, &self.theme, scale);

                let state = visual::map_progress(progress, &self.tuning);
                let glow = GlowAnim::snapped(&state);

                let radius = 105.0 * scale;
                let center = egui::pos2(rect.center().x, rect.top() + rect.height() * 0.36);
                eclipse::draw(ui, center, radius, &state, &glow, &self.theme);

                let content_rect = egui::Rect::from_min_max(
                    egui::pos2(rect.left(), center.y + radius * 2.3),
                    egui::pos2(rect.right(), rect.bottom() - 60.0 * scale),
                );
                content::draw(
                    ui,
                    content_rect,
                    self.storyline.phase(state.phase),
                    &self.theme,
                    1.0,
                    scale,
                );
            });

        // Request screenshot after rendering (will arrive next frame)
        if !self.screenshot_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            self.screenshot_requested = true;
        }

        ctx.request_repaint();
    }
}

fn save_color_image(image: &egui::ColorImage, path: &Path) {
    let width = image.width() as u32;
    let height = image.height() as u32;
    let pixels: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| [c.r(), c.g(), c.b(), c.a()])
        .collect();

    image::save_buffer(path, &pixels, width, height, image::ColorType::Rgba8)
        .unwrap_or_else(|e| eprintln!("Failed to save {}: {e}", path.display()));
}

pub fn run(output_dir: PathBuf, frames: usize, width: u32, height: u32) -> anyhow::Result<()> {
    if frames < 2 {
        anyhow::bail!("Need at least 2 frames to cover the timeline");
    }

    std::fs::create_dir_all(&output_dir)?;

    eprintln!(
        "Exporting {} frames to {} ({}x{})",
        frames,
        output_dir.display(),
        width,
        height,
    );

    let config = Config::load_or_default();
    let theme_name = config
        .defaults
        .as_ref()
        .and_then(|d| d.theme.as_deref())
        .unwrap_or("night");
    let theme = Theme::from_name(theme_name);

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([width as f32, height as f32])
        .with_title("umbra export")
        .with_decorations(false);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let output_dir_clone = output_dir.clone();
    eframe::run_native(
        "umbra export",
        options,
        Box::new(move |_cc| Ok(Box::new(ExportApp::new(theme, output_dir_clone, frames)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    eprintln!("Export complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_span_full_timeline() {
        let app = ExportApp::new(Theme::night(), PathBuf::from("export"), 5);
        assert_eq!(app.progress_for(0), 0.0);
        assert_eq!(app.progress_for(4), 1.0);
        assert_eq!(app.progress_for(2), 0.5);
    }
}

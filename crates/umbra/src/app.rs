use eframe::egui;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::config::{Config, NarrativeConfig, NarrativeMode};
use crate::narrative;
use crate::phase::{Phase, Storyline};
use crate::render::{self, content};
use crate::render::eclipse::{self, GlowAnim};
use crate::render::starfield::Starfield;
use crate::theme::Theme;
use crate::timeline::{Pacing, Timeline};
use crate::visual::{self, VisualTuning};

const CONTENT_FADE_DURATION: f32 = 0.7;
const STAR_COUNT: usize = 120;
const STAR_SEED: u64 = 1977;

const WORDMARK: &str = "UMBRA";
const TAGLINE: &str = "TOTAL SOLAR";
const HINT_TEXT: &str = "DRAG TO WITNESS THE SHIFT";
const LOADING_TEXT: &str = "AWAITING THE ALIGNMENT";
const LOAD_ERROR_TEXT: &str = "The light is still obscured. Please try again.";

/// Where the one-shot storyline fetch currently stands.
enum NarrativeState {
    Idle,
    Pending(mpsc::Receiver<anyhow::Result<Storyline>>),
    /// Blocking mode only: the fetch failed and we are showing the retry
    /// affordance. Background mode falls back silently instead.
    Failed,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

pub struct EclipseApp {
    timeline: Timeline,
    tuning: VisualTuning,
    theme: Theme,
    storyline: Storyline,
    narrative_config: NarrativeConfig,
    narrative_mode: NarrativeMode,
    narrative: NarrativeState,
    glow: GlowAnim,
    stars: Starfield,
    /// Phase currently shown by the caption stack; tracked separately from
    /// the timeline only to timestamp the cross-fade.
    shown_phase: Phase,
    phase_changed_at: Instant,
    show_hud: bool,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    frame_count: u32,
    fps: f32,
    fps_update: Instant,
}

impl EclipseApp {
    fn new(config: &Config, start_phase: Option<Phase>, start_paused: bool, offline: bool) -> Self {
        let theme_name = config
            .defaults
            .as_ref()
            .and_then(|d| d.theme.as_deref())
            .unwrap_or("night");
        let theme = Theme::from_name(theme_name);

        let narrative_config = config.narrative();
        let narrative_mode = if offline {
            NarrativeMode::Off
        } else {
            narrative_config.mode()
        };
        let narrative = match narrative_mode {
            NarrativeMode::Off => NarrativeState::Idle,
            _ => NarrativeState::Pending(narrative::spawn_fetch(narrative_config.clone())),
        };

        let mut timeline = Timeline::new(Pacing::default());
        if let Some(phase) = start_phase {
            timeline.jump_to(phase);
        }
        if start_paused {
            timeline.pause();
        }

        let tuning = VisualTuning::default();
        let now = Instant::now();
        Self {
            shown_phase: timeline.phase(),
            timeline,
            tuning,
            theme,
            storyline: Storyline::fallback(),
            narrative_config,
            narrative_mode,
            narrative,
            glow: GlowAnim::resting(&tuning),
            stars: Starfield::new(STAR_COUNT, STAR_SEED),
            phase_changed_at: now,
            show_hud: false,
            toast: None,
            last_esc: None,
            frame_count: 0,
            fps: 0.0,
            fps_update: now,
        }
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let elapsed = self.fps_update.elapsed().as_secs_f32();
        if elapsed >= 0.5 {
            self.fps = self.frame_count as f32 / elapsed;
            self.frame_count = 0;
            self.fps_update = Instant::now();
        }
    }

    /// Apply the fetch result, if it has arrived. At most one state update
    /// ever comes out of the channel.
    fn poll_narrative(&mut self) {
        let state = std::mem::replace(&mut self.narrative, NarrativeState::Idle);
        self.narrative = match state {
            NarrativeState::Pending(rx) => match rx.try_recv() {
                Ok(Ok(story)) => {
                    self.storyline = story;
                    NarrativeState::Idle
                }
                Ok(Err(e)) => {
                    if self.narrative_mode == NarrativeMode::Blocking {
                        NarrativeState::Failed
                    } else {
                        eprintln!("narrative offline ({e:#}); keeping the built-in storyline");
                        NarrativeState::Idle
                    }
                }
                Err(mpsc::TryRecvError::Empty) => NarrativeState::Pending(rx),
                Err(mpsc::TryRecvError::Disconnected) => NarrativeState::Idle,
            },
            other => other,
        };
    }

    fn retry_narrative(&mut self) {
        self.narrative = NarrativeState::Pending(narrative::spawn_fetch(
            self.narrative_config.clone(),
        ));
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn toggle_playback(&mut self) {
        self.timeline.toggle();
        let message = if self.timeline.is_playing() {
            "Journey resumed"
        } else {
            "Journey paused"
        };
        self.toast = Some(Toast::new(message.to_string()));
    }

    /// Jump to the neighboring phase anchor (pauses, like any phase jump).
    fn jump_relative(&mut self, delta: isize) {
        let index = self.timeline.phase().index() as isize + delta;
        let index = index.clamp(0, Phase::COUNT as isize - 1) as usize;
        self.timeline.jump_to(Phase::ALL[index]);
    }
}

impl eframe::App for EclipseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_fps();
        self.poll_narrative();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();

        ctx.input(|i| {
            // Quit: Q
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            // ESC double-tap to quit
            if i.key_pressed(egui::Key::Escape) {
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < 1.0 {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
                return;
            }

            // Fullscreen toggle: F
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
                return;
            }

            // Theme toggle: D
            if i.key_pressed(egui::Key::D) {
                self.toggle_theme();
                return;
            }

            // Toggle HUD: H
            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
                return;
            }

            // Play / pause: Space
            if i.key_pressed(egui::Key::Space) {
                self.toggle_playback();
            }

            // Phase jumps
            if i.key_pressed(egui::Key::ArrowRight) {
                self.jump_relative(1);
            }
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.jump_relative(-1);
            }
            if i.key_pressed(egui::Key::Home) {
                self.timeline.jump_to(Phase::Before);
            }
            if i.key_pressed(egui::Key::End) {
                self.timeline.jump_to(Phase::Afterglow);
            }
            let digits = [
                egui::Key::Num1,
                egui::Key::Num2,
                egui::Key::Num3,
                egui::Key::Num4,
                egui::Key::Num5,
                egui::Key::Num6,
            ];
            for (index, key) in digits.into_iter().enumerate() {
                if i.key_pressed(key) {
                    self.timeline.jump_to(Phase::ALL[index]);
                }
            }
        });

        // Send collected viewport commands outside the input closure
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        // Advance autoplay by the frame's wall-clock delta. While a blocking
        // load holds the experience behind the loader, the journey must not
        // start without the viewer.
        let blocked = self.narrative_mode == NarrativeMode::Blocking
            && !matches!(self.narrative, NarrativeState::Idle);
        if !blocked {
            let dt = ctx.input(|i| i.stable_dt).min(0.1);
            self.timeline.tick(dt as f64);
        }

        let phase = self.timeline.phase();
        if phase != self.shown_phase {
            self.shown_phase = phase;
            self.phase_changed_at = Instant::now();
        }

        let bg = self.theme.background;

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);

                let scale = render::compute_scale(rect);
                let time = ctx.input(|i| i.time);
                self.stars.draw(ui, rect, time, &self.theme, scale);

                let waiting = self.narrative_mode == NarrativeMode::Blocking
                    && matches!(self.narrative, NarrativeState::Pending(_));

                if waiting {
                    self.draw_loading(ui, rect, scale, time);
                    ctx.request_repaint();
                } else if matches!(self.narrative, NarrativeState::Failed) {
                    self.draw_load_error(ui, rect, scale);
                } else {
                    self.draw_experience(ui, ctx, rect, scale);
                }

                // Toast notification
                if let Some(ref toast) = self.toast {
                    let opacity = toast.opacity();
                    if opacity > 0.0 {
                        let toast_color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
                        let toast_bg = Theme::with_opacity(self.theme.faint, opacity * 0.9);
                        let galley = ui.painter().layout_no_wrap(
                            toast.message.clone(),
                            egui::FontId::proportional(18.0 * scale),
                            toast_color,
                        );
                        let padding = 14.0 * scale;
                        let toast_rect = egui::Rect::from_min_size(
                            egui::pos2(
                                rect.center().x - galley.rect.width() / 2.0 - padding,
                                rect.bottom() - 220.0 * scale,
                            ),
                            egui::vec2(
                                galley.rect.width() + padding * 2.0,
                                galley.rect.height() + padding * 2.0,
                            ),
                        );
                        ui.painter().rect_filled(toast_rect, 8.0 * scale, toast_bg);
                        let text_pos =
                            egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
                        ui.painter().galley(text_pos, galley, toast_color);
                        ctx.request_repaint();
                    }
                }

                if self.show_hud {
                    draw_hud(ui, &self.theme, rect, scale);
                }
            });

        // Expire toast
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        if self.timeline.is_playing() {
            ctx.request_repaint();
        } else {
            // Star twinkle keeps breathing while paused.
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

impl EclipseApp {
    fn draw_experience(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        rect: egui::Rect,
        scale: f32,
    ) {
        let state = visual::map_progress(self.timeline.progress(), &self.tuning);
        if self.glow.advance(&state) {
            ctx.request_repaint();
        }

        let radius = 105.0 * scale;
        let center = egui::pos2(rect.center().x, rect.top() + rect.height() * 0.36);
        eclipse::draw(ui, center, radius, &state, &self.glow, &self.theme);

        // Caption stack, cross-faded on phase change.
        let elapsed = self.phase_changed_at.elapsed().as_secs_f32();
        let fade = (elapsed / CONTENT_FADE_DURATION).clamp(0.0, 1.0);
        let opacity = ease_in_out(fade);
        if fade < 1.0 {
            ctx.request_repaint();
        }
        let content_rect = egui::Rect::from_min_max(
            egui::pos2(rect.left(), center.y + radius * 2.3),
            egui::pos2(rect.right(), rect.bottom() - 190.0 * scale),
        );
        content::draw(
            ui,
            content_rect,
            self.storyline.phase(self.shown_phase),
            &self.theme,
            opacity,
            scale,
        );

        self.draw_header(ui, rect, scale);
        self.draw_footer(ui, rect, scale);
        self.draw_chrome(ui, rect, scale);
    }

    fn draw_header(&mut self, ui: &mut egui::Ui, rect: egui::Rect, scale: f32) {
        let padding = 44.0 * scale;

        // Wordmark
        let wordmark_color = Theme::with_opacity(self.theme.heading_color, 0.95);
        let wordmark_galley = ui.painter().layout_no_wrap(
            spaced(WORDMARK),
            egui::FontId::proportional(26.0 * scale),
            wordmark_color,
        );
        let wordmark_pos = egui::pos2(rect.left() + padding, rect.top() + padding);
        ui.painter()
            .galley(wordmark_pos, wordmark_galley, wordmark_color);

        let tagline_color = Theme::with_opacity(self.theme.accent, 0.8);
        let tagline_galley = ui.painter().layout_no_wrap(
            spaced(TAGLINE),
            egui::FontId::proportional(10.0 * scale),
            tagline_color,
        );
        let tagline_pos = egui::pos2(rect.left() + padding, rect.top() + padding + 36.0 * scale);
        ui.painter()
            .galley(tagline_pos, tagline_galley, tagline_color);

        // Play / pause toggle
        let button_radius = 26.0 * scale;
        let button_center = egui::pos2(
            rect.right() - padding - button_radius,
            rect.top() + padding + button_radius * 0.4,
        );
        let button_rect = egui::Rect::from_center_size(
            button_center,
            egui::vec2(button_radius * 2.0, button_radius * 2.0),
        );
        let response = ui.interact(
            button_rect,
            ui.id().with("playback_toggle"),
            egui::Sense::click(),
        );

        let fill_opacity = if response.hovered() { 0.10 } else { 0.05 };
        ui.painter().circle_filled(
            button_center,
            button_radius,
            Theme::with_opacity(self.theme.foreground, fill_opacity),
        );
        ui.painter().circle_stroke(
            button_center,
            button_radius,
            egui::Stroke::new(1.0, Theme::with_opacity(self.theme.foreground, 0.08)),
        );

        let glyph_color = Theme::with_opacity(
            self.theme.foreground,
            if response.hovered() { 0.95 } else { 0.6 },
        );
        if self.timeline.is_playing() {
            let bar = egui::vec2(3.0 * scale, 16.0 * scale);
            for dx in [-4.0, 4.0] {
                let bar_rect = egui::Rect::from_center_size(
                    button_center + egui::vec2(dx * scale, 0.0),
                    bar,
                );
                ui.painter().rect_filled(bar_rect, 1.0, glyph_color);
            }
        } else {
            let s = 9.0 * scale;
            ui.painter().add(egui::Shape::convex_polygon(
                vec![
                    button_center + egui::vec2(-s * 0.5 + 2.0 * scale, -s),
                    button_center + egui::vec2(-s * 0.5 + 2.0 * scale, s),
                    button_center + egui::vec2(s + 2.0 * scale, 0.0),
                ],
                glyph_color,
                egui::Stroke::NONE,
            ));
        }

        if response.clicked() {
            self.toggle_playback();
        }
    }

    fn draw_footer(&mut self, ui: &mut egui::Ui, rect: egui::Rect, scale: f32) {
        let footer_width = (rect.width() - 180.0 * scale).min(980.0 * scale);
        let left = rect.center().x - footer_width / 2.0;
        let current = self.timeline.phase();

        // Phase selector labels, spread edge-to-edge like the timeline below.
        let labels_y = rect.bottom() - 150.0 * scale;
        let label_font = egui::FontId::proportional(self.theme.label_size * scale);
        for phase in Phase::ALL {
            let frac = phase.anchor() as f32;
            let active = phase == current;

            let galley = ui.painter().layout_no_wrap(
                spaced(&phase.label().to_uppercase()),
                label_font.clone(),
                egui::Color32::PLACEHOLDER,
            );
            let x = left + frac * footer_width - galley.rect.width() * frac;
            let label_rect = egui::Rect::from_min_size(
                egui::pos2(x, labels_y),
                galley.rect.size(),
            )
            .expand(6.0 * scale);

            let response = ui.interact(
                label_rect,
                ui.id().with(("phase_label", phase.index())),
                egui::Sense::click(),
            );

            let opacity = if active {
                1.0
            } else if response.hovered() {
                0.55
            } else {
                0.25
            };
            let color = if active {
                Theme::with_opacity(self.theme.heading_color, 1.0)
            } else {
                Theme::with_opacity(self.theme.foreground, opacity)
            };
            ui.painter().galley(egui::pos2(x, labels_y), galley, color);

            if response.clicked() {
                self.timeline.jump_to(phase);
            }
        }

        // Seek track
        let track_y = rect.bottom() - 104.0 * scale;
        let track_rect = egui::Rect::from_min_max(
            egui::pos2(left, track_y - 1.0),
            egui::pos2(left + footer_width, track_y + 1.0),
        );
        let hit_rect = track_rect.expand2(egui::vec2(0.0, 14.0 * scale));
        let response = ui.interact(
            hit_rect,
            ui.id().with("seek_track"),
            egui::Sense::click_and_drag(),
        );

        if response.clicked() || response.dragged() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let p = ((pointer.x - left) / footer_width).clamp(0.0, 1.0);
                self.timeline.seek(p as f64);
            }
        }

        let track_opacity = if response.hovered() || response.dragged() {
            0.10
        } else {
            0.05
        };
        ui.painter().rect_filled(
            track_rect,
            1.0,
            Theme::with_opacity(self.theme.foreground, track_opacity),
        );

        let progress = self.timeline.progress() as f32;
        let fill_rect = egui::Rect::from_min_max(
            track_rect.min,
            egui::pos2(left + progress * footer_width, track_rect.bottom()),
        );
        ui.painter().rect_filled(
            fill_rect,
            1.0,
            Theme::with_opacity(self.theme.accent, 0.9),
        );

        let thumb_center = egui::pos2(left + progress * footer_width, track_y);
        ui.painter().circle_filled(
            thumb_center,
            12.0 * scale,
            Theme::with_opacity(self.theme.accent, 0.25),
        );
        ui.painter()
            .circle_filled(thumb_center, 6.0 * scale, self.theme.sun);

        // Hint line
        let hint_color = Theme::with_opacity(self.theme.muted, 0.5);
        let hint_galley = ui.painter().layout_no_wrap(
            spaced(HINT_TEXT),
            egui::FontId::proportional(9.0 * scale),
            hint_color,
        );
        let hint_pos = egui::pos2(
            rect.center().x - hint_galley.rect.width() / 2.0,
            rect.bottom() - 58.0 * scale,
        );
        ui.painter().galley(hint_pos, hint_galley, hint_color);
    }

    fn draw_chrome(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32) {
        // Phase counter
        let counter_text = format!("{} / {}", self.timeline.phase().index() + 1, Phase::COUNT);
        let counter_color = Theme::with_opacity(self.theme.foreground, 0.3);
        let counter_galley = ui.painter().layout_no_wrap(
            counter_text,
            egui::FontId::monospace(14.0 * scale),
            counter_color,
        );
        let counter_pos = egui::pos2(
            rect.right() - counter_galley.rect.width() - 16.0 * scale,
            rect.bottom() - 30.0 * scale,
        );
        ui.painter()
            .galley(counter_pos, counter_galley, counter_color);

        // FPS overlay
        let fps_text = format!("{:.0} fps", self.fps);
        let fps_color = Theme::with_opacity(self.theme.foreground, 0.3);
        let fps_galley =
            ui.painter()
                .layout_no_wrap(fps_text, egui::FontId::monospace(14.0 * scale), fps_color);
        let fps_pos = egui::pos2(rect.left() + 16.0 * scale, rect.bottom() - 30.0 * scale);
        ui.painter().galley(fps_pos, fps_galley, fps_color);
    }

    fn draw_loading(&self, ui: &egui::Ui, rect: egui::Rect, scale: f32, time: f64) {
        let center = rect.center();
        let spinner_radius = 22.0 * scale;

        let dots = 12;
        for i in 0..dots {
            let frac = i as f32 / dots as f32;
            let angle = frac * std::f32::consts::TAU - time as f32 * 2.4;
            let pos = center + spinner_radius * egui::vec2(angle.cos(), angle.sin());
            let alpha = 0.08 + 0.72 * frac;
            ui.painter().circle_filled(
                pos,
                2.4 * scale,
                Theme::with_opacity(self.theme.foreground, alpha),
            );
        }

        let text_color = Theme::with_opacity(self.theme.muted, 0.8);
        let galley = ui.painter().layout_no_wrap(
            spaced(LOADING_TEXT),
            egui::FontId::proportional(11.0 * scale),
            text_color,
        );
        let pos = egui::pos2(
            center.x - galley.rect.width() / 2.0,
            center.y + spinner_radius + 28.0 * scale,
        );
        ui.painter().galley(pos, galley, text_color);
    }

    fn draw_load_error(&mut self, ui: &mut egui::Ui, rect: egui::Rect, scale: f32) {
        let center = rect.center();

        let message_color = Theme::with_opacity(self.theme.foreground, 0.7);
        let message_galley = ui.painter().layout(
            LOAD_ERROR_TEXT.to_string(),
            egui::FontId::proportional(20.0 * scale),
            message_color,
            rect.width() * 0.6,
        );
        let message_pos = egui::pos2(
            center.x - message_galley.rect.width() / 2.0,
            center.y - 60.0 * scale,
        );
        ui.painter()
            .galley(message_pos, message_galley, message_color);

        // Retry affordance
        let label_galley = ui.painter().layout_no_wrap(
            spaced("RETRY"),
            egui::FontId::proportional(12.0 * scale),
            egui::Color32::PLACEHOLDER,
        );
        let padding = egui::vec2(28.0 * scale, 12.0 * scale);
        let button_rect = egui::Rect::from_center_size(
            egui::pos2(center.x, center.y + 24.0 * scale),
            label_galley.rect.size() + padding * 2.0,
        );
        let response = ui.interact(
            button_rect,
            ui.id().with("narrative_retry"),
            egui::Sense::click(),
        );

        let (fill, text_opacity) = if response.hovered() {
            (0.12, 0.95)
        } else {
            (0.0, 0.7)
        };
        if fill > 0.0 {
            ui.painter().rect_filled(
                button_rect,
                2.0,
                Theme::with_opacity(self.theme.foreground, fill),
            );
        }
        ui.painter().rect_stroke(
            button_rect,
            2.0,
            egui::Stroke::new(1.0, Theme::with_opacity(self.theme.foreground, 0.3)),
            egui::StrokeKind::Inside,
        );
        let text_color = Theme::with_opacity(self.theme.foreground, text_opacity);
        ui.painter()
            .galley(button_rect.min + padding, label_galley, text_color);

        if response.clicked() {
            self.retry_narrative();
        }
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Letter-space a short label the way the original tracks its uppercase text.
fn spaced(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        if i > 0 {
            out.push('\u{2009}');
        }
        out.push(c);
    }
    out
}

fn draw_hud(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, scale: f32) {
    let shortcuts = [
        ("Space", "Play / pause the journey"),
        ("\u{2190} / \u{2192}", "Previous / next phase"),
        ("1-6", "Jump to a phase"),
        ("Home / End", "First / last phase"),
        ("Drag timeline", "Scrub (pauses autoplay)"),
        ("D", "Toggle theme"),
        ("F", "Toggle fullscreen"),
        ("H", "Toggle this HUD"),
        ("Esc \u{00d7}2 / Q", "Quit"),
    ];

    let bg = Theme::with_opacity(theme.faint, 0.92);
    let text_color = Theme::with_opacity(theme.foreground, 0.9);
    let key_color = Theme::with_opacity(theme.accent, 0.9);

    let padding = 24.0 * scale;
    let line_height = 30.0 * scale;
    let hud_height = shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0 * scale;
    let hud_width = 380.0 * scale;

    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(hud_width, hud_height));
    ui.painter().rect_filled(hud_rect, 12.0 * scale, bg);

    let title_galley = ui.painter().layout_no_wrap(
        "Keyboard Shortcuts".to_string(),
        egui::FontId::proportional(18.0 * scale),
        Theme::with_opacity(theme.heading_color, 0.9),
    );
    let title_pos = egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding);
    ui.painter().galley(title_pos, title_galley, text_color);

    let mut y = hud_rect.top() + padding + 40.0 * scale;
    for (key, desc) in &shortcuts {
        let key_galley = ui.painter().layout_no_wrap(
            key.to_string(),
            egui::FontId::monospace(14.0 * scale),
            key_color,
        );
        ui.painter().galley(
            egui::pos2(hud_rect.left() + padding, y),
            key_galley,
            key_color,
        );

        let desc_galley = ui.painter().layout_no_wrap(
            desc.to_string(),
            egui::FontId::proportional(14.0 * scale),
            text_color,
        );
        ui.painter().galley(
            egui::pos2(hud_rect.left() + padding + 150.0 * scale, y),
            desc_galley,
            text_color,
        );

        y += line_height;
    }
}

pub fn run(
    windowed: bool,
    start_phase: Option<usize>,
    paused: bool,
    offline: bool,
) -> anyhow::Result<()> {
    let start_phase = match start_phase {
        Some(n) if (1..=Phase::COUNT).contains(&n) => Some(Phase::ALL[n - 1]),
        Some(n) => anyhow::bail!("Phase must be between 1 and {}, got {n}", Phase::COUNT),
        None => None,
    };

    let config = Config::load_or_default();
    let start_paused = paused
        || config
            .defaults
            .as_ref()
            .and_then(|d| d.start_paused)
            .unwrap_or(false);

    let title = "Umbra \u{2014} Total Solar";
    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(EclipseApp::new(
                &config,
                start_phase,
                start_paused,
                offline,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_mode_never_fetches() {
        let app = EclipseApp::new(&Config::default(), None, true, true);
        assert!(matches!(app.narrative, NarrativeState::Idle));
        assert_eq!(app.storyline, Storyline::fallback());
    }

    #[test]
    fn test_failed_fetch_keeps_fallback_storyline() {
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let mut app = EclipseApp::new(&Config::default(), None, true, false);
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(app.narrative, NarrativeState::Pending(_)) && Instant::now() < deadline {
            app.poll_narrative();
            std::thread::sleep(Duration::from_millis(10));
        }
        for phase in Phase::ALL {
            assert_eq!(app.storyline.phase(phase), Storyline::fallback().phase(phase));
        }
    }

    #[test]
    fn test_blocking_failure_surfaces_retry() {
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let mut config = Config::default();
        config.set("narrative.mode", "blocking").unwrap();
        let mut app = EclipseApp::new(&config, None, true, false);
        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(app.narrative, NarrativeState::Pending(_)) && Instant::now() < deadline {
            app.poll_narrative();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(matches!(app.narrative, NarrativeState::Failed));
        assert_eq!(app.storyline, Storyline::fallback());
    }

    #[test]
    fn test_start_phase_opens_paused_on_anchor() {
        let app = EclipseApp::new(&Config::default(), Some(Phase::Totality), false, true);
        assert!(!app.timeline.is_playing());
        assert_eq!(app.timeline.progress(), Phase::Totality.anchor());
    }

    #[test]
    fn test_jump_relative_clamps_at_the_ends() {
        let mut app = EclipseApp::new(&Config::default(), None, true, true);
        app.jump_relative(-1);
        assert_eq!(app.timeline.phase(), Phase::Before);
        app.timeline.jump_to(Phase::Afterglow);
        app.jump_relative(1);
        assert_eq!(app.timeline.phase(), Phase::Afterglow);
    }
}

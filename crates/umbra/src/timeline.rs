use crate::phase::Phase;

/// Autoplay speed policy.
///
/// Progress advances at `base_speed` units per second, scaled down near the
/// midpoint so the experience dwells on totality instead of sweeping through
/// it: within `dwell_band` of 0.5 the multiplier drops to `dwell_multiplier`,
/// within `approach_band` to `approach_multiplier`.
#[derive(Debug, Clone, Copy)]
pub struct Pacing {
    pub base_speed: f64,
    pub dwell_band: f64,
    pub dwell_multiplier: f64,
    pub approach_band: f64,
    pub approach_multiplier: f64,
}

impl Default for Pacing {
    fn default() -> Self {
        // A full sweep takes ~33s at cruise, noticeably longer around 0.5.
        Self {
            base_speed: 0.03,
            dwell_band: 0.03,
            dwell_multiplier: 0.3,
            approach_band: 0.12,
            approach_multiplier: 0.55,
        }
    }
}

/// The playback driver: owns progress and the playing flag, and is the only
/// writer of either.
#[derive(Debug, Clone)]
pub struct Timeline {
    progress: f64,
    playing: bool,
    pacing: Pacing,
}

impl Timeline {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            progress: 0.0,
            playing: true,
            pacing,
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn phase(&self) -> Phase {
        Phase::from_progress(self.progress)
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    /// The speed multiplier the pacing policy applies at the current
    /// progress.
    pub fn speed_multiplier(&self) -> f64 {
        let proximity = (0.5 - self.progress).abs();
        if proximity < self.pacing.dwell_band {
            self.pacing.dwell_multiplier
        } else if proximity < self.pacing.approach_band {
            self.pacing.approach_multiplier
        } else {
            1.0
        }
    }

    /// Advance by `dt` seconds of wall-clock time. Progress wraps past 1.0
    /// back into [0, 1) so autoplay loops indefinitely. A paused timeline
    /// ignores ticks entirely.
    pub fn tick(&mut self, dt: f64) {
        if !self.playing {
            return;
        }
        let step = dt * self.pacing.base_speed * self.speed_multiplier();
        self.progress = (self.progress + step) % 1.0;
    }

    /// Set progress directly from the seek control. Always pauses autoplay.
    pub fn seek(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
        self.playing = false;
    }

    /// Land exactly on a phase anchor and pause autoplay.
    pub fn jump_to(&mut self, phase: Phase) {
        self.progress = phase.anchor();
        self.playing = false;
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new(Pacing::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_playing_from_zero() {
        let timeline = Timeline::default();
        assert_eq!(timeline.progress(), 0.0);
        assert!(timeline.is_playing());
        assert_eq!(timeline.phase(), Phase::Before);
    }

    #[test]
    fn test_paused_ticks_are_noops() {
        let mut timeline = Timeline::default();
        timeline.seek(0.25);
        for _ in 0..100 {
            timeline.tick(10.0);
        }
        assert_eq!(timeline.progress(), 0.25);
    }

    #[test]
    fn test_multiplier_is_minimum_at_midpoint() {
        let pacing = Pacing::default();
        let mut timeline = Timeline::new(pacing);
        timeline.seek(0.5);
        assert_eq!(timeline.speed_multiplier(), pacing.dwell_multiplier);

        // The dwell multiplier is the smallest value the policy can produce.
        for i in 0..=100 {
            timeline.seek(i as f64 / 100.0);
            assert!(timeline.speed_multiplier() >= pacing.dwell_multiplier);
        }
    }

    #[test]
    fn test_multiplier_tiers() {
        let pacing = Pacing::default();
        let mut timeline = Timeline::new(pacing);

        timeline.seek(0.0);
        assert_eq!(timeline.speed_multiplier(), 1.0);

        timeline.seek(0.42);
        assert_eq!(timeline.speed_multiplier(), pacing.approach_multiplier);

        timeline.seek(0.49);
        assert_eq!(timeline.speed_multiplier(), pacing.dwell_multiplier);
    }

    #[test]
    fn test_tick_advances_by_scaled_step() {
        let pacing = Pacing {
            base_speed: 0.1,
            ..Pacing::default()
        };
        let mut timeline = Timeline::new(pacing);
        // Far from the midpoint the multiplier is 1.0.
        timeline.tick(1.0);
        assert!((timeline.progress() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_wraps_into_unit_interval() {
        let pacing = Pacing {
            base_speed: 0.01,
            ..Pacing::default()
        };
        let mut timeline = Timeline::new(pacing);
        timeline.seek(0.999);
        timeline.play();
        timeline.tick(1.0);
        assert!(timeline.progress() < 1.0);
        assert!((timeline.progress() - 0.009).abs() < 1e-12);
    }

    #[test]
    fn test_seek_pauses_and_clamps() {
        let mut timeline = Timeline::default();
        timeline.seek(1.5);
        assert_eq!(timeline.progress(), 1.0);
        assert!(!timeline.is_playing());

        timeline.play();
        timeline.seek(-0.5);
        assert_eq!(timeline.progress(), 0.0);
        assert!(!timeline.is_playing());
    }

    #[test]
    fn test_jump_lands_on_exact_anchor_and_pauses() {
        let mut timeline = Timeline::default();
        for (i, phase) in Phase::ALL.into_iter().enumerate() {
            timeline.play();
            timeline.jump_to(phase);
            assert_eq!(
                timeline.progress(),
                i as f64 / (Phase::COUNT - 1) as f64
            );
            assert_eq!(timeline.phase(), phase);
            assert!(!timeline.is_playing());
        }
    }

    #[test]
    fn test_dwell_slows_ticks_near_totality() {
        let mut cruising = Timeline::default();
        cruising.seek(0.2);
        cruising.play();
        cruising.tick(0.1);
        let cruise_step = cruising.progress() - 0.2;

        let mut dwelling = Timeline::default();
        dwelling.seek(0.5);
        dwelling.play();
        dwelling.tick(0.1);
        let dwell_step = dwelling.progress() - 0.5;

        assert!(dwell_step > 0.0);
        assert!(dwell_step < cruise_step);
    }
}

use crate::phase::Phase;

/// The constants that shape the eclipse rendering, collected in one place so
/// every copy of the experience draws from the same table.
#[derive(Debug, Clone, Copy)]
pub struct VisualTuning {
    /// Horizontal sweep of the occluding disc, in percent of its diameter.
    pub shadow_sweep: f64,
    /// Half-width of the totality window around 0.5 (flare, maximum glow).
    pub peak_band: f64,
    /// Half-width of the wider approach window around 0.5 (glow ramp-up).
    pub near_band: f64,
    pub glow_opacity_rest: f64,
    pub glow_blur_rest: f64,
    pub glow_blur_peak: f64,
    pub glow_scale_peak: f64,
}

impl Default for VisualTuning {
    fn default() -> Self {
        Self {
            shadow_sweep: 115.0,
            peak_band: 0.02,
            near_band: 0.10,
            glow_opacity_rest: 0.05,
            glow_blur_rest: 20.0,
            glow_blur_peak: 60.0,
            glow_scale_peak: 2.4,
        }
    }
}

/// Everything the renderer needs for one frame, derived entirely from
/// progress. No hidden state: the same progress always yields the same
/// `VisualState`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualState {
    pub phase: Phase,
    /// Offset of the occluding disc in percent of its diameter; zero at
    /// progress 0.5 (full overlap), positive before, negative after.
    pub shadow_offset_percent: f64,
    pub in_near_window: bool,
    pub in_peak_window: bool,
    pub glow_opacity: f64,
    pub glow_blur: f64,
    pub glow_scale: f64,
    pub flare_visible: bool,
}

/// Map a progress value in [0, 1] to the frame's visual parameters.
pub fn map_progress(progress: f64, tuning: &VisualTuning) -> VisualState {
    let proximity = (0.5 - progress).abs();
    let in_peak = proximity < tuning.peak_band;
    let in_near = proximity < tuning.near_band;

    VisualState {
        phase: Phase::from_progress(progress),
        shadow_offset_percent: (0.5 - progress) * tuning.shadow_sweep,
        in_near_window: in_near,
        in_peak_window: in_peak,
        glow_opacity: if in_near { 1.0 } else { tuning.glow_opacity_rest },
        glow_blur: if in_peak {
            tuning.glow_blur_peak
        } else {
            tuning.glow_blur_rest
        },
        glow_scale: if in_peak { tuning.glow_scale_peak } else { 1.0 },
        flare_visible: in_peak,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> VisualTuning {
        VisualTuning::default()
    }

    #[test]
    fn test_shadow_offset_zero_at_midpoint() {
        let state = map_progress(0.5, &tuning());
        assert_eq!(state.shadow_offset_percent, 0.0);
    }

    #[test]
    fn test_shadow_offset_monotonically_decreasing() {
        let t = tuning();
        let mut last = f64::INFINITY;
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let offset = map_progress(p, &t).shadow_offset_percent;
            assert!(offset < last, "offset did not decrease at p = {p}");
            last = offset;
        }
    }

    #[test]
    fn test_shadow_offset_endpoints() {
        let t = tuning();
        assert_eq!(map_progress(0.0, &t).shadow_offset_percent, 57.5);
        assert_eq!(map_progress(1.0, &t).shadow_offset_percent, -57.5);
    }

    #[test]
    fn test_mapper_is_idempotent() {
        let t = tuning();
        for i in 0..=100 {
            let p = i as f64 / 100.0;
            assert_eq!(map_progress(p, &t), map_progress(p, &t));
        }
    }

    #[test]
    fn test_peak_window_inside_near_window() {
        let t = tuning();
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let state = map_progress(p, &t);
            if state.in_peak_window {
                assert!(state.in_near_window);
            }
        }
    }

    #[test]
    fn test_window_edges() {
        let t = tuning();
        assert!(map_progress(0.49, &t).in_peak_window);
        assert!(!map_progress(0.47, &t).in_peak_window);
        assert!(map_progress(0.41, &t).in_near_window);
        assert!(!map_progress(0.39, &t).in_near_window);
    }

    #[test]
    fn test_flare_follows_peak_window() {
        let t = tuning();
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let state = map_progress(p, &t);
            assert_eq!(state.flare_visible, state.in_peak_window);
        }
    }

    #[test]
    fn test_glow_levels() {
        let t = tuning();

        let rest = map_progress(0.1, &t);
        assert_eq!(rest.glow_opacity, t.glow_opacity_rest);
        assert_eq!(rest.glow_blur, t.glow_blur_rest);
        assert_eq!(rest.glow_scale, 1.0);

        let near = map_progress(0.42, &t);
        assert_eq!(near.glow_opacity, 1.0);
        assert_eq!(near.glow_blur, t.glow_blur_rest);
        assert_eq!(near.glow_scale, 1.0);

        let peak = map_progress(0.5, &t);
        assert_eq!(peak.glow_opacity, 1.0);
        assert_eq!(peak.glow_blur, t.glow_blur_peak);
        assert_eq!(peak.glow_scale, t.glow_scale_peak);
        assert!(peak.flare_visible);
    }
}

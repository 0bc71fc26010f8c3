use serde::{Deserialize, Serialize};

/// The six narrative phases of the eclipse, in timeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Before,
    FirstContact,
    DuringPeak,
    Totality,
    ReturnOfLight,
    Afterglow,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::Before,
        Phase::FirstContact,
        Phase::DuringPeak,
        Phase::Totality,
        Phase::ReturnOfLight,
        Phase::Afterglow,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Derive the phase from a progress value in [0, 1].
    ///
    /// The unit interval splits into six equal segments; exactly 1.0 still
    /// maps to the last phase. Always recomputed from progress, never cached.
    pub fn from_progress(progress: f64) -> Phase {
        let index = (progress * Self::COUNT as f64).floor() as usize;
        Self::ALL[index.min(Self::COUNT - 1)]
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// The progress value this phase's selector lands on: `index / (COUNT - 1)`.
    pub fn anchor(self) -> f64 {
        self.index() as f64 / (Self::COUNT - 1) as f64
    }

    pub fn key(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::FirstContact => "first_contact",
            Phase::DuringPeak => "during_peak",
            Phase::Totality => "totality",
            Phase::ReturnOfLight => "return_of_light",
            Phase::Afterglow => "afterglow",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Before => "Anticipation",
            Phase::FirstContact => "Transformation",
            Phase::DuringPeak => "Ascension",
            Phase::Totality => "Totality",
            Phase::ReturnOfLight => "Renewal",
            Phase::Afterglow => "Presence",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Caption content for a single phase.
///
/// `feeling` is a comma-joined keyword list; use [`PhaseStory::feelings`] to
/// iterate the individual keywords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseStory {
    pub sentence: String,
    pub feeling: String,
    pub reflection: String,
}

impl PhaseStory {
    pub fn feelings(&self) -> impl Iterator<Item = &str> {
        self.feeling
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The full six-phase storyline.
///
/// Deserialization is strict: all six keys and all three fields per phase are
/// required, and unknown fields are rejected. A document that fails this
/// shape is discarded wholesale in favor of [`Storyline::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Storyline {
    pub before: PhaseStory,
    pub first_contact: PhaseStory,
    pub during_peak: PhaseStory,
    pub totality: PhaseStory,
    pub return_of_light: PhaseStory,
    pub afterglow: PhaseStory,
}

impl Storyline {
    pub fn phase(&self, phase: Phase) -> &PhaseStory {
        match phase {
            Phase::Before => &self.before,
            Phase::FirstContact => &self.first_contact,
            Phase::DuringPeak => &self.during_peak,
            Phase::Totality => &self.totality,
            Phase::ReturnOfLight => &self.return_of_light,
            Phase::Afterglow => &self.afterglow,
        }
    }

    /// The storyline shipped in the binary, used whenever the narrative fetch
    /// is skipped or fails.
    pub fn fallback() -> Self {
        fn story(sentence: &str, feeling: &str, reflection: &str) -> PhaseStory {
            PhaseStory {
                sentence: sentence.to_string(),
                feeling: feeling.to_string(),
                reflection: reflection.to_string(),
            }
        }

        Self {
            before: story(
                "The island pulses with a warm, expectant glow.",
                "Quiet, Solar",
                "What intentions are you carrying into the shadow?",
            ),
            first_contact: story(
                "A cosmic bite begins the silent transformation.",
                "Shift, Breath",
                "Can you feel the air cooling on your skin?",
            ),
            during_peak: story(
                "Surreal silver light washes over the water.",
                "Ethereal, Gold",
                "Who is sharing this half-lit world with you?",
            ),
            totality: story(
                "The universe holds its breath in a ring of fire.",
                "Infinite, Absolute",
                "When the sun vanishes, what truth remains?",
            ),
            return_of_light: story(
                "A diamond spark heralds the second dawn.",
                "Birth, Clarity",
                "What will you build with this restored light?",
            ),
            afterglow: story(
                "The shadow leaves a golden mark upon the soul.",
                "Presence, Awake",
                "How will you speak of this to the future?",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(Phase::from_progress(0.0), Phase::Before);
        assert_eq!(Phase::from_progress(0.999_999), Phase::Afterglow);
        assert_eq!(Phase::from_progress(1.0), Phase::Afterglow);
    }

    #[test]
    fn test_phase_monotone_and_in_range() {
        let mut last = 0;
        for i in 0..=1000 {
            let p = i as f64 / 1000.0;
            let index = Phase::from_progress(p).index();
            assert!(index < Phase::COUNT);
            assert!(index >= last, "phase index regressed at p = {p}");
            last = index;
        }
    }

    #[test]
    fn test_anchor_endpoints() {
        assert_eq!(Phase::Before.anchor(), 0.0);
        assert_eq!(Phase::Afterglow.anchor(), 1.0);
        assert_eq!(Phase::Totality.anchor(), 3.0 / 5.0);
    }

    #[test]
    fn test_anchor_round_trips_to_phase() {
        // The totality anchor (0.6) sits on the during_peak/totality boundary
        // and floor() lands it in totality; every anchor must select its own
        // phase.
        for phase in Phase::ALL {
            assert_eq!(Phase::from_progress(phase.anchor()), phase);
        }
    }

    #[test]
    fn test_feelings_split_and_trim() {
        let story = PhaseStory {
            sentence: String::new(),
            feeling: " Quiet,  Solar ,".to_string(),
            reflection: String::new(),
        };
        let feelings: Vec<&str> = story.feelings().collect();
        assert_eq!(feelings, vec!["Quiet", "Solar"]);
    }

    #[test]
    fn test_storyline_parses_complete_document() {
        let json = serde_json::json!({
            "before": {"sentence": "a", "feeling": "b", "reflection": "c"},
            "first_contact": {"sentence": "a", "feeling": "b", "reflection": "c"},
            "during_peak": {"sentence": "a", "feeling": "b", "reflection": "c"},
            "totality": {"sentence": "a", "feeling": "b", "reflection": "c"},
            "return_of_light": {"sentence": "a", "feeling": "b", "reflection": "c"},
            "afterglow": {"sentence": "a", "feeling": "b", "reflection": "c"},
        });
        let story: Storyline = serde_json::from_value(json).unwrap();
        assert_eq!(story.phase(Phase::Totality).sentence, "a");
    }

    #[test]
    fn test_storyline_rejects_missing_phase() {
        let json = serde_json::json!({
            "before": {"sentence": "a", "feeling": "b", "reflection": "c"},
        });
        assert!(serde_json::from_value::<Storyline>(json).is_err());
    }

    #[test]
    fn test_storyline_rejects_missing_field() {
        let mut value = serde_json::to_value(Storyline::fallback()).unwrap();
        value["totality"].as_object_mut().unwrap().remove("reflection");
        assert!(serde_json::from_value::<Storyline>(value).is_err());
    }

    #[test]
    fn test_storyline_rejects_unknown_field() {
        let mut value = serde_json::to_value(Storyline::fallback()).unwrap();
        value["before"]["mood"] = serde_json::json!("extra");
        assert!(serde_json::from_value::<Storyline>(value).is_err());
    }

    #[test]
    fn test_fallback_covers_all_phases() {
        let story = Storyline::fallback();
        for phase in Phase::ALL {
            assert!(!story.phase(phase).sentence.is_empty());
            assert!(story.phase(phase).feelings().count() >= 2);
            assert!(story.phase(phase).reflection.ends_with('?'));
        }
    }
}

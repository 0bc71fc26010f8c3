//! One-shot fetch of the six-phase storyline from the Gemini API.
//!
//! The request pins a strict response schema; anything that comes back in a
//! different shape is discarded and the caller keeps the built-in storyline.

use std::sync::mpsc;

use anyhow::{Context, Result};

use crate::config::NarrativeConfig;
use crate::phase::{Phase, Storyline};

const SYSTEM_INSTRUCTION: &str = "\
ROLE: Poetic experience designer.
TASK: Generate short, refined storytelling content for an interactive eclipse timeline.
CONSTRAINTS:
- No astronomy facts, dates, locations, or technical tone.
- No astrology, emojis, or motivational cliches.
- Minimal, calm, premium, timeless, emotion-first writing.
STRUCTURE:
Exactly 6 phases in this order: before, first_contact, during_peak, totality, return_of_light, afterglow.
Each needs: 'sentence' (max 12 words), 'feeling' (2-3 comma-separated keywords), 'reflection' (one gentle question).
TONE: Quiet museum wall text.";

const PROMPT: &str =
    "Generate the poetic content for the eclipse storyline with 6 distinct phases.";

/// Run the fetch on a background thread, delivering exactly one result.
///
/// Dropping the receiver is the only teardown needed: a late result is
/// discarded by the failed `send`.
pub fn spawn_fetch(config: NarrativeConfig) -> mpsc::Receiver<Result<Storyline>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(fetch(&config));
    });
    rx
}

/// Fetch the storyline synchronously. Makes no request at all when no API
/// key is available.
pub fn fetch(config: &NarrativeConfig) -> Result<Storyline> {
    let api_key = config
        .resolve_api_key()
        .ok_or_else(|| anyhow::anyhow!("No API key configured"))?;

    let url = format!(
        "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={api_key}",
        config.model()
    );

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .timeout_global(Some(config.timeout()))
        .build()
        .into();

    let response: serde_json::Value = agent
        .post(&url)
        .header("Content-Type", "application/json")
        .send_json(&request_body())
        .context("Failed to call the narrative API")?
        .body_mut()
        .read_json()
        .context("Failed to parse the narrative API response")?;

    parse_response(&response)
}

/// Convenience for terminal use: fetch, or fall back to the built-in
/// storyline on any failure.
pub fn fetch_or_fallback(config: &NarrativeConfig) -> (Storyline, Option<anyhow::Error>) {
    match fetch(config) {
        Ok(story) => (story, None),
        Err(e) => (Storyline::fallback(), Some(e)),
    }
}

fn request_body() -> serde_json::Value {
    serde_json::json!({
        "contents": [{
            "parts": [{ "text": PROMPT }]
        }],
        "systemInstruction": {
            "parts": [{ "text": SYSTEM_INSTRUCTION }]
        },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": storyline_schema(),
        }
    })
}

fn storyline_schema() -> serde_json::Value {
    let phase_schema = serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "sentence": { "type": "STRING" },
            "feeling": { "type": "STRING" },
            "reflection": { "type": "STRING" }
        },
        "required": ["sentence", "feeling", "reflection"]
    });

    let mut properties = serde_json::Map::new();
    for phase in Phase::ALL {
        properties.insert(phase.key().to_string(), phase_schema.clone());
    }

    serde_json::json!({
        "type": "OBJECT",
        "properties": properties,
        "required": Phase::ALL.map(Phase::key),
    })
}

/// Extract and validate the storyline from a `generateContent` response.
fn parse_response(response: &serde_json::Value) -> Result<Storyline> {
    let text = response["candidates"][0]["content"]["parts"][0]["text"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("No text candidate in the narrative response"))?;

    let story: Storyline =
        serde_json::from_str(text).context("Narrative response failed schema validation")?;
    Ok(story)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap_candidate(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{ "text": text }]
                }
            }]
        })
    }

    #[test]
    fn test_parse_valid_response() {
        let payload = serde_json::to_string(&Storyline::fallback()).unwrap();
        let story = parse_response(&wrap_candidate(&payload)).unwrap();
        assert_eq!(story, Storyline::fallback());
    }

    #[test]
    fn test_parse_rejects_missing_candidates() {
        let response = serde_json::json!({ "candidates": [] });
        assert!(parse_response(&response).is_err());
    }

    #[test]
    fn test_parse_rejects_non_json_text() {
        assert!(parse_response(&wrap_candidate("the shadow passes")).is_err());
    }

    #[test]
    fn test_parse_rejects_incomplete_storyline() {
        let payload = r#"{"before": {"sentence": "a", "feeling": "b", "reflection": "c"}}"#;
        assert!(parse_response(&wrap_candidate(payload)).is_err());
    }

    #[test]
    fn test_fetch_without_key_makes_no_request() {
        // resolve_api_key consults the environment, so pin an empty key via
        // config being absent AND the env var unset for this test binary.
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let err = fetch(&NarrativeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("No API key"));
    }

    #[test]
    fn test_fetch_or_fallback_yields_defaults_on_failure() {
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let (story, error) = fetch_or_fallback(&NarrativeConfig::default());
        assert_eq!(story, Storyline::fallback());
        assert!(error.is_some());
    }

    #[test]
    fn test_schema_lists_all_phases() {
        let schema = storyline_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), Phase::COUNT);
        for phase in Phase::ALL {
            assert!(schema["properties"][phase.key()].is_object());
        }
    }
}

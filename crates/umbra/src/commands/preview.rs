use anyhow::Result;
use colored::Colorize;

use crate::config::Config;
use crate::narrative;
use crate::phase::{Phase, Storyline};

/// Terminal twin of the in-app narrative fetch: print all six phases,
/// falling back to the built-in storyline on any failure.
pub fn run(quiet: bool) -> Result<()> {
    let config = Config::load_or_default();
    let narrative_config = config.narrative();

    let story = if narrative_config.resolve_api_key().is_none() {
        if !quiet {
            eprintln!("{}", "No API key; showing the built-in storyline.".yellow());
        }
        Storyline::fallback()
    } else {
        if !quiet {
            eprintln!("Fetching the storyline ({})...", narrative_config.model());
        }
        let (story, error) = narrative::fetch_or_fallback(&narrative_config);
        if let Some(e) = error {
            if !quiet {
                eprintln!(
                    "{}",
                    format!("Narrative offline ({e:#}); showing the built-in storyline.").yellow()
                );
            }
        }
        story
    };

    print_storyline(&story);
    Ok(())
}

fn print_storyline(story: &Storyline) {
    for phase in Phase::ALL {
        let data = story.phase(phase);
        let feelings: Vec<&str> = data.feelings().collect();

        println!();
        println!(
            "{}  {}",
            format!("{} / {}", phase.index() + 1, Phase::COUNT).dimmed(),
            phase.label().to_uppercase().bold()
        );
        println!("  {}", data.sentence);
        println!("  {}", feelings.join("  \u{00b7}  ").yellow());
        println!("  {}", data.reflection.dimmed().italic());
    }
    println!();
}

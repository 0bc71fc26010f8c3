use anyhow::Result;
use colored::Colorize;
use inquire::{Select, Text};

use crate::cli::ConfigCommands;
use crate::config::{API_KEY_ENV, Config};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
        ConfigCommands::Init => init(),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    let yaml = serde_yaml::to_string(&config)?;
    if yaml.trim() == "{}" {
        println!("{}", "No configuration set; using defaults.".yellow());
    } else {
        println!("{yaml}");
    }

    let narrative = config.narrative();
    println!("{}", "Effective narrative settings:".bold());
    println!("  model:        {}", narrative.model());
    println!("  timeout_secs: {}", narrative.timeout().as_secs());
    println!("  mode:         {}", narrative.mode());
    match narrative.resolve_api_key() {
        Some(_) => println!("  api key:      {}", "configured".green()),
        None => println!(
            "  api key:      {}",
            format!("not set (export {API_KEY_ENV} or set narrative.api_key)").yellow()
        ),
    }
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!("{} {key} = {value}", "Saved:".green().bold());
    println!("  {}", path.display());
    Ok(())
}

fn init() -> Result<()> {
    println!("{}", "Umbra setup".bold());
    println!("Answers are written to the config file; leave the key empty to rely on {API_KEY_ENV}.");

    let mut config = Config::load_or_default();

    let api_key = Text::new("Gemini API key:").prompt()?;
    if !api_key.trim().is_empty() {
        config.set("narrative.api_key", api_key.trim())?;
    }

    let model = Select::new(
        "Narrative model:",
        vec!["gemini-3-flash-preview", "gemini-2.5-flash"],
    )
    .prompt()?;
    config.set("narrative.model", model)?;

    let mode = Select::new(
        "Narrative mode:",
        vec!["background", "blocking", "off"],
    )
    .prompt()?;
    config.set("narrative.mode", mode)?;

    let theme = Select::new("Theme:", vec!["night", "dawn"]).prompt()?;
    config.set("defaults.theme", theme)?;

    let path = config.save()?;
    println!();
    println!(
        "{} {}",
        "Configuration written to".green().bold(),
        path.display()
    );
    Ok(())
}

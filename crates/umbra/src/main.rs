mod app;
mod cli;
mod commands;
mod config;
mod narrative;
mod phase;
mod render;
mod theme;
mod timeline;
mod visual;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    cli.run()
}

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "umbra")]
#[command(author, version, about)]
#[command(long_about = "An animated eclipse storyline player.\n\n\
    Watch a slow solar eclipse unfold, scrub it with the timeline, and let\n\
    each phase speak in a short poetic caption.\n\n\
    Examples:\n  \
    umbra                        Launch the experience (fullscreen)\n  \
    umbra --windowed             Launch in a window\n  \
    umbra --phase 4 --paused     Open paused on totality\n  \
    umbra preview                Print the storyline in the terminal")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start on a specific phase (1-6), paused
    #[arg(long, global = false)]
    pub phase: Option<usize>,

    /// Start with autoplay paused
    #[arg(long, global = false)]
    pub paused: bool,

    /// Skip the narrative fetch and keep the built-in storyline
    #[arg(long, global = false)]
    pub offline: bool,

    /// Increase output verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Fetch the narrative and print all six phases in the terminal
    Preview,

    /// Export evenly spaced eclipse frames as PNG images
    Export {
        /// Output directory for PNG files
        #[arg(short, long, default_value = "export")]
        output_dir: PathBuf,

        /// Number of frames across the full timeline
        #[arg(long, default_value = "12")]
        frames: usize,

        /// Export width in pixels
        #[arg(long, default_value = "1920")]
        width: u32,

        /// Export height in pixels
        #[arg(long, default_value = "1080")]
        height: u32,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, narrative.mode)
        key: String,

        /// Value to set
        value: String,
    },

    /// Interactively set up the narrative service and defaults
    Init,
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Preview) => crate::commands::preview::run(self.quiet),
            Some(Commands::Export {
                output_dir,
                frames,
                width,
                height,
            }) => crate::commands::export::run(output_dir, frames, width, height),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("umbra {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                if self.verbose > 0 {
                    if let Ok(path) = crate::config::Config::path() {
                        eprintln!("Config: {}", path.display());
                    }
                }
                crate::app::run(self.windowed, self.phase, self.paused, self.offline)
            }
        }
    }
}

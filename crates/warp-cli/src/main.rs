//! Warp CLI - Curved tiling and collision tools
//!
//! A tool for inspecting tilings, checking holonomy and running collision
//! probes against scene files.

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use warp_core::walk::Step;

mod commands;

/// Warp - Navigable worlds in curved space
#[derive(Parser)]
#[command(name = "warp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the geometry of a square tiling
    Tile {
        /// Squares meeting at each vertex (3 spherical, 4 flat, 5+ hyperbolic)
        valence: f64,
    },

    /// Walk from tile to tile and report where you end up
    Walk {
        /// Squares meeting at each vertex
        valence: f64,

        /// Steps to take; defaults to one loop around a vertex
        #[arg(short, long, value_enum, value_delimiter = ',')]
        steps: Vec<StepArg>,

        /// Accumulate in single precision
        #[arg(long)]
        single: bool,
    },

    /// Run collision probes against a scene file
    Collide {
        /// Input scene file (JSON)
        input: String,

        /// Collision config file (JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum StepArg {
    Up,
    Right,
    Down,
    Left,
}

impl From<StepArg> for Step {
    fn from(step: StepArg) -> Self {
        match step {
            StepArg::Up => Step::Up,
            StepArg::Right => Step::Right,
            StepArg::Down => Step::Down,
            StepArg::Left => Step::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    /// One line per probe
    Text,
    /// JSON array of hits
    Json,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Tile { valence } => {
            commands::tile::run(valence)?;
        }

        Commands::Walk {
            valence,
            steps,
            single,
        } => {
            let steps: Vec<Step> = steps.into_iter().map(Step::from).collect();
            commands::walk::run(valence, &steps, single)?;
        }

        Commands::Collide {
            input,
            config,
            format,
        } => {
            commands::collide::run(&input, config.as_deref(), format)?;
        }
    }

    Ok(())
}

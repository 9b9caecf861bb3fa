//! LightDrive CLI - run the loop headlessly and inspect configuration

mod commands;
mod demo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lightdrive")]
#[command(about = "Fixed-timestep render loop runner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in demo state on a headless surface
    Run {
        /// Loop configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Internal width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Internal height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Update ticks per second
        #[arg(long)]
        tps: Option<f64>,

        /// Title used in rate reports
        #[arg(long)]
        title: Option<String>,

        /// How long to run, in seconds
        #[arg(short, long, default_value = "3")]
        seconds: f64,

        /// Integer factor between internal and presented resolution
        #[arg(long, default_value = "1")]
        scale: u32,

        /// Post-process filter, repeatable (invert, grayscale, exposure=F, vignette=F)
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Antialiasing mode (none, shapes, text, both)
        #[arg(long, default_value = "none")]
        antialias: String,

        /// Cap presented frames per second
        #[arg(long)]
        fps_cap: Option<f64>,

        /// Maximum update ticks per iteration before dropping
        #[arg(long)]
        catch_up: Option<u32>,

        /// Keep looping when the state fails instead of stopping
        #[arg(long)]
        continue_on_fault: bool,

        /// Send a space key press after this many seconds (pauses the demo)
        #[arg(long)]
        pause_at: Option<f64>,

        /// Save the last presented frame as PNG
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },

    /// Print a loop configuration as TOML
    Config {
        /// Configuration file to validate and print; defaults when omitted
        path: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            width,
            height,
            tps,
            title,
            seconds,
            scale,
            filters,
            antialias,
            fps_cap,
            catch_up,
            continue_on_fault,
            pause_at,
            screenshot,
        } => run::run(run::RunArgs {
            config,
            width,
            height,
            tps,
            title,
            seconds,
            scale,
            filters,
            antialias,
            fps_cap,
            catch_up,
            continue_on_fault,
            pause_at,
            screenshot,
        }),
        Commands::Config { path } => config::run(path.as_deref()),
    }
}

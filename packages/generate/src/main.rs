#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! CLI tool for generating the protest map dataset.
//!
//! Reads a TOML config naming the protest CSV and the country boundary
//! `GeoJSON`, then writes `map.json` and two `GeoJSON` layers for the
//! static site to render.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use protest_map_generate::{rank_table, run_pipeline, write_outputs};
use protest_map_loader::load_config;

#[derive(Parser)]
#[command(name = "protest_map_generate", about = "Protest map dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dataset and write all output files
    Generate {
        /// Path to the pipeline config
        #[arg(long, default_value = "protest-map.toml")]
        config: PathBuf,

        /// Output directory (overrides the config)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print countries ranked by protest count
    Rank {
        /// Path to the pipeline config
        #[arg(long, default_value = "protest-map.toml")]
        config: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { config, output_dir } => {
            let config = load_config(&config)?;
            let dataset = run_pipeline(&config)?;
            let dir = output_dir.unwrap_or(config.output.dir);
            let written = write_outputs(&dataset, &dir)?;

            log::info!(
                "Generated {} countries and {} protests into {} files",
                dataset.countries.len(),
                dataset.protests.len(),
                written.len()
            );
            if !dataset.diagnostics.unmatched_names.is_empty() {
                log::warn!(
                    "Unmatched protest country names: {:?}",
                    dataset.diagnostics.unmatched_names
                );
            }
        }
        Commands::Rank { config } => {
            let config = load_config(&config)?;
            let dataset = run_pipeline(&config)?;
            print!("{}", rank_table(&dataset));
        }
    }

    Ok(())
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for exploring freight flow datasets.
//!
//! ```text
//! faf_flows datasets
//! faf_flows categories [--dataset gnn_counties]
//! faf_flows origins --category sctg_02
//! faf_flows destinations --category sctg_02 --origin 061
//! faf_flows summary --category sctg_02 --origin 061 [--dest 064]
//! faf_flows trips --category sctg_02 --origin 061 [--top 60] [--layer arc] [--output trips.json]
//! faf_flows boundaries [--output zones.geojson]
//! ```
//!
//! Data files are read from `--data-dir` (default `data`). Set `RUST_LOG`
//! for load diagnostics.

mod format;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use faf_flows_dataset::registry::all_datasets;
use faf_flows_dataset::source::FsDataSource;
use faf_flows_explorer::{Explorer, Selection};
use faf_flows_flow_models::{DestinationFilter, LayerKind};

#[derive(Parser)]
#[command(name = "faf_flows", about = "Explore freight origin/destination flows")]
struct Cli {
    /// Registered dataset id
    #[arg(long, global = true)]
    dataset: Option<String>,

    /// Dataset definition TOML file (overrides --dataset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory the dataset's files are read from
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered datasets
    Datasets,
    /// List the commodity categories of the dataset
    Categories,
    /// List the origins present in a category
    Origins {
        /// Category id or name
        #[arg(long)]
        category: String,
    },
    /// List the destinations reached from an origin
    Destinations {
        /// Category id or name
        #[arg(long)]
        category: String,
        /// Origin code or label
        #[arg(long)]
        origin: String,
    },
    /// Print summary statistics for a selection
    Summary {
        /// Category id or name
        #[arg(long)]
        category: String,
        /// Origin code or label (defaults to the dataset's default origin)
        #[arg(long)]
        origin: Option<String>,
        /// Destination code, label, or "All"
        #[arg(long, default_value = "All")]
        dest: String,
        /// Rows in the top-destinations table
        #[arg(long)]
        top_destinations: Option<usize>,
    },
    /// Write the trip segments of a selection as JSON
    Trips {
        /// Category id or name
        #[arg(long)]
        category: String,
        /// Origin code or label (defaults to the dataset's default origin)
        #[arg(long)]
        origin: Option<String>,
        /// Destination code, label, or "All"
        #[arg(long, default_value = "All")]
        dest: String,
        /// Number of links to draw
        #[arg(long)]
        top: Option<usize>,
        /// Layer kind: trips or arc
        #[arg(long, default_value = "trips")]
        layer: LayerKind,
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the simplified zone boundaries as GeoJSON
    Boundaries {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Datasets) {
        for dataset in all_datasets() {
            println!(
                "{:<16} {:<24} {} categories",
                dataset.id,
                dataset.name,
                dataset.categories.len()
            );
        }
        return Ok(());
    }

    let dataset =
        faf_flows_dataset::resolve_definition(cli.config.as_deref(), cli.dataset.as_deref())?;
    let explorer = Explorer::new(dataset, Arc::new(FsDataSource::new(&cli.data_dir)));

    match cli.command {
        Commands::Datasets => {}
        Commands::Categories => {
            for category in &explorer.dataset().categories {
                println!("{:<10} {}", category.id, category.name);
            }
        }
        Commands::Origins { category } => {
            for option in explorer.origin_options(&category)? {
                println!("{}", option.label);
            }
        }
        Commands::Destinations { category, origin } => {
            for option in explorer.destination_options(&category, &origin)? {
                println!("{}", option.label);
            }
        }
        Commands::Summary {
            category,
            origin,
            dest,
            top_destinations,
        } => {
            let view = explorer.select(&Selection {
                category,
                origin,
                destination: dest.parse::<DestinationFilter>()?,
                top_n: None,
                top_destinations,
                layer: LayerKind::default(),
            })?;
            print!("{}", format::summary_text(&view, explorer.dataset()));
        }
        Commands::Trips {
            category,
            origin,
            dest,
            top,
            layer,
            output,
        } => {
            let view = explorer.select(&Selection {
                category,
                origin,
                destination: dest.parse::<DestinationFilter>()?,
                top_n: top,
                top_destinations: None,
                layer,
            })?;
            if view.unresolved > 0 {
                log::warn!(
                    "{} flows have no zone centroid and were left out",
                    view.unresolved
                );
            }
            let json = serde_json::to_string_pretty(&view.trips)?;
            write_output(output.as_deref(), &json)?;
            log::info!("Wrote {} {} segments", view.trips.len(), view.layer);
        }
        Commands::Boundaries { output } => {
            let boundaries = explorer.boundaries()?;
            write_output(output.as_deref(), &boundaries.to_geojson_string()?)?;
            log::info!("Wrote {} boundaries", boundaries.records().len());
        }
    }

    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> std::io::Result<()> {
    match path {
        Some(path) => std::fs::write(path, content),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}

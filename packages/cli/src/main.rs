#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line viewer for NASA EONET natural events near the user.
//!
//! Resolves the user's location from their IP address, builds a
//! validated, location-bounded EONET query from the given filters, and
//! prints the matching events, most recent first. Run without a
//! subcommand for an interactive form.

mod display;
mod interactive;
mod run;

use std::path::PathBuf;
use std::str::FromStr as _;

use clap::{Args, Parser, Subcommand};
use eonet_viewer_event_models::CatalogKind;
use eonet_viewer_query::RawFilters;
use eonet_viewer_source::{Session, UpstreamClient};

use crate::run::{QueryOptions, run_query};

#[derive(Parser)]
#[command(name = "eonet_viewer", about = "Browse NASA EONET natural events near you")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query events around your location
    Query(QueryArgs),
    /// List a reference catalog (sources, categories, magnitudes)
    Catalogs {
        /// Which catalog to list
        #[arg(value_parser = parse_catalog_kind)]
        kind: CatalogKind,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Comma-separated source ids (e.g. "IRWIN,EO")
    #[arg(long)]
    source: Option<String>,
    /// Comma-separated category ids (e.g. "wildfires,volcanoes")
    #[arg(long)]
    category: Option<String>,
    /// Event status: open, closed, or all
    #[arg(long)]
    status: Option<String>,
    /// Maximum number of events to return
    #[arg(long)]
    limit: Option<String>,
    /// Start of the date range (YYYY-MM-DD); defaults to 30 days ago
    #[arg(long)]
    start: Option<String>,
    /// End of the date range (YYYY-MM-DD); defaults to today
    #[arg(long)]
    end: Option<String>,
    /// Magnitude scale id (e.g. "mag_kts")
    #[arg(long)]
    mag_id: Option<String>,
    /// Minimum magnitude value
    #[arg(long)]
    mag_min: Option<String>,
    /// Maximum magnitude value
    #[arg(long)]
    mag_max: Option<String>,
    /// Half-width of the search area in degrees
    #[arg(long)]
    scale: Option<String>,
    /// IP address to locate instead of your own
    #[arg(long)]
    ip: Option<String>,
    /// Print the search area as a `GeoJSON` feature
    #[arg(long)]
    show_bbox: bool,
    /// Write the raw EONET response to this file
    #[arg(long)]
    export: Option<PathBuf>,
    /// Print processed events as JSON
    #[arg(long)]
    json: bool,
}

impl QueryArgs {
    fn into_options(self) -> (Option<String>, QueryOptions) {
        (
            self.ip,
            QueryOptions {
                filters: RawFilters {
                    source: self.source,
                    category: self.category,
                    status: self.status,
                    limit: self.limit,
                    start: self.start,
                    end: self.end,
                    mag_id: self.mag_id,
                    mag_min: self.mag_min,
                    mag_max: self.mag_max,
                    scale: self.scale,
                },
                show_bbox: self.show_bbox,
                export: self.export,
                json: self.json,
            },
        )
    }
}

fn parse_catalog_kind(value: &str) -> Result<CatalogKind, String> {
    CatalogKind::from_str(&value.to_lowercase()).map_err(|_| {
        let valid: Vec<&str> = CatalogKind::all().iter().map(AsRef::<str>::as_ref).collect();
        format!("expected one of: {}", valid.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();
    let client = UpstreamClient::from_env()?;

    let Some(command) = cli.command else {
        return interactive::run(&client).await;
    };

    match command {
        Commands::Query(args) => {
            let (ip, options) = args.into_options();
            log::debug!("Locating {}", ip.as_deref().unwrap_or("own address"));
            let session = Session::start(&client, ip.as_deref()).await?;
            run_query(&client, &session, &options).await?;
        }
        Commands::Catalogs { kind } => {
            let catalog = client.catalog(kind).await?;
            print!("{}", display::format_catalog(kind, &catalog));
        }
    }

    Ok(())
}

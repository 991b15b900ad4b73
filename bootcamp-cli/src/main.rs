use anyhow::{Context, Result};
use bootcamp::{BootcampService, BootcampServiceBuilder, GeocoderConfig};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod commands;

/// Bootcamp directory CLI tool
#[derive(Parser)]
#[command(name = "bootcamp")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file holding the bootcamp collection
    #[arg(short, long, env = "BOOTCAMP_DATA_FILE", global = true)]
    data_file: Option<PathBuf>,

    /// Geocoding provider used by radius searches
    #[arg(
        long,
        env = "BOOTCAMP_GEOCODER_PROVIDER",
        value_enum,
        default_value = "static",
        global = true
    )]
    geocoder: GeocoderKind,

    /// JSON answers for the static geocoder
    #[arg(long, env = "BOOTCAMP_GEOCODER_FIXTURES", global = true)]
    geocoder_fixtures: Option<PathBuf>,

    /// MapQuest consumer key
    #[arg(long, env = "BOOTCAMP_GEOCODER_API_KEY", global = true, hide_env_values = true)]
    geocoder_api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GeocoderKind {
    Static,
    Mapquest,
}

#[derive(Subcommand)]
enum Commands {
    /// Import bootcamps from a JSON file (an array of bootcamps)
    Import {
        /// Input file
        input: PathBuf,
    },

    /// Delete every bootcamp
    Destroy,

    /// List bootcamps using the API's query syntax
    List {
        /// Query string, e.g. "averageCost[lte]=10000&sort=-averageRating&select=name"
        #[arg(short, long, default_value = "")]
        query: String,

        /// Output the page as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Find bootcamps within a distance of a postal code
    Radius {
        /// Postal code to search around
        zipcode: String,

        /// Distance in miles
        distance: f64,

        /// Output result as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Export located bootcamps as a GeoJSON FeatureCollection
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn geocoder_config(&self) -> Result<GeocoderConfig> {
        match self.geocoder {
            GeocoderKind::Static => Ok(GeocoderConfig::Static {
                fixtures: self.geocoder_fixtures.clone(),
            }),
            GeocoderKind::Mapquest => {
                let api_key = self.geocoder_api_key.clone().context(
                    "BOOTCAMP_GEOCODER_API_KEY environment variable not set. Use --geocoder-api-key or set BOOTCAMP_GEOCODER_API_KEY",
                )?;
                Ok(GeocoderConfig::MapQuest(
                    bootcamp::mapquest::MapQuestConfig::new(api_key),
                ))
            }
        }
    }

    fn service(&self) -> Result<BootcampService> {
        let data_file = self.data_file.as_ref().context(
            "BOOTCAMP_DATA_FILE environment variable not set. Use --data-file or set BOOTCAMP_DATA_FILE",
        )?;

        BootcampServiceBuilder::new()
            .data_file(data_file)
            .geocoder(self.geocoder_config()?)
            .build()
            .with_context(|| format!("Failed to open data file {}", data_file.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let service = cli.service()?;

    match cli.command {
        Commands::Import { input } => commands::import::run(&service, input).await,
        Commands::Destroy => commands::destroy::run(&service).await,
        Commands::List { query, json } => commands::list::run(&service, &query, json).await,
        Commands::Radius {
            zipcode,
            distance,
            json,
        } => commands::radius::run(&service, &zipcode, distance, json).await,
        Commands::Export { output } => commands::export::run(&service, output).await,
    }
}

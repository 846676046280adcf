use std::path::PathBuf;
use std::process;

use cavemap::scraper::{WebScraper, load_clean_records};
use cavemap::types::CleanRecord;
use cavemap::utils::{RecordFilter, RecordStats};
use cavemap::{DEFAULT_URL, MapOptions, MapRenderer};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "cavemap")]
#[command(about = "Scrapes the list of deepest caves and maps them", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args)]
struct Source {
    #[arg(
        long,
        default_value = DEFAULT_URL,
        conflicts_with = "input",
        help = "Page holding the cave table"
    )]
    url: String,

    #[arg(long, value_name = "FILE", help = "Read a saved copy of the page instead of fetching")]
    input: Option<PathBuf>,

    #[arg(long, value_name = "METRES", help = "Only keep caves at least this deep")]
    min_depth: Option<u32>,

    #[arg(
        long,
        help = "Maximum number of caves to keep",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    limit: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cleaned cave records
    List {
        #[command(flatten)]
        source: Source,

        #[arg(
            long,
            help = "Number of caves to skip from the beginning",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        offset: Option<u16>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Render the cave records as an interactive HTML map
    Map {
        #[command(flatten)]
        source: Source,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILE",
            default_value = "caves.html",
            help = "Where to save the map"
        )]
        output: PathBuf,

        #[arg(long, default_value_t = 2, help = "Initial zoom level")]
        zoom: u8,

        #[arg(long, default_value = "green", help = "Marker color (any CSS color)")]
        marker_color: String,

        #[arg(long, default_value = "Deepest caves", help = "Page title")]
        title: String,
    },
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

async fn load_records(source: &Source, offset: Option<u16>) -> Vec<CleanRecord> {
    let filter = RecordFilter {
        min_depth: source.min_depth,
        limit: source.limit.map(usize::from),
        offset: offset.map(usize::from),
    };

    let filter = filter.validate().unwrap_or_else(|e| {
        log::error!("Invalid args: {e}");
        process::exit(1);
    });

    let records = match &source.input {
        Some(path) => load_clean_records(path),
        None => {
            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });
            scraper.fetch_clean_records(&source.url).await
        }
    };

    let records = records.unwrap_or_else(|e| {
        log::error!("Error loading cave table: {}", e);
        process::exit(1);
    });

    log::info!("Cleaned {} cave records", records.len());
    filter.apply(records)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::List {
            source,
            offset,
            format,
        } => {
            let records = load_records(&source, offset).await;

            match format {
                OutputFormat::Json => serialize_json(&records),
                OutputFormat::Text => {
                    if records.is_empty() {
                        println!("No caves to display.");
                    } else {
                        for (i, record) in records.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, record);
                        }
                        print!("{}", RecordStats::from_records(&records));
                    }
                }
            }
        }

        Commands::Map {
            source,
            output,
            zoom,
            marker_color,
            title,
        } => {
            let records = load_records(&source, None).await;

            let renderer = MapRenderer::new(MapOptions {
                zoom,
                marker_color,
                title,
                ..MapOptions::default()
            });

            renderer.save(&records, &output).unwrap_or_else(|e| {
                log::error!("Error saving map: {}", e);
                process::exit(1);
            });

            println!("Saved {} caves to {}", records.len(), output.display());
        }
    }
}

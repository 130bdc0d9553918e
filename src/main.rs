use clap::{Parser, Subcommand, ValueEnum};
use nuremberg_archive::imaging::{HttpFetcher, probe_with_schedule};
use nuremberg_archive::scan::{self, ScanOptions};
use nuremberg_archive::types::{AuthorInput, DocumentEntry};
use nuremberg_archive::{config, generate, output, properties};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nuremberg-archive")]
#[command(about = "Author metadata and scanned page images for the trial document archive")]
#[command(long_about = "\
Author metadata and scanned page images for the trial document archive

Inputs are JSON exports of the archive database:

  author.json      {\"author\": {...}, \"ranks\": [...], \"properties\": [...]}
  documents.json   [{\"id\": 30, \"image_count\": 12, \"existing_pages\": [1, 2],
                     \"legacy_images\": [...]}, ...]

Settings (image server, probe tiers, worker count, HTTP timeout) are read
from config.toml in --config-dir. Run 'nuremberg-archive gen-config' to
generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log progress at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Json,
    Text,
    Html,
}

#[derive(Subcommand)]
enum Command {
    /// Aggregate an author's ranked properties
    Metadata {
        /// Author export (author, ranks, properties)
        input: PathBuf,
        #[arg(long, value_enum, default_value = "json")]
        format: Format,
    },
    /// Read JPEG dimensions from remote images
    Probe {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Populate missing page images for scanned documents
    ScanImages {
        /// Document export
        input: PathBuf,
        /// Only scan these document ids
        #[arg(long, num_args = 1..)]
        ids: Option<Vec<u32>>,
        /// Rescan pages that already have an image
        #[arg(long)]
        force: bool,
        /// Download each stored image below this directory
        #[arg(long)]
        download: Option<PathBuf>,
        /// Where to write the JSON report
        #[arg(long, default_value = "scan-report.json")]
        output: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Metadata { input, format } => {
            let input: AuthorInput = read_json(&input)?;
            let metadata =
                properties::aggregate(&input.author, &input.properties, &input.rank_table());
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&metadata)?),
                Format::Text => output::print_author_metadata(&metadata),
                Format::Html => {
                    println!("{}", generate::render_author_page(&metadata).into_string())
                }
            }
        }
        Command::Probe { urls } => {
            let config = config::load_config(&cli.config_dir)?;
            let fetcher = HttpFetcher::new(config.http.timeout());
            let schedule = config.probe.schedule();
            for url in &urls {
                let result = probe_with_schedule(&fetcher, url, &schedule);
                println!("{}", output::format_probe_result(url, &result));
            }
        }
        Command::ScanImages {
            input,
            ids,
            force,
            download,
            output: report_path,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let documents: Vec<DocumentEntry> = read_json(&input)?;
            let fetcher = HttpFetcher::new(config.http.timeout());
            let options = ScanOptions {
                ids,
                force,
                download_to: download,
            };

            let report = scan::scan(&documents, &fetcher, &config, &options)?;
            std::fs::write(&report_path, serde_json::to_string_pretty(&report)?)?;
            output::print_scan_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "nuremberg_archive=info"
    } else {
        "nuremberg_archive=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

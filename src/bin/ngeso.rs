//! ngeso CLI - Command-line interface for the National Grid ESO data portal.

use clap::{Parser, Subcommand};
use ngeso::{AccessMode, Config, DatasetRef, NgEso, QueryParams};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "ngeso")]
#[command(author, version, about = "Query National Grid ESO open data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query a datastore resource with SQL
    Query {
        /// Resource id (or package name with --package)
        resource: String,

        /// Treat RESOURCE as a catalogue package name
        #[arg(long)]
        package: bool,

        /// Column the date bounds apply to
        #[arg(short, long)]
        date_col: String,

        /// Start date, inclusive (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(short, long)]
        start: Option<String>,

        /// End date, inclusive (YYYY-MM-DD or YYYY-MM-DD HH:MM:SS)
        #[arg(short, long)]
        end: Option<String>,

        /// Extra SQL predicate, e.g. "\"Service\" = 'DCH'" (repeatable)
        #[arg(short, long)]
        filter: Vec<String>,

        /// Write the raw response here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show generated SQL query
        #[arg(long)]
        show_query: bool,
    },

    /// Download a resource file as-is
    Download {
        /// Resource id (or package name with --package)
        resource: String,

        /// Treat RESOURCE as a catalogue package name
        #[arg(long)]
        package: bool,

        /// Write the file here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Configure the portal client
    Config {
        /// Action API base URL
        #[arg(long)]
        base_url: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn open(resource: String, package: bool, mode: AccessMode) -> ngeso::Result<NgEso> {
    let config = Config::load()?;
    if package {
        NgEso::for_package(&resource, mode, config)
    } else {
        NgEso::with_config(DatasetRef::new(resource, mode), config)
    }
}

fn write_output(bytes: &[u8], output: Option<PathBuf>) -> std::io::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(&path, bytes)?;
            eprintln!("Saved {} bytes to {}", bytes.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query {
            resource,
            package,
            date_col,
            start,
            end,
            filter,
            output,
            show_query,
        } => {
            let client = open(resource, package, AccessMode::Query)?;

            let mut params = QueryParams::new().date_col(date_col);
            if let Some(start) = start {
                params = params.start(start);
            }
            if let Some(end) = end {
                params = params.end(end);
            }
            for fragment in filter {
                params = params.filter(fragment);
            }

            if show_query {
                let preview = ngeso::build_query_preview(client.dataset().resource_id(), &params);
                eprintln!("Query:\n{}\n", preview);
            }

            let body = client.query_with(&params)?;
            eprintln!("Retrieved {} records", ngeso::record_count(&body)?);
            write_output(&body, output)?;
        }

        Commands::Download {
            resource,
            package,
            output,
        } => {
            let client = open(resource, package, AccessMode::File)?;
            let body = client.download_file()?;
            write_output(&body, output)?;
        }

        Commands::Config {
            base_url,
            timeout,
            show,
        } => {
            if show {
                let config = Config::load()?;
                println!("ESO portal configuration:");
                println!("  Base URL:   {}", config.base_url);
                println!("  Timeout:    {}s", config.timeout.as_secs());
                println!("  User agent: {}", config.user_agent);
                return Ok(());
            }

            if base_url.is_none() && timeout.is_none() {
                println!("Use --base-url and --timeout to change settings, or --show to view.");
                return Ok(());
            }

            let mut config = Config::load().unwrap_or_default();
            if let Some(url) = base_url {
                config.base_url = url;
            }
            if let Some(secs) = timeout {
                config.timeout = Duration::from_secs(secs);
            }

            let path = config.save()?;
            println!("Configuration saved to {}.", path.display());
        }
    }

    Ok(())
}

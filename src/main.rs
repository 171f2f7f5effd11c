//! Contact-Harvest main entry point
//!
//! This is the command-line interface for the Contact-Harvest crawler.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use contact_harvest::config::{load_config_or_default, validate, Config, ExportFormat};
use contact_harvest::{Job, JobRunner, JobStatus};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Contact-Harvest: a bounded contact crawler
///
/// Crawls a small neighbourhood of each site, mines email addresses and phone
/// numbers, validates them with a language model and exports the result.
#[derive(Parser, Debug)]
#[command(name = "contact-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A bounded contact crawler with model-assisted enrichment", long_about = None)]
struct Cli {
    /// Sites to crawl
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum pages to fetch per site
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Maximum link depth from each seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Skip model enrichment
    #[arg(long)]
    no_enrich: bool,

    /// Export format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Directory receiving the export
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Webhook receiving the final contact list
    #[arg(long, value_name = "URL")]
    webhook: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Sqlite,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => ExportFormat::Markdown,
            FormatArg::Sqlite => ExportFormat::Sqlite,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("failed to load configuration")?;
    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    let runner = JobRunner::new(config)?;
    let (id, handle) = runner.submit(cli.urls.clone())?;
    handle.await.context("job task failed")?;

    let job = runner
        .registry()
        .get(id)
        .ok_or_else(|| contact_harvest::HarvestError::JobNotFound(id.to_string()))?;
    print_report(&job);

    if job.status == JobStatus::Error {
        anyhow::bail!(
            "job failed: {}",
            job.error_message.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if cli.no_enrich {
        config.enrichment.enabled = false;
    }
    if let Some(format) = cli.format {
        config.output.format = format.into();
    }
    if let Some(output) = &cli.output {
        config.output.directory = output.display().to_string();
    }
    if let Some(webhook) = &cli.webhook {
        config.webhook.url = Some(webhook.clone());
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("contact_harvest=info,warn"),
            1 => EnvFilter::new("contact_harvest=debug,info"),
            2 => EnvFilter::new("contact_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn print_report(job: &Job) {
    println!("\n=== Contact-Harvest ===\n");

    for (index, site) in job.sites.iter().enumerate() {
        println!(
            "[{}/{}] {} -> {} ({} contacts, {} pages)",
            index + 1,
            job.urls.len(),
            site.url,
            site.status,
            site.contacts,
            site.visited_pages
        );
    }

    println!("\nStatus: {}", job.status);
    println!("  Pages visited: {}", job.visited_pages);
    println!("  Links explored: {}", job.explored_links);
    println!("  Contacts: {}", job.contacts().len());

    match job.status {
        JobStatus::Ok => {
            for contact in job.contacts() {
                let verdict = match contact.validated {
                    Some(true) => " [valid]",
                    Some(false) => " [invalid]",
                    None => "",
                };
                println!("  - {}: {}{}", contact.kind, contact.value, verdict);
            }
        }
        JobStatus::Restricted | JobStatus::NotFound => {
            if !job.errors.is_empty() {
                println!("\nDetails:");
                for error in &job.errors {
                    println!("  - {}", error);
                }
            }
        }
        _ => {}
    }

    if !job.notes.is_empty() {
        println!("\nNotes:");
        for note in &job.notes {
            println!("  - {}", note);
        }
    }

    if let Some(path) = &job.export_path {
        println!("\nExported to: {}", path.display());
    }

    if let Some(delivery) = &job.webhook {
        match (delivery.success, delivery.status) {
            (true, Some(status)) => println!("Webhook delivered ({})", status),
            (true, None) => println!("Webhook delivered"),
            (false, _) => println!(
                "Webhook failed: {}",
                delivery.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

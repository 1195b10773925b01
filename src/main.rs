//! Wraith main entry point
//!
//! This is the command-line interface for the Wraith link crawler.

use anyhow::Context;
use clap::{ArgAction, Parser};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use wraith::archive::ArchiveClient;
use wraith::config::{load_config, parse_headers, validate, Config};
use wraith::crawler::{HttpFetcher, Supervisor};
use wraith::output::{write_records, Deduplicator, RecordFormat};
use wraith::ConfigError;

/// Wraith: a scoped link crawler
///
/// Reads seed URLs from stdin, one per line, crawls each within its host
/// and depth limits, and prints every link, script source and form action
/// it finds. Diagnostics go to stderr.
#[derive(Parser, Debug)]
#[command(name = "wraith")]
#[command(version = "1.0.0")]
#[command(about = "A scoped, depth-bounded link crawler", long_about = None)]
#[command(disable_help_flag = true)]
struct Cli {
    /// Only crawl inside path
    #[arg(short, long)]
    inside: bool,

    /// Number of threads to utilise [default: 16]
    #[arg(short, long)]
    threads: Option<u32>,

    /// Depth to crawl [default: 4]
    #[arg(short, long)]
    depth: Option<u32>,

    /// Page size limit, in KB, -1 for unlimited [default: -1]
    #[arg(long, allow_hyphen_values = true)]
    size: Option<i64>,

    /// Disable TLS verification
    #[arg(long)]
    insecure: bool,

    /// Include subdomains for crawling
    #[arg(long)]
    subs: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Show the source of URL based on where it was found (href, form, script, etc.)
    #[arg(short = 's', long)]
    show_source: bool,

    /// Show at which link the URL is found
    #[arg(short = 'w', long)]
    show_where: bool,

    /// Custom headers separated by two semi-colons, e.g. -h "Cookie: foo=bar;;Referer: http://example.com/"
    #[arg(short = 'h', long)]
    headers: Option<String>,

    /// Show only unique URLs
    #[arg(short, long)]
    unique: bool,

    /// Proxy URL, e.g. --proxy http://127.0.0.1:8080
    #[arg(long, env = "PROXY")]
    proxy: Option<String>,

    /// Maximum time to crawl each URL from stdin, in seconds, -1 for unlimited [default: 360]
    #[arg(long, allow_hyphen_values = true)]
    timeout: Option<i64>,

    /// Disable following HTTP redirects
    #[arg(long = "disable-redirects", visible_alias = "dr")]
    disable_redirects: bool,

    /// Crawl for URLs inside JavaScript files
    #[arg(long)]
    crawl_js: bool,

    /// Fetch URLs from the Wayback Machine and crawl them
    #[arg(long)]
    wayback: bool,

    /// Path to TOML configuration file; flags override its values
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if std::io::stdin().is_terminal() {
        return Err(ConfigError::NoInput.into());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries results only.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wraith=info,warn"),
            1 => EnvFilter::new("wraith=debug,info"),
            2 => EnvFilter::new("wraith=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file, if any, and layers the command-line flags on top
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_flags(cli, &mut config)?;
    validate(&config).context("Invalid configuration")?;

    Ok(config)
}

fn apply_flags(cli: &Cli, config: &mut Config) -> Result<(), ConfigError> {
    if let Some(threads) = cli.threads {
        config.crawler.threads = threads;
    }
    if let Some(depth) = cli.depth {
        config.crawler.max_depth = depth;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.timeout = timeout;
    }
    config.crawler.inside_only |= cli.inside;
    config.crawler.include_subdomains |= cli.subs;
    config.crawler.crawl_js |= cli.crawl_js;

    if let Some(size) = cli.size {
        config.http.max_size_kb = size;
    }
    if let Some(raw) = &cli.headers {
        config.http.headers.extend(parse_headers(raw)?);
    }
    if let Some(proxy) = cli.proxy.as_deref().filter(|p| !p.is_empty()) {
        config.http.proxy = Some(proxy.to_string());
    }
    config.http.insecure |= cli.insecure;
    config.http.disable_redirects |= cli.disable_redirects;

    config.output.json |= cli.json;
    config.output.show_source |= cli.show_source;
    config.output.show_where |= cli.show_where;
    config.output.unique |= cli.unique;

    config.archive.enabled |= cli.wayback;

    Ok(())
}

/// Runs the crawl over stdin and streams results to stdout
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::debug!(
        "Crawling with {} threads, depth {}, timeout {}s",
        config.crawler.threads,
        config.crawler.max_depth,
        config.crawler.timeout
    );

    let fetcher = Arc::new(HttpFetcher::new(&config.http).context("Failed to build HTTP client")?);

    let mut supervisor = Supervisor::new(&config, fetcher.clone());
    if config.archive.enabled {
        supervisor = supervisor.with_archive(ArchiveClient::new(
            fetcher.client().clone(),
            config.archive.endpoint.clone(),
        ));
    }

    let dedup = config.output.unique.then(|| Arc::new(Deduplicator::new()));
    let format = RecordFormat::from_config(&config.output);

    let (tx, rx) = mpsc::channel(config.crawler.threads as usize);
    let consumer = tokio::spawn(write_records(rx, tokio::io::stdout(), format, dedup));

    let report = supervisor
        .run(BufReader::new(tokio::io::stdin()), tx)
        .await
        .context("Crawl failed")?;

    let written = consumer.await.context("Output task panicked")??;
    tracing::debug!(
        "{} of {} records written",
        written,
        report.records_emitted
    );

    Ok(())
}

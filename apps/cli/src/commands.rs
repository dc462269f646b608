//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{info, warn};

use wpmigrate_core::{
    ItemKind, MigrationOptions, MigrationReport, ProgressReporter, Tally, run_migration,
};
use wpmigrate_shared::{
    AppConfig, DestinationSettings, FetchErrorPolicy, MigrationSettings, Overrides,
    SourceSettings, init_config, load_config, load_config_from, read_token,
};
use wpmigrate_source::{WordPressSource, http_client};
use wpmigrate_store::{ImageSize, MemoryStore, SanityClient, image_url, queries};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// wpmigrate: move WordPress posts and pages into Sanity.
#[derive(Parser)]
#[command(
    name = "wpmigrate",
    version,
    about = "Migrate WordPress posts, pages and categories into a Sanity dataset.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.wpmigrate/wpmigrate.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Destination selection shared by every command that talks to the store.
#[derive(clap::Args, Debug, Default)]
pub(crate) struct DestinationArgs {
    /// Sanity project id.
    #[arg(long, env = "SANITY_PROJECT_ID")]
    pub project_id: Option<String>,

    /// Sanity dataset.
    #[arg(long, env = "SANITY_DATASET")]
    pub dataset: Option<String>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the one-shot migration.
    Migrate {
        /// Source site base URL.
        #[arg(long, env = "WORDPRESS_URL")]
        wordpress_url: Option<String>,

        #[command(flatten)]
        destination: DestinationArgs,

        /// Items per listing request (1-100).
        #[arg(long)]
        per_page: Option<u32>,

        /// What to do when a listing page fails: truncate or abort.
        #[arg(long)]
        on_fetch_error: Option<FetchErrorPolicy>,

        /// Write into an in-memory store instead of Sanity.
        #[arg(long)]
        dry_run: bool,
    },

    /// Query migrated content and print it as JSON.
    Query {
        #[command(flatten)]
        destination: DestinationArgs,

        #[command(subcommand)]
        target: QueryTarget,
    },

    /// Print the CDN URL for an image asset.
    ImageUrl {
        /// Asset id, e.g. image-<hash>-1200x800-jpg.
        asset_id: String,

        #[command(flatten)]
        destination: DestinationArgs,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Read-side queries.
#[derive(Subcommand)]
pub(crate) enum QueryTarget {
    /// All blog posts, newest first.
    Posts,
    /// One blog post by slug.
    Post { slug: String },
    /// All pages.
    Pages,
    /// One page by slug.
    Page { slug: String },
    /// A navigation menu by id.
    Nav { menu_id: String },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "wpmigrate=info",
        1 => "wpmigrate=debug",
        _ => "wpmigrate=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    match cli.command {
        Command::Migrate {
            wordpress_url,
            destination,
            per_page,
            on_fetch_error,
            dry_run,
        } => {
            let overrides = Overrides {
                wordpress_url,
                project_id: destination.project_id,
                dataset: destination.dataset,
                per_page,
                on_fetch_error,
            };
            if dry_run {
                cmd_migrate_dry_run(&config, &overrides).await
            } else {
                cmd_migrate(&config, &overrides).await
            }
        }
        Command::Query {
            destination,
            target,
        } => cmd_query(&config, &destination.into(), target).await,
        Command::ImageUrl {
            asset_id,
            destination,
            width,
            height,
        } => cmd_image_url(&config, &destination.into(), &asset_id, ImageSize { width, height }),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

impl From<DestinationArgs> for Overrides {
    fn from(args: DestinationArgs) -> Self {
        Self {
            project_id: args.project_id,
            dataset: args.dataset,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// migrate
// ---------------------------------------------------------------------------

async fn cmd_migrate(config: &AppConfig, overrides: &Overrides) -> Result<()> {
    // Fail on missing settings before any network traffic.
    let settings = MigrationSettings::resolve(config, overrides, read_token(config))?;

    info!(
        source = %settings.source.base_url,
        project = %settings.destination.project_id,
        dataset = %settings.destination.dataset,
        on_fetch_error = %settings.on_fetch_error,
        "starting migration"
    );

    let source = WordPressSource::new(&settings.source, settings.on_fetch_error)?;
    let store = SanityClient::new(&settings.destination)?;
    let http = http_client(settings.source.timeout)?;

    let reporter = CliProgress::new();
    let report = run_migration(
        &source,
        &store,
        http,
        &MigrationOptions::from(&settings),
        &reporter,
    )
    .await?;

    print_report(&report, &format!(
        "{}/{}",
        settings.destination.project_id, settings.destination.dataset
    ));
    Ok(())
}

async fn cmd_migrate_dry_run(config: &AppConfig, overrides: &Overrides) -> Result<()> {
    let source_settings = SourceSettings::resolve(config, overrides)?;
    let policy = overrides
        .on_fetch_error
        .unwrap_or(config.migration.on_fetch_error);

    info!(source = %source_settings.base_url, "starting dry run");

    let source = WordPressSource::new(&source_settings, policy)?;
    let store = MemoryStore::new();
    let http = http_client(source_settings.timeout)?;
    let options = MigrationOptions {
        page_type: config.migration.page_type.clone(),
        unknown_author: config.migration.unknown_author.clone(),
    };

    let reporter = CliProgress::new();
    let report = run_migration(&source, &store, http, &options, &reporter).await?;

    print_report(&report, "in-memory store (dry run)");
    println!("  Assets:     {} uploaded", store.assets().len());
    println!();
    Ok(())
}

fn print_report(report: &MigrationReport, destination: &str) {
    println!();
    println!("  Migration finished");
    println!("  Destination: {destination}");
    println!(
        "  Fetched:    {} posts, {} pages",
        report.posts_fetched, report.pages_fetched
    );
    print_tally("Categories", &report.categories);
    print_tally("Posts", &report.posts);
    print_tally("Pages", &report.pages);
    if report.posts_skipped + report.pages_skipped > 0 {
        println!(
            "  Skipped:    {} posts, {} pages (unreadable source items)",
            report.posts_skipped, report.pages_skipped
        );
    }
    if let Some(page) = report.posts_failed_page {
        println!("  Warning:    post listing stopped at page {page}");
    }
    if let Some(page) = report.pages_failed_page {
        println!("  Warning:    page listing stopped at page {page}");
    }
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.failures() > 0 {
        warn!(failures = report.failures(), "some items were not migrated; see log above");
    }
}

fn print_tally(label: &str, tally: &Tally) {
    println!("  {:<11} {tally}", format!("{label}:"));
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item_finished(&self, kind: ItemKind, label: &str, current: usize, total: usize, ok: bool) {
        let mark = if ok { "ok" } else { "failed" };
        self.spinner
            .set_message(format!("Migrating {kind} [{current}/{total}] {label} ({mark})"));
    }

    fn done(&self, _report: &MigrationReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// query / image-url
// ---------------------------------------------------------------------------

async fn cmd_query(config: &AppConfig, overrides: &Overrides, target: QueryTarget) -> Result<()> {
    let settings = DestinationSettings::resolve(config, overrides, read_token(config))?;
    let client = SanityClient::new(&settings)?;
    info!(project = client.project_id(), dataset = client.dataset(), "querying content store");

    match target {
        QueryTarget::Posts => print_json(&queries::all_blog_posts(&client).await?),
        QueryTarget::Post { slug } => {
            let post = queries::blog_post_by_slug(&client, &slug)
                .await?
                .ok_or_else(|| eyre!("no blog post with slug '{slug}'"))?;
            print_json(&post)
        }
        QueryTarget::Pages => print_json(&queries::all_pages(&client).await?),
        QueryTarget::Page { slug } => {
            let page = queries::page_by_slug(&client, &slug)
                .await?
                .ok_or_else(|| eyre!("no page with slug '{slug}'"))?;
            print_json(&page)
        }
        QueryTarget::Nav { menu_id } => {
            let nav = queries::navigation_by_menu_id(&client, &menu_id)
                .await?
                .ok_or_else(|| eyre!("no navigation with menu id '{menu_id}'"))?;
            print_json(&nav)
        }
    }
}

fn cmd_image_url(
    config: &AppConfig,
    overrides: &Overrides,
    asset_id: &str,
    size: ImageSize,
) -> Result<()> {
    let settings = DestinationSettings::resolve(config, overrides, None)?;
    let url = image_url(&settings.project_id, &settings.dataset, asset_id, size)?;
    println!("{url}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use photo_search::client::ApiClient;
use photo_search::config::{
    find_config_file, load_config, write_config_file, Config, LogFormat, ENV_PREFIX,
};
use photo_search::controller::{ControllerSettings, SearchController};
use photo_search::models::{Status, UiState};
use photo_search::sources::PexelsDataSource;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Photo Search - Search Pexels photos from the command line
#[derive(Parser, Debug)]
#[command(name = "photo-search")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Debounced, paginated photo search against the Pexels API", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for photos and print the loaded results
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// Number of pages to load
        #[arg(long, short, default_value_t = 1)]
        pages: u32,

        /// Photos per page (overrides the configured value)
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Type queries line by line and watch the search state change
    #[command(alias = "i")]
    Interactive,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write the file (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration with credentials redacted
    Show,
}

/// A line typed into the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
enum ReplCommand {
    Query(String),
    More,
    Retry,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            ":more" | ":m" => ReplCommand::More,
            ":retry" | ":r" => ReplCommand::Retry,
            ":quit" | ":q" => ReplCommand::Quit,
            _ if line.starts_with(':') => ReplCommand::Unknown(line.to_string()),
            _ => ReplCommand::Query(line.to_string()),
        }
    }
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Photo Search - Environment Variables");
    println!();
    println!("Credentials:");
    println!("  PEXELS_API_KEY                      Pexels API key (default for api.api_key)");
    println!("  {ENV_PREFIX}__API__API_KEY          API key, overrides the config file");
    println!("  {ENV_PREFIX}__API__BEARER_TOKEN     Bearer token, used when no API key is set");
    println!();
    println!("Endpoint:");
    println!("  {ENV_PREFIX}__API__BASE_URL         API base URL (default: https://api.pexels.com/)");
    println!();
    println!("Search:");
    println!("  {ENV_PREFIX}__SEARCH__PER_PAGE      Photos per page (default: 20)");
    println!("  {ENV_PREFIX}__SEARCH__DEBOUNCE_MS   Quiet period before searching (default: 500)");
    println!();
    println!("HTTP:");
    println!("  {ENV_PREFIX}__HTTP__TIMEOUT_SECS          Request timeout (default: 30)");
    println!("  {ENV_PREFIX}__HTTP__CONNECT_TIMEOUT_SECS  Connect timeout (default: 10)");
    println!("  {ENV_PREFIX}__HTTP__USER_AGENT            User agent header");
    println!();
    println!("Logging:");
    println!("  {ENV_PREFIX}__LOGGING__LEVEL        Log level (default: info)");
    println!("  {ENV_PREFIX}__LOGGING__FORMAT       text or json (default: text)");
    println!("  RUST_LOG                            Full tracing filter, overrides the above");
    println!();
    println!("Example:");
    println!("  export PEXELS_API_KEY=\"your-key-here\"");
    println!("  photo-search search nature --pages 2");
    std::process::exit(0);
}

fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("photo_search={}", level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    match config.logging.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn build_controller(config: &Config, settings: ControllerSettings) -> Result<SearchController> {
    let credentials = config.api.credentials();
    if credentials.is_none() {
        tracing::warn!("No API credentials configured; set PEXELS_API_KEY or api.api_key");
    }

    let session = config
        .http
        .build_session()
        .context("Failed to build HTTP client")?;
    let client = ApiClient::new(Arc::new(session), config.api.endpoint()?, credentials);
    let source = PexelsDataSource::new(client);

    Ok(SearchController::spawn(Arc::new(source), settings))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    match cli.command {
        Some(Commands::Search {
            query,
            pages,
            per_page,
        }) => {
            // Nothing is being typed, so there is nothing to debounce
            let mut settings = config
                .search
                .controller_settings()
                .debounce(Duration::ZERO);
            if let Some(per_page) = per_page {
                settings = settings.per_page(per_page);
            }

            let controller = build_controller(&config, settings)?;
            let state = run_search(&controller, &query, pages).await?;

            if !cli.quiet {
                eprintln!(
                    "Loaded {} of {} photos for \"{}\" ({})",
                    state.items.len(),
                    state.total_count,
                    state.query,
                    state.status
                );
            }
            output_state(&state, cli.output)?;

            if state.status == Status::Error {
                anyhow::bail!("Search failed; run with -v for details");
            }
        }
        Some(Commands::Interactive) => {
            let controller = build_controller(&config, config.search.controller_settings())?;
            run_interactive(&controller, cli.quiet).await?;
        }
        Some(Commands::Config { action }) => match action {
            ConfigCommands::Init { path, force } => {
                let path = match path {
                    Some(path) => path,
                    None => dirs::config_dir()
                        .map(|dir| dir.join("photo-search").join("config.toml"))
                        .context("Could not determine the user config directory")?,
                };

                let mut defaults = Config::default();
                defaults.api.api_key = None;
                write_config_file(&defaults, &path, force)?;
                println!("Wrote {}", path.display());
            }
            ConfigCommands::Show => {
                let shown = toml::to_string_pretty(&config.redacted())?;
                print!("{}", shown);
            }
        },
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

/// Search for `query` and load up to `pages` pages, returning the final state
async fn run_search(controller: &SearchController, query: &str, pages: u32) -> Result<UiState> {
    // An empty query never fetches, so there is nothing to wait for
    if query.is_empty() {
        return Ok(controller.state());
    }

    controller.on_query_changed(query);
    let mut state = controller
        .wait_for(|s| s.status.is_settled())
        .await
        .context("Search controller stopped unexpectedly")?;

    for _ in 1..pages {
        if state.status != Status::Loaded || !state.has_more() {
            break;
        }
        state = load_next_page(controller).await?;
    }

    Ok(state)
}

/// Request the next page and wait for the fetch to settle, whatever it returns
async fn load_next_page(controller: &SearchController) -> Result<UiState> {
    let mut states = controller.subscribe();
    states.borrow_and_update();
    controller.load_more_items();

    loop {
        states
            .changed()
            .await
            .context("Search controller stopped unexpectedly")?;
        let state = states.borrow_and_update().clone();
        if state.status.is_settled() {
            return Ok(state);
        }
    }
}

async fn run_interactive(controller: &SearchController, quiet: bool) -> Result<()> {
    if !quiet {
        eprintln!("Type a query to search. Commands: :more, :retry, :quit");
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut states = controller.subscribe();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ReplCommand::parse(&line) {
                    ReplCommand::Query(query) => controller.on_query_changed(query),
                    ReplCommand::More => controller.load_more_items(),
                    ReplCommand::Retry => controller.retry(),
                    ReplCommand::Quit => break,
                    ReplCommand::Unknown(command) => {
                        eprintln!("Unknown command: {}", command);
                    }
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                println!("{}", status_line(&state));
            }
        }
    }

    Ok(())
}

fn status_line(state: &UiState) -> String {
    let more = if state.has_more() { " +" } else { "" };
    format!(
        "[{}] \"{}\" {}/{}{}",
        state.status,
        state.query,
        state.items.len(),
        state.total_count,
        more
    )
}

fn output_state(state: &UiState, format: OutputFormat) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if std::io::stdout().is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(state)?);
        }
        OutputFormat::Plain => {
            for photo in &state.items {
                println!("{}", photo.id);
                if let Some(ref url) = photo.thumbnail_url {
                    println!("  Thumbnail: {}", url);
                }
                if let Some(ref url) = photo.preview_url {
                    println!("  Preview: {}", url);
                }
                println!();
            }
        }
        OutputFormat::Table => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["#", "ID", "Thumbnail", "Preview"]);

            let url_cell = |url: &Option<url::Url>| {
                Cell::new(url.as_ref().map(|u| u.to_string()).unwrap_or_default())
            };

            for (index, photo) in state.items.iter().enumerate() {
                table.add_row(vec![
                    Cell::new(index + 1),
                    Cell::new(photo.id).add_attribute(Attribute::Bold),
                    url_cell(&photo.thumbnail_url),
                    url_cell(&photo.preview_url),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Auto => unreachable!(),
    }

    Ok(())
}

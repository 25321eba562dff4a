// crates/openbroker-cli/src/main.rs
// ============================================================================
// Module: OpenBroker CLI Entry Point
// Description: Command dispatcher for serving and checking a broker setup.
// Purpose: Run the in-memory broker over HTTP and validate configuration.
// Dependencies: clap, openbroker-api, openbroker-config, openbroker-core, tokio, tracing.
// ============================================================================

//! ## Overview
//! The `openbroker` binary serves the in-memory reference broker over the
//! configured catalog and offers offline checks for configuration and
//! catalog files. Logs go to stderr; command output goes to stdout.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use openbroker_api::BrokerServer;
use openbroker_config::OpenBrokerConfig;
use openbroker_core::Catalog;
use openbroker_core::InMemoryBroker;
use openbroker_core::runtime::response::CatalogResponse;
use thiserror::Error;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the log filter.
const LOG_ENV: &str = "OPENBROKER_LOG";
/// Log filter used when [`LOG_ENV`] is unset or blank.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "openbroker", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the in-memory broker over HTTP.
    Serve(ServeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to openbroker.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL used to build instance dashboard URLs.
    #[arg(long, value_name = "URL")]
    dashboard_base: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate an OpenBroker configuration file.
    Validate(ConfigArgs),
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Print the configured catalog as served by `GET /v2/catalog`.
    Show(ConfigArgs),
}

/// Shared config path argument.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to openbroker.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("openbroker {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        write_stdout_line("usage: openbroker <serve|config|catalog> [--config PATH]")
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Catalog {
            command,
        } => command_catalog(command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    init_tracing(std::env::var(LOG_ENV).ok().as_deref())?;
    let config = OpenBrokerConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let broker = build_broker(&config, command.dashboard_base)?;
    let server = BrokerServer::from_config(&config, Arc::new(broker))
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the in-memory broker over the configured catalog.
fn build_broker(
    config: &OpenBrokerConfig,
    dashboard_base: Option<String>,
) -> CliResult<InMemoryBroker> {
    let catalog = config
        .load_catalog()
        .map_err(|err| CliError::new(format!("catalog load failed: {err}")))?;
    if catalog.services().is_empty() {
        warn!("catalog is empty; provision requests will be rejected");
    } else {
        info!(services = catalog.services().len(), "catalog loaded");
    }
    let broker = InMemoryBroker::new(catalog);
    Ok(match dashboard_base {
        Some(base) => broker.with_dashboard_base(base),
        None => broker,
    })
}

/// Installs the stderr log subscriber.
fn init_tracing(env_filter: Option<&str>) -> CliResult<()> {
    let filter = EnvFilter::try_new(log_filter(env_filter))
        .map_err(|err| CliError::new(format!("invalid {LOG_ENV}: {err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|err| CliError::new(format!("log init failed: {err}")))
}

/// Returns the log filter directive for an optional env value.
fn log_filter(env_value: Option<&str>) -> &str {
    match env_value.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => DEFAULT_LOG_FILTER,
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => command_config_validate(&args),
    }
}

/// Executes the config validation command.
fn command_config_validate(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = OpenBrokerConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    config.load_catalog().map_err(|err| CliError::new(format!("catalog load failed: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Catalog Commands
// ============================================================================

/// Dispatches catalog subcommands.
fn command_catalog(command: CatalogCommand) -> CliResult<ExitCode> {
    match command {
        CatalogCommand::Show(args) => command_catalog_show(&args),
    }
}

/// Prints the configured catalog.
fn command_catalog_show(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = OpenBrokerConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))?;
    let catalog = config
        .load_catalog()
        .map_err(|err| CliError::new(format!("catalog load failed: {err}")))?;
    let rendered = render_catalog(catalog)?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Renders a catalog as the pretty-printed catalog response body.
fn render_catalog(catalog: Catalog) -> CliResult<String> {
    let response = CatalogResponse {
        services: catalog.into_services(),
    };
    serde_json::to_string_pretty(&response)
        .map_err(|err| CliError::new(format!("catalog render failed: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

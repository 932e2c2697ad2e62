use crate::{
    env::EnvManager,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use commands::Commands;
use connectors::{
    adapter,
    copy::registry::CopyAdapterRegistry,
    sql::{
        base::{connection::Connection, recording::RecordingConnection},
        teradata::copy::TeradataTptAdapter,
    },
};
use engine_config::settings::{ImportSettings, SettingsValidator, ValidatedSettings};
use engine_core::{importer::TableImporter, state::ImportResult};
use model::core::backend::BackendKind;
use std::{path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(name = "stageload", version = "0.1.0", about = "Warehouse staging import tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so that plan output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let code = match run(cli.command, &shutdown).await {
        Ok(()) => ExitCode::Success,
        Err(CliError::ShutdownRequested) => {
            warn!("Import interrupted");
            ExitCode::ShutdownRequested
        }
        Err(e) => {
            error!("{e}");
            ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn run(command: Commands, shutdown: &ShutdownCoordinator) -> Result<(), CliError> {
    match command {
        Commands::Import {
            config,
            env_file,
            output,
        } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            let result = import(&settings, shutdown).await?;
            match output {
                Some(path) => output::write_result(&result, &path).await?,
                None => output::print_result(&result)?,
            }
        }
        Commands::Plan { config, env_file } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            plan(&settings).await?;
        }
        Commands::Validate { config, env_file } => {
            let settings = load_settings(&config, env_file.as_deref())?;
            info!(
                backend = %settings.backend(),
                source = %settings.source().kind(),
                destination = %settings.destination().name,
                "Settings are valid"
            );
            println!("{}", serde_json::to_string_pretty(settings.options())?);
        }
        Commands::TestConn { backend, url } => {
            let backend: BackendKind = backend.parse().map_err(CliError::Config)?;
            conn::ping(backend, &url).await?;
        }
    }

    Ok(())
}

fn load_settings(path: &str, env_file: Option<&str>) -> Result<ValidatedSettings, CliError> {
    let mut env = EnvManager::new();
    if let Some(env_file) = env_file {
        env.load_from_file(env_file)?;
    }
    let raw = ImportSettings::load(Path::new(path), &|name: &str| env.get(name))?;
    Ok(SettingsValidator::new(&raw).validate()?)
}

fn table_importer(
    settings: &ValidatedSettings,
    conn: Arc<dyn Connection>,
    registry: CopyAdapterRegistry,
) -> TableImporter {
    let importer = TableImporter::new(conn, registry).with_typed_staging(settings.typed_staging());
    match settings.timestamp() {
        Some(ts) => importer.with_timestamp(ts),
        None => importer,
    }
}

async fn import(
    settings: &ValidatedSettings,
    shutdown: &ShutdownCoordinator,
) -> Result<ImportResult, CliError> {
    let url = settings
        .connection_url()
        .ok_or(CliError::MissingConnectionUrl)?;
    let conn = adapter::connect(settings.backend(), url).await?;

    let tpt = settings.loader().map(|config| {
        TeradataTptAdapter::new(config.clone()).with_cancellation(shutdown.cancel_token())
    });
    let importer = table_importer(settings, conn, CopyAdapterRegistry::with_defaults(tpt));

    let outcome = importer
        .import_table(settings.source(), settings.destination(), settings.options())
        .await;
    match outcome {
        Err(e) if shutdown.is_shutdown_requested() => {
            error!("Import stopped after shutdown request: {e}");
            Err(CliError::ShutdownRequested)
        }
        other => Ok(other?),
    }
}

/// Runs the import against a recording connection and prints what it sent.
/// External loaders are never started.
async fn plan(settings: &ValidatedSettings) -> Result<(), CliError> {
    let conn = Arc::new(RecordingConnection::new(settings.backend()));
    let importer = table_importer(settings, conn.clone(), CopyAdapterRegistry::with_defaults(None));

    let outcome = importer
        .import_table(settings.source(), settings.destination(), settings.options())
        .await;
    output::print_statements(&conn.statements().await);
    outcome?;
    Ok(())
}

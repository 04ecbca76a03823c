mod config;
mod logging;
mod signals;
mod statsd;

use api::Dispatcher;
use api::db::{CredentialsError, DbError, PgDatabase, ReadOnlyCredentials};
use clap::{Args, Parser, Subcommand};
use config::{Config, ConfigError};
use projects::LoadError;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "devstats-api", about = "JSON API over the devstats project databases")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve the API until a fatal signal arrives
    Serve(ConfigArgs),
    /// Print the project to database mapping and exit
    Projects(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(long)]
    config_file: Option<PathBuf>,
}

impl CliCommand {
    fn config_file(&self) -> Option<&PathBuf> {
        match self {
            CliCommand::Serve(args) | CliCommand::Projects(args) => args.config_file.as_ref(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error(transparent)]
    Projects(#[from] LoadError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Metrics(#[from] statsd::MetricsError),
    #[error(transparent)]
    Api(#[from] api::ApiError),
    #[error("runtime error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Exiting due to signal {0}")]
    Signal(&'static str),
    #[error("API server exited without error, returning error state anyway")]
    ServerExited,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(cli.command.config_file().map(PathBuf::as_path), |name| {
        std::env::var(name).ok()
    }) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let sentry_guard = logging::init(config.common.logging.as_ref());

    if let Err(e) = run(cli.command, config) {
        tracing::error!(error = %e, "Exiting");
        drop(sentry_guard);
        process::exit(1);
    }
}

fn run(command: CliCommand, config: Config) -> Result<(), CliError> {
    if let Some(metrics_config) = &config.common.metrics {
        statsd::init(metrics_config)?;
    }

    match command {
        CliCommand::Serve(_) => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(config))
        }
        CliCommand::Projects(_) => list_projects(&config),
    }
}

async fn serve(config: Config) -> Result<(), CliError> {
    tracing::info!("Starting API serve");

    let credentials = ReadOnlyCredentials::from_env()?;
    let path = config.projects.path();
    let registry = projects::load_registry(&config.projects)?;
    tracing::info!(
        path = %path.display(),
        keys = registry.len(),
        "Project registry built"
    );

    let mut signals = signals::FatalSignals::register()?;

    let database = Arc::new(PgDatabase::new(credentials, &config.api.database)?);
    let dispatcher = Dispatcher::with_default_handlers(Arc::new(registry), database);

    tokio::select! {
        signal = signals.recv() => Err(CliError::Signal(signal)),
        result = api::run(&config.api, dispatcher) => {
            result?;
            Err(CliError::ServerExited)
        }
    }
}

fn list_projects(config: &Config) -> Result<(), CliError> {
    let registry = projects::load_registry(&config.projects)?;
    for (key, database) in registry.iter() {
        println!("{key} -> {database}");
    }
    Ok(())
}

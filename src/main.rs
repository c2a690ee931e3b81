use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use update_checker::config::{CacheBackend, UpdaterConfig, data_dir, db_path, log_path};
use update_checker::package::identifier::PackageIdentifier;
use update_checker::package::types::Package;
use update_checker::version::checker::UpdateChecker;
use update_checker::version::registry::RegistryClient;
use update_checker::version::store::KeyValueStore;
use update_checker::version::stores::{MemoryStore, SqliteStore};
use update_checker::version::transports::HttpTransport;
use update_checker::version::transports::http::user_agent;

#[derive(Parser)]
#[command(name = "update-checker")]
#[command(version, about = "Checks installed plugins and themes against an update registry")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct PackageArgs {
    /// Identifier the registry knows the package by
    #[arg(long)]
    package_id: String,

    /// Directory the package is installed in
    #[arg(long)]
    directory: String,

    /// Main plugin file, or any file of a theme
    #[arg(long)]
    file: String,

    /// Installed version
    #[arg(long)]
    current_version: Option<String>,
}

impl PackageArgs {
    fn into_package(self) -> Package {
        Package {
            package_id: self.package_id,
            install_directory: self.directory,
            install_file: self.file,
            current_version: self.current_version,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Check one package for a newer version
    Check(PackageArgs),

    /// Check every package listed in a JSON manifest
    CheckAll {
        #[arg(long)]
        manifest: PathBuf,
    },

    /// Show registry details for a package
    Details {
        #[command(flatten)]
        package: PackageArgs,

        /// Slug the details are requested for
        #[arg(long)]
        slug: String,
    },

    /// Maintain the persistent response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete expired responses
    Purge,
    /// Delete every cached response
    Clear,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => UpdaterConfig::load(path)?,
        None => UpdaterConfig::default(),
    };

    let _guard = init_logging(cli.verbose)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command, config))
}

fn init_logging(verbose: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_env("UPDATE_CHECKER_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let log_path = log_path();
    let log_dir = log_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {:?}", log_dir))?;

    let file_name = log_path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "update-checker.log".into());
    let appender = tracing_appender::rolling::never(log_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

async fn run(command: Command, config: UpdaterConfig) -> anyhow::Result<()> {
    match (command, config.cache.backend) {
        (Command::Cache { action }, _) => run_cache_action(action),
        (command, CacheBackend::Sqlite) => {
            let store = Arc::new(open_sqlite_store()?);
            run_with_store(command, &config, store).await
        }
        (command, CacheBackend::Memory) => {
            run_with_store(command, &config, Arc::new(MemoryStore::new())).await
        }
    }
}

fn open_sqlite_store() -> anyhow::Result<SqliteStore> {
    let data_dir = data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    Ok(SqliteStore::new(&db_path())?)
}

fn run_cache_action(action: CacheAction) -> anyhow::Result<()> {
    let store = open_sqlite_store()?;

    let removed = match action {
        CacheAction::Purge => store.purge_expired()?,
        CacheAction::Clear => store.clear()?,
    };

    info!("Removed {} cached responses", removed);
    println!("{}", json!({ "removed": removed }));
    Ok(())
}

async fn run_with_store<S: KeyValueStore>(
    command: Command,
    config: &UpdaterConfig,
    store: Arc<S>,
) -> anyhow::Result<()> {
    let transport = HttpTransport::new(
        &user_agent(config.registry.site_url.as_deref()),
        config.registry.timeout(),
    )?;
    let client = RegistryClient::from_config(Arc::new(transport), store, config);
    let checker = UpdateChecker::new(client, PackageIdentifier::from_config(&config.roots));

    let output = match command {
        Command::Check(args) => {
            let record = checker.check(&args.into_package()).await?;
            serde_json::to_value(record)?
        }
        Command::CheckAll { manifest } => {
            let raw = std::fs::read_to_string(&manifest)
                .with_context(|| format!("Failed to read manifest {:?}", manifest))?;
            let packages: Vec<Package> = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse manifest {:?}", manifest))?;

            let results: Vec<serde_json::Value> = checker
                .check_all(&packages)
                .await
                .into_iter()
                .map(|check| match check.result {
                    Ok(update) => json!({ "packageId": check.package_id, "update": update }),
                    Err(e) => json!({ "packageId": check.package_id, "error": e.to_string() }),
                })
                .collect();
            serde_json::Value::Array(results)
        }
        Command::Details { package, slug } => {
            let detail = checker.details(&package.into_package(), &slug).await?;
            serde_json::to_value(detail)?
        }
        Command::Cache { action } => return run_cache_action(action),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

//! petclinic server binary

use clap::Parser;
use petclinic::{Config, Database, api, logging};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "petclinic", version, about = "Pet clinic owner registry and CSV export server")]
struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Address to listen on, overriding the config file
    #[arg(short = 'b', long = "bind")]
    bind: Option<SocketAddr>,

    /// SQLite database path, overriding the config file
    #[arg(long = "database")]
    database: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match Config::from_toml_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("petclinic: {}", e);
                std::process::exit(2);
            }
        },
        None => Config::default(),
    };

    if let Some(bind) = cli.bind {
        config.server.api.bind_address = bind;
    }
    if let Some(database) = cli.database {
        config.persistence.database_path = database;
    }

    logging::init(cli.debug, config.logging.level.as_deref());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        debug = cli.debug,
        "petclinic starting"
    );

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "petclinic stopped with an error");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> petclinic::Result<()> {
    config.validate()?;

    let db = Arc::new(Database::new(&config.persistence.database_path).await?);
    tracing::info!(
        path = %config.persistence.database_path.display(),
        max_export_rows = config.export.max_rows,
        "Owner registry opened"
    );

    api::start_api_server(db, Arc::new(config), petclinic::shutdown_signal()).await
}

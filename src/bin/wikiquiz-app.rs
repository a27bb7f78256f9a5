use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;

use wikiquiz::app::quiz_store::SqliteQuizStore;
use wikiquiz::app::routes;
use wikiquiz::app::service::QuizService;
use wikiquiz::config::Config;
use wikiquiz::generate::OpenAiQuizGenerator;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8000")]
    addr: SocketAddr,

    /// SQLite database file (default: $WIKIQUIZ_DB_PATH or `wikiquiz.sqlite3`).
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    wikiquiz::logging::init("info,tower_http=info")?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting wikiquiz-app");

    let mut config = Config::from_env().context("load config")?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if config.llm.api_key.is_none() {
        tracing::warn!("no LLM api key configured; quiz generation will fail");
    }

    let store = SqliteQuizStore::open(&config.db_path)?;
    tracing::info!(db = %config.db_path.display(), "opened quiz store");
    let service = QuizService::new(
        wikiquiz::extract::build_http_client()?,
        Arc::new(OpenAiQuizGenerator::new(&config.llm)?),
        Arc::new(store),
    );

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, routes::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

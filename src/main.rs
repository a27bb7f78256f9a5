use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;

use wikiquiz::app::quiz_store::SqliteQuizStore;
use wikiquiz::app::service::QuizService;
use wikiquiz::cli::{Cli, Command};
use wikiquiz::config::Config;
use wikiquiz::generate::OpenAiQuizGenerator;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    wikiquiz::logging::init("info").context("init logging")?;

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let mut config = Config::from_env().context("load config")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    tracing::debug!(?config, "loaded config");

    let store = SqliteQuizStore::open(&config.db_path).context("open quiz store")?;
    let service = QuizService::new(
        wikiquiz::extract::build_http_client()?,
        Arc::new(OpenAiQuizGenerator::new(&config.llm)?),
        Arc::new(store),
    );

    let json = match cli.command {
        Command::Preview(args) => {
            let preview = service.preview(&args.url).await.context("preview")?;
            serde_json::to_string_pretty(&preview)
        }
        Command::Generate(args) => {
            let record = service.generate(&args.url).await.context("generate")?;
            serde_json::to_string_pretty(&record)
        }
        Command::History => {
            let records = service.history().await.context("history")?;
            serde_json::to_string_pretty(&records)
        }
    }
    .context("serialize output")?;

    println!("{json}");
    Ok(())
}

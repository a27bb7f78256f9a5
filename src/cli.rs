use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// SQLite database file (default: $WIKIQUIZ_DB_PATH or `wikiquiz.sqlite3`).
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch an article and print its title.
    Preview(UrlArgs),
    /// Print the stored quiz for an article, generating it first if needed.
    Generate(UrlArgs),
    /// Print every stored quiz.
    History,
}

#[derive(Debug, Args)]
pub struct UrlArgs {
    /// Article URL (must be http/https).
    #[arg(long)]
    pub url: String,
}

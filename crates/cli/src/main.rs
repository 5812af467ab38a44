use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_kernel::settings::{Settings, StorageBackend};

#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about = "Books CRUD service")]
struct Cli {
    /// Use the in-memory store instead of PostgreSQL
    #[arg(long, global = true)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API until interrupted
    Serve {
        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().context("failed to load bookshelf settings")?;
    if cli.in_memory {
        settings.database.backend = StorageBackend::Memory;
    }
    bookshelf_telemetry::init(&settings.telemetry)?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshelf_app::bootstrap::serve(settings).await
        }
        Command::Migrate => {
            let applied = bookshelf_app::bootstrap::migrate(&settings).await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
    }
}

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stencil::app::{AppContext, StencilError};
use stencil::cli::{commands, Cli, Commands};
use stencil::config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stencil=info")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .map_err(|e| StencilError::Config(e.to_string()))?;

    let ctx = AppContext::new(&config, cli.db)?;

    match cli.command {
        Commands::Scan { files } => {
            commands::scan_messages(&ctx, &files).await?;
        }
        Commands::Crawl { urls } => {
            commands::crawl_urls(&ctx, &urls).await?;
        }
        Commands::Get { url, output } => {
            commands::get_entry(&ctx, &url, output.as_deref())?;
        }
        Commands::Ingest { doc_type, paths } => {
            commands::ingest_files(&ctx, &doc_type, &paths)?;
        }
        Commands::Extract { out } => {
            commands::extract_documents(&ctx, &out)?;
        }
        Commands::List => {
            commands::list_records(&ctx)?;
        }
    }

    Ok(())
}

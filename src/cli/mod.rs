pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_INGEST_TYPE: &str = "hpolizapd";

#[derive(Parser)]
#[command(name = "stencil")]
#[command(about = "Crawl linked documents into a template-delta cache", long_about = None)]
pub struct Cli {
    /// Cache database file
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Configuration file (default: ~/.config/stencil/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan message bodies for hub links and crawl them
    Scan {
        /// Files holding one raw message body each ("-" reads stdin)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Crawl seed URLs directly
    Crawl {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Print or save one cached entry
    Get {
        url: String,
        /// Write the document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Add local PDF files to the cache
    Ingest {
        /// Document type the files belong to
        #[arg(long = "type", default_value = DEFAULT_INGEST_TYPE)]
        doc_type: String,
        /// Files, or directories searched recursively for *.pdf
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Export every cached document to a folder tree
    Extract {
        #[arg(short, long, default_value = "extracted_pdfs")]
        out: PathBuf,
    },
    /// List cache records
    List,
}

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::warn;
use walkdir::WalkDir;

use crate::app::{AppContext, Result, StencilError};
use crate::cache::{Payload, PutOutcome};
use crate::crawler::{discover_seeds, CrawlReport, Outcome};
use crate::domain::UrlKind;
use crate::store::Store;

pub async fn scan_messages(ctx: &AppContext, files: &[PathBuf]) -> Result<()> {
    let bodies = read_messages(files)?;
    let seeds = discover_seeds(&bodies, ctx.cache.classifier());

    if seeds.is_empty() {
        println!("No hub links in {} messages", bodies.len());
        return Ok(());
    }

    println!("Found {} hub links in {} messages", seeds.len(), bodies.len());
    crawl_urls(ctx, &seeds).await
}

pub async fn crawl_urls(ctx: &AppContext, urls: &[String]) -> Result<()> {
    let report = ctx.crawler().crawl(urls.iter().cloned()).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &CrawlReport) {
    for entry in &report.entries {
        if let Outcome::Failed(reason) = &entry.outcome {
            eprintln!("  Error fetching {}: {}", entry.url, reason);
        }
    }

    println!(
        "Crawl complete: {} stored, {} cached, {} skipped, {} errors",
        report.stored(),
        report.cached(),
        report.skipped(),
        report.failed()
    );
}

pub fn get_entry(ctx: &AppContext, url: &str, output: Option<&Path>) -> Result<()> {
    match ctx.cache.get(url)? {
        Some(Payload::Links(links)) => {
            println!("{}", serde_json::to_string_pretty(&links)?);
        }
        Some(Payload::Document(bytes)) => match output {
            Some(path) => {
                fs::write(path, &bytes)?;
                println!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
            None => std::io::stdout().write_all(&bytes)?,
        },
        None => return Err(StencilError::Other(format!("Not cached: {}", url))),
    }
    Ok(())
}

pub fn ingest_files(ctx: &AppContext, doc_type: &str, paths: &[PathBuf]) -> Result<usize> {
    let mut files = Vec::new();
    for path in paths {
        collect_pdf_files(path, &mut files)?;
    }

    let mut ingested = 0;
    for file in files {
        let content = fs::read(&file)?;
        let tag = format!("ingest={}", hex::encode(Sha256::digest(&content)));
        let url = ctx.cache.classifier().synthetic_document_url(doc_type, &tag);

        match ctx.cache.put_document(&url, &content) {
            Ok(PutOutcome::Discarded) => {
                eprintln!("  Type '{}' does not form a document URL, skipping", doc_type);
            }
            Ok(_) => {
                println!("Ingested {}", file.display());
                ingested += 1;
            }
            Err(e) if e.aborts_run() => return Err(e),
            Err(e) => eprintln!("  Error ingesting {}: {}", file.display(), e),
        }
    }

    println!("Ingest complete: {} files", ingested);
    Ok(ingested)
}

/// `path` itself if it is a file, otherwise every `*.pdf` below it, sorted.
fn collect_pdf_files(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if !path.is_dir() {
        out.push(path.to_path_buf());
        return Ok(());
    }

    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        let is_pdf = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if entry.file_type().is_file() && is_pdf {
            out.push(entry.into_path());
        }
    }
    Ok(())
}

pub fn extract_documents(ctx: &AppContext, out: &Path) -> Result<usize> {
    let classifier = ctx.cache.classifier();
    let mut written = 0;

    for record in ctx.store.list_records()? {
        let Some(doc_type) = classifier.document_type(&record.key) else {
            continue;
        };

        let url_hash = hex::encode(Sha256::digest(record.key.as_bytes()));
        let folder = out.join(doc_type.kind.folder());
        let path = folder.join(format!("{}-{}.pdf", doc_type.key, &url_hash[..16]));
        if path.exists() {
            continue;
        }

        match ctx.cache.get_document(&record.key) {
            Ok(Some(bytes)) => {
                fs::create_dir_all(&folder)?;
                fs::write(&path, bytes)?;
                written += 1;
            }
            Ok(None) => warn!("No content at URL: {}", record.key),
            Err(e) if e.aborts_run() => return Err(e),
            Err(e) => eprintln!("  Error extracting {}: {}", record.key, e),
        }
    }

    println!("Extracted {} documents to {}", written, out.display());
    Ok(written)
}

pub fn list_records(ctx: &AppContext) -> Result<()> {
    let records = ctx.store.list_records()?;

    if records.is_empty() {
        println!("Cache is empty");
        return Ok(());
    }

    for record in records {
        let kind = match ctx.cache.classifier().classify(&record.key) {
            UrlKind::LinkList => "links",
            UrlKind::Document(_) => "delta",
            UrlKind::Unrecognized if !record.key.contains("://") => "template",
            UrlKind::Unrecognized => "other",
        };
        let fetched = record
            .fetched_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());

        println!("{:<8} {:>9} {} {}", kind, record.size, fetched, record.key);
    }

    Ok(())
}

/// Raw message bodies, one per file. `-` reads standard input.
pub fn read_messages(files: &[PathBuf]) -> Result<Vec<String>> {
    let mut bodies = Vec::with_capacity(files.len());

    for file in files {
        let raw = if file.as_os_str() == "-" {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        } else {
            fs::read(file)?
        };
        bodies.push(String::from_utf8_lossy(&raw).into_owned());
    }

    Ok(bodies)
}

//! # Stencil
//!
//! A crawler and cache for near-identical PDF documents linked from emails.
//!
//! ## Architecture
//!
//! ```text
//! Messages → Crawler → Fetcher → Cache (Normalizer + Delta) → Store
//! ```
//!
//! Every document type has one template: the first document of that type,
//! stored expanded. Every document is then kept as a binary delta against
//! its type's template, so a few hundred bytes stand in for a whole PDF.
//!
//! ## Quick Start
//!
//! ```bash
//! # Find hub links in saved message bodies and crawl them
//! stencil scan inbox/*.eml
//!
//! # Reconstruct one cached document
//! stencil get 'https://www.triunfonet.com.ar/gauswebtriunfo/servlet/hpolizapd?id=1' -o policy.pdf
//!
//! # Export everything
//! stencil extract --out extracted_pdfs
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// the fetcher and the content cache.
pub mod app;

/// Template/delta content cache.
///
/// - [`ContentCache`](cache::ContentCache): URL-keyed get/put over a [`Store`](store::Store)
/// - [`TemplateStore`](cache::TemplateStore): per-type templates, fixed once written
pub mod cache;

/// Command-line interface using clap.
///
/// - `scan <files>` - Crawl hub links found in message bodies
/// - `crawl <urls>` - Crawl seed URLs
/// - `get <url>` - Print or save one cached entry
/// - `ingest <paths>` - Add local PDFs
/// - `extract` - Export cached documents
/// - `list` - List cache records
pub mod cli;

/// Configuration loaded from `~/.config/stencil/config.toml`.
pub mod config;

/// Depth-limited crawl from link-list pages to documents.
pub mod crawler;

/// Binary deltas with base/target integrity checks.
pub mod delta;

/// Core domain models.
///
/// - [`UrlClassifier`](domain::UrlClassifier): link-list vs document URLs
/// - [`CacheRecord`](domain::CacheRecord): one stored row
pub mod domain;

/// HTTP fetching.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for fetching a URL
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Canonical PDF expansion and recompression.
pub mod normalizer;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

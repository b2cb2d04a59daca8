//! Two-level crawl: link-list pages, then the documents they point to.
//!
//! Work is an explicit stack of [`CrawlTask`]s, so traversal is depth-first:
//! every child of a link-list page is fetched and cached before the next
//! seed is looked at. A URL is visited at most once per run.

pub mod links;

use std::collections::HashSet;

use tracing::{debug, error, info, warn};

use crate::app::Result;
use crate::cache::ContentCache;
use crate::domain::UrlKind;
use crate::fetcher::Fetcher;
use crate::store::Store;

pub use links::{discover_seeds, find_script_links, find_urls, is_valid_url};

/// Deepest level a task may sit at. Seeds are depth 0, their documents depth 1.
pub const MAX_DEPTH: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRole {
    /// Fetch, extract child URLs, recurse one level.
    LinkList,
    /// Fetch and cache; never expanded.
    Document,
}

#[derive(Debug, Clone)]
pub struct CrawlTask {
    pub url: String,
    pub depth: u8,
    pub role: TaskRole,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Served from the cache without touching the network.
    Cached,
    /// Fetched and written to the cache.
    Stored,
    /// Fetched, but there was nothing worth caching.
    Fetched,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CrawlEntry {
    pub url: String,
    pub depth: u8,
    pub outcome: Outcome,
}

#[derive(Debug, Default)]
pub struct CrawlReport {
    pub entries: Vec<CrawlEntry>,
}

impl CrawlReport {
    fn record(&mut self, task: &CrawlTask, outcome: Outcome) {
        self.entries.push(CrawlEntry {
            url: task.url.clone(),
            depth: task.depth,
            outcome,
        });
    }

    pub fn outcome(&self, url: &str) -> Option<&Outcome> {
        self.entries
            .iter()
            .find(|entry| entry.url == url)
            .map(|entry| &entry.outcome)
    }

    pub fn cached(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Cached))
    }

    pub fn stored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Stored))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|entry| pred(&entry.outcome)).count()
    }
}

pub struct Crawler<'a, S: Store> {
    cache: &'a ContentCache<S>,
    fetcher: &'a (dyn Fetcher + Send + Sync),
    max_depth: u8,
}

impl<'a, S: Store> Crawler<'a, S> {
    pub fn new(cache: &'a ContentCache<S>, fetcher: &'a (dyn Fetcher + Send + Sync)) -> Self {
        Self {
            cache,
            fetcher,
            max_depth: MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u8) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Crawl every seed in order.
    ///
    /// Per-URL failures are recorded in the report and the crawl moves on.
    /// Failures that signal an inconsistent store end the run with `Err`.
    pub async fn crawl<I>(&self, seeds: I) -> Result<CrawlReport>
    where
        I: IntoIterator<Item = String>,
    {
        let classifier = self.cache.classifier();
        let mut stack: Vec<CrawlTask> = seeds
            .into_iter()
            .map(|url| {
                let role = match classifier.classify(&url) {
                    UrlKind::LinkList => TaskRole::LinkList,
                    _ => TaskRole::Document,
                };
                CrawlTask { url, depth: 0, role }
            })
            .collect();
        stack.reverse();

        let mut visited = HashSet::new();
        let mut report = CrawlReport::default();

        while let Some(task) = stack.pop() {
            if !visited.insert(task.url.clone()) {
                debug!("Already visited {}", task.url);
                continue;
            }
            if task.depth > self.max_depth {
                report.record(&task, Outcome::Skipped("depth limit".to_string()));
                continue;
            }

            let result = match task.role {
                TaskRole::LinkList => self.visit_link_list(&task).await,
                TaskRole::Document => self.visit_document(&task).await,
            };

            match result {
                Ok((outcome, children)) => {
                    report.record(&task, outcome);
                    stack.extend(children.into_iter().rev().map(|url| CrawlTask {
                        url,
                        depth: task.depth + 1,
                        role: TaskRole::Document,
                    }));
                }
                Err(e) if e.aborts_run() => {
                    error!("Aborting crawl at {}: {}", task.url, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!("Error fetching URL '{}': {}", task.url, e);
                    report.record(&task, Outcome::Failed(e.to_string()));
                }
            }
        }

        Ok(report)
    }

    async fn visit_link_list(&self, task: &CrawlTask) -> Result<(Outcome, Vec<String>)> {
        let cached = self.cache.get_links(&task.url)?;
        if !cached.is_empty() {
            info!("Using cached content for '{}'", task.url);
            return Ok((Outcome::Cached, cached));
        }

        let body = self.fetcher.fetch(&task.url).await?;
        let children = find_script_links(&String::from_utf8_lossy(&body));
        if children.is_empty() {
            warn!("No document links in {}", task.url);
            return Ok((Outcome::Fetched, children));
        }

        self.cache.put_links(&task.url, &children)?;
        Ok((Outcome::Stored, children))
    }

    async fn visit_document(&self, task: &CrawlTask) -> Result<(Outcome, Vec<String>)> {
        match self.cache.classifier().classify(&task.url) {
            UrlKind::Document(_) => {}
            UrlKind::LinkList => {
                return Ok((
                    Outcome::Skipped("link list below top level".to_string()),
                    Vec::new(),
                ))
            }
            UrlKind::Unrecognized => {
                debug!("Skipping unrecognized document URL {}", task.url);
                return Ok((
                    Outcome::Skipped("unrecognized document shape".to_string()),
                    Vec::new(),
                ));
            }
        }

        if self.cache.get_document(&task.url)?.is_some() {
            info!("Using cached content for '{}'", task.url);
            return Ok((Outcome::Cached, Vec::new()));
        }

        let body = self.fetcher.fetch(&task.url).await?;
        self.cache.put_document(&task.url, &body)?;
        Ok((Outcome::Stored, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::app::StencilError;
    use crate::domain::url_kind::{DEFAULT_HUB_PREFIX, DEFAULT_SERVLET_BASE};
    use crate::domain::UrlClassifier;
    use crate::normalizer::fixtures::{page_text, sample_pdf};
    use crate::store::SqliteStore;

    const HUB_1: &str = "https://l.triunfonet.com.ar/hub1";
    const HUB_2: &str = "https://l.triunfonet.com.ar/hub2";
    const DOC_A: &str = "https://www.triunfonet.com.ar/gauswebtriunfo/servlet/hpolizapd?id=1";
    const DOC_B: &str = "https://www.triunfonet.com.ar/gauswebtriunfo/servlet/hpolizapd?id=2";
    const DOC_C: &str = "https://www.triunfonet.com.ar/gauswebtriunfo/servlet/tarjetaverde?id=3";

    #[derive(Default)]
    struct FakeFetcher {
        pages: HashMap<String, Vec<u8>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.pages.insert(url.to_string(), body.into());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| StencilError::Other(format!("connection refused: {}", url)))
        }
    }

    fn hub_page(links: &[&str]) -> String {
        links
            .iter()
            .map(|l| format!("<a href=\"javascript:self.abre('{}')\">doc</a>\n", l))
            .collect()
    }

    fn cache() -> ContentCache<SqliteStore> {
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let classifier = UrlClassifier::new(DEFAULT_HUB_PREFIX, DEFAULT_SERVLET_BASE).unwrap();
        ContentCache::new(store, classifier)
    }

    fn seeds(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_crawl_stores_hub_and_documents() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_A, sample_pdf("POLICY 0001"))
            .page(DOC_B, sample_pdf("POLICY 0002"));

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert_eq!(report.stored(), 3);
        assert_eq!(report.failed(), 0);
        assert_eq!(cache.get_links(HUB_1).unwrap(), seeds(&[DOC_A, DOC_B]));
        let b = cache.get_document(DOC_B).unwrap().unwrap();
        assert!(page_text(&b).contains("POLICY 0002"));
    }

    #[tokio::test]
    async fn test_second_run_uses_cache() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_A, sample_pdf("POLICY 0001"))
            .page(DOC_B, sample_pdf("POLICY 0002"));

        Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();
        let offline = FakeFetcher::default();
        let report = Crawler::new(&cache, &offline)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert_eq!(report.cached(), 3);
        assert!(offline.calls().is_empty());
    }

    #[tokio::test]
    async fn test_depth_first_order() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(HUB_2, hub_page(&[DOC_C]))
            .page(DOC_A, sample_pdf("POLICY 0001"))
            .page(DOC_B, sample_pdf("POLICY 0002"))
            .page(DOC_C, sample_pdf("CARD 03"));

        Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1, HUB_2]))
            .await
            .unwrap();

        assert_eq!(fetcher.calls(), seeds(&[HUB_1, DOC_A, DOC_B, HUB_2, DOC_C]));
    }

    #[tokio::test]
    async fn test_shared_child_fetched_once() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A]))
            .page(HUB_2, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_A, sample_pdf("POLICY 0001"))
            .page(DOC_B, sample_pdf("POLICY 0002"));

        Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1, HUB_2, HUB_1]))
            .await
            .unwrap();

        let calls = fetcher.calls();
        assert_eq!(calls.iter().filter(|u| *u == DOC_A).count(), 1);
        assert_eq!(calls.iter().filter(|u| *u == HUB_1).count(), 1);
    }

    #[tokio::test]
    async fn test_failed_child_does_not_stop_siblings() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_B, sample_pdf("POLICY 0002"));

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert!(matches!(report.outcome(DOC_A), Some(Outcome::Failed(_))));
        assert_eq!(report.outcome(DOC_B), Some(&Outcome::Stored));
    }

    #[tokio::test]
    async fn test_failed_seed_does_not_stop_other_seeds() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_2, hub_page(&[DOC_C]))
            .page(DOC_C, sample_pdf("CARD 03"));

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1, HUB_2]))
            .await
            .unwrap();

        assert!(matches!(report.outcome(HUB_1), Some(Outcome::Failed(_))));
        assert_eq!(report.outcome(DOC_C), Some(&Outcome::Stored));
    }

    #[tokio::test]
    async fn test_malformed_document_is_per_item() {
        let cache = cache();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_A, "<html>session expired</html>")
            .page(DOC_B, sample_pdf("POLICY 0002"));

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert!(matches!(report.outcome(DOC_A), Some(Outcome::Failed(_))));
        assert_eq!(report.outcome(DOC_B), Some(&Outcome::Stored));
        assert!(!cache.store().contains(DOC_A).unwrap());
    }

    #[tokio::test]
    async fn test_hub_without_links_is_not_cached() {
        let cache = cache();
        let fetcher = FakeFetcher::default().page(HUB_1, "<html>nothing here</html>");

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert_eq!(report.outcome(HUB_1), Some(&Outcome::Fetched));
        assert!(!cache.store().contains(HUB_1).unwrap());
    }

    #[tokio::test]
    async fn test_unrecognized_and_nested_children_skipped() {
        let cache = cache();
        let fetcher = FakeFetcher::default().page(
            HUB_1,
            hub_page(&["https://example.com/other.pdf", HUB_2]),
        );

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert_eq!(report.skipped(), 2);
        assert_eq!(fetcher.calls(), seeds(&[HUB_1]));
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let cache = cache();
        let fetcher = FakeFetcher::default().page(HUB_1, hub_page(&[DOC_A]));

        let report = Crawler::new(&cache, &fetcher)
            .with_max_depth(0)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap();

        assert_eq!(
            report.outcome(DOC_A),
            Some(&Outcome::Skipped("depth limit".to_string()))
        );
        assert_eq!(fetcher.calls(), seeds(&[HUB_1]));
    }

    #[tokio::test]
    async fn test_document_seed() {
        let cache = cache();
        let fetcher = FakeFetcher::default().page(DOC_A, sample_pdf("POLICY 0001"));

        let report = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[DOC_A]))
            .await
            .unwrap();

        assert_eq!(report.outcome(DOC_A), Some(&Outcome::Stored));
    }

    #[tokio::test]
    async fn test_missing_template_aborts_run() {
        let cache = cache();
        cache.store().put_content(DOC_A, b"orphan delta").unwrap();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_A, DOC_B]))
            .page(DOC_B, sample_pdf("POLICY 0002"));

        let err = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1]))
            .await
            .unwrap_err();

        assert!(matches!(err, StencilError::MissingTemplate { .. }));
        assert_eq!(fetcher.calls(), seeds(&[HUB_1]));
    }

    #[tokio::test]
    async fn test_corrupt_delta_aborts_run() {
        let cache = cache();
        cache.put_document(DOC_A, &sample_pdf("POLICY 0001")).unwrap();
        cache.store().put_content(DOC_B, b"STD1 not really").unwrap();
        let fetcher = FakeFetcher::default()
            .page(HUB_1, hub_page(&[DOC_B]))
            .page(HUB_2, hub_page(&[DOC_C]))
            .page(DOC_C, sample_pdf("CARD 03"));

        let err = Crawler::new(&cache, &fetcher)
            .crawl(seeds(&[HUB_1, HUB_2]))
            .await
            .unwrap_err();

        assert!(matches!(err, StencilError::CorruptDelta { .. }));
        assert_eq!(fetcher.calls(), seeds(&[HUB_1]));
    }
}

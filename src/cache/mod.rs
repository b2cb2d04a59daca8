//! URL-keyed content cache with template-delta storage for documents.
//!
//! # Layout
//!
//! ```text
//! link-list URL  → JSON array of child URLs
//! type token     → expanded template (first document seen of that type)
//! document URL   → delta(template, expanded document)
//! ```
//!
//! Reads rebuild the expanded document from its template and hand back the
//! compressed delivery form.

mod templates;

pub use templates::{Resolved, TemplateStore};

use std::sync::Arc;

use tracing::debug;

use crate::app::{Result, StencilError};
use crate::delta::DeltaCodec;
use crate::domain::{DocumentType, UrlClassifier, UrlKind};
use crate::normalizer::Normalizer;
use crate::store::Store;

/// Value cached under a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Child URLs of a link-list page, in page order.
    Links(Vec<String>),
    /// A document. Raw bytes on write, compressed form on read.
    Document(Vec<u8>),
}

/// What a [`ContentCache::put`] call wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Links { count: usize },
    /// First document of its type; it became the template.
    TemplateCreated { type_key: String, delta_len: usize },
    DeltaStored { type_key: String, delta_len: usize },
    /// URL outside every known key space; nothing was written.
    Discarded,
}

pub struct ContentCache<S: Store> {
    store: Arc<S>,
    classifier: UrlClassifier,
    templates: TemplateStore,
    normalizer: Normalizer,
    codec: DeltaCodec,
}

impl<S: Store> ContentCache<S> {
    pub fn new(store: Arc<S>, classifier: UrlClassifier) -> Self {
        Self {
            store,
            classifier,
            templates: TemplateStore::new(),
            normalizer: Normalizer::new(),
            codec: DeltaCodec::new(),
        }
    }

    pub fn classifier(&self) -> &UrlClassifier {
        &self.classifier
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Cached value for `url`.
    ///
    /// Link-list URLs always yield `Some`, with an empty list when nothing is
    /// cached yet. Document URLs yield `None` when absent or when the URL is
    /// not a recognized document shape.
    pub fn get(&self, url: &str) -> Result<Option<Payload>> {
        match self.classifier.classify(url) {
            UrlKind::LinkList => Ok(Some(Payload::Links(self.get_links(url)?))),
            UrlKind::Document(doc_type) => Ok(self
                .read_document(url, &doc_type)?
                .map(Payload::Document)),
            UrlKind::Unrecognized => Ok(None),
        }
    }

    pub fn get_links(&self, url: &str) -> Result<Vec<String>> {
        match self.store.get_content(url)? {
            Some(raw) => Ok(serde_json::from_slice(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Compressed document cached under `url`, if any.
    pub fn get_document(&self, url: &str) -> Result<Option<Vec<u8>>> {
        match self.classifier.document_type(url) {
            Some(doc_type) => self.read_document(url, &doc_type),
            None => Ok(None),
        }
    }

    pub fn put(&self, url: &str, payload: &Payload) -> Result<PutOutcome> {
        match (self.classifier.classify(url), payload) {
            (UrlKind::LinkList, Payload::Links(links)) => self.write_links(url, links),
            (UrlKind::Document(doc_type), Payload::Document(raw)) => {
                self.write_document(url, &doc_type, raw)
            }
            (UrlKind::Unrecognized, _) => {
                debug!("Discarding unrecognized URL {}", url);
                Ok(PutOutcome::Discarded)
            }
            _ => Err(StencilError::PayloadMismatch(url.to_string())),
        }
    }

    pub fn put_links(&self, url: &str, links: &[String]) -> Result<PutOutcome> {
        self.put(url, &Payload::Links(links.to_vec()))
    }

    pub fn put_document(&self, url: &str, raw: &[u8]) -> Result<PutOutcome> {
        self.put(url, &Payload::Document(raw.to_vec()))
    }

    fn write_links(&self, url: &str, links: &[String]) -> Result<PutOutcome> {
        let encoded = serde_json::to_vec(links)?;
        self.store.put_content(url, &encoded)?;
        debug!("Cached {} links for {}", links.len(), url);
        Ok(PutOutcome::Links { count: links.len() })
    }

    fn write_document(&self, url: &str, doc_type: &DocumentType, raw: &[u8]) -> Result<PutOutcome> {
        let expanded = self.normalizer.expand(raw)?;
        let resolved = self
            .templates
            .resolve_for_write(self.store.as_ref(), &doc_type.key, &expanded)?;

        // The template's own URL still gets a (near-empty) delta so it can be
        // read back by URL like every other document.
        let delta = self
            .codec
            .diff(&resolved.template, &expanded)
            .map_err(|e| StencilError::Other(format!("Delta encoding failed for {}: {}", url, e)))?;
        self.store.put_content(url, &delta)?;

        debug!(
            "Cached {} as {} byte delta against '{}' ({} bytes expanded)",
            url,
            delta.len(),
            doc_type.key,
            expanded.len()
        );

        let type_key = doc_type.key.clone();
        let delta_len = delta.len();
        if resolved.created {
            Ok(PutOutcome::TemplateCreated {
                type_key,
                delta_len,
            })
        } else {
            Ok(PutOutcome::DeltaStored {
                type_key,
                delta_len,
            })
        }
    }

    fn read_document(&self, url: &str, doc_type: &DocumentType) -> Result<Option<Vec<u8>>> {
        let delta = match self.store.get_content(url)? {
            Some(delta) => delta,
            None => return Ok(None),
        };

        let template = self
            .templates
            .resolve_for_read(self.store.as_ref(), &doc_type.key, url)?;
        let expanded = self
            .codec
            .patch(&template, &delta)
            .map_err(|e| StencilError::CorruptDelta {
                key: url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Some(self.normalizer.compress(&expanded)?))
    }
}

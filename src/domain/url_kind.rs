use std::fmt;

use regex::Regex;

use crate::app::{Result, StencilError};

pub const DEFAULT_HUB_PREFIX: &str = "https://l.triunfonet.com.ar/";
pub const DEFAULT_SERVLET_BASE: &str = "https://www.triunfonet.com.ar/gauswebtriunfo/servlet/";

/// Family a document type belongs to, derived from its type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Policy,
    CirculationCard,
    GreenCard,
    Other,
}

impl DocumentKind {
    pub fn from_type_key(type_key: &str) -> Self {
        if type_key.starts_with("hpoliza") {
            DocumentKind::Policy
        } else if type_key.starts_with("tarjetacir") {
            DocumentKind::CirculationCard
        } else if type_key.starts_with("tarjetaver") {
            DocumentKind::GreenCard
        } else {
            DocumentKind::Other
        }
    }

    /// Folder name used when exporting documents of this kind.
    pub fn folder(&self) -> &'static str {
        match self {
            DocumentKind::Policy => "policies",
            DocumentKind::CirculationCard => "circulation-cards",
            DocumentKind::GreenCard => "green-cards",
            DocumentKind::Other => "other",
        }
    }
}

/// A document type: the servlet token shared by every document of one layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentType {
    pub key: String,
    pub kind: DocumentKind,
}

impl DocumentType {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let kind = DocumentKind::from_type_key(&key);
        Self { key, kind }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlKind {
    /// Hub URL whose cached value is a list of child document URLs.
    LinkList,
    /// Servlet URL producing a templated document.
    Document(DocumentType),
    /// Anything else. Never cached.
    Unrecognized,
}

/// Pure mapping from URL string to [`UrlKind`].
#[derive(Debug, Clone)]
pub struct UrlClassifier {
    hub_prefix: String,
    servlet_base: String,
    document_pattern: Regex,
}

impl UrlClassifier {
    pub fn new(hub_prefix: &str, servlet_base: &str) -> Result<Self> {
        let pattern = format!(r"{}(\w+)\?", regex::escape(servlet_base));
        let document_pattern = Regex::new(&pattern)
            .map_err(|e| StencilError::Config(format!("Invalid servlet base: {}", e)))?;

        Ok(Self {
            hub_prefix: hub_prefix.to_string(),
            servlet_base: servlet_base.to_string(),
            document_pattern,
        })
    }

    pub fn classify(&self, url: &str) -> UrlKind {
        if self.is_link_list(url) {
            return UrlKind::LinkList;
        }
        match self.document_type(url) {
            Some(doc_type) => UrlKind::Document(doc_type),
            None => UrlKind::Unrecognized,
        }
    }

    pub fn is_link_list(&self, url: &str) -> bool {
        url.starts_with(&self.hub_prefix)
    }

    pub fn document_type(&self, url: &str) -> Option<DocumentType> {
        self.document_pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| DocumentType::new(m.as_str()))
    }

    /// Build a document URL of the given type, used for documents that did
    /// not arrive through a crawl.
    pub fn synthetic_document_url(&self, type_key: &str, tag: &str) -> String {
        format!("{}{}?{}", self.servlet_base, type_key, tag)
    }
}

//! Canonical PDF forms for diffing and for delivery.
//!
//! [`Normalizer::expand`] removes every stream filter lopdf can decode so the
//! byte layout tracks logical content only. [`Normalizer::compress`] drops
//! unreachable objects, renumbers what is left and deflates every stream.

#[cfg(test)]
pub(crate) mod fixtures;

use lopdf::xref::XrefType;
use lopdf::{Document, Object};

use crate::app::{Result, StencilError};

/// How far into the buffer the `%PDF-` header may start.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Trailer entries describing the source file's cross-reference layout. They
/// are meaningless once the document is rewritten.
const XREF_TRAILER_KEYS: &[&[u8]] = &[
    b"Prev",
    b"XRefStm",
    b"Type",
    b"W",
    b"Index",
    b"Filter",
    b"DecodeParms",
    b"Length",
];

#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Rewrite `raw` with all decodable streams expanded.
    ///
    /// Output depends only on the document objects, so two documents of the
    /// same layout differ only where their content differs.
    pub fn expand(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Self::load(raw)?;
        doc.decompress();
        Self::save(&mut doc)
    }

    /// Rewrite `raw` in its compact delivery form.
    pub fn compress(&self, raw: &[u8]) -> Result<Vec<u8>> {
        let mut doc = Self::load(raw)?;
        doc.prune_objects();
        doc.delete_zero_length_streams();
        doc.renumber_objects();
        doc.compress();
        Self::save(&mut doc)
    }

    fn load(raw: &[u8]) -> Result<Document> {
        let window = &raw[..raw.len().min(HEADER_SEARCH_WINDOW)];
        if !window.windows(5).any(|w| w == b"%PDF-") {
            return Err(StencilError::MalformedDocument(
                "missing %PDF- header".to_string(),
            ));
        }

        let mut doc = Document::load_mem(raw)
            .map_err(|e| StencilError::MalformedDocument(e.to_string()))?;
        Self::strip_xref_containers(&mut doc);
        Ok(doc)
    }

    /// Drop cross-reference streams and object streams and force the writer
    /// to a classic xref table. Their objects were already materialized at
    /// load time. `max_id` follows the surviving objects so the output does
    /// not depend on how the source numbered its xref stream.
    fn strip_xref_containers(doc: &mut Document) {
        doc.objects.retain(|_, object| match object {
            Object::Stream(stream) => !matches!(
                stream.dict.get(b"Type").and_then(Object::as_name),
                Ok(b"XRef") | Ok(b"ObjStm")
            ),
            _ => true,
        });

        for key in XREF_TRAILER_KEYS {
            doc.trailer.remove(key);
        }

        doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;
        doc.max_id = doc.objects.keys().map(|&(id, _)| id).max().unwrap_or(0);
    }

    fn save(doc: &mut Document) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        doc.save_to(&mut out)
            .map_err(|e| StencilError::MalformedDocument(e.to_string()))?;
        Ok(out)
    }
}

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use crate::app::{Result, StencilError};
use crate::store::Store;

/// Template bytes and whether this call is the one that created them.
pub struct Resolved {
    pub template: Arc<Vec<u8>>,
    pub created: bool,
}

/// One expanded template per document type, mirrored in memory.
///
/// The map is filled lazily and never evicted. A template is written to the
/// store exactly once; later lookups only read it.
#[derive(Default)]
pub struct TemplateStore {
    templates: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Template for `type_key`, adopting `candidate` as the template when the
    /// type has never been seen.
    pub fn resolve_for_write<S: Store>(
        &self,
        store: &S,
        type_key: &str,
        candidate: &[u8],
    ) -> Result<Resolved> {
        if let Some(template) = self.lookup(store, type_key)? {
            return Ok(Resolved {
                template,
                created: false,
            });
        }

        let created = store.insert_content(type_key, candidate)?;
        let template = if created {
            info!("New template for document type '{}' ({} bytes)", type_key, candidate.len());
            Arc::new(candidate.to_vec())
        } else {
            // Another writer got there between our lookup and insert.
            let stored = store.get_content(type_key)?.ok_or_else(|| {
                StencilError::Other(format!("Template '{}' vanished after insert", type_key))
            })?;
            Arc::new(stored)
        };

        self.map()?.insert(type_key.to_string(), template.clone());
        Ok(Resolved { template, created })
    }

    /// Template for `type_key`, which must already exist.
    pub fn resolve_for_read<S: Store>(
        &self,
        store: &S,
        type_key: &str,
        url: &str,
    ) -> Result<Arc<Vec<u8>>> {
        self.lookup(store, type_key)?
            .ok_or_else(|| StencilError::MissingTemplate {
                type_key: type_key.to_string(),
                url: url.to_string(),
            })
    }

    /// Number of templates currently held in memory.
    pub fn loaded(&self) -> Result<usize> {
        Ok(self.map()?.len())
    }

    fn lookup<S: Store>(&self, store: &S, type_key: &str) -> Result<Option<Arc<Vec<u8>>>> {
        if let Some(template) = self.map()?.get(type_key) {
            return Ok(Some(template.clone()));
        }

        match store.get_content(type_key)? {
            Some(stored) => {
                debug!("Loaded template '{}' from store", type_key);
                let template = Arc::new(stored);
                self.map()?.insert(type_key.to_string(), template.clone());
                Ok(Some(template))
            }
            None => Ok(None),
        }
    }

    fn map(&self) -> Result<MutexGuard<'_, HashMap<String, Arc<Vec<u8>>>>> {
        self.templates
            .lock()
            .map_err(|e| StencilError::Other(format!("Template map poisoned: {}", e)))
    }
}

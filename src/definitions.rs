//! Memoized global-definition lookup for SDK artifacts.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::errors::InitError;

/// Reads the definition names a compiled artifact provides.
pub trait DefinitionReader: Send + Sync {
    fn read_definitions(&self, artifact: &Path) -> io::Result<HashSet<String>>;
}

/// Memoized artifact -> definition-name mapping.
///
/// SDK artifacts are immutable for the session, so a successful read is
/// cached for the process lifetime. Failed reads are not cached; a later
/// call retries the read.
pub struct GlobalDefinitionIndex {
    reader: Box<dyn DefinitionReader>,
    cache: Mutex<HashMap<PathBuf, Arc<HashSet<String>>>>,
}

impl GlobalDefinitionIndex {
    pub fn new(reader: Box<dyn DefinitionReader>) -> Self {
        Self {
            reader,
            cache: Mutex::default(),
        }
    }

    /// Definition names provided by `artifact`, reading it on first use.
    pub fn definitions_for(&self, artifact: &Path) -> Result<Arc<HashSet<String>>, InitError> {
        if let Some(definitions) = self.cache.lock().get(artifact) {
            return Ok(definitions.clone());
        }
        let definitions =
            self.reader
                .read_definitions(artifact)
                .map_err(|source| InitError::ReadDefinitions {
                    file: artifact.to_path_buf(),
                    source,
                })?;
        debug!(
            artifact = %artifact.display(),
            definitions = definitions.len(),
            "indexed global definitions"
        );
        let definitions = Arc::new(definitions);
        self.cache
            .lock()
            .insert(artifact.to_path_buf(), definitions.clone());
        Ok(definitions)
    }

    /// Number of artifacts indexed so far.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

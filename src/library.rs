//! Library records and the identity-keyed registry that owns them.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// One compiled library artifact (a SWC archive, as laid out by the host).
///
/// Identity is the artifact path: the registry guarantees at most one
/// `Library` per distinct path for the session. Style/resource discovery
/// mutates the record in place, so re-collecting a module refreshes the same
/// shared instance instead of duplicating it.
#[derive(Debug)]
pub struct Library {
    file: PathBuf,
    state: RwLock<LibraryState>,
}

#[derive(Debug, Default)]
struct LibraryState {
    catalog_file: Option<PathBuf>,
    /// locale -> bundle names found under the artifact's locale tree.
    resource_bundles: HashMap<String, HashSet<String>>,
    processed: bool,
}

impl Library {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            state: RwLock::default(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn catalog_file(&self) -> Option<PathBuf> {
        self.state.read().catalog_file.clone()
    }

    pub fn set_catalog_file(&self, path: impl Into<PathBuf>) {
        self.state.write().catalog_file = Some(path.into());
    }

    pub fn is_processed(&self) -> bool {
        self.state.read().processed
    }

    pub fn mark_processed(&self) {
        self.state.write().processed = true;
    }

    /// Record that the artifact carries `bundle` for `locale`.
    pub fn put_resource_bundle(&self, locale: &str, bundle: &str) {
        self.state
            .write()
            .resource_bundles
            .entry(locale.to_string())
            .or_default()
            .insert(bundle.to_string());
    }

    pub fn has_resource_bundles(&self) -> bool {
        !self.state.read().resource_bundles.is_empty()
    }

    pub fn has_resource_bundle(&self, locale: &str, bundle: &str) -> bool {
        self.state
            .read()
            .resource_bundles
            .get(locale)
            .is_some_and(|bundles| bundles.contains(bundle))
    }
}

#[derive(Debug)]
struct RegistryEntry {
    library: Arc<Library>,
    /// Wire id, assigned when the library is first registered with the
    /// client. `None` between original creation and set registration.
    id: Option<u32>,
}

/// Identity-keyed store mapping artifact paths to their `Library` records.
///
/// Mirrors the designer protocol's library table: `add` assigns the small id
/// the wire client refers to the library by, idempotently per artifact.
#[derive(Debug, Default)]
pub struct LibraryRegistry {
    inner: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    by_path: HashMap<PathBuf, RegistryEntry>,
    next_id: u32,
}

impl LibraryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get-or-create the library for `file` and (re)run style/resource
    /// discovery on it via `process`.
    ///
    /// Caller contract: a given artifact is submitted as an *original*
    /// creation at most once per collection pass. Submissions across passes
    /// reuse the existing instance, which `process` sees with
    /// `is_new == false`.
    pub fn create_original(
        &self,
        file: &Path,
        process: impl FnOnce(&Arc<Library>, bool),
    ) -> Arc<Library> {
        let (library, is_new) = {
            let mut inner = self.inner.lock();
            match inner.by_path.get(file) {
                Some(entry) => (entry.library.clone(), false),
                None => {
                    let library = Arc::new(Library::new(file));
                    inner.by_path.insert(
                        file.to_path_buf(),
                        RegistryEntry {
                            library: library.clone(),
                            id: None,
                        },
                    );
                    (library, true)
                }
            }
        };
        process(&library, is_new);
        library
    }

    /// Assign (or fetch) the wire id for `library`. Idempotent per artifact.
    pub fn add(&self, library: &Arc<Library>) -> u32 {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.by_path.get(library.file()) {
            if let Some(id) = entry.id {
                return id;
            }
        }
        let id = inner.next_id;
        inner.next_id += 1;
        match inner.by_path.get_mut(library.file()) {
            Some(entry) => entry.id = Some(id),
            None => {
                inner.by_path.insert(
                    library.file().to_path_buf(),
                    RegistryEntry {
                        library: library.clone(),
                        id: Some(id),
                    },
                );
            }
        }
        id
    }

    /// Whether `library` has been registered (assigned a wire id).
    pub fn contains(&self, library: &Library) -> bool {
        self.inner
            .lock()
            .by_path
            .get(library.file())
            .is_some_and(|entry| entry.id.is_some())
    }

    pub fn get(&self, file: &Path) -> Option<Arc<Library>> {
        self.inner
            .lock()
            .by_path
            .get(file)
            .map(|entry| entry.library.clone())
    }

    /// Number of distinct artifacts known to the registry.
    pub fn len(&self) -> usize {
        self.inner.lock().by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

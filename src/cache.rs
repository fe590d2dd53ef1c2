//! Canonical-key dedup cache for library sets.
//!
//! The cache owns the identity protocol around sorting: a library list is
//! canonicalized into an order-independent key, and at most one
//! [`LibrarySet`] is ever constructed per distinct key for the process
//! lifetime. Many modules end up sharing the same `Arc<LibrarySet>`.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::client::DesignerClient;
use crate::errors::{Attachment, InitError};
use crate::id_pool::IdPool;
use crate::library::{Library, LibraryRegistry};
use crate::library_set::{AssetCounter, ContainsPredicate, LibrarySet};
use crate::sort::LibrarySorter;

const SWF_EXTENSION: &str = "swf";

/// Canonical, order-independent key for a library list: artifact paths
/// sorted lexicographically, each terminated by `':'`. Set-equal lists yield
/// identical keys.
pub fn cache_key(libraries: &[Arc<Library>]) -> String {
    let mut paths: Vec<String> = libraries
        .iter()
        .map(|library| library.file().to_string_lossy().into_owned())
        .collect();
    paths.sort_unstable();

    let mut key = String::with_capacity(paths.iter().map(|path| path.len() + 1).sum());
    for path in &paths {
        key.push_str(path);
        key.push(':');
    }
    key
}

/// What kind of set a resolve call should produce on a cache miss.
pub enum ResolveRequest {
    /// SDK-level root set. The sort's is-external predicate is membership in
    /// the global artifact's definitions; the built set's own predicate also
    /// covers the sort's definition map.
    Root {
        global_definitions: Arc<HashSet<String>>,
        assets: Arc<Mutex<AssetCounter>>,
    },
    /// Project-level set chained to the given root; the sort's is-external
    /// predicate is the root set's.
    Child { parent: Arc<LibrarySet> },
}

/// Collaborators a resolve call needs on a cache miss.
pub struct ResolveContext<'a> {
    pub sorter: &'a dyn LibrarySorter,
    pub registry: &'a LibraryRegistry,
    pub client: &'a dyn DesignerClient,
    pub sdk_version: &'a str,
}

/// Process-wide dedup cache: canonical key -> registered library set.
pub struct LibrarySetCache {
    /// Destination directory for sorted output artifacts, `<app_dir>/<id>.swf`.
    app_dir: PathBuf,
    sets: Mutex<HashMap<String, Arc<LibrarySet>>>,
    /// Per-key construction guards: resolve calls racing on the same key
    /// serialize here, so a set is built at most once per key even under
    /// true parallelism. Guards are retained for keys already seen.
    building: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    id_pool: Mutex<IdPool>,
}

impl LibrarySetCache {
    pub fn new(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: app_dir.into(),
            sets: Mutex::default(),
            building: Mutex::default(),
            id_pool: Mutex::new(IdPool::new()),
        }
    }

    /// Resolve `libraries` into a registered set, reusing a cached one when
    /// the canonical key matches.
    ///
    /// Returns `Ok(None)` for an empty list; the caller substitutes the
    /// parent or root set. A sort failure leaves the cache and the id pool
    /// unchanged for this key.
    pub fn resolve(
        &self,
        libraries: &[Arc<Library>],
        request: ResolveRequest,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<Arc<LibrarySet>>, InitError> {
        if libraries.is_empty() {
            return Ok(None);
        }

        let key = cache_key(libraries);
        if let Some(set) = self.sets.lock().get(&key) {
            debug!(id = set.id(), "library set cache hit");
            return Ok(Some(set.clone()));
        }

        let guard = self.building_guard(&key);
        let _held = guard.lock();
        // Lost the race: another resolve built this key while we waited.
        if let Some(set) = self.sets.lock().get(&key) {
            debug!(id = set.id(), "library set built concurrently, reusing");
            return Ok(Some(set.clone()));
        }

        let id = self.id_pool.lock().allocate();
        let output = self.app_dir.join(format!("{id}.{SWF_EXTENSION}"));
        let is_external: Box<dyn Fn(&str) -> bool> = match &request {
            ResolveRequest::Root {
                global_definitions, ..
            } => {
                let definitions = global_definitions.clone();
                Box::new(move |name| definitions.contains(name))
            }
            ResolveRequest::Child { parent } => {
                let parent = parent.clone();
                Box::new(move |name| parent.root_contains().contains(name))
            }
        };

        let result = match ctx.sorter.sort(libraries, &output, is_external.as_ref()) {
            Ok(result) => result,
            Err(source) => {
                self.id_pool.lock().dispose(&[id]);
                return Err(sort_error(source, libraries, ctx.sdk_version));
            }
        };

        let set = Arc::new(match request {
            ResolveRequest::Root {
                global_definitions,
                assets,
            } => LibrarySet::new_root(
                id,
                result.libraries,
                ContainsPredicate::new(global_definitions, result.definition_map),
                assets,
            ),
            ResolveRequest::Child { parent } => LibrarySet::new_child(id, parent, result.libraries),
        });

        for library in set.libraries() {
            ctx.registry.add(library);
        }
        ctx.client.register_library_set(&set);
        self.sets.lock().insert(key, set.clone());
        info!(id, libraries = set.libraries().len(), "registered library set");
        Ok(Some(set))
    }

    /// Drop every cached set whose id is in `ids` and release those ids for
    /// reuse. This is the only reclamation path; there is no automatic
    /// eviction.
    pub fn unregister(&self, ids: &[u32]) {
        self.sets.lock().retain(|_, set| !ids.contains(&set.id()));
        self.id_pool.lock().dispose(ids);
        debug!(?ids, "unregistered library sets");
    }

    /// Number of cached sets.
    pub fn len(&self) -> usize {
        self.sets.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn app_dir(&self) -> &std::path::Path {
        &self.app_dir
    }

    fn building_guard(&self, key: &str) -> Arc<Mutex<()>> {
        self.building
            .lock()
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

/// Wrap a sorter failure, attaching every library's catalog file on a
/// best-effort basis. A secondary failure while gathering attachments is
/// appended to the technical message instead of masking the original cause.
fn sort_error(source: anyhow::Error, libraries: &[Arc<Library>], sdk_version: &str) -> InitError {
    let mut technical_message = format!("Flex SDK {sdk_version}");
    let mut attachments = Vec::with_capacity(libraries.len());
    for library in libraries {
        match library.catalog_file() {
            Some(path) => attachments.push(Attachment::new(path)),
            None => {
                technical_message.push_str(&format!(
                    "; cannot collect library catalog files: no catalog recorded for {}",
                    library.file().display()
                ));
                break;
            }
        }
    }
    InitError::SortLibraries {
        source,
        technical_message,
        attachments,
    }
}

//! The external sorting capability, consumed as a black box.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::library::Library;

/// Output of one sort pass: the libraries in dependency order (producers
/// precede consumers) plus the definition names resolved while sorting,
/// keyed to the artifact that won each definition.
pub struct SortResult {
    pub libraries: Vec<Arc<Library>>,
    pub definition_map: HashMap<String, PathBuf>,
}

/// Dependency-orders an unordered library list, writing the merged output
/// artifact to `output`.
///
/// `is_external` classifies a definition name as already provided elsewhere
/// (by the global artifact for root sorts, by the root set for child sorts)
/// so the sorter skips re-emitting it. Sorting is a synchronous, blocking
/// call; a failure is fatal to the resolve that requested it.
pub trait LibrarySorter: Send + Sync {
    fn sort(
        &self,
        libraries: &[Arc<Library>],
        output: &Path,
        is_external: &dyn Fn(&str) -> bool,
    ) -> anyhow::Result<SortResult>;
}

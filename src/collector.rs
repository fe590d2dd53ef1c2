//! Host-side collection boundary: library discovery and style processing.

use std::path::PathBuf;

use crate::library::Library;
use crate::library_set::AssetCounter;
use crate::module_info::ModuleInfo;
use crate::strings::StringWriter;

/// Artifact lists collected for one module.
///
/// The SDK and external lists are disjoint and free of duplicates.
/// `global_artifact` is the baseline library (playerglobal/airglobal) whose
/// definitions seed the root set's is-external predicate.
#[derive(Debug)]
pub struct CollectedArtifacts {
    pub sdk_artifacts: Vec<PathBuf>,
    pub external_artifacts: Vec<PathBuf>,
    pub sdk_version: String,
    pub global_artifact: PathBuf,
}

/// Walks a module's SDK and project-declared library roots.
///
/// Implementations run inside the host's read snapshot: the inspected
/// project model must not mutate structurally while `collect` runs, and the
/// snapshot is released when `collect` returns on any path.
pub trait LibraryCollector {
    fn collect(&self, module: &crate::module_info::Module) -> anyhow::Result<CollectedArtifacts>;
}

/// Style and resource discovery over libraries and modules.
pub trait StyleInfoCollector {
    /// Runs for every collected library, again for reused instances
    /// (`is_new == false`). Non-fatal problems are the implementation's to
    /// report; this path does not fail.
    fn process(
        &self,
        library: &Library,
        is_new: bool,
        writer: &mut StringWriter,
        assets: &mut AssetCounter,
    );

    /// Collects the module's own style holders. Runs once per module inside
    /// its own rollback window after the sets are registered.
    fn collect_local_style_holders(
        &self,
        info: &ModuleInfo,
        sdk_version: &str,
        writer: &mut StringWriter,
        assets: &mut AssetCounter,
    ) -> anyhow::Result<()>;
}

//! Shared fakes for the initialization flow tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use parking_lot::Mutex;

use flex_libset::{
    AssetCounter, CollectedArtifacts, DefinitionReader, DesignerClient, Library, LibraryCollector,
    LibrarySet, LibrarySorter, Module, ModuleInfo, Notifier, Project, ProjectRegistry, SortResult,
    StringWriter, StyleInfoCollector,
};

pub fn project(id: u64, name: &str) -> Arc<Project> {
    Arc::new(Project {
        id,
        name: name.to_string(),
    })
}

pub fn module(id: u64, name: &str, project: &Arc<Project>) -> Arc<Module> {
    Arc::new(Module {
        id,
        name: name.to_string(),
        project: project.clone(),
        app: true,
        sdk_home: None,
    })
}

/// Collector returning a fixed artifact layout, or failing on demand.
pub struct FakeCollector {
    pub sdk_artifacts: Vec<PathBuf>,
    pub external_artifacts: Vec<PathBuf>,
    pub fail: bool,
}

impl FakeCollector {
    pub fn new(sdk: &[&str], external: &[&str]) -> Self {
        Self {
            sdk_artifacts: sdk.iter().map(PathBuf::from).collect(),
            external_artifacts: external.iter().map(PathBuf::from).collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            sdk_artifacts: Vec::new(),
            external_artifacts: Vec::new(),
            fail: true,
        }
    }
}

impl LibraryCollector for FakeCollector {
    fn collect(&self, _module: &Module) -> anyhow::Result<CollectedArtifacts> {
        if self.fail {
            return Err(anyhow!("module roots are broken"));
        }
        Ok(CollectedArtifacts {
            sdk_artifacts: self.sdk_artifacts.clone(),
            external_artifacts: self.external_artifacts.clone(),
            sdk_version: "4.6".to_string(),
            global_artifact: PathBuf::from("/sdk/playerglobal.swc"),
        })
    }
}

/// Style discovery fake: interns one string and counts one image per
/// processed library, injects configured resource bundles, and can fail the
/// local style-holder phase.
#[derive(Default)]
pub struct FakeStyles {
    /// (artifact path, locale, bundle) triples to inject during processing.
    pub bundles: Vec<(PathBuf, String, String)>,
    pub fail_local: bool,
}

impl FakeStyles {
    pub fn with_bundle(artifact: &str, locale: &str, bundle: &str) -> Self {
        Self {
            bundles: vec![(
                PathBuf::from(artifact),
                locale.to_string(),
                bundle.to_string(),
            )],
            fail_local: false,
        }
    }

    pub fn failing_local() -> Self {
        Self {
            fail_local: true,
            ..Self::default()
        }
    }
}

impl StyleInfoCollector for FakeStyles {
    fn process(
        &self,
        library: &Library,
        _is_new: bool,
        writer: &mut StringWriter,
        assets: &mut AssetCounter,
    ) {
        let stem = library
            .file()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        writer.write(&format!("style::{stem}"));
        assets.image_count += 1;
        library.set_catalog_file(library.file().join("catalog.xml"));
        for (artifact, locale, bundle) in &self.bundles {
            if artifact == library.file() {
                library.put_resource_bundle(locale, bundle);
            }
        }
        library.mark_processed();
    }

    fn collect_local_style_holders(
        &self,
        info: &ModuleInfo,
        _sdk_version: &str,
        writer: &mut StringWriter,
        _assets: &mut AssetCounter,
    ) -> anyhow::Result<()> {
        writer.write(&format!("local::{}", info.module().name));
        if self.fail_local {
            return Err(anyhow!("defaults.css is unreadable"));
        }
        Ok(())
    }
}

/// Sorter ordering libraries by path, counting invocations.
pub struct AlphaSorter {
    pub calls: Arc<AtomicUsize>,
}

impl AlphaSorter {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl LibrarySorter for AlphaSorter {
    fn sort(
        &self,
        libraries: &[Arc<Library>],
        _output: &Path,
        _is_external: &dyn Fn(&str) -> bool,
    ) -> anyhow::Result<SortResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut sorted = libraries.to_vec();
        sorted.sort_by(|a, b| a.file().cmp(b.file()));
        let definition_map = sorted
            .iter()
            .map(|library| {
                let stem = library.file().file_stem().unwrap().to_string_lossy();
                (format!("def::{stem}"), library.file().to_path_buf())
            })
            .collect();
        Ok(SortResult {
            libraries: sorted,
            definition_map,
        })
    }
}

pub struct FailingSorter;

impl LibrarySorter for FailingSorter {
    fn sort(
        &self,
        _libraries: &[Arc<Library>],
        _output: &Path,
        _is_external: &dyn Fn(&str) -> bool,
    ) -> anyhow::Result<SortResult> {
        Err(anyhow!("definition cycle between inputs"))
    }
}

/// Definition reader serving a fixed set, counting reads.
pub struct StaticReader {
    pub definitions: HashSet<String>,
    pub reads: Arc<AtomicUsize>,
    pub fail: bool,
}

impl StaticReader {
    pub fn new(definitions: &[&str]) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                definitions: definitions.iter().map(|s| s.to_string()).collect(),
                reads: reads.clone(),
                fail: false,
            },
            reads,
        )
    }

    pub fn failing() -> Self {
        Self {
            definitions: HashSet::new(),
            reads: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }
}

impl DefinitionReader for StaticReader {
    fn read_definitions(&self, _artifact: &Path) -> io::Result<HashSet<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "missing catalog"));
        }
        Ok(self.definitions.clone())
    }
}

/// Client recording every registration as a string event.
#[derive(Default)]
pub struct RecordingClient {
    pub events: Mutex<Vec<String>>,
    projects: ProjectRegistry,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl DesignerClient for RecordingClient {
    fn register_library_set(&self, set: &Arc<LibrarySet>) {
        self.events.lock().push(format!(
            "register_library_set:{}:{}",
            set.id(),
            set.libraries().len()
        ));
    }

    fn register_module(
        &self,
        project: &Arc<Project>,
        info: &Arc<ModuleInfo>,
        writer: &mut StringWriter,
    ) {
        let strings = writer.pending_entries().len();
        writer.finish_change();
        self.events.lock().push(format!(
            "register_module:{}:{}:{}",
            project.name,
            info.module().name,
            strings
        ));
    }

    fn open_project(&self, project: &Arc<Project>) {
        self.events.lock().push(format!("open_project:{}", project.name));
    }

    fn fill_asset_pool(&self, root: &Arc<LibrarySet>) {
        self.events
            .lock()
            .push(format!("fill_asset_pool:{}", root.id()));
    }

    fn update_string_registry(&self, writer: &mut StringWriter) {
        let strings = writer.pending_entries().len();
        writer.finish_change();
        self.events.lock().push(format!("strings:{strings}"));
    }

    fn registered_projects(&self) -> &ProjectRegistry {
        &self.projects
    }
}

/// Notifier recording advisories as (project id, message) pairs.
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(u64, String)>>,
}

impl Notifier for RecordingNotifier {
    fn notify_warning(&self, project: &Project, message: &str) {
        self.messages.lock().push((project.id, message.to_string()));
    }
}

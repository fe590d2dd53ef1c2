//! Top-level orchestration: collect a module's libraries, resolve its sets,
//! register everything with the designer runtime.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use smallvec::smallvec;
use tracing::info;

use crate::bundles;
use crate::cache::{LibrarySetCache, ResolveContext, ResolveRequest};
use crate::client::{DesignerClient, Notifier};
use crate::collector::{LibraryCollector, StyleInfoCollector};
use crate::definitions::{DefinitionReader, GlobalDefinitionIndex};
use crate::errors::InitError;
use crate::library::{Library, LibraryRegistry};
use crate::library_set::{AssetCounter, LibrarySet};
use crate::module_info::{Module, ModuleInfo, ProjectInfo};
use crate::sort::LibrarySorter;
use crate::strings::{StringRegistry, StringWriter};

/// Session-wide library manager.
///
/// Owns the process-wide caches (library registry, set cache, definition
/// index, string registry) and orchestrates module initialization against
/// the injected collaborators. Created at session start, torn down at
/// session end; tests construct a fresh instance per case.
///
/// `init_library_sets` calls are serialized by the host; the caches
/// themselves tolerate concurrent resolves (see [`LibrarySetCache`]).
pub struct LibraryManager {
    set_cache: LibrarySetCache,
    registry: LibraryRegistry,
    definition_index: GlobalDefinitionIndex,
    string_registry: Arc<StringRegistry>,
    sorter: Box<dyn LibrarySorter>,
    client: Arc<dyn DesignerClient>,
    notifier: Arc<dyn Notifier>,
    /// Modules subscribed to external root-change advisories.
    root_subscriptions: Mutex<Vec<Arc<Module>>>,
}

/// Collected artifacts resolved into `Library` records.
struct CollectedLibraries {
    sdk: Vec<Arc<Library>>,
    external: Vec<Arc<Library>>,
    sdk_version: String,
    global_artifact: PathBuf,
}

impl LibraryManager {
    pub fn new(
        app_dir: impl Into<PathBuf>,
        definition_reader: Box<dyn DefinitionReader>,
        sorter: Box<dyn LibrarySorter>,
        client: Arc<dyn DesignerClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            set_cache: LibrarySetCache::new(app_dir),
            registry: LibraryRegistry::new(),
            definition_index: GlobalDefinitionIndex::new(definition_reader),
            string_registry: Arc::new(StringRegistry::new()),
            sorter,
            client,
            notifier,
            root_subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Resolve and register the library sets for `module`.
    ///
    /// Runs the whole pipeline: collect SDK/external artifacts, resolve the
    /// root set and (when external libraries exist) its child set through
    /// the dedup cache, build the module record, optionally collect local
    /// style holders, and push the registration to the client. Any failure
    /// aborts the call; staged string-table changes are rolled back, while
    /// set registrations already committed stay (they are keyed by content
    /// and safe to reuse on retry).
    pub fn init_library_sets(
        &self,
        module: &Arc<Module>,
        collector: &dyn LibraryCollector,
        styles: &dyn StyleInfoCollector,
        collect_local_style_holders: bool,
    ) -> Result<Arc<ModuleInfo>, InitError> {
        let project = module.project.clone();
        let mut writer = StringWriter::new(self.string_registry.clone());
        writer.start_change();
        let assets = Arc::new(Mutex::new(AssetCounter::default()));

        let collected =
            match self.collect_and_process(module, collector, styles, &mut writer, &assets) {
                Ok(collected) => collected,
                Err(source) => {
                    writer.rollback_change();
                    return Err(InitError::collect(source));
                }
            };
        if writer.has_changes() {
            self.client.update_string_registry(&mut writer);
        } else {
            writer.finish_change();
        }

        // An SDK always contributes at least its framework libraries; an
        // empty list here is a collector bug, not a recoverable condition.
        assert!(
            !collected.sdk.is_empty(),
            "collector yielded no SDK libraries for module {}",
            module.name
        );

        let root_set = self.get_or_create_root_set(&collected, assets.clone())?;

        let projects = self.client.registered_projects();
        if projects.get(&project).is_none() {
            projects.add(ProjectInfo::new(project.clone()));
            self.client.open_project(&project);
        }

        let ctx = ResolveContext {
            sorter: self.sorter.as_ref(),
            registry: &self.registry,
            client: self.client.as_ref(),
            sdk_version: &collected.sdk_version,
        };
        let external_set = self.set_cache.resolve(
            &collected.external,
            ResolveRequest::Child {
                parent: root_set.clone(),
            },
            &ctx,
        )?;

        let info = Arc::new(ModuleInfo::new(
            module.clone(),
            smallvec![external_set.unwrap_or_else(|| root_set.clone())],
            module.app,
        ));

        if collect_local_style_holders {
            // the client finalizes this window in register_module
            writer.start_change();
            if let Err(source) = styles.collect_local_style_holders(
                &info,
                &collected.sdk_version,
                &mut writer,
                &mut assets.lock(),
            ) {
                writer.rollback_change();
                return Err(InitError::collect_style_holders(source));
            }
        }

        self.client.register_module(&project, &info, &mut writer);
        self.client.fill_asset_pool(&root_set);
        self.subscribe_to_root_changes(module);
        info!(module = %module.name, sets = info.library_sets().len(), "module registered");
        Ok(info)
    }

    /// Drop the sets with the given ids from the cache and release the ids.
    pub fn unregister(&self, ids: &[u32]) {
        self.set_cache.unregister(ids);
    }

    /// Reclaim unused sets and ids. Extension point, currently a no-op:
    /// `unregister` is the only reclamation path.
    pub fn garbage_collection(&self) {}

    pub fn is_registered(&self, library: &Library) -> bool {
        self.registry.contains(library)
    }

    /// Assign (or fetch) the wire id for `library`.
    pub fn add(&self, library: &Arc<Library>) -> u32 {
        self.registry.add(library)
    }

    /// Find the `.properties` file backing `(locale, bundle_name)` for a
    /// module. Absence is a normal `None`, not an error.
    pub fn resource_bundle_file(
        &self,
        info: &ModuleInfo,
        locale: &str,
        bundle_name: &str,
    ) -> Option<PathBuf> {
        bundles::find_resource_bundle(info, locale, bundle_name)
    }

    /// Host callback: a subscribed module's external roots changed. The
    /// session's caches are not invalidated; the user is advised to reopen.
    pub fn roots_changed(&self, module_id: u64) {
        let subscriptions = self.root_subscriptions.lock();
        for module in subscriptions.iter().filter(|module| module.id == module_id) {
            self.notifier.notify_warning(
                &module.project,
                "Please reopen your project to update on library changes.",
            );
        }
    }

    pub fn registry(&self) -> &LibraryRegistry {
        &self.registry
    }

    pub fn set_cache(&self) -> &LibrarySetCache {
        &self.set_cache
    }

    pub fn string_registry(&self) -> &Arc<StringRegistry> {
        &self.string_registry
    }

    fn collect_and_process(
        &self,
        module: &Arc<Module>,
        collector: &dyn LibraryCollector,
        styles: &dyn StyleInfoCollector,
        writer: &mut StringWriter,
        assets: &Mutex<AssetCounter>,
    ) -> anyhow::Result<CollectedLibraries> {
        let artifacts = collector.collect(module)?;
        let sdk = self.create_libraries(&artifacts.sdk_artifacts, styles, writer, assets);
        let external = self.create_libraries(&artifacts.external_artifacts, styles, writer, assets);
        Ok(CollectedLibraries {
            sdk,
            external,
            sdk_version: artifacts.sdk_version,
            global_artifact: artifacts.global_artifact,
        })
    }

    fn create_libraries(
        &self,
        paths: &[PathBuf],
        styles: &dyn StyleInfoCollector,
        writer: &mut StringWriter,
        assets: &Mutex<AssetCounter>,
    ) -> Vec<Arc<Library>> {
        paths
            .iter()
            .map(|path| {
                self.registry.create_original(path, |library, is_new| {
                    styles.process(library, is_new, writer, &mut assets.lock())
                })
            })
            .collect()
    }

    fn get_or_create_root_set(
        &self,
        collected: &CollectedLibraries,
        assets: Arc<Mutex<AssetCounter>>,
    ) -> Result<Arc<LibrarySet>, InitError> {
        let global_definitions = self
            .definition_index
            .definitions_for(&collected.global_artifact)?;
        let ctx = ResolveContext {
            sorter: self.sorter.as_ref(),
            registry: &self.registry,
            client: self.client.as_ref(),
            sdk_version: &collected.sdk_version,
        };
        let set = self.set_cache.resolve(
            &collected.sdk,
            ResolveRequest::Root {
                global_definitions,
                assets,
            },
            &ctx,
        )?;
        Ok(set.expect("non-empty sdk library list always yields a set"))
    }

    fn subscribe_to_root_changes(&self, module: &Arc<Module>) {
        let mut subscriptions = self.root_subscriptions.lock();
        if !subscriptions.iter().any(|known| known.id == module.id) {
            subscriptions.push(module.clone());
        }
    }
}

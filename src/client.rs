//! Downstream designer-runtime client boundary.
//!
//! The runtime consumes registered library sets and modules through
//! [`DesignerClient`]; these are the only mutation points it exposes and the
//! engine never bypasses them. Client methods are infallible at this
//! boundary: the client owns its transport and its failure handling.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::warn;

use crate::library_set::{AssetCounter, LibrarySet};
use crate::module_info::{ModuleInfo, Project, ProjectInfo};
use crate::strings::StringWriter;

/// Session-wide record of projects already opened with the client.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: Mutex<HashMap<u64, Arc<ProjectInfo>>>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, project: &Project) -> Option<Arc<ProjectInfo>> {
        self.projects.lock().get(&project.id).cloned()
    }

    pub fn add(&self, info: ProjectInfo) -> Arc<ProjectInfo> {
        let info = Arc::new(info);
        self.projects.lock().insert(info.project().id, info.clone());
        info
    }

    pub fn contains(&self, project: &Project) -> bool {
        self.projects.lock().contains_key(&project.id)
    }

    pub fn len(&self) -> usize {
        self.projects.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The designer runtime consuming registered sets and modules.
pub trait DesignerClient: Send + Sync {
    fn register_library_set(&self, set: &Arc<LibrarySet>);

    /// Register a module. Consumes (and finalizes) the writer's pending
    /// string-table window.
    fn register_module(
        &self,
        project: &Arc<Project>,
        info: &Arc<ModuleInfo>,
        writer: &mut StringWriter,
    );

    fn open_project(&self, project: &Arc<Project>);

    /// Ask the runtime to top up its asset class pool from the root set's
    /// counters, if anything was counted.
    fn fill_asset_pool(&self, root: &Arc<LibrarySet>);

    /// Forward (and finalize) the writer's pending string-table window.
    fn update_string_registry(&self, writer: &mut StringWriter);

    fn registered_projects(&self) -> &ProjectRegistry;
}

/// Advisory messages surfaced to the user. Fire and forget, no
/// acknowledgment expected.
pub trait Notifier: Send + Sync {
    fn notify_warning(&self, project: &Project, message: &str);
}

/// Notifier that routes advisories to the tracing log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_warning(&self, project: &Project, message: &str) {
        warn!(project = %project.name, message, "designer advisory");
    }
}

/// Wire payloads written by [`JsonLinesClient`], one JSON object per line.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage<'a> {
    OpenProject {
        project_id: u64,
        name: &'a str,
    },
    RegisterLibrarySet {
        id: u32,
        parent_id: Option<u32>,
        libraries: Vec<String>,
    },
    RegisterModule {
        project_id: u64,
        module_id: u64,
        name: &'a str,
        app: bool,
        library_set_ids: Vec<u32>,
    },
    FillAssetPool {
        library_set_id: u32,
        assets: AssetCounter,
    },
    Strings {
        entries: Vec<(u32, String)>,
    },
}

/// Designer client writing newline-delimited JSON to the runtime transport.
///
/// Write failures are logged and the message dropped; the runtime detects a
/// broken transport on its side.
pub struct JsonLinesClient<W> {
    out: Mutex<W>,
    projects: ProjectRegistry,
}

impl<W: Write + Send> JsonLinesClient<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            projects: ProjectRegistry::new(),
        }
    }

    /// Hand back the transport, for tests and shutdown.
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn send(&self, message: &ClientMessage<'_>) {
        if let Err(error) = self.try_send(message) {
            warn!(%error, "dropping designer client message after write failure");
        }
    }

    fn try_send(&self, message: &ClientMessage<'_>) -> anyhow::Result<()> {
        let mut out = self.out.lock();
        serde_json::to_writer(&mut *out, message)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }

    fn flush_strings(&self, writer: &mut StringWriter) {
        let entries = writer.pending_entries();
        if !entries.is_empty() {
            self.send(&ClientMessage::Strings { entries });
        }
        writer.finish_change();
    }
}

impl<W: Write + Send> DesignerClient for JsonLinesClient<W> {
    fn register_library_set(&self, set: &Arc<LibrarySet>) {
        self.send(&ClientMessage::RegisterLibrarySet {
            id: set.id(),
            parent_id: set.parent().map(|parent| parent.id()),
            libraries: set
                .libraries()
                .iter()
                .map(|library| library.file().to_string_lossy().into_owned())
                .collect(),
        });
    }

    fn register_module(
        &self,
        project: &Arc<Project>,
        info: &Arc<ModuleInfo>,
        writer: &mut StringWriter,
    ) {
        self.flush_strings(writer);
        self.send(&ClientMessage::RegisterModule {
            project_id: project.id,
            module_id: info.module().id,
            name: &info.module().name,
            app: info.is_app(),
            library_set_ids: info.library_sets().iter().map(|set| set.id()).collect(),
        });
    }

    fn open_project(&self, project: &Arc<Project>) {
        self.send(&ClientMessage::OpenProject {
            project_id: project.id,
            name: &project.name,
        });
    }

    fn fill_asset_pool(&self, root: &Arc<LibrarySet>) {
        let Some(assets) = root.assets() else {
            return;
        };
        if assets.total() == 0 {
            return;
        }
        self.send(&ClientMessage::FillAssetPool {
            library_set_id: root.id(),
            assets,
        });
    }

    fn update_string_registry(&self, writer: &mut StringWriter) {
        self.flush_strings(writer);
    }

    fn registered_projects(&self) -> &ProjectRegistry {
        &self.projects
    }
}

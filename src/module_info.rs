//! Host module/project handles and their registration records.

use std::path::PathBuf;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::library_set::LibrarySet;

/// Host project handle. Identity is the numeric id assigned by the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    pub id: u64,
    pub name: String,
}

/// Host module handle.
#[derive(Debug, Clone)]
pub struct Module {
    pub id: u64,
    pub name: String,
    pub project: Arc<Project>,
    /// Application module (produces a runnable SWF) vs library module.
    pub app: bool,
    /// SDK install root, when the module targets a locally installed SDK.
    pub sdk_home: Option<PathBuf>,
}

/// The set(s) a module resolves against: the external child set when the
/// module declares external libraries, otherwise the root SDK set.
pub type LibrarySets = SmallVec<[Arc<LibrarySet>; 2]>;

/// Per-module registration record.
#[derive(Debug)]
pub struct ModuleInfo {
    module: Arc<Module>,
    library_sets: LibrarySets,
    app: bool,
}

impl ModuleInfo {
    pub fn new(module: Arc<Module>, library_sets: LibrarySets, app: bool) -> Self {
        Self {
            module,
            library_sets,
            app,
        }
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }

    pub fn library_sets(&self) -> &[Arc<LibrarySet>] {
        &self.library_sets
    }

    pub fn is_app(&self) -> bool {
        self.app
    }
}

/// Per-project registration record, created lazily on the first module
/// registration and kept for the session.
#[derive(Debug)]
pub struct ProjectInfo {
    project: Arc<Project>,
}

impl ProjectInfo {
    pub fn new(project: Arc<Project>) -> Self {
        Self { project }
    }

    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }
}

//! Ordered, immutable library sets and their root/child variants.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::library::Library;

/// Counters for embedded assets discovered during style processing.
///
/// A root set keeps the live counter it was built with; the runtime reads a
/// snapshot when it fills its asset class pool.
#[derive(Debug, Default, Clone, Serialize)]
pub struct AssetCounter {
    pub image_count: u32,
    pub swf_count: u32,
    pub view_navigator_count: u32,
}

impl AssetCounter {
    pub fn append(&mut self, other: &AssetCounter) {
        self.image_count += other.image_count;
        self.swf_count += other.swf_count;
        self.view_navigator_count += other.view_navigator_count;
    }

    pub fn total(&self) -> u32 {
        self.image_count + self.swf_count + self.view_navigator_count
    }
}

/// Classifies a definition name as already provided by the root set.
///
/// Root sorts treat a name as external when the designated global artifact
/// defines it; child sorts additionally treat everything the root set itself
/// resolved as external.
#[derive(Debug, Clone)]
pub struct ContainsPredicate {
    global_definitions: Arc<HashSet<String>>,
    definition_map: HashMap<String, PathBuf>,
}

impl ContainsPredicate {
    pub fn new(
        global_definitions: Arc<HashSet<String>>,
        definition_map: HashMap<String, PathBuf>,
    ) -> Self {
        Self {
            global_definitions,
            definition_map,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.global_definitions.contains(name) || self.definition_map.contains_key(name)
    }
}

/// Root-vs-child payload of a [`LibrarySet`].
#[derive(Debug)]
pub enum SetKind {
    /// SDK-level set: no parent; owns the global/external predicate and the
    /// asset counter that was live while it was built.
    Root {
        contains: ContainsPredicate,
        assets: Arc<Mutex<AssetCounter>>,
    },
    /// Project-level set chained to an already-registered parent.
    Child { parent: Arc<LibrarySet> },
}

/// A deduplicated, dependency-ordered group of libraries produced by one
/// sort pass.
///
/// Immutable after construction (asset counters aside) and shared
/// structurally: every module that resolves to the same canonical key holds
/// the same `Arc<LibrarySet>`.
#[derive(Debug)]
pub struct LibrarySet {
    id: u32,
    libraries: Vec<Arc<Library>>,
    kind: SetKind,
}

impl LibrarySet {
    pub fn new_root(
        id: u32,
        libraries: Vec<Arc<Library>>,
        contains: ContainsPredicate,
        assets: Arc<Mutex<AssetCounter>>,
    ) -> Self {
        Self {
            id,
            libraries,
            kind: SetKind::Root { contains, assets },
        }
    }

    pub fn new_child(id: u32, parent: Arc<LibrarySet>, libraries: Vec<Arc<Library>>) -> Self {
        Self {
            id,
            libraries,
            kind: SetKind::Child { parent },
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Libraries in dependency order: producers precede consumers.
    pub fn libraries(&self) -> &[Arc<Library>] {
        &self.libraries
    }

    pub fn kind(&self) -> &SetKind {
        &self.kind
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, SetKind::Root { .. })
    }

    pub fn parent(&self) -> Option<&Arc<LibrarySet>> {
        match &self.kind {
            SetKind::Root { .. } => None,
            SetKind::Child { parent } => Some(parent),
        }
    }

    /// The predicate of the root set this set chains to. Child chains are
    /// acyclic and always end in a root, by construction.
    pub fn root_contains(&self) -> &ContainsPredicate {
        let mut set = self;
        loop {
            match &set.kind {
                SetKind::Root { contains, .. } => return contains,
                SetKind::Child { parent } => set = parent,
            }
        }
    }

    /// Snapshot of the root set's asset counters; `None` for child sets.
    pub fn assets(&self) -> Option<AssetCounter> {
        match &self.kind {
            SetKind::Root { assets, .. } => Some(assets.lock().clone()),
            SetKind::Child { .. } => None,
        }
    }

    /// This set followed by its ancestors, child to root.
    pub fn chain(&self) -> SetChain<'_> {
        SetChain { next: Some(self) }
    }
}

/// Iterator over a set and its parent chain.
pub struct SetChain<'a> {
    next: Option<&'a LibrarySet>,
}

impl<'a> Iterator for SetChain<'a> {
    type Item = &'a LibrarySet;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent().map(|parent| parent.as_ref());
        Some(current)
    }
}

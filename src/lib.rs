//! Library-set resolution and caching for a Flex UI designer runtime.
//!
//! Resolves a module's compiled library dependencies (SDK frameworks plus
//! project-declared external libraries) into deduplicated, dependency-ordered,
//! cacheable library sets and registers them with the downstream designer
//! runtime:
//!
//! - **Identity**: an order-independent canonical key dedups set construction;
//!   artifact-equal library lists share one [`LibrarySet`] instance.
//! - **Lifecycle**: small integer ids are pooled and become reusable when sets
//!   are unregistered.
//! - **Rollback**: a failing initialization step never leaves partial state
//!   visible to the runtime.
//!
//! The sorting algorithm, the host project model, and the runtime transport
//! are consumed through traits ([`LibrarySorter`], [`LibraryCollector`],
//! [`DesignerClient`]); this crate owns only the identity management around
//! them. See [`LibraryManager`] for the top-level entry point.

pub mod bundles;
pub mod cache;
pub mod client;
pub mod collector;
pub mod definitions;
pub mod errors;
pub mod id_pool;
pub mod library;
pub mod library_set;
pub mod manager;
pub mod module_info;
pub mod sort;
pub mod strings;

pub use cache::{cache_key, LibrarySetCache, ResolveContext, ResolveRequest};
pub use client::{DesignerClient, JsonLinesClient, LogNotifier, Notifier, ProjectRegistry};
pub use collector::{CollectedArtifacts, LibraryCollector, StyleInfoCollector};
pub use definitions::{DefinitionReader, GlobalDefinitionIndex};
pub use errors::{Attachment, InitError};
pub use id_pool::IdPool;
pub use library::{Library, LibraryRegistry};
pub use library_set::{AssetCounter, ContainsPredicate, LibrarySet, SetKind};
pub use manager::LibraryManager;
pub use module_info::{LibrarySets, Module, ModuleInfo, Project, ProjectInfo};
pub use sort::{LibrarySorter, SortResult};
pub use strings::{StringRegistry, StringWriter};

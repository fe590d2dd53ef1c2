//! Typed failures raised while initializing a module's library sets.
//!
//! Every variant keeps the underlying cause chain and maps to the localized
//! message key the host UI renders. A failure aborts the whole
//! initialization call; nothing partial is left visible to the client.

use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Diagnostic file reference attached to a sort failure, pointing at a
/// library's catalog so the failing input can be inspected offline.
#[derive(Debug, Clone, Serialize)]
pub struct Attachment {
    pub name: String,
    pub path: PathBuf,
}

impl Attachment {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// Failure raised while initializing a module's library sets.
#[derive(Debug)]
pub enum InitError {
    /// Walking the module's SDK and external libraries failed.
    Collect { source: anyhow::Error },
    /// The external sorter rejected a library list. Carries a technical
    /// summary and best-effort catalog attachments for the libraries that
    /// were being sorted.
    SortLibraries {
        source: anyhow::Error,
        technical_message: String,
        attachments: Vec<Attachment>,
    },
    /// Reading the global artifact's definition names failed.
    ReadDefinitions {
        file: PathBuf,
        source: std::io::Error,
    },
    /// Collecting local style holders failed after the sets were already
    /// registered.
    CollectStyleHolders { source: anyhow::Error },
}

impl InitError {
    pub fn collect(source: anyhow::Error) -> Self {
        InitError::Collect { source }
    }

    pub fn collect_style_holders(source: anyhow::Error) -> Self {
        InitError::CollectStyleHolders { source }
    }

    /// Localized message key for the host UI.
    pub fn message_key(&self) -> &'static str {
        match self {
            InitError::Collect { .. } => "error.collect.libraries",
            InitError::SortLibraries { .. } => "error.sort.libraries",
            InitError::ReadDefinitions { .. } => "error.read.definitions",
            InitError::CollectStyleHolders { .. } => "error.collect.local.style.holders",
        }
    }

    /// Diagnostic attachments, if the failure carries any.
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            InitError::SortLibraries { attachments, .. } => attachments,
            _ => &[],
        }
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Collect { .. } => write!(f, "failed to collect module libraries"),
            InitError::SortLibraries {
                technical_message, ..
            } => write!(f, "failed to sort libraries ({technical_message})"),
            InitError::ReadDefinitions { file, .. } => {
                write!(f, "failed to read definitions from {}", file.display())
            }
            InitError::CollectStyleHolders { .. } => {
                write!(f, "failed to collect local style holders")
            }
        }
    }
}

impl StdError for InitError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            InitError::Collect { source }
            | InitError::SortLibraries { source, .. }
            | InitError::CollectStyleHolders { source } => Some(source.as_ref()),
            InitError::ReadDefinitions { source, .. } => Some(source),
        }
    }
}

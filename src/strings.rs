//! Interned protocol strings shared with the designer client.
//!
//! Strings referenced by wire payloads are sent to the client once and
//! referred to by id afterwards. Writers stage additions inside a *change
//! window* so a failing initialization step can roll the table back to its
//! pre-call state; the client never observes strings from a rolled-back
//! window.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Session-wide interning table of protocol strings.
#[derive(Debug, Default)]
pub struct StringRegistry {
    table: Mutex<StringTable>,
}

#[derive(Debug, Default)]
struct StringTable {
    index: HashMap<String, u32>,
    names: Vec<String>,
}

impl StringRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.lock().index.contains_key(name)
    }
}

/// Stages string-table additions for one initialization pass.
///
/// The orchestrator serializes passes, so at most one writer has an open
/// change window at a time; rollback relies on the staged strings being the
/// table's tail.
#[derive(Debug)]
pub struct StringWriter {
    registry: Arc<StringRegistry>,
    /// Table length at `start_change`, while a window is open.
    mark: Option<usize>,
    /// Ids interned during the current window, in interning order.
    pending: Vec<u32>,
}

impl StringWriter {
    pub fn new(registry: Arc<StringRegistry>) -> Self {
        Self {
            registry,
            mark: None,
            pending: Vec::new(),
        }
    }

    /// Open a change window.
    pub fn start_change(&mut self) {
        debug_assert!(self.mark.is_none(), "change window already open");
        self.mark = Some(self.registry.len());
        self.pending.clear();
    }

    /// Intern `name`, returning its stable id.
    pub fn write(&mut self, name: &str) -> u32 {
        let mut table = self.registry.table.lock();
        if let Some(&id) = table.index.get(name) {
            return id;
        }
        let id = table.names.len() as u32;
        table.names.push(name.to_string());
        table.index.insert(name.to_string(), id);
        self.pending.push(id);
        id
    }

    /// Whether the current window interned any new strings.
    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Discard the current window: every string interned since
    /// `start_change` is removed from the table.
    pub fn rollback_change(&mut self) {
        if let Some(mark) = self.mark.take() {
            let mut table = self.registry.table.lock();
            let removed = table.names.split_off(mark);
            for name in &removed {
                table.index.remove(name);
            }
        }
        self.pending.clear();
    }

    /// Commit the current window without emitting it.
    pub fn finish_change(&mut self) {
        self.mark = None;
        self.pending.clear();
    }

    /// `(id, name)` pairs staged in the current window, for the client to
    /// forward before it consumes payloads referencing them.
    pub fn pending_entries(&self) -> Vec<(u32, String)> {
        let table = self.registry.table.lock();
        self.pending
            .iter()
            .map(|&id| (id, table.names[id as usize].clone()))
            .collect()
    }

    pub fn registry(&self) -> &Arc<StringRegistry> {
        &self.registry
    }
}

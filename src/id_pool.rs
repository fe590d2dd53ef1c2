//! Reusable small-integer id allocation for library sets.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Allocates small non-negative ids for library sets and recycles them in
/// batches when sets are unregistered.
///
/// `allocate` always returns the smallest id not currently issued, so the id
/// space stays dense across long sessions. Disposing an id that is not
/// issued is a no-op, which keeps duplicate cleanup calls harmless.
#[derive(Debug, Default)]
pub struct IdPool {
    /// `issued[i]` is true while id `i` is held by a live set.
    issued: Vec<bool>,
    /// Released ids, smallest first.
    released: BinaryHeap<Reverse<u32>>,
}

impl IdPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the smallest id not currently issued. Never fails.
    pub fn allocate(&mut self) -> u32 {
        while let Some(Reverse(id)) = self.released.pop() {
            let slot = &mut self.issued[id as usize];
            if !*slot {
                *slot = true;
                return id;
            }
        }
        let id = self.issued.len() as u32;
        self.issued.push(true);
        id
    }

    /// Releases a batch of ids back to the pool.
    pub fn dispose(&mut self, ids: &[u32]) {
        for &id in ids {
            if let Some(slot) = self.issued.get_mut(id as usize) {
                if *slot {
                    *slot = false;
                    self.released.push(Reverse(id));
                }
            }
        }
    }

    /// Whether `id` is currently issued.
    pub fn is_issued(&self, id: u32) -> bool {
        self.issued.get(id as usize).copied().unwrap_or(false)
    }

    /// Number of ids currently issued.
    pub fn issued_count(&self) -> usize {
        self.issued.iter().filter(|held| **held).count()
    }
}

// src/engine/queue.rs

use std::collections::VecDeque;

use tracing::debug;

use crate::graph::PackagePath;

/// FIFO queue of package paths without duplicates.
#[derive(Debug, Clone, Default)]
pub struct BuildQueue {
    items: VecDeque<PackagePath>,
}

impl BuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, package: &str) -> bool {
        self.items.iter().any(|p| p == package)
    }

    /// Append `package` unless it is already queued. Returns whether it was
    /// appended.
    pub fn push_back(&mut self, package: &str) -> bool {
        if self.contains(package) {
            return false;
        }
        self.items.push_back(package.to_string());
        true
    }

    /// Remove `package` wherever it sits. Returns whether it was present.
    pub fn remove(&mut self, package: &str) -> bool {
        match self.items.iter().position(|p| p == package) {
            Some(idx) => {
                self.items.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn pop_front(&mut self) -> Option<PackagePath> {
        self.items.pop_front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}

/// Everything the scheduler knows about outstanding work.
///
/// Invariants:
/// - a package is never in both queues;
/// - `building` holds at most one package, and the next build is only
///   taken from the queues while it is empty;
/// - `direct` is always drained before `implied`.
#[derive(Debug, Clone, Default)]
pub struct PendingBuilds {
    direct: BuildQueue,
    implied: BuildQueue,
    building: Option<PackagePath>,
}

impl PendingBuilds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct(&self) -> &BuildQueue {
        &self.direct
    }

    pub fn implied(&self) -> &BuildQueue {
        &self.implied
    }

    pub fn building(&self) -> Option<&str> {
        self.building.as_deref()
    }

    /// No build running and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.building.is_none() && self.direct.is_empty() && self.implied.is_empty()
    }

    /// A direct request supersedes a queued implied one for the same package.
    pub fn request_direct(&mut self, package: &str) {
        let promoted = self.implied.remove(package);
        let queued = self.direct.push_back(package);
        debug!(package, promoted, queued, "direct request");
    }

    /// Ignored if the package is already queued in either queue.
    pub fn request_implied(&mut self, package: &str) {
        if self.direct.contains(package) || self.implied.contains(package) {
            debug!(package, "implied request already queued; ignoring");
            return;
        }
        self.implied.push_back(package);
        debug!(package, "implied request queued");
    }

    /// Clear the building slot if `package` is the one running.
    ///
    /// Returns whether the slot was cleared.
    pub fn complete(&mut self, package: &str) -> bool {
        if self.building.as_deref() == Some(package) {
            self.building = None;
            true
        } else {
            false
        }
    }

    /// If nothing is building, move the next package (direct first) into
    /// the building slot and return it.
    pub fn start_next(&mut self) -> Option<PackagePath> {
        if self.building.is_some() {
            return None;
        }
        let next = self
            .direct
            .pop_front()
            .or_else(|| self.implied.pop_front())?;
        self.building = Some(next.clone());
        Some(next)
    }
}

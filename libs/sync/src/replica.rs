//! Client-side replica of the visible instances.
//!
//! The replica is an ordered list with at most one record per identity.
//! Applying an event never reorders records it does not touch.

use labvt_events::{ChangeEvent, UpdateKind};
use labvt_model::{Instance, ObjectKey};

/// A replica entry as read by the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRecord {
    pub key: ObjectKey,
    pub instance: Instance,
    /// Position in the ordered collection.
    pub index: usize,
}

/// What applying an event did to the replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new record was appended.
    Inserted { index: usize },
    /// An existing record's snapshot was replaced in place.
    Replaced { index: usize, changed: bool },
    /// Records matching a deleted identity were removed.
    Removed { count: usize },
    /// Delete of an identity that is not present.
    Absent,
    /// Malformed event, nothing applied.
    Skipped,
}

impl ApplyOutcome {
    /// Returns true if the collection changed.
    pub fn mutated(&self) -> bool {
        match self {
            Self::Inserted { .. } | Self::Removed { .. } => true,
            Self::Replaced { changed, .. } => *changed,
            Self::Absent | Self::Skipped => false,
        }
    }
}

/// Ordered, duplicate-free collection of instance records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceReplica {
    records: Vec<InstanceRecord>,
}

impl InstanceReplica {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a replica from an authoritative list.
    ///
    /// Duplicate identities in the list collapse onto the first position,
    /// keeping the last snapshot.
    pub fn from_snapshot(items: impl IntoIterator<Item = Instance>) -> Self {
        let mut replica = Self::new();
        for instance in items {
            replica.upsert(instance);
        }
        replica
    }

    /// Replaces the whole content with an authoritative list.
    pub fn reset(&mut self, items: impl IntoIterator<Item = Instance>) {
        *self = Self::from_snapshot(items);
    }

    pub fn records(&self) -> &[InstanceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn position(&self, key: &ObjectKey) -> Option<usize> {
        self.records.iter().position(|r| &r.key == key)
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&InstanceRecord> {
        self.records.iter().find(|r| &r.key == key)
    }

    /// Applies a single change event.
    pub fn apply(&mut self, event: &ChangeEvent) -> ApplyOutcome {
        match event.kind {
            UpdateKind::Deleted => self.remove(&event.key),
            UpdateKind::Added | UpdateKind::Modified => match event.snapshot() {
                Some(instance) => self.upsert(instance.clone()),
                None => ApplyOutcome::Skipped,
            },
        }
    }

    /// Returns the replica that results from applying `event`, leaving `self`
    /// untouched.
    #[must_use]
    pub fn merged(&self, event: &ChangeEvent) -> (Self, ApplyOutcome) {
        let mut next = self.clone();
        let outcome = next.apply(event);
        (next, outcome)
    }

    fn upsert(&mut self, instance: Instance) -> ApplyOutcome {
        let key = instance.key();
        match self.position(&key) {
            Some(index) => {
                let record = &mut self.records[index];
                let changed = record.instance != instance;
                record.instance = instance;
                ApplyOutcome::Replaced { index, changed }
            }
            None => {
                let index = self.records.len();
                self.records.push(InstanceRecord {
                    key,
                    instance,
                    index,
                });
                ApplyOutcome::Inserted { index }
            }
        }
    }

    fn remove(&mut self, key: &ObjectKey) -> ApplyOutcome {
        let before = self.records.len();
        self.records.retain(|r| &r.key != key);
        let count = before - self.records.len();
        if count == 0 {
            return ApplyOutcome::Absent;
        }

        for (index, record) in self.records.iter_mut().enumerate() {
            record.index = index;
        }
        ApplyOutcome::Removed { count }
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Reference data lookups.
//!
//! The backing store's user and priority tables are already resident in
//! memory on the client. The [`ReferenceLookup`] trait abstracts read-only
//! access to them so the normalizer can be tested against a small in-memory
//! directory, which is also the production implementation.

use std::collections::BTreeMap;

use pulseboard_types::{PriorityRecord, UserRecord};

/// Synchronous, read-only access to the reference tables.
pub trait ReferenceLookup {
    /// Look up a user record by id.
    fn user_by_id(&self, id: i64) -> Option<&UserRecord>;

    /// Look up a priority record by id.
    fn priority_by_id(&self, id: i64) -> Option<&PriorityRecord>;
}

/// In-memory reference directory backed by ordered maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    /// User records keyed by id.
    users: BTreeMap<i64, UserRecord>,

    /// Priority records keyed by id.
    priorities: BTreeMap<i64, PriorityRecord>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub const fn new() -> Self {
        Self {
            users: BTreeMap::new(),
            priorities: BTreeMap::new(),
        }
    }

    /// Build a directory from record lists (e.g. loaded from configuration).
    pub fn from_records(users: Vec<UserRecord>, priorities: Vec<PriorityRecord>) -> Self {
        let mut directory = Self::new();
        for user in users {
            directory.insert_user(user);
        }
        for priority in priorities {
            directory.insert_priority(priority);
        }
        directory
    }

    /// Insert or replace a user record.
    pub fn insert_user(&mut self, user: UserRecord) {
        self.users.insert(user.id, user);
    }

    /// Insert or replace a priority record.
    pub fn insert_priority(&mut self, priority: PriorityRecord) {
        self.priorities.insert(priority.id, priority);
    }

    /// Number of user records in the directory.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl ReferenceLookup for InMemoryDirectory {
    fn user_by_id(&self, id: i64) -> Option<&UserRecord> {
        self.users.get(&id)
    }

    fn priority_by_id(&self, id: i64) -> Option<&PriorityRecord> {
        self.priorities.get(&id)
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use sidechat_storage::{SessionId, SessionRecord, UserId};
use snafu::ensure;

use super::error::{CoordinatorResult, DuplicateSessionSnafu};

/// Ordered sessions of the active user, newest first.
///
/// Records sit behind an `Arc` so renderers hold a cheap snapshot that later
/// mutations never touch.
#[derive(Debug, Clone, Default)]
pub struct SessionList {
    records: Arc<Vec<SessionRecord>>,
    owner: Option<UserId>,
    selected: Option<SessionId>,
}

impl SessionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Arc<Vec<SessionRecord>> {
        Arc::clone(&self.records)
    }

    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.records.iter().any(|record| record.id == session_id)
    }

    /// Places a freshly created session at the top of the list.
    pub fn insert_front(&mut self, record: SessionRecord) -> CoordinatorResult<()> {
        ensure!(
            !self.contains(record.id),
            DuplicateSessionSnafu {
                stage: "session-list-insert",
                session_id: record.id,
            }
        );

        Arc::make_mut(&mut self.records).insert(0, record);
        Ok(())
    }

    /// Swaps in an updated record at its current position.
    pub fn replace(&mut self, record: SessionRecord) -> bool {
        let records = Arc::make_mut(&mut self.records);
        match records.iter_mut().find(|existing| existing.id == record.id) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, session_id: SessionId) -> Option<SessionRecord> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == session_id)?;
        if self.selected == Some(session_id) {
            self.selected = None;
        }
        Some(Arc::make_mut(&mut self.records).remove(index))
    }

    /// Replaces everything with `records` for `owner`, keeping the first copy of any repeated id.
    pub fn reset(&mut self, owner: Option<UserId>, records: Vec<SessionRecord>) {
        let mut seen = HashSet::with_capacity(records.len());
        let mut unique = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.id) {
                unique.push(record);
            } else {
                tracing::warn!("dropping repeated session {} from loaded list", record.id);
            }
        }

        if self.owner != owner {
            self.selected = None;
        }
        self.owner = owner;
        self.records = Arc::new(unique);
    }

    pub fn select(&mut self, session_id: SessionId) -> bool {
        if !self.contains(session_id) {
            return false;
        }
        self.selected = Some(session_id);
        true
    }

    /// The selected session, or `None` once it has left the list.
    pub fn selected(&self) -> Option<SessionId> {
        self.selected.filter(|selected| self.contains(*selected))
    }
}

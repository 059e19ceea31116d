use std::cmp::Ordering;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::ids::{SessionId, UserId};

/// Name given to sessions created without an explicit label.
pub const DEFAULT_SESSION_NAME: &str = "New Chat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub owner: UserId,
    pub name: String,
    pub created_at_unix_seconds: u64,
    pub updated_at_unix_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub name: String,
}

impl NewSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Trimmed name, or [`DEFAULT_SESSION_NAME`] when blank.
    pub fn resolved_name(&self) -> String {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_SESSION_NAME.to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl Default for NewSession {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_NAME)
    }
}

/// Newest first. Use with a stable sort so same-second sessions keep insertion order.
pub fn sort_by_recent_desc(left: &SessionRecord, right: &SessionRecord) -> Ordering {
    right
        .created_at_unix_seconds
        .cmp(&left.created_at_unix_seconds)
}

pub(crate) fn unix_now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw_id: u128, created_at_unix_seconds: u64) -> SessionRecord {
        SessionRecord {
            id: SessionId::new(uuid::Uuid::from_u128(raw_id)),
            owner: UserId::parse("owner").unwrap(),
            name: DEFAULT_SESSION_NAME.to_string(),
            created_at_unix_seconds,
            updated_at_unix_seconds: created_at_unix_seconds,
        }
    }

    #[test]
    fn blank_names_resolve_to_default() {
        assert_eq!(NewSession::new("   ").resolved_name(), DEFAULT_SESSION_NAME);
        assert_eq!(NewSession::new(" Trip plan ").resolved_name(), "Trip plan");
    }

    #[test]
    fn recent_sort_puts_newest_first_and_keeps_ties_in_place() {
        let old = record(1, 10);
        let second = record(3, 20);
        let first = record(2, 20);
        let mut records = vec![old.clone(), second.clone(), first.clone()];

        records.sort_by(sort_by_recent_desc);

        assert_eq!(
            records.iter().map(|record| record.id).collect::<Vec<_>>(),
            vec![second.id, first.id, old.id]
        );
    }
}

use std::collections::HashMap;

use snafu::{OptionExt, ensure};
use tokio::sync::RwLock;

use super::error::{BlankSessionNameSnafu, ConflictSnafu, NotFoundSnafu, StorageResult};
use super::ids::{SessionId, UserId};
use super::types::{NewSession, SessionRecord, unix_now_seconds};
use super::{BoxFuture, SessionPersistence};

/// Process-local persistence, newest session first per owner.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    sessions: RwLock<HashMap<UserId, Vec<SessionRecord>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds sessions for one owner, keeping the given order.
    pub fn with_sessions(owner: UserId, sessions: Vec<SessionRecord>) -> Self {
        let mut by_owner = HashMap::new();
        by_owner.insert(owner, sessions);
        Self {
            sessions: RwLock::new(by_owner),
        }
    }

    async fn create(&self, owner: &UserId, input: NewSession) -> StorageResult<SessionRecord> {
        let now = unix_now_seconds();
        let created = SessionRecord {
            id: SessionId::new_v7(),
            owner: owner.clone(),
            name: input.resolved_name(),
            created_at_unix_seconds: now,
            updated_at_unix_seconds: now,
        };

        let mut sessions = self.sessions.write().await;
        let owned = sessions.entry(owner.clone()).or_default();
        ensure!(
            owned.iter().all(|session| session.id != created.id),
            ConflictSnafu {
                stage: "memory-create-session",
                entity: "session",
                details: format!("id {} already exists", created.id),
            }
        );
        owned.insert(0, created.clone());
        Ok(created)
    }

    async fn rename(
        &self,
        owner: &UserId,
        session_id: SessionId,
        name: String,
    ) -> StorageResult<SessionRecord> {
        let name = name.trim().to_string();
        ensure!(
            !name.is_empty(),
            BlankSessionNameSnafu {
                stage: "memory-rename-session",
            }
        );

        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(owner)
            .and_then(|owned| owned.iter_mut().find(|session| session.id == session_id))
            .context(NotFoundSnafu {
                stage: "memory-rename-session",
                entity: "session",
                id: session_id.to_string(),
            })?;
        session.name = name;
        session.updated_at_unix_seconds = unix_now_seconds();
        Ok(session.clone())
    }

    async fn delete(&self, owner: &UserId, session_id: SessionId) -> StorageResult<()> {
        let mut sessions = self.sessions.write().await;
        let owned = sessions.get_mut(owner).context(NotFoundSnafu {
            stage: "memory-delete-session",
            entity: "session",
            id: session_id.to_string(),
        })?;
        let index = owned
            .iter()
            .position(|session| session.id == session_id)
            .context(NotFoundSnafu {
                stage: "memory-delete-session",
                entity: "session",
                id: session_id.to_string(),
            })?;
        owned.remove(index);
        Ok(())
    }
}

impl SessionPersistence for MemoryStorage {
    fn create_session<'a>(
        &'a self,
        owner: &'a UserId,
        input: NewSession,
    ) -> BoxFuture<'a, StorageResult<SessionRecord>> {
        Box::pin(self.create(owner, input))
    }

    fn list_sessions<'a>(
        &'a self,
        owner: &'a UserId,
    ) -> BoxFuture<'a, StorageResult<Vec<SessionRecord>>> {
        Box::pin(async move {
            Ok(self
                .sessions
                .read()
                .await
                .get(owner)
                .cloned()
                .unwrap_or_default())
        })
    }

    fn rename_session<'a>(
        &'a self,
        owner: &'a UserId,
        session_id: SessionId,
        name: String,
    ) -> BoxFuture<'a, StorageResult<SessionRecord>> {
        Box::pin(self.rename(owner, session_id, name))
    }

    fn delete_session<'a>(
        &'a self,
        owner: &'a UserId,
        session_id: SessionId,
    ) -> BoxFuture<'a, StorageResult<()>> {
        Box::pin(self.delete(owner, session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;

    fn user(raw: &str) -> UserId {
        UserId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn sessions_are_scoped_per_owner_and_listed_newest_first() {
        let storage = MemoryStorage::new();
        let alice = user("alice");
        let bob = user("bob");

        let first = storage
            .create_session(&alice, NewSession::default())
            .await
            .unwrap();
        let second = storage
            .create_session(&alice, NewSession::new("Groceries"))
            .await
            .unwrap();
        storage
            .create_session(&bob, NewSession::default())
            .await
            .unwrap();

        let listed = storage.list_sessions(&alice).await.unwrap();
        assert_eq!(listed, vec![second.clone(), first]);
        assert_eq!(second.name, "Groceries");
        assert_eq!(storage.list_sessions(&bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rename_and_delete_reject_foreign_sessions() {
        let storage = MemoryStorage::new();
        let alice = user("alice");
        let created = storage
            .create_session(&alice, NewSession::default())
            .await
            .unwrap();

        let renamed = storage
            .rename_session(&user("mallory"), created.id, "mine".to_string())
            .await;
        assert!(matches!(renamed, Err(StorageError::NotFound { .. })));

        let deleted = storage.delete_session(&user("mallory"), created.id).await;
        assert!(matches!(deleted, Err(StorageError::NotFound { .. })));

        assert_eq!(storage.list_sessions(&alice).await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn rename_trims_and_rejects_blank_names() {
        let storage = MemoryStorage::new();
        let alice = user("alice");
        let created = storage
            .create_session(&alice, NewSession::default())
            .await
            .unwrap();

        let blank = storage
            .rename_session(&alice, created.id, "  ".to_string())
            .await;
        assert!(matches!(blank, Err(StorageError::BlankSessionName { .. })));

        let renamed = storage
            .rename_session(&alice, created.id, "  Rust questions ".to_string())
            .await
            .unwrap();
        assert_eq!(renamed.name, "Rust questions");
        assert_eq!(renamed.id, created.id);
    }
}

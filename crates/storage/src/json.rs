use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt, ensure};
use tokio::sync::Mutex;

use super::error::{
    BlankSessionNameSnafu, CreateStoreDirectorySnafu, NotFoundSnafu, ParseStoreSnafu,
    ReadStoreSnafu, ReplaceStoreSnafu, SerializeStoreSnafu, StorageResult,
    UnsupportedStoreVersionSnafu, WriteStoreSnafu,
};
use super::ids::{SessionId, UserId};
use super::types::{NewSession, SessionRecord, sort_by_recent_desc, unix_now_seconds};
use super::{BoxFuture, SessionPersistence};

pub const STORE_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            sessions: Vec::new(),
        }
    }
}

/// Sessions of every user in one JSON document, rewritten atomically on change.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_document(&self) -> StorageResult<StoreDocument> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("session store {:?} missing; starting empty", self.path);
                return Ok(StoreDocument::default());
            }
            Err(source) => {
                return Err(source).context(ReadStoreSnafu {
                    stage: "json-read-store",
                    path: display_path(&self.path),
                });
            }
        };

        if text.trim().is_empty() {
            return Ok(StoreDocument::default());
        }

        let mut document: StoreDocument =
            serde_json::from_str(&text).context(ParseStoreSnafu {
                stage: "json-parse-store",
                path: display_path(&self.path),
            })?;
        ensure!(
            document.version == STORE_FORMAT_VERSION,
            UnsupportedStoreVersionSnafu {
                stage: "json-check-version",
                path: display_path(&self.path),
                version: document.version,
            }
        );

        document.sessions.sort_by(sort_by_recent_desc);
        Ok(document)
    }

    async fn write_document(&self, document: &StoreDocument) -> StorageResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .context(CreateStoreDirectorySnafu {
                    stage: "json-create-store-directory",
                    path: display_path(parent),
                })?;
        }

        let content = serde_json::to_string_pretty(document).context(SerializeStoreSnafu {
            stage: "json-serialize-store",
        })?;

        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .context(WriteStoreSnafu {
                stage: "json-write-temporary-store",
                path: display_path(&temp_path),
            })?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .context(ReplaceStoreSnafu {
                stage: "json-rename-temporary-store",
                from: display_path(&temp_path),
                to: display_path(&self.path),
            })
    }

    async fn create(&self, owner: &UserId, input: NewSession) -> StorageResult<SessionRecord> {
        let _write = self.write_lock.lock().await;
        let mut document = self.read_document().await?;

        let now = unix_now_seconds();
        let created = SessionRecord {
            id: SessionId::new_v7(),
            owner: owner.clone(),
            name: input.resolved_name(),
            created_at_unix_seconds: now,
            updated_at_unix_seconds: now,
        };
        document.sessions.insert(0, created.clone());
        self.write_document(&document).await?;

        tracing::debug!("stored session {} for {owner}", created.id);
        Ok(created)
    }

    async fn list(&self, owner: &UserId) -> StorageResult<Vec<SessionRecord>> {
        let document = self.read_document().await?;
        Ok(document
            .sessions
            .into_iter()
            .filter(|session| &session.owner == owner)
            .collect())
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
                stage: "json-rename-session",
            }
        );

        let _write = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let session = document
            .sessions
            .iter_mut()
            .find(|session| session.id == session_id && &session.owner == owner)
            .context(NotFoundSnafu {
                stage: "json-rename-session",
                entity: "session",
                id: session_id.to_string(),
            })?;
        session.name = name;
        session.updated_at_unix_seconds = unix_now_seconds();
        let renamed = session.clone();

        self.write_document(&document).await?;
        Ok(renamed)
    }

    async fn delete(&self, owner: &UserId, session_id: SessionId) -> StorageResult<()> {
        let _write = self.write_lock.lock().await;
        let mut document = self.read_document().await?;
        let index = document
            .sessions
            .iter()
            .position(|session| session.id == session_id && &session.owner == owner)
            .context(NotFoundSnafu {
                stage: "json-delete-session",
                entity: "session",
                id: session_id.to_string(),
            })?;
        document.sessions.remove(index);
        self.write_document(&document).await
    }
}

impl SessionPersistence for JsonFileStorage {
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
        Box::pin(self.list(owner))
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

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

use std::future::Future;
use std::pin::Pin;

pub mod error;
pub mod ids;
pub mod json;
pub mod memory;
pub mod types;

pub use error::{StorageError, StorageResult};
pub use ids::{SessionId, UserId};
pub use json::JsonFileStorage;
pub use memory::MemoryStorage;
pub use types::{DEFAULT_SESSION_NAME, NewSession, SessionRecord, sort_by_recent_desc};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Authoritative session persistence, scoped by owner.
///
/// Every call may suspend and may fail; callers decide how failures surface.
pub trait SessionPersistence: Send + Sync {
    fn create_session<'a>(
        &'a self,
        owner: &'a UserId,
        input: NewSession,
    ) -> BoxFuture<'a, StorageResult<SessionRecord>>;
    /// Sessions owned by `owner`, newest first.
    fn list_sessions<'a>(
        &'a self,
        owner: &'a UserId,
    ) -> BoxFuture<'a, StorageResult<Vec<SessionRecord>>>;
    fn rename_session<'a>(
        &'a self,
        owner: &'a UserId,
        session_id: SessionId,
        name: String,
    ) -> BoxFuture<'a, StorageResult<SessionRecord>>;
    fn delete_session<'a>(
        &'a self,
        owner: &'a UserId,
        session_id: SessionId,
    ) -> BoxFuture<'a, StorageResult<()>>;
}

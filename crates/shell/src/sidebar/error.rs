use sidechat_storage::{SessionId, StorageError};
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CoordinatorError {
    #[snafu(display("a session creation is already in flight on `{stage}`"))]
    CreationInProgress { stage: &'static str },
    #[snafu(display("sign-in required on `{stage}`"))]
    Unauthenticated { stage: &'static str },
    #[snafu(display("session '{session_id}' is not listed in the sidebar"))]
    UnknownSession {
        stage: &'static str,
        session_id: SessionId,
    },
    #[snafu(display("session '{session_id}' is already listed in the sidebar"))]
    DuplicateSession {
        stage: &'static str,
        session_id: SessionId,
    },
    #[snafu(display("session name must not be blank"))]
    BlankName { stage: &'static str },
    #[snafu(display("session persistence failed on `{stage}`: {source}"))]
    Persistence {
        stage: &'static str,
        source: StorageError,
    },
}

pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

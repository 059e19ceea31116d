use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use uuid::Uuid;

use super::error::{InvalidIdSnafu, InvalidUserIdSnafu, StorageError, StorageResult};

/// Identifier of one chat session, minted by persistence at creation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new(raw: Uuid) -> Self {
        Self(raw)
    }

    // v7 ids sort by creation time, which keeps same-second sessions ordered.
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn parse(raw: &str) -> StorageResult<Self> {
        let parsed = Uuid::parse_str(raw).context(InvalidIdSnafu {
            stage: "parse-session-id",
            id_type: "session-id",
            raw: raw.to_string(),
        })?;
        Ok(Self(parsed))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self::new(value)
    }
}

impl FromStr for SessionId {
    type Err = StorageError;

    fn from_str(raw: &str) -> StorageResult<Self> {
        Self::parse(raw)
    }
}

/// Opaque identifier handed out by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let trimmed = raw.trim();
        ensure!(
            !trimmed.is_empty(),
            InvalidUserIdSnafu {
                stage: "parse-user-id",
                raw: raw.to_string(),
            }
        );
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = StorageError;

    fn from_str(raw: &str) -> StorageResult<Self> {
        Self::parse(raw)
    }
}

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StorageError {
    #[snafu(display("storage entity '{entity}' with id '{id}' was not found"))]
    NotFound {
        stage: &'static str,
        entity: &'static str,
        id: String,
    },
    #[snafu(display("storage conflict for '{entity}': {details}"))]
    Conflict {
        stage: &'static str,
        entity: &'static str,
        details: String,
    },
    #[snafu(display("storage id '{raw}' is invalid for {id_type}"))]
    InvalidId {
        stage: &'static str,
        id_type: &'static str,
        raw: String,
        source: uuid::Error,
    },
    #[snafu(display("user id '{raw}' is blank"))]
    InvalidUserId { stage: &'static str, raw: String },
    #[snafu(display("session name must not be blank"))]
    BlankSessionName { stage: &'static str },
    #[snafu(display("failed to create session store directory at {path}"))]
    CreateStoreDirectory {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to read session store from {path}"))]
    ReadStore {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to parse session store at {path}"))]
    ParseStore {
        stage: &'static str,
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("failed to serialize session store on `{stage}`"))]
    SerializeStore {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write session store to {path}"))]
    WriteStore {
        stage: &'static str,
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("failed to replace session store {from} with {to}"))]
    ReplaceStore {
        stage: &'static str,
        from: String,
        to: String,
        source: std::io::Error,
    },
    #[snafu(display("session store at {path} has unsupported version {version}"))]
    UnsupportedStoreVersion {
        stage: &'static str,
        path: String,
        version: u32,
    },
}

pub type StorageResult<T> = Result<T, StorageError>;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use figment::{
    Figment,
    providers::{Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use sidechat_storage::DEFAULT_SESSION_NAME;
use snafu::{ResultExt, Snafu};

pub const SETTINGS_DIRECTORY_NAME: &str = "sidechat";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const SESSIONS_FILE_NAME: &str = "sessions.json";

/// User-facing notification texts, one per call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellMessages {
    pub sign_in_to_create: String,
    pub sign_in_for_profile: String,
    pub sign_in_to_manage: String,
    pub create_failed: String,
    pub rename_failed: String,
    pub delete_failed: String,
    pub load_failed: String,
    pub session_renamed: String,
    pub session_deleted: String,
}

impl Default for ShellMessages {
    fn default() -> Self {
        Self {
            sign_in_to_create: "Please login to create a new chat".to_string(),
            sign_in_for_profile: "Please login to access your profile".to_string(),
            sign_in_to_manage: "Please login to manage your chats".to_string(),
            create_failed: "Failed to create a new chat".to_string(),
            rename_failed: "Failed to rename chat".to_string(),
            delete_failed: "Failed to delete chat".to_string(),
            load_failed: "Failed to load your chats".to_string(),
            session_renamed: "Chat renamed".to_string(),
            session_deleted: "Chat deleted".to_string(),
        }
    }
}

impl ShellMessages {
    fn normalized(self) -> Self {
        let defaults = Self::default();
        Self {
            sign_in_to_create: or_default(self.sign_in_to_create, defaults.sign_in_to_create),
            sign_in_for_profile: or_default(
                self.sign_in_for_profile,
                defaults.sign_in_for_profile,
            ),
            sign_in_to_manage: or_default(self.sign_in_to_manage, defaults.sign_in_to_manage),
            create_failed: or_default(self.create_failed, defaults.create_failed),
            rename_failed: or_default(self.rename_failed, defaults.rename_failed),
            delete_failed: or_default(self.delete_failed, defaults.delete_failed),
            load_failed: or_default(self.load_failed, defaults.load_failed),
            session_renamed: or_default(self.session_renamed, defaults.session_renamed),
            session_deleted: or_default(self.session_deleted, defaults.session_deleted),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSettings {
    #[serde(default = "default_session_name")]
    pub default_session_name: String,
    #[serde(default)]
    pub panel_expanded_on_start: bool,
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub messages: ShellMessages,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            default_session_name: default_session_name(),
            panel_expanded_on_start: false,
            storage_path: None,
            messages: ShellMessages::default(),
        }
    }
}

impl ShellSettings {
    pub fn normalized(mut self) -> Self {
        self.default_session_name =
            or_default(self.default_session_name, default_session_name());
        self.storage_path = self
            .storage_path
            .filter(|path| !path.as_os_str().is_empty());
        self.messages = self.messages.normalized();
        self
    }

    /// Where the session file lives when no explicit path is configured.
    pub fn resolved_storage_path(&self) -> PathBuf {
        self.storage_path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
                .unwrap_or_else(|| PathBuf::from(".sidechat"))
                .join(SESSIONS_FILE_NAME)
        })
    }
}

pub struct SettingsStore {
    settings: Arc<ArcSwap<ShellSettings>>,
    config_path: PathBuf,
}

impl SettingsStore {
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".sidechat"))
    }

    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn new(config_path: PathBuf) -> Self {
        let settings = Self::load_from_disk(&config_path);
        Self {
            settings: Arc::new(ArcSwap::from_pointee(settings)),
            config_path,
        }
    }

    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn settings(&self) -> Arc<ShellSettings> {
        self.settings.load_full()
    }

    pub fn update(&self, settings: ShellSettings) -> Result<(), SettingsError> {
        let normalized_settings = settings.normalized();
        self.persist(&normalized_settings)?;
        self.settings.store(Arc::new(normalized_settings));
        Ok(())
    }

    fn load_from_disk(path: &Path) -> ShellSettings {
        if !path.exists() {
            tracing::info!("settings file not found at {:?}, using defaults", path);
            return ShellSettings::default();
        }

        let figment = Figment::from(Serialized::defaults(ShellSettings::default()))
            .merge(Json::file(path));

        match figment.extract::<ShellSettings>() {
            Ok(settings) => settings.normalized(),
            Err(error) => {
                tracing::warn!(
                    "failed to parse settings from {:?}: {}. using defaults",
                    path,
                    error
                );
                ShellSettings::default()
            }
        }
    }

    fn persist(&self, settings: &ShellSettings) -> Result<(), SettingsError> {
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).context(CreateDirSnafu {
                stage: "create-settings-directory",
                path: parent.to_path_buf(),
            })?;
        }

        let content = serde_json::to_string_pretty(settings).context(SerializeConfigSnafu {
            stage: "serialize-settings-json",
        })?;

        let temp_path = self.config_path.with_extension("json.tmp");
        std::fs::write(&temp_path, content).context(WriteFileSnafu {
            stage: "write-temporary-settings-file",
            path: temp_path.clone(),
        })?;

        std::fs::rename(&temp_path, &self.config_path).context(RenameTempFileSnafu {
            stage: "rename-temporary-settings-file",
            from: temp_path,
            to: self.config_path.clone(),
        })?;

        tracing::info!("saved settings to {:?}", self.config_path);
        Ok(())
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to create settings directory at {path:?} on `{stage}`: {source}"))]
    CreateDir {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("failed to serialize settings on `{stage}`: {source}"))]
    SerializeConfig {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to write settings file at {path:?} on `{stage}`: {source}"))]
    WriteFile {
        stage: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display(
        "failed to replace settings file from {from:?} to {to:?} on `{stage}`: {source}"
    ))]
    RenameTempFile {
        stage: &'static str,
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

fn default_session_name() -> String {
    DEFAULT_SESSION_NAME.to_string()
}

fn or_default(value: String, default: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));

        assert_eq!(*store.settings(), ShellSettings::default());
    }

    #[test]
    fn partial_file_merges_over_defaults_and_blank_texts_are_restored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "panel_expanded_on_start": true,
                "default_session_name": "  ",
                "messages": { "create_failed": "Could not start a chat", "load_failed": "" }
            }"#,
        )
        .unwrap();

        let settings = SettingsStore::new(path).settings();

        assert!(settings.panel_expanded_on_start);
        assert_eq!(settings.default_session_name, DEFAULT_SESSION_NAME);
        assert_eq!(settings.messages.create_failed, "Could not start a chat");
        assert_eq!(
            settings.messages.load_failed,
            ShellMessages::default().load_failed
        );
        assert_eq!(
            settings.messages.sign_in_to_create,
            "Please login to create a new chat"
        );
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ panel_expanded_on_start: ").unwrap();

        assert_eq!(*SettingsStore::new(path).settings(), ShellSettings::default());
    }

    #[test]
    fn update_persists_and_swaps_the_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config/settings.json");
        let store = SettingsStore::new(path.clone());
        let before = store.settings();

        store
            .update(ShellSettings {
                storage_path: Some(dir.path().join("sessions.json")),
                ..ShellSettings::default()
            })
            .unwrap();

        assert_eq!(before.storage_path, None);
        assert_eq!(
            store.settings().resolved_storage_path(),
            dir.path().join("sessions.json")
        );
        assert_eq!(
            SettingsStore::new(path).settings().storage_path,
            Some(dir.path().join("sessions.json"))
        );
    }
}

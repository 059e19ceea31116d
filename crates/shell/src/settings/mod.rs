pub mod state;

pub use state::{SettingsError, SettingsStore, ShellMessages, ShellSettings};

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use sidechat::command::{Command, CommandOutcome, HELP_TEXT};
use sidechat::settings::SettingsStore;
use sidechat::sidebar::SidebarSnapshot;
use sidechat::{
    ChannelNotifier, LocalIdentity, Notification, NotificationLevel, SidebarCoordinator,
};
use sidechat_storage::JsonFileStorage;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Overrides the settings file location.
const CONFIG_PATH_ENV: &str = "SIDECHAT_CONFIG";

/// Line-driven front end for the sidebar.
///
/// Bootstraps:
/// 1. Tracing, filtered through `RUST_LOG`
/// 2. Settings from the config directory (defaults when missing)
/// 3. JSON session storage at the configured path
/// 4. A local identity, signed out until `login`
#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings_store = match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) => SettingsStore::new(PathBuf::from(path)),
        None => SettingsStore::load(),
    };
    tracing::info!("loaded settings from {:?}", settings_store.config_path());
    let settings = settings_store.settings();
    let storage_path = settings.resolved_storage_path();
    tracing::info!("using session store at {:?}", storage_path);

    let identity = Arc::new(LocalIdentity::new());
    let (notifier, mut notifications) = ChannelNotifier::new();
    let coordinator = SidebarCoordinator::new(
        identity.clone(),
        Arc::new(JsonFileStorage::new(storage_path)),
        Arc::new(notifier),
        settings,
    );

    println!("{HELP_TEXT}");
    print_snapshot(&coordinator.snapshot());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                tracing::error!("failed to read input: {error}");
                return ExitCode::FAILURE;
            }
        };

        let outcome = match Command::parse(&line) {
            Ok(Some(command)) => command.execute(&coordinator, &identity).await,
            Ok(None) => continue,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(CommandOutcome::Continue) => {}
            Ok(CommandOutcome::Help) => println!("{HELP_TEXT}"),
            Ok(CommandOutcome::Quit) => break,
            Err(error) if error.already_reported() => {
                tracing::debug!("command failed: {error}");
            }
            Err(error) => println!("! {error}"),
        }

        print_notifications(&mut notifications);
        print_snapshot(&coordinator.snapshot());
    }

    ExitCode::SUCCESS
}

fn print_notifications(notifications: &mut mpsc::UnboundedReceiver<Notification>) {
    while let Ok(notification) = notifications.try_recv() {
        let tag = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        println!("[{tag}] {}", notification.message);
    }
}

fn print_snapshot(snapshot: &SidebarSnapshot) {
    let panel = if snapshot.expanded {
        "expanded"
    } else {
        "collapsed"
    };
    println!(
        "-- sidebar {panel} | {} | {}",
        snapshot.new_chat_label, snapshot.profile_label
    );

    if !snapshot.recents_visible {
        return;
    }
    if snapshot.sessions.is_empty() {
        println!("   (no chats yet)");
        return;
    }

    println!("   Recents");
    for (index, item) in snapshot.sessions.iter().enumerate() {
        let marker = if item.selected { '>' } else { ' ' };
        let menu = if item.menu_open {
            "  [rename | delete]"
        } else {
            ""
        };
        println!("  {marker}{:>2}. {}{menu}", index + 1, item.name);
    }
}

//! Session sidebar for a chat client.
//!
//! The crate coordinates the chat list, gated session creation, the panel
//! toggle and per-item context menus. Rendering is left to the caller, which
//! reads [`sidebar::SidebarSnapshot`] and forwards user gestures.
#![deny(unsafe_code)]

/// Line commands driving the sidebar from a terminal.
pub mod command;
pub mod identity;
pub mod notify;
/// Settings persistence.
pub mod settings;
/// Sidebar state and the coordinator that owns it.
pub mod sidebar;

pub use identity::{Identity, IdentityProvider, LocalIdentity};
pub use notify::{ChannelNotifier, Notification, NotificationLevel, NotificationSink};
pub use sidebar::{CoordinatorError, SidebarCoordinator, SidebarSnapshot};

/// Sign-in screening for user actions.
pub mod auth;
pub mod coordinator;
pub mod error;
/// Reentrancy lock around session creation.
pub mod guard;
pub mod menu;
pub mod panel;
/// Ordered session list of the active user.
pub mod sessions;
pub mod snapshot;

pub use auth::{AuthGate, require_auth};
pub use coordinator::SidebarCoordinator;
pub use error::{CoordinatorError, CoordinatorResult};
pub use guard::{CreationGuard, CreationPermit};
pub use menu::MenuState;
pub use panel::{PANEL_COLLAPSED_WIDTH, PANEL_EXPANDED_WIDTH, PanelState};
pub use sessions::SessionList;
pub use snapshot::{
    CREATING_LABEL, LOGIN_LABEL, NEW_CHAT_LABEL, PROFILE_LABEL, SessionListItem, SidebarSnapshot,
};

use sidechat_storage::SessionId;

pub const NEW_CHAT_LABEL: &str = "New chat";
pub const CREATING_LABEL: &str = "Creating...";
pub const PROFILE_LABEL: &str = "My Profile";
pub const LOGIN_LABEL: &str = "Login";

/// What a list-item renderer needs for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListItem {
    pub id: SessionId,
    pub name: String,
    pub menu_open: bool,
    pub selected: bool,
}

/// Consistent read-only view of the sidebar at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarSnapshot {
    pub expanded: bool,
    pub width: f32,
    /// Recents are only reachable while the panel is expanded.
    pub recents_visible: bool,
    /// Drives the disabled/"Creating..." state of the new-chat button.
    pub creating: bool,
    pub new_chat_label: &'static str,
    pub signed_in: bool,
    pub profile_label: &'static str,
    pub sessions: Vec<SessionListItem>,
}

impl SidebarSnapshot {
    pub fn open_menu(&self) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|item| item.menu_open)
            .map(|item| item.id)
    }

    /// Session at a 1-based display position.
    pub fn session_at(&self, position: usize) -> Option<&SessionListItem> {
        position
            .checked_sub(1)
            .and_then(|index| self.sessions.get(index))
    }
}

pub(crate) fn new_chat_label(creating: bool) -> &'static str {
    if creating {
        CREATING_LABEL
    } else {
        NEW_CHAT_LABEL
    }
}

pub(crate) fn profile_label(signed_in: bool) -> &'static str {
    if signed_in {
        PROFILE_LABEL
    } else {
        LOGIN_LABEL
    }
}

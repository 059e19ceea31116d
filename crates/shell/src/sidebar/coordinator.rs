use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sidechat_storage::{NewSession, SessionId, SessionPersistence, SessionRecord, UserId};
use snafu::{OptionExt, ensure};

use super::auth::AuthGate;
use super::error::{
    BlankNameSnafu, CoordinatorError, CoordinatorResult, CreationInProgressSnafu,
    UnauthenticatedSnafu, UnknownSessionSnafu,
};
use super::guard::CreationGuard;
use super::menu::MenuState;
use super::panel::PanelState;
use super::sessions::SessionList;
use super::snapshot::{SessionListItem, SidebarSnapshot, new_chat_label, profile_label};
use crate::identity::IdentityProvider;
use crate::notify::{Notification, NotificationSink};
use crate::settings::ShellSettings;

#[derive(Debug, Default)]
struct SidebarState {
    sessions: SessionList,
    menu: MenuState,
    panel: PanelState,
}

impl SidebarState {
    /// Keeps the list scoped to `user`, clearing it once someone else is signed in.
    fn follow_user(&mut self, user: Option<&UserId>) {
        if self.sessions.owner() == user {
            return;
        }
        if let Some(previous) = self.sessions.owner() {
            tracing::debug!("signed-in user is no longer {previous}; clearing sidebar");
        }
        self.sessions.reset(user.cloned(), Vec::new());
        self.menu.close();
    }
}

/// Owns sidebar state and mediates every read and write of it.
///
/// Only [`create_session`](Self::create_session), rename, delete and refresh
/// suspend, and none of them hold the state lock across an await.
pub struct SidebarCoordinator {
    auth: AuthGate,
    persistence: Arc<dyn SessionPersistence>,
    notifications: Arc<dyn NotificationSink>,
    settings: Arc<ShellSettings>,
    creation: CreationGuard,
    state: Mutex<SidebarState>,
}

impl SidebarCoordinator {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        persistence: Arc<dyn SessionPersistence>,
        notifications: Arc<dyn NotificationSink>,
        settings: Arc<ShellSettings>,
    ) -> Self {
        let state = SidebarState {
            panel: PanelState::new(settings.panel_expanded_on_start),
            ..SidebarState::default()
        };

        Self {
            auth: AuthGate::new(identity, Arc::clone(&notifications)),
            persistence,
            notifications,
            settings,
            creation: CreationGuard::new(),
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, SidebarState> {
        let current = self.auth.current_user();
        self.state_for(current.as_ref().map(|identity| &identity.user_id))
    }

    /// Locks the state as seen by `user`.
    fn state_for(&self, user: Option<&UserId>) -> MutexGuard<'_, SidebarState> {
        // Mutations are single statements on plain data, so a poisoned lock is still consistent.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.follow_user(user);
        state
    }

    fn is_current_user(&self, user: &UserId) -> bool {
        self.auth
            .current_user()
            .is_some_and(|identity| identity.user_id == *user)
    }

    fn notify(&self, notification: Notification) {
        self.notifications.notify(notification);
    }

    pub fn is_creating(&self) -> bool {
        self.creation.is_held()
    }

    pub fn is_expanded(&self) -> bool {
        self.state().panel.is_expanded()
    }

    pub fn toggle_panel(&self) -> bool {
        let expanded = self.state().panel.toggle();
        tracing::debug!(expanded, "sidebar panel toggled");
        expanded
    }

    pub fn sessions(&self) -> Arc<Vec<SessionRecord>> {
        self.state().sessions.records()
    }

    pub fn open_menu(&self) -> Option<SessionId> {
        let state = self.state();
        state.menu.open_item(|item| state.sessions.contains(item))
    }

    /// Opens the menu of `session_id`, or closes it if already open.
    ///
    /// Returns the open item. An unlisted id still closes any other menu and
    /// reads back as closed.
    pub fn toggle_menu(&self, session_id: SessionId) -> Option<SessionId> {
        let mut state = self.state();
        state.menu.toggle(session_id);
        let sessions = &state.sessions;
        state.menu.open_item(|item| sessions.contains(item))
    }

    pub fn close_menu(&self) {
        self.state().menu.close();
    }

    pub fn select_session(&self, session_id: SessionId) -> bool {
        self.state().sessions.select(session_id)
    }

    pub fn selected_session(&self) -> Option<SessionId> {
        self.state().sessions.selected()
    }

    /// True when signed in; otherwise warns and prompts for sign-in.
    pub fn open_profile(&self) -> bool {
        self.auth
            .check(&self.settings.messages.sign_in_for_profile)
            .is_some()
    }

    /// Creates a session through persistence and puts it at the top of the list.
    ///
    /// Requests arriving while another creation is in flight are dropped with
    /// [`CoordinatorError::CreationInProgress`]. Failures leave the list untouched
    /// and are reported through the notification sink before returning.
    pub async fn create_session(&self) -> CoordinatorResult<SessionRecord> {
        if self.creation.is_held() {
            tracing::debug!("dropping new-chat request while a creation is in flight");
            return CreationInProgressSnafu {
                stage: "create-session-dedup",
            }
            .fail();
        }

        let identity = self
            .auth
            .check(&self.settings.messages.sign_in_to_create)
            .context(UnauthenticatedSnafu {
                stage: "create-session-auth",
            })?;

        let Some(_permit) = self.creation.try_acquire() else {
            return CreationInProgressSnafu {
                stage: "create-session-acquire",
            }
            .fail();
        };

        let input = NewSession::new(self.settings.default_session_name.clone());
        let created = match self
            .persistence
            .create_session(&identity.user_id, input)
            .await
        {
            Ok(created) => created,
            Err(source) => {
                tracing::error!("failed to create session for {}: {source}", identity.user_id);
                self.notify(Notification::error(&self.settings.messages.create_failed));
                return Err(CoordinatorError::Persistence {
                    stage: "create-session-persist",
                    source,
                });
            }
        };

        if !self.is_current_user(&identity.user_id) {
            tracing::warn!(
                "session {} created for {} after the signed-in user changed; not listing it",
                created.id,
                identity.user_id
            );
            return Ok(created);
        }

        let mut state = self.state_for(Some(&identity.user_id));
        if let Err(error) = state.sessions.insert_front(created.clone()) {
            tracing::error!("refusing to list created session: {error}");
            self.notify(Notification::error(&self.settings.messages.create_failed));
            return Err(error);
        }
        state.sessions.select(created.id);

        tracing::info!("created session {} for {}", created.id, identity.user_id);
        Ok(created)
    }

    pub async fn rename_session(
        &self,
        session_id: SessionId,
        name: &str,
    ) -> CoordinatorResult<SessionRecord> {
        let identity = self
            .auth
            .check(&self.settings.messages.sign_in_to_manage)
            .context(UnauthenticatedSnafu {
                stage: "rename-session-auth",
            })?;

        let name = name.trim();
        ensure!(
            !name.is_empty(),
            BlankNameSnafu {
                stage: "rename-session-validate",
            }
        );
        ensure!(
            self.state_for(Some(&identity.user_id))
                .sessions
                .contains(session_id),
            UnknownSessionSnafu {
                stage: "rename-session-lookup",
                session_id,
            }
        );

        let renamed = match self
            .persistence
            .rename_session(&identity.user_id, session_id, name.to_string())
            .await
        {
            Ok(renamed) => renamed,
            Err(source) => {
                tracing::error!("failed to rename session {session_id}: {source}");
                self.notify(Notification::error(&self.settings.messages.rename_failed));
                return Err(CoordinatorError::Persistence {
                    stage: "rename-session-persist",
                    source,
                });
            }
        };

        if self.state().sessions.replace(renamed.clone()) {
            self.notify(Notification::success(
                &self.settings.messages.session_renamed,
            ));
        } else {
            tracing::debug!("renamed session {session_id} left the list before completion");
        }
        Ok(renamed)
    }

    /// Deletes a session. Never waits on an in-flight creation.
    pub async fn delete_session(&self, session_id: SessionId) -> CoordinatorResult<()> {
        let identity = self
            .auth
            .check(&self.settings.messages.sign_in_to_manage)
            .context(UnauthenticatedSnafu {
                stage: "delete-session-auth",
            })?;

        ensure!(
            self.state_for(Some(&identity.user_id))
                .sessions
                .contains(session_id),
            UnknownSessionSnafu {
                stage: "delete-session-lookup",
                session_id,
            }
        );

        if let Err(source) = self
            .persistence
            .delete_session(&identity.user_id, session_id)
            .await
        {
            tracing::error!("failed to delete session {session_id}: {source}");
            self.notify(Notification::error(&self.settings.messages.delete_failed));
            return Err(CoordinatorError::Persistence {
                stage: "delete-session-persist",
                source,
            });
        }

        {
            let mut state = self.state();
            state.sessions.remove(session_id);
            state.menu.close_if_open(session_id);
        }

        tracing::info!("deleted session {session_id}");
        self.notify(Notification::success(
            &self.settings.messages.session_deleted,
        ));
        Ok(())
    }

    /// Reloads the list for whoever is signed in now; clears it when nobody is.
    ///
    /// Sessions created while the load runs stay listed, and sessions deleted
    /// meanwhile are not brought back. Returns the number of listed sessions.
    pub async fn refresh_for_current_user(&self) -> CoordinatorResult<usize> {
        let Some(identity) = self.auth.current_user() else {
            drop(self.state_for(None));
            tracing::debug!("no signed-in user; sidebar cleared");
            return Ok(0);
        };

        let before = self.state_for(Some(&identity.user_id)).sessions.records();
        let loaded = match self.persistence.list_sessions(&identity.user_id).await {
            Ok(loaded) => loaded,
            Err(source) => {
                tracing::error!("failed to load sessions for {}: {source}", identity.user_id);
                self.notify(Notification::error(&self.settings.messages.load_failed));
                return Err(CoordinatorError::Persistence {
                    stage: "refresh-sessions-list",
                    source,
                });
            }
        };

        if !self.is_current_user(&identity.user_id) {
            tracing::debug!("discarding sessions loaded for {}; user changed", identity.user_id);
            return Ok(self.state().sessions.records().len());
        }

        let mut state = self.state_for(Some(&identity.user_id));
        let merged = merge_loaded(&before, &state.sessions.records(), loaded);
        state.sessions.reset(Some(identity.user_id.clone()), merged);
        let listed = state.sessions.records().len();

        tracing::info!("loaded {listed} sessions for {}", identity.user_id);
        Ok(listed)
    }

    pub fn snapshot(&self) -> SidebarSnapshot {
        let creating = self.creation.is_held();
        let current = self.auth.current_user();
        let signed_in = current.is_some();
        let state = self.state_for(current.as_ref().map(|identity| &identity.user_id));
        let open = state.menu.open_item(|item| state.sessions.contains(item));
        let selected = state.sessions.selected();

        let sessions = state
            .sessions
            .records()
            .iter()
            .map(|record| SessionListItem {
                id: record.id,
                name: record.name.clone(),
                menu_open: open == Some(record.id),
                selected: selected == Some(record.id),
            })
            .collect();

        SidebarSnapshot {
            expanded: state.panel.is_expanded(),
            width: state.panel.width(),
            recents_visible: state.panel.is_expanded(),
            creating,
            new_chat_label: new_chat_label(creating),
            signed_in,
            profile_label: profile_label(signed_in),
            sessions,
        }
    }
}

/// Folds edits made during a load into the loaded list.
///
/// `before` is the list when the load started and `current` the list now.
fn merge_loaded(
    before: &[SessionRecord],
    current: &[SessionRecord],
    loaded: Vec<SessionRecord>,
) -> Vec<SessionRecord> {
    let known_before = |id: SessionId| before.iter().any(|record| record.id == id);
    let still_listed = |id: SessionId| current.iter().any(|record| record.id == id);

    let mut merged: Vec<SessionRecord> = current
        .iter()
        .filter(|record| !known_before(record.id))
        .cloned()
        .collect();
    for record in loaded {
        let removed = known_before(record.id) && !still_listed(record.id);
        let repeated = merged.iter().any(|listed| listed.id == record.id);
        if !removed && !repeated {
            merged.push(record);
        }
    }
    merged
}

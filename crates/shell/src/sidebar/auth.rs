use std::sync::Arc;

use crate::identity::{Identity, IdentityProvider};
use crate::notify::{Notification, NotificationSink};

/// Returns true when `identity` is present; otherwise runs `on_fail` once.
pub fn require_auth<F>(identity: Option<&Identity>, on_fail: F) -> bool
where
    F: FnOnce(),
{
    if identity.is_some() {
        return true;
    }

    on_fail();
    false
}

/// Screens user actions that need a signed-in user.
pub struct AuthGate {
    identity: Arc<dyn IdentityProvider>,
    notifications: Arc<dyn NotificationSink>,
}

impl AuthGate {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            identity,
            notifications,
        }
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.identity.current_user()
    }

    /// Signed-in identity, or `None` after warning the user and prompting sign-in.
    ///
    /// Silent while signed in, however often it is called.
    pub fn check(&self, warning: &str) -> Option<Identity> {
        let identity = self.identity.current_user();
        let allowed = require_auth(identity.as_ref(), || {
            tracing::warn!("blocked signed-out action: {warning}");
            self.notifications.notify(Notification::warning(warning));
            self.identity.prompt_sign_in();
        });

        if allowed { identity } else { None }
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arc_swap::ArcSwapOption;
use sidechat_storage::{StorageResult, UserId};

/// A signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub display_name: String,
}

impl Identity {
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }
}

/// Opaque sign-in capability. The sidebar only reads identity and asks for a prompt.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
    /// Starts an out-of-band sign-in flow. Fire-and-forget.
    fn prompt_sign_in(&self);
}

/// In-process identity used by the command-line shell and tests.
#[derive(Debug, Default)]
pub struct LocalIdentity {
    current: ArcSwapOption<Identity>,
    prompts: AtomicUsize,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(name: &str) -> StorageResult<Self> {
        let identity = Self::new();
        identity.sign_in(name)?;
        Ok(identity)
    }

    pub fn sign_in(&self, name: &str) -> StorageResult<Identity> {
        let user_id = UserId::parse(name)?;
        let identity = Identity::new(user_id.clone(), user_id.as_str());
        self.current.store(Some(Arc::new(identity.clone())));
        tracing::info!("signed in as {}", identity.user_id);
        Ok(identity)
    }

    pub fn sign_out(&self) {
        if let Some(previous) = self.current.swap(None) {
            tracing::info!("signed out {}", previous.user_id);
        }
    }

    /// Number of sign-in prompts requested so far.
    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::Acquire)
    }
}

impl IdentityProvider for LocalIdentity {
    fn current_user(&self) -> Option<Identity> {
        self.current.load_full().map(|identity| (*identity).clone())
    }

    fn prompt_sign_in(&self) {
        self.prompts.fetch_add(1, Ordering::AcqRel);
        tracing::info!("sign-in requested; use `login <name>`");
    }
}

//! Identity-provider collaborator.
//!
//! The engine only consumes an opaque identity signal — who is signed in
//! right now, and a channel that fires when that changes. Credential
//! handling and session persistence live with the provider.

use tokio::sync::watch;

/// Source of the current authenticated identity.
pub trait IdentityProvider: Send + Sync {
    /// The currently authenticated identity, if any.
    fn current(&self) -> Option<String>;

    /// Change-notification channel. Carries the full identity value; the
    /// receiver always observes the latest state.
    fn watch(&self) -> watch::Receiver<Option<String>>;
}

/// Watch-backed identity signal with explicit sign-in/sign-out transitions.
///
/// The concrete provider used in tests and by embedders that drive identity
/// from their own auth layer.
pub struct AuthHandle {
    tx: watch::Sender<Option<String>>,
}

impl AuthHandle {
    /// A signed-out handle.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// A handle that starts already signed in as `id`.
    pub fn signed_in(id: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(Some(id.into()));
        Self { tx }
    }

    pub fn sign_in(&self, id: impl Into<String>) {
        self.tx.send_replace(Some(id.into()));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }
}

impl Default for AuthHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for AuthHandle {
    fn current(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watch_observes_sign_in_and_out() {
        let auth = AuthHandle::new();
        let mut rx = auth.watch();
        assert_eq!(*rx.borrow(), None);

        auth.sign_in("user-1");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_deref(), Some("user-1"));
        assert_eq!(auth.current().as_deref(), Some("user-1"));

        auth.sign_out();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test]
    async fn signed_in_starts_with_identity() {
        let auth = AuthHandle::signed_in("user-2");
        assert_eq!(auth.current().as_deref(), Some("user-2"));
    }
}

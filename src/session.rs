use crate::api::types::{Credentials, Identity, RegisterAck};
use crate::api::AuthApi;
use crate::errors::ClientResult;
use portable_atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

// ── Session State Machine ──

/// Checking is visited exactly once, during the startup probe. After that
/// the session moves between Authenticated and Anonymous via login/logout
/// and never returns to Checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Checking,
    Authenticated,
    Anonymous,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Checking => write!(f, "checking"),
            Self::Authenticated => write!(f, "authenticated"),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}

/// Immutable snapshot of the client's belief about who is logged in.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub status: SessionStatus,
    pub identity: Option<Identity>,
}

impl Session {
    fn checking() -> Self {
        Self { status: SessionStatus::Checking, identity: None }
    }

    fn anonymous() -> Self {
        Self { status: SessionStatus::Anonymous, identity: None }
    }

    fn authenticated(identity: Identity) -> Self {
        Self { status: SessionStatus::Authenticated, identity: Some(identity) }
    }
}

/// Single source of truth for the session. The snapshot lives in a watch
/// channel: mutation and notification are one send, so dependents
/// re-evaluate on change instead of polling.
pub struct SessionStore<A: AuthApi> {
    gateway: A,
    snapshot: watch::Sender<Session>,
    probed: AtomicBool,
}

impl<A: AuthApi> SessionStore<A> {
    pub fn new(gateway: A) -> Self {
        let (snapshot, _) = watch::channel(Session::checking());
        Self {
            gateway,
            snapshot,
            probed: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.snapshot.subscribe()
    }

    /// Startup identity probe. Runs at most once per store lifetime;
    /// re-entry while the probe is in flight (or after it resolved) is a
    /// no-op. Every failure is fail-closed to Anonymous, never surfaced.
    pub async fn initialize(&self) {
        if self.probed.swap(true, Ordering::SeqCst) {
            return;
        }

        match self.gateway.current_user().await {
            Ok(Some(identity)) => {
                tracing::info!(username = %identity.username, "session restored from persisted token");
                self.snapshot.send_replace(Session::authenticated(identity));
            }
            Ok(None) => {
                tracing::info!("no persisted token, starting anonymous");
                self.snapshot.send_replace(Session::anonymous());
            }
            Err(e) => {
                tracing::debug!(error = %e, "identity probe failed, starting anonymous");
                self.snapshot.send_replace(Session::anonymous());
            }
        }
    }

    /// On failure the snapshot is left untouched and the typed error
    /// propagates to the caller. No silent retry.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Identity> {
        let identity = self.gateway.login(credentials).await?;
        tracing::info!(username = %identity.username, "login succeeded");
        self.snapshot.send_replace(Session::authenticated(identity.clone()));
        Ok(identity)
    }

    /// Registration does not imply login; session status is untouched.
    pub async fn register(&self, credentials: &Credentials) -> ClientResult<RegisterAck> {
        self.gateway.register(credentials).await
    }

    /// Purges the persisted token and goes Anonymous regardless of prior
    /// status. Idempotent; Anonymous is set even if the purge errored.
    pub fn logout(&self) -> ClientResult<()> {
        let purged = self.gateway.logout();
        self.snapshot.send_replace(Session::anonymous());
        tracing::info!("logged out");
        purged
    }
}

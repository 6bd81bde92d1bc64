use std::sync::Arc;

use tokio::sync::{watch, Mutex};

use crate::error::Result;
use crate::models::user::User;
use crate::store::SessionStore;

/// The well-known storage key the session envelope lives under.
pub const SESSION_RECORD_KEY: &str = "user";

/// The asynchronously observed session value.
///
/// Starts `Pending` while the storage read is in flight, then settles
/// to `Absent` or `Present` exactly once per observation cycle. No
/// guard acts before the state leaves `Pending`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The storage read is in flight; nothing to act on yet.
    Pending,
    /// The read completed and no valid session was found. Covers both
    /// "never saved" and "unreadable at rest".
    Absent,
    /// The read completed and recovered a valid user.
    Present(User),
}

impl SessionState {
    /// Whether the storage read has completed.
    pub fn is_settled(&self) -> bool {
        !matches!(self, SessionState::Pending)
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Present(user) => Some(user),
            _ => None,
        }
    }
}

struct TrackerInner {
    store: SessionStore,
    state: watch::Sender<SessionState>,
    prime_lock: Mutex<()>,
}

/// The observable current session.
///
/// One tracker owns the well-known session record and publishes its
/// state over a watch channel; every mounted guard subscribes to the
/// same value instead of issuing its own decrypting read. Cloning is
/// cheap and clones share state.
#[derive(Clone)]
pub struct SessionTracker {
    inner: Arc<TrackerInner>,
}

impl SessionTracker {
    /// Creates a new `SessionTracker` over `store`, seeded `Pending`.
    pub fn new(store: SessionStore) -> Self {
        let (state, _) = watch::channel(SessionState::Pending);
        Self {
            inner: Arc::new(TrackerInner {
                store,
                state,
                prime_lock: Mutex::new(()),
            }),
        }
    }

    /// Performs the initial session read if nobody has yet.
    ///
    /// The first caller loads and decrypts the persisted record and
    /// publishes the result; concurrent callers wait on the internal
    /// lock and reuse the published value, so N simultaneously mounted
    /// guards cost one backend read, not N.
    pub async fn prime(&self) -> SessionState {
        let _guard = self.inner.prime_lock.lock().await;

        let current = self.inner.state.borrow().clone();
        if current.is_settled() {
            return current;
        }

        let state = self.read_back().await;
        self.inner.state.send_replace(state.clone());
        state
    }

    /// Unconditionally re-reads the persisted record and publishes the
    /// result.
    pub async fn refresh(&self) -> SessionState {
        let _guard = self.inner.prime_lock.lock().await;
        let state = self.read_back().await;
        self.inner.state.send_replace(state.clone());
        state
    }

    /// Persists `user` as the current session, then publishes
    /// `Present`.
    ///
    /// Publication happens-after the save completes, so a guard that
    /// observes the signed-in state can never race a record that is not
    /// yet at rest. Write failures propagate; silently losing a
    /// just-created session is worse than a visible error.
    pub async fn sign_in(&self, user: User) -> Result<()> {
        self.inner.store.save(SESSION_RECORD_KEY, &user).await?;
        tracing::info!("✅ User {} signed in", user.id);
        self.inner.state.send_replace(SessionState::Present(user));
        Ok(())
    }

    /// Removes the persisted session, then publishes `Absent`.
    pub async fn sign_out(&self) -> Result<()> {
        self.inner.store.remove(SESSION_RECORD_KEY).await?;
        tracing::info!("👋 User signed out");
        self.inner.state.send_replace(SessionState::Absent);
        Ok(())
    }

    /// Subscribes to the session value. The subscription is scoped;
    /// dropping the receiver tears it down.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The session value as currently published.
    pub fn current(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Reads the persisted record and maps it to a state.
    ///
    /// A hard read failure has no error channel toward a guard, so it
    /// is logged and admitted as `Absent`: denial over accidental
    /// admission. Direct callers that need the error use
    /// `SessionStore::load`.
    async fn read_back(&self) -> SessionState {
        match self.inner.store.load::<User>(SESSION_RECORD_KEY).await {
            Ok(Some(user)) => {
                tracing::debug!("✅ Session recovered for user {}", user.id);
                SessionState::Present(user)
            }
            Ok(None) => {
                tracing::debug!("🔍 No session at rest");
                SessionState::Absent
            }
            Err(e) => {
                tracing::error!("❌ Session read failed, treating as signed out: {}", e);
                SessionState::Absent
            }
        }
    }
}

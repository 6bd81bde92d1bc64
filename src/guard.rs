use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::watch;

use crate::session::{SessionState, SessionTracker};

/// The access policy a route declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any signed-in user may enter; role is not checked.
    AuthenticatedOnly,
    /// Only signed-in users whose role is in the allow-set may enter.
    RoleRestricted {
        /// The capability tiers admitted to this route.
        allowed_roles: BTreeSet<u32>,
    },
    /// Sign-in and password-recovery pages: signed-out users see them,
    /// signed-in users are sent to their landing page instead.
    PublicOnly,
}

/// What a guard tells its caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// The session read is still in flight; show a neutral loading
    /// indicator, render nothing protected.
    Loading,
    /// Admission granted; render the route's children.
    Render,
    /// Admission refused; navigate to the carried path. The target path
    /// is the only observable output of a refusal.
    Redirect(String),
}

/// The navigation targets guards redirect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRoutes {
    /// Where unauthenticated users are sent.
    pub sign_in: String,
    /// Where authenticated-but-not-entitled users are sent.
    pub unauthorized: String,
    /// The in-flight second-factor page, exempt from the public-only
    /// bounce. Matched by exact path, no prefix matching.
    pub second_factor: String,
    /// The landing page for roles without a dedicated one.
    pub default_landing: String,
    /// Role-specific landing pages, keyed by capability tier.
    pub role_landings: BTreeMap<u32, String>,
}

impl Default for GuardRoutes {
    fn default() -> Self {
        Self {
            sign_in: "/auth/signin".to_string(),
            unauthorized: "/unauthorized".to_string(),
            second_factor: "/auth/signin/verify".to_string(),
            default_landing: "/".to_string(),
            role_landings: BTreeMap::new(),
        }
    }
}

impl GuardRoutes {
    /// The landing page for `role`.
    pub fn landing_for(&self, role: u32) -> &str {
        self.role_landings
            .get(&role)
            .map(String::as_str)
            .unwrap_or(&self.default_landing)
    }
}

/// One mounted route guard.
///
/// Subscribes to the tracker's session value on mount and maps it
/// through the policy's decision table. Dropping the guard cancels the
/// subscription, so a guard unmounted mid-load never acts on a late
/// result.
pub struct RouteGuard {
    tracker: SessionTracker,
    policy: AccessPolicy,
    routes: GuardRoutes,
    path: String,
    rx: watch::Receiver<SessionState>,
}

impl RouteGuard {
    /// Mounts a guard for the navigation at `path`.
    ///
    /// # Arguments
    ///
    /// * `tracker` - The shared session publisher.
    /// * `policy` - The route's declared access policy.
    /// * `routes` - The redirect targets.
    /// * `path` - The path being navigated to, compared exactly against
    ///   the second-factor exemption.
    pub fn mount(
        tracker: &SessionTracker,
        policy: AccessPolicy,
        routes: GuardRoutes,
        path: impl Into<String>,
    ) -> Self {
        let rx = tracker.subscribe();
        Self {
            tracker: tracker.clone(),
            policy,
            routes,
            path: path.into(),
            rx,
        }
    }

    /// The synchronous render contract: the decision for the session
    /// value as currently published. `Loading` while the read is in
    /// flight; no admission decision is ever made before the load
    /// resolves.
    pub fn evaluate(&self) -> GuardOutcome {
        let state = self.rx.borrow().clone();
        self.decide(&state)
    }

    /// Waits out `Pending` and returns the admission decision. Never
    /// returns `Loading`.
    ///
    /// Triggers the (deduplicated) initial read, so the first mounted
    /// guard performs it and every other one reuses the published
    /// value. If the publisher goes away before settling, the guard
    /// fails closed and decides as if no session exists.
    pub async fn resolve(&mut self) -> GuardOutcome {
        self.tracker.prime().await;

        loop {
            let state = self.rx.borrow_and_update().clone();
            if state.is_settled() {
                return self.decide(&state);
            }
            if self.rx.changed().await.is_err() {
                tracing::warn!("⚠️  Session publisher dropped before settling, failing closed");
                return self.decide(&SessionState::Absent);
            }
        }
    }

    /// The decision table.
    fn decide(&self, state: &SessionState) -> GuardOutcome {
        match (&self.policy, state) {
            (_, SessionState::Pending) => GuardOutcome::Loading,

            (AccessPolicy::PublicOnly, SessionState::Absent) => GuardOutcome::Render,
            (AccessPolicy::PublicOnly, SessionState::Present(user)) => {
                if self.path == self.routes.second_factor {
                    tracing::debug!("🔐 Second-factor page, signed-in user allowed through");
                    GuardOutcome::Render
                } else {
                    let landing = self.routes.landing_for(user.role).to_string();
                    tracing::debug!("↩️  Already signed in, bouncing {} to {}", self.path, landing);
                    GuardOutcome::Redirect(landing)
                }
            }

            (_, SessionState::Absent) => {
                tracing::warn!("❌ No session for {}, redirecting to sign-in", self.path);
                GuardOutcome::Redirect(self.routes.sign_in.clone())
            }

            (AccessPolicy::AuthenticatedOnly, SessionState::Present(user)) => {
                tracing::debug!("✅ User {} admitted to {}", user.id, self.path);
                GuardOutcome::Render
            }

            (AccessPolicy::RoleRestricted { allowed_roles }, SessionState::Present(user)) => {
                if allowed_roles.contains(&user.role) {
                    tracing::debug!("✅ User {} (role {}) admitted to {}", user.id, user.role, self.path);
                    GuardOutcome::Render
                } else {
                    // Authenticated but not entitled: a distinct outcome
                    // from not authenticated, never sent to sign-in.
                    tracing::warn!(
                        "🚫 User {} (role {}) not entitled to {}, redirecting to unauthorized",
                        user.id,
                        user.role,
                        self.path
                    );
                    GuardOutcome::Redirect(self.routes.unauthorized.clone())
                }
            }
        }
    }
}

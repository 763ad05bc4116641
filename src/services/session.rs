// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session store: the single owner of auth state.
//!
//! Handles:
//! - Sign-in / sign-up / sign-out against the auth provider
//! - Session restore at startup and on provider-pushed changes
//! - Profile loading for the signed-in user
//! - Deduplicated token refresh after a 401 rejection
//! - State snapshots over a watch channel for guards and UI

use std::sync::{Arc, Mutex as StdMutex, PoisonError, RwLock};

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::{ClientError, Result};
use crate::models::{Profile, ProfileUpdate, Role, Session, SignUp};
use crate::provider::{AuthChange, AuthProvider};
use validator::Validate;

/// Point-in-time view of auth state, published on every change.
///
/// `restoring` is true from construction until the first session restore
/// resolves; guards render a loading placeholder while it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub restoring: bool,
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

impl SessionSnapshot {
    fn initial() -> Self {
        Self {
            restoring: true,
            user_id: None,
            email: None,
            role: None,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Auth state owned by the store. Session and profile always change under
/// one lock so no reader can observe a torn update.
struct SessionState {
    restoring: bool,
    session: Option<Session>,
    profile: Option<Profile>,
}

/// Single owner of session, profile, and the refresh path.
pub struct SessionStore {
    provider: Arc<dyn AuthProvider>,
    state: RwLock<SessionState>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    /// Serializes refresh attempts so concurrent 401s produce one provider
    /// call (double-checked after acquisition).
    refresh_gate: Mutex<()>,
    /// Auth-change pump task, live between init and teardown.
    pump: StdMutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(provider: Arc<dyn AuthProvider>) -> Arc<Self> {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::initial());
        Arc::new(Self {
            provider,
            state: RwLock::new(SessionState {
                restoring: true,
                session: None,
                profile: None,
            }),
            snapshot_tx,
            refresh_gate: Mutex::new(()),
            pump: StdMutex::new(None),
        })
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────────

    /// Start watching provider auth changes and restore any persisted
    /// session. Safe to call more than once; the pump is spawned only once.
    pub async fn init(self: &Arc<Self>) {
        {
            let mut pump = self.pump.lock().unwrap_or_else(PoisonError::into_inner);
            if pump.is_none() {
                let store = Arc::clone(self);
                let mut changes = self.provider.subscribe();
                *pump = Some(tokio::spawn(async move {
                    loop {
                        match changes.recv().await {
                            Ok(change) => store.apply_change(change).await,
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, "Auth change stream lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }));
                tracing::info!("Session store initialized, watching auth changes");
            }
        }

        self.restore_session().await;
    }

    /// Stop watching provider auth changes. Events after teardown are
    /// ignored; state is left as-is.
    pub fn teardown(&self) {
        let handle = self
            .pump
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            tracing::info!("Session store torn down");
        }
    }

    // ─── Auth operations ─────────────────────────────────────────────────────

    /// Authenticate with email and password. On success the session is
    /// stored and the profile loaded; on failure state is left untouched.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.provider.sign_in(email, password).await?;
        tracing::info!(user_id = %session.user.id, "Sign-in succeeded");
        self.apply_session(Some(session.clone())).await;
        Ok(session)
    }

    /// Register a new account. Registration never authenticates this
    /// client; the user signs in explicitly afterwards.
    pub async fn sign_up(&self, signup: &SignUp) -> Result<()> {
        signup
            .validate()
            .map_err(|e| ClientError::Invalid(e.to_string()))?;
        self.provider.sign_up(signup).await
    }

    /// Sign out: revoke server-side, then clear session and profile
    /// unconditionally before returning. Revocation failure is logged, not
    /// surfaced; local state never survives a sign-out.
    pub async fn sign_out(&self) {
        let token = {
            let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
            st.session.as_ref().map(|s| s.access_token.clone())
        };

        if let Some(token) = token {
            if let Err(e) = self.provider.sign_out(&token).await {
                tracing::warn!(error = %e, "Server-side sign-out failed, clearing local session anyway");
            }
        }

        {
            let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);
            st.session = None;
            st.profile = None;
            st.restoring = false;
        }
        self.publish();
        tracing::info!("Signed out");
    }

    /// Load whatever session the provider has persisted. Idempotent:
    /// applying the same underlying session twice is a no-op.
    pub async fn restore_session(&self) {
        let restored = match self.provider.current_session().await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Session restore failed, treating as signed out");
                None
            }
        };
        self.apply_session(restored).await;
    }

    /// Verify the current password by re-authenticating, then set the new
    /// one. The fresh session from the verification step is applied so the
    /// password update runs under a current token.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<()> {
        if new_password.len() < 8 {
            return Err(ClientError::Invalid(
                "password must be at least 8 characters".to_string(),
            ));
        }

        let email = {
            let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
            let session = st.session.as_ref().ok_or(ClientError::NoSession)?;
            session
                .user
                .email
                .clone()
                .ok_or_else(|| ClientError::Invalid("session has no email address".to_string()))?
        };

        let fresh = self
            .provider
            .sign_in(&email, current_password)
            .await
            .map_err(|_| ClientError::Auth("Current password is incorrect".to_string()))?;
        self.apply_session(Some(fresh.clone())).await;

        self.provider
            .update_password(&fresh.access_token, new_password)
            .await
    }

    /// Patch the editable profile fields, then reload the profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<()> {
        let user_id = self.user_id().ok_or(ClientError::NoSession)?;
        self.provider.update_profile(&user_id, update).await?;
        self.load_profile(&user_id).await;
        Ok(())
    }

    /// Re-fetch the current user's profile. No-op when signed out.
    pub async fn refresh_profile(&self) {
        if let Some(user_id) = self.user_id() {
            self.load_profile(&user_id).await;
        }
    }

    // ─── Token refresh ───────────────────────────────────────────────────────

    /// Refresh the session after the API rejected `rejected_token` with a
    /// 401. Returns the access token to retry with.
    ///
    /// Concurrent rejections deduplicate to one provider call:
    /// 1. Fast path: a newer token already exists, return it.
    /// 2. Acquire the refresh gate.
    /// 3. Re-check after acquiring (another task may have refreshed while
    ///    this one waited).
    /// 4. Exchange the refresh token; install the new session only if the
    ///    rejected generation is still current, so a sign-out or newer
    ///    sign-in mid-flight wins.
    ///
    /// Any provider failure clears the session and surfaces
    /// `SessionExpired`; callers never retry the refresh themselves.
    pub async fn refresh_after_rejection(&self, rejected_token: &str) -> Result<String> {
        // Fast path: no lock needed when someone else already refreshed.
        {
            let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
            match &st.session {
                Some(s) if s.access_token != rejected_token => {
                    return Ok(s.access_token.clone())
                }
                Some(_) => {}
                None => return Err(ClientError::SessionExpired),
            }
        }

        let _gate = self.refresh_gate.lock().await;

        // Double-check after acquiring the gate.
        let refresh_token = {
            let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
            match &st.session {
                Some(s) if s.access_token != rejected_token => {
                    return Ok(s.access_token.clone())
                }
                Some(s) => s.refresh_token.clone(),
                None => return Err(ClientError::SessionExpired),
            }
        };

        tracing::debug!("Access token rejected, refreshing session");

        match self.provider.refresh_session(&refresh_token).await {
            Ok(new_session) => {
                let (result, publish) = {
                    let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);
                    match st.session.as_ref() {
                        // Still the generation that was rejected: install
                        // the pair atomically.
                        Some(current) if current.access_token == rejected_token => {
                            let token = new_session.access_token.clone();
                            st.session = Some(new_session);
                            (Ok(token), true)
                        }
                        // A newer session landed while refreshing; the
                        // stale result must not overwrite it.
                        Some(current) => (Ok(current.access_token.clone()), false),
                        // Signed out mid-refresh: the sign-out wins.
                        None => (Err(ClientError::SessionExpired), false),
                    }
                };
                if publish {
                    self.publish();
                    tracing::debug!("Session refreshed after rejection");
                }
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session refresh failed, clearing session");
                {
                    let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);
                    st.session = None;
                    st.profile = None;
                }
                self.publish();
                Err(ClientError::SessionExpired)
            }
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn session(&self) -> Option<Session> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .clone()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile
            .clone()
    }

    pub fn user_id(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .as_ref()
            .map(|s| s.user.id.clone())
    }

    pub fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .session
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Watch auth-state snapshots. The receiver immediately holds the
    /// current snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    async fn apply_change(&self, change: AuthChange) {
        tracing::debug!(event = ?change.event, "Auth change received");
        self.apply_session(change.session).await;
    }

    /// Install a session (or its absence), then load the profile when the
    /// user changed. Idempotent on the access token.
    async fn apply_session(&self, incoming: Option<Session>) {
        let load_profile_for = {
            let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);

            let same_token = match (&st.session, &incoming) {
                (Some(current), Some(new)) => current.access_token == new.access_token,
                (None, None) => true,
                _ => false,
            };
            if same_token && !st.restoring {
                return;
            }

            let user_changed = match (&st.session, &incoming) {
                (Some(current), Some(new)) => current.user.id != new.user.id,
                (None, None) => false,
                _ => true,
            };

            st.restoring = false;
            st.session = incoming.clone();
            if user_changed {
                st.profile = None;
            }

            incoming
                .as_ref()
                .filter(|_| st.profile.is_none())
                .map(|s| s.user.id.clone())
        };

        self.publish();

        if let Some(user_id) = load_profile_for {
            self.load_profile(&user_id).await;
        }
    }

    /// Fetch and install the profile for `user_id`, unless the signed-in
    /// user changed while the fetch was in flight.
    async fn load_profile(&self, user_id: &str) {
        match self.provider.fetch_profile(user_id).await {
            Ok(profile) => {
                if profile.is_none() {
                    tracing::warn!(user_id, "No profile row for user");
                }
                {
                    let mut st = self.state.write().unwrap_or_else(PoisonError::into_inner);
                    if st.session.as_ref().map(|s| s.user.id.as_str()) == Some(user_id) {
                        st.profile = profile;
                    }
                }
                self.publish();
            }
            Err(e) => {
                tracing::warn!(error = %e, user_id, "Profile fetch failed");
            }
        }
    }

    fn publish(&self) {
        let snapshot = {
            let st = self.state.read().unwrap_or_else(PoisonError::into_inner);
            SessionSnapshot {
                restoring: st.restoring,
                user_id: st.session.as_ref().map(|s| s.user.id.clone()),
                email: st.session.as_ref().and_then(|s| s.user.email.clone()),
                role: st.profile.as_ref().map(|p| p.role),
            }
        };
        self.snapshot_tx.send_replace(snapshot);
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use atlas_client::config::Config;
use atlas_client::error::{ClientError, Result};
use atlas_client::models::{
    AuthUser, BookmarkRecord, Profile, ProfileUpdate, Role, Session, SignUp,
};
use atlas_client::provider::{AuthChange, AuthEvent, AuthProvider};
use atlas_client::services::{SessionSnapshot, SessionStore};
use atlas_client::Client;
use chrono::Utc;
use tokio::sync::broadcast;

/// Install a subscriber honoring `RUST_LOG`, once per test binary.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a session for `user_id` holding `access_token`.
#[allow(dead_code)]
pub fn session(user_id: &str, access_token: &str) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: format!("refresh-{}", access_token),
        expires_at: Utc::now().timestamp() + 3600,
        user: AuthUser {
            id: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id)),
        },
    }
}

/// Build a profile row for `user_id` with the given role.
#[allow(dead_code)]
pub fn profile(user_id: &str, role: Role) -> Profile {
    Profile {
        id: user_id.to_string(),
        email: Some(format!("{}@example.com", user_id)),
        first_name: Some("Test".to_string()),
        last_name: Some("User".to_string()),
        role,
        department: None,
        position: None,
    }
}

/// Build a client wired to the stub provider, with the application API
/// pointed at `api_base_url` (usually a mockito server).
#[allow(dead_code)]
pub fn test_client(api_base_url: &str, provider: Arc<StubProvider>) -> Client {
    let config = Config {
        api_base_url: api_base_url.to_string(),
        ..Config::default()
    };
    Client::with_provider(config, provider).expect("Client should build")
}

/// Wait until the published snapshot satisfies `pred`, or panic after two
/// seconds. Used for state driven by the provider change pump.
#[allow(dead_code)]
pub async fn wait_for_snapshot<F>(store: &Arc<SessionStore>, pred: F) -> SessionSnapshot
where
    F: Fn(&SessionSnapshot) -> bool,
{
    let mut rx = store.subscribe();
    tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            {
                let snap = rx.borrow().clone();
                if pred(&snap) {
                    return snap;
                }
            }
            rx.changed().await.expect("Snapshot channel closed");
        }
    })
    .await
    .expect("Snapshot condition not reached in time")
}

/// Programmable in-memory auth provider.
///
/// Operations record call counts and arguments; `fail_*` switches make the
/// matching operation fail. `refresh_session` hands out queued sessions in
/// order and fails once the queue is empty.
#[allow(dead_code)]
pub struct StubProvider {
    current: Mutex<Option<Session>>,
    sign_in_session: Mutex<Option<Session>>,
    refresh_queue: Mutex<Vec<Session>>,
    profiles: Mutex<Vec<Profile>>,
    bookmarks: Mutex<HashSet<(String, String)>>,

    pub fail_sign_in: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub fail_add_bookmark: AtomicBool,
    pub fail_remove_bookmark: AtomicBool,
    pub fail_list_bookmarks: AtomicBool,
    refresh_delay: Mutex<Duration>,

    pub sign_up_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub update_password_calls: AtomicUsize,
    pub fetch_profile_calls: AtomicUsize,
    pub update_profile_calls: AtomicUsize,
    pub list_bookmark_calls: AtomicUsize,
    pub add_bookmark_calls: AtomicUsize,
    pub remove_bookmark_calls: AtomicUsize,

    last_sign_in: Mutex<Option<(String, String)>>,
    last_password_update: Mutex<Option<(String, String)>>,
    last_revoked_token: Mutex<Option<String>>,

    events: broadcast::Sender<AuthChange>,
}

#[allow(dead_code)]
impl StubProvider {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            current: Mutex::new(None),
            sign_in_session: Mutex::new(None),
            refresh_queue: Mutex::new(Vec::new()),
            profiles: Mutex::new(Vec::new()),
            bookmarks: Mutex::new(HashSet::new()),
            fail_sign_in: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
            fail_add_bookmark: AtomicBool::new(false),
            fail_remove_bookmark: AtomicBool::new(false),
            fail_list_bookmarks: AtomicBool::new(false),
            refresh_delay: Mutex::new(Duration::ZERO),
            sign_up_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            update_password_calls: AtomicUsize::new(0),
            fetch_profile_calls: AtomicUsize::new(0),
            update_profile_calls: AtomicUsize::new(0),
            list_bookmark_calls: AtomicUsize::new(0),
            add_bookmark_calls: AtomicUsize::new(0),
            remove_bookmark_calls: AtomicUsize::new(0),
            last_sign_in: Mutex::new(None),
            last_password_update: Mutex::new(None),
            last_revoked_token: Mutex::new(None),
            events,
        })
    }

    /// Set the session `current_session` hands out.
    pub fn set_current(&self, session: Option<Session>) {
        *self.current.lock().unwrap() = session;
    }

    /// Set the session the next `sign_in` calls hand out.
    pub fn set_sign_in_session(&self, session: Session) {
        *self.sign_in_session.lock().unwrap() = Some(session);
    }

    /// Queue a session for `refresh_session` to hand out.
    pub fn queue_refresh(&self, session: Session) {
        self.refresh_queue.lock().unwrap().push(session);
    }

    /// Hold every `refresh_session` call in flight for `delay`.
    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = delay;
    }

    /// Add a profile row `fetch_profile` can find.
    pub fn add_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().push(profile);
    }

    /// Seed a bookmark row.
    pub fn seed_bookmark(&self, user_id: &str, document_id: &str) {
        self.bookmarks
            .lock()
            .unwrap()
            .insert((user_id.to_string(), document_id.to_string()));
    }

    /// Push an auth change as the backend would (another tab, revocation).
    pub fn push_change(&self, event: AuthEvent, session: Option<Session>) {
        let _ = self.events.send(AuthChange { event, session });
    }

    pub fn bookmark_rows(&self) -> HashSet<(String, String)> {
        self.bookmarks.lock().unwrap().clone()
    }

    pub fn last_sign_in(&self) -> Option<(String, String)> {
        self.last_sign_in.lock().unwrap().clone()
    }

    pub fn last_password_update(&self) -> Option<(String, String)> {
        self.last_password_update.lock().unwrap().clone()
    }

    pub fn last_revoked_token(&self) -> Option<String> {
        self.last_revoked_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuthProvider for StubProvider {
    async fn sign_up(&self, _signup: &SignUp) -> Result<()> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_sign_in.lock().unwrap() = Some((email.to_string(), password.to_string()));
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(ClientError::Auth("Invalid login credentials".to_string()));
        }
        let session = self
            .sign_in_session
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Auth("No account configured".to_string()))?;
        *self.current.lock().unwrap() = Some(session.clone());
        let _ = self.events.send(AuthChange {
            event: AuthEvent::SignedIn,
            session: Some(session.clone()),
        });
        Ok(session)
    }

    async fn refresh_session(&self, _refresh_token: &str) -> Result<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.refresh_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let session = {
            let mut queue = self.refresh_queue.lock().unwrap();
            if queue.is_empty() {
                return Err(ClientError::Auth("Refresh token revoked".to_string()));
            }
            queue.remove(0)
        };
        *self.current.lock().unwrap() = Some(session.clone());
        let _ = self.events.send(AuthChange {
            event: AuthEvent::TokenRefreshed,
            session: Some(session.clone()),
        });
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_revoked_token.lock().unwrap() = Some(access_token.to_string());
        *self.current.lock().unwrap() = None;
        let _ = self.events.send(AuthChange {
            event: AuthEvent::SignedOut,
            session: None,
        });
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ClientError::Network(
                "Revocation endpoint unreachable".to_string(),
            ));
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.current.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        self.update_password_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_password_update.lock().unwrap() =
            Some((access_token.to_string(), new_password.to_string()));
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.fetch_profile_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == user_id)
            .cloned())
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        self.update_profile_calls.fetch_add(1, Ordering::SeqCst);
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(row) = profiles.iter_mut().find(|p| p.id == user_id) {
            if let Some(v) = &update.first_name {
                row.first_name = Some(v.clone());
            }
            if let Some(v) = &update.last_name {
                row.last_name = Some(v.clone());
            }
            if let Some(v) = &update.department {
                row.department = Some(v.clone());
            }
            if let Some(v) = &update.position {
                row.position = Some(v.clone());
            }
        }
        Ok(())
    }

    async fn list_bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>> {
        self.list_bookmark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list_bookmarks.load(Ordering::SeqCst) {
            return Err(ClientError::Network("Bookmark query failed".to_string()));
        }
        Ok(self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .enumerate()
            .map(|(i, (owner, document_id))| BookmarkRecord {
                id: format!("bm-{}", i),
                user_id: owner.clone(),
                document_id: document_id.clone(),
                created_at: Utc::now(),
            })
            .collect())
    }

    async fn add_bookmark(&self, user_id: &str, document_id: &str) -> Result<()> {
        self.add_bookmark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_add_bookmark.load(Ordering::SeqCst) {
            return Err(ClientError::Network("Bookmark insert failed".to_string()));
        }
        self.bookmarks
            .lock()
            .unwrap()
            .insert((user_id.to_string(), document_id.to_string()));
        Ok(())
    }

    async fn remove_bookmark(&self, user_id: &str, document_id: &str) -> Result<()> {
        self.remove_bookmark_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_remove_bookmark.load(Ordering::SeqCst) {
            return Err(ClientError::Network("Bookmark delete failed".to_string()));
        }
        self.bookmarks
            .lock()
            .unwrap()
            .remove(&(user_id.to_string(), document_id.to_string()));
        Ok(())
    }
}

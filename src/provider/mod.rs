// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Auth provider abstraction.
//!
//! The session store drives the identity backend through [`AuthProvider`],
//! so tests and alternative backends can swap in their own implementation.
//! Record operations (profiles, bookmarks) live on the same trait: they are
//! rows owned by the auth backend and authorized with its session, not the
//! application API.

pub mod rest;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::{BookmarkRecord, Profile, ProfileUpdate, Session, SignUp};

pub use rest::RestAuthProvider;

/// Auth state transitions pushed by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// A pushed auth-state change, carrying the session it resulted in.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

/// Identity backend interface.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account. Never authenticates this client.
    async fn sign_up(&self, signup: &SignUp) -> Result<()>;

    /// Authenticate with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    /// Exchange a refresh token for a new session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    /// Revoke the session server-side and forget it locally.
    async fn sign_out(&self, access_token: &str) -> Result<()>;

    /// Session the provider currently holds for this client, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribe to pushed auth-state changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Set a new password for the authenticated user.
    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()>;

    /// Profile row for a user, `Ok(None)` when absent.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Patch the editable profile fields.
    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()>;

    /// All bookmark rows for a user, newest first.
    async fn list_bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>>;

    async fn add_bookmark(&self, user_id: &str, document_id: &str) -> Result<()>;

    async fn remove_bookmark(&self, user_id: &str, document_id: &str) -> Result<()>;
}

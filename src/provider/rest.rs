// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP auth provider speaking the GoTrue/PostgREST wire protocol.
//!
//! Handles:
//! - Password and refresh-token grants
//! - Sign-up with profile metadata
//! - Session revocation and password updates
//! - Profile and bookmark record queries (`eq.` filters)

use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::error::{ClientError, Result};
use crate::models::{AuthUser, BookmarkRecord, Profile, ProfileUpdate, Session, SignUp};
use crate::provider::{AuthChange, AuthEvent, AuthProvider};

/// Broadcast capacity for auth-state changes. Consumers are expected to keep
/// up; a lagged receiver only skips intermediate states.
const EVENT_CAPACITY: usize = 16;

/// Fallback token lifetime when the grant response carries neither
/// `expires_at` nor `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Auth provider backed by a GoTrue-compatible HTTP backend.
pub struct RestAuthProvider {
    http: reqwest::Client,
    auth_url: String,
    api_key: String,
    /// Session held for this client process. Not persisted to disk.
    current: RwLock<Option<Session>>,
    events: broadcast::Sender<AuthChange>,
}

impl RestAuthProvider {
    pub fn new(http: reqwest::Client, auth_url: String, api_key: String) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            http,
            auth_url,
            api_key,
            current: RwLock::new(None),
            events,
        }
    }

    fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.auth_url, path)
    }

    fn rest_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.auth_url, table)
    }

    /// Bearer value for record requests: the user's token when signed in,
    /// the publishable key otherwise.
    fn record_bearer(&self) -> String {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.api_key.clone())
    }

    /// Replace the held session and broadcast the change.
    fn install(&self, session: Option<Session>, event: AuthEvent) {
        {
            let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *slot = session.clone();
        }
        // Nobody listening is fine
        let _ = self.events.send(AuthChange { event, session });
    }

    async fn token_grant(&self, grant_type: &str, body: serde_json::Value) -> Result<Session> {
        let response = self
            .http
            .post(self.auth_endpoint("/token"))
            .query(&[("grant_type", grant_type)])
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let grant: TokenGrant = read_auth_json(response).await?;
        Ok(grant.into_session())
    }
}

#[async_trait]
impl AuthProvider for RestAuthProvider {
    async fn sign_up(&self, signup: &SignUp) -> Result<()> {
        let body = serde_json::json!({
            "email": signup.email,
            "password": signup.password,
            "data": {
                "first_name": signup.first_name,
                "last_name": signup.last_name,
                "role": signup.role,
            },
        });

        let response = self
            .http
            .post(self.auth_endpoint("/signup"))
            .header("apikey", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        tracing::info!(email = %signup.email, "Sign-up submitted");
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .token_grant(
                "password",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await?;

        self.install(Some(session.clone()), AuthEvent::SignedIn);
        tracing::info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let session = self
            .token_grant(
                "refresh_token",
                serde_json::json!({ "refresh_token": refresh_token }),
            )
            .await?;

        self.install(Some(session.clone()), AuthEvent::TokenRefreshed);
        tracing::debug!(user_id = %session.user.id, "Session refreshed");
        Ok(session)
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        // Forget the session first so it cannot be restored even if the
        // revocation request fails.
        self.install(None, AuthEvent::SignedOut);

        let response = self
            .http
            .post(self.auth_endpoint("/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        tracing::info!("Signed out and revoked server-side");
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.events.subscribe()
    }

    async fn update_password(&self, access_token: &str, new_password: &str) -> Result<()> {
        let response = self
            .http
            .put(self.auth_endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        tracing::info!("Password updated");
        Ok(())
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let response = self
            .http
            .get(self.rest_endpoint("profiles"))
            .query(&[("id", format!("eq.{}", user_id)), ("select", "*".into())])
            .header("apikey", &self.api_key)
            .bearer_auth(self.record_bearer())
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        let mut rows: Vec<Profile> = read_auth_json(response).await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    async fn update_profile(&self, user_id: &str, update: &ProfileUpdate) -> Result<()> {
        // PostgREST patch body; updated_at is set here since the table has
        // no trigger for it.
        let mut body = serde_json::to_value(update)
            .map_err(|e| ClientError::Decode(format!("Profile patch: {}", e)))?;
        body["updated_at"] = serde_json::Value::String(Utc::now().to_rfc3339());

        let response = self
            .http
            .patch(self.rest_endpoint("profiles"))
            .query(&[("id", format!("eq.{}", user_id))])
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.record_bearer())
            .json(&body)
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        Ok(())
    }

    async fn list_bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>> {
        let response = self
            .http
            .get(self.rest_endpoint("bookmarks"))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("select", "*".into()),
                ("order", "created_at.desc".into()),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(self.record_bearer())
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        read_auth_json(response).await
    }

    async fn add_bookmark(&self, user_id: &str, document_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.rest_endpoint("bookmarks"))
            .header("apikey", &self.api_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(self.record_bearer())
            .json(&serde_json::json!({
                "user_id": user_id,
                "document_id": document_id,
            }))
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        Ok(())
    }

    async fn remove_bookmark(&self, user_id: &str, document_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.rest_endpoint("bookmarks"))
            .query(&[
                ("user_id", format!("eq.{}", user_id)),
                ("document_id", format!("eq.{}", document_id)),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(self.record_bearer())
            .send()
            .await
            .map_err(ClientError::from_transport)?;

        check_auth_status(response).await?;
        Ok(())
    }
}

// ─── Wire types and response checking ────────────────────────────────────────

/// Token grant response for both password and refresh-token grants.
#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenGrant {
    fn into_session(self) -> Session {
        let expires_at = match self.expires_at {
            Some(at) => at,
            None => {
                Utc::now().timestamp() + self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            }
        };

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Error body shapes the auth backend uses.
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Check status, mapping non-2xx to `ClientError::Auth` with the backend's
/// message when one is present.
async fn check_auth_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Auth(auth_error_message(status.as_u16(), &body)))
}

/// Check status and parse the JSON body.
async fn read_auth_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let response = check_auth_status(response).await?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Decode(format!("Auth response: {}", e)))
}

fn auth_error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<AuthErrorBody>(body) {
        if let Some(message) = parsed.error_description.or(parsed.msg).or(parsed.error) {
            return message;
        }
    }
    format!("HTTP {}: {}", status, body)
}

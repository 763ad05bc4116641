// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Atlas client: session and data layer for the Atlas knowledge assistant.
//!
//! This crate owns everything between the UI and the network: a session
//! store with deduplicated token refresh, an authenticated API client that
//! retries once after a 401, pure route guards, and per-user gamification
//! and bookmark caches. Rendering is left entirely to the embedder.

pub mod config;
pub mod error;
pub mod guards;
pub mod models;
pub mod provider;
pub mod services;

use std::sync::Arc;

use config::Config;
use error::{ClientError, Result};
use provider::{AuthProvider, RestAuthProvider};
use services::{ApiClient, BookmarkStore, GamificationStore, SessionStore};

/// Everything an embedder needs, wired together.
pub struct Client {
    pub config: Config,
    pub sessions: Arc<SessionStore>,
    pub api: ApiClient,
    pub gamification: GamificationStore,
    pub bookmarks: BookmarkStore,
}

impl Client {
    /// Build a client against the configured REST auth provider.
    pub fn new(config: Config) -> Result<Self> {
        let http = build_http(&config)?;
        let provider: Arc<dyn AuthProvider> = Arc::new(RestAuthProvider::new(
            http.clone(),
            config.auth_url.clone(),
            config.auth_api_key.clone(),
        ));
        Ok(Self::assemble(config, http, provider))
    }

    /// Build a client with an injected auth provider (tests, alternative
    /// identity backends).
    pub fn with_provider(config: Config, provider: Arc<dyn AuthProvider>) -> Result<Self> {
        let http = build_http(&config)?;
        Ok(Self::assemble(config, http, provider))
    }

    fn assemble(config: Config, http: reqwest::Client, provider: Arc<dyn AuthProvider>) -> Self {
        let sessions = SessionStore::new(Arc::clone(&provider));
        let api = ApiClient::new(http, config.api_base_url.clone(), Arc::clone(&sessions));
        let gamification = GamificationStore::new(api.clone(), Arc::clone(&sessions));
        let bookmarks = BookmarkStore::new(provider, Arc::clone(&sessions));

        Self {
            config,
            sessions,
            api,
            gamification,
            bookmarks,
        }
    }

    /// Start the session lifecycle: watch provider auth changes and
    /// restore any persisted session.
    pub async fn init(&self) {
        self.sessions.init().await;
    }

    /// Stop watching auth changes. State is left as-is.
    pub fn teardown(&self) {
        self.sessions.teardown();
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.sessions.teardown();
    }
}

/// Shared HTTP client with the configured per-request timeout. Auth
/// provider and API calls alike run under it.
fn build_http(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .map_err(|e| ClientError::Internal(anyhow::anyhow!("HTTP client build failed: {}", e)))
}

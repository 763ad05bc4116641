// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bookmark store: the signed-in user's bookmarked document IDs.
//!
//! The set is loaded lazily per user and kept in sync with toggle results;
//! membership tests are pure and never touch the network.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{ClientError, Result};
use crate::provider::AuthProvider;
use crate::services::session::SessionStore;

#[derive(Default)]
struct BookmarkState {
    /// User the set belongs to.
    user_id: Option<String>,
    ids: HashSet<String>,
    loaded: bool,
}

/// Per-user bookmark set over the provider's records API.
pub struct BookmarkStore {
    provider: Arc<dyn AuthProvider>,
    sessions: Arc<SessionStore>,
    state: Mutex<BookmarkState>,
}

impl BookmarkStore {
    pub fn new(provider: Arc<dyn AuthProvider>, sessions: Arc<SessionStore>) -> Self {
        Self {
            provider,
            sessions,
            state: Mutex::new(BookmarkState::default()),
        }
    }

    /// Reset the set when the signed-in user changed since it was filled.
    fn sync_user(&self, st: &mut BookmarkState) {
        let current = self.sessions.user_id();
        if st.user_id != current {
            *st = BookmarkState {
                user_id: current,
                ..BookmarkState::default()
            };
        }
    }

    /// Whether a document is bookmarked by the current user. Pure
    /// membership test; never performs I/O.
    pub fn is_bookmarked(&self, document_id: &str) -> bool {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.ids.contains(document_id)
    }

    /// Snapshot of the current user's bookmarked document IDs.
    pub fn bookmarked_ids(&self) -> HashSet<String> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.ids.clone()
    }

    /// Toggle a bookmark for the current user.
    ///
    /// Issues exactly one add or remove based on current membership, and
    /// updates the local set only after the provider confirmed the write;
    /// there is no optimistic update to roll back. Returns the new
    /// membership state.
    pub async fn toggle_bookmark(&self, document_id: &str) -> Result<bool> {
        let user_id = match self.sessions.user_id() {
            Some(id) => id,
            None => return Err(ClientError::NoSession),
        };

        self.ensure_loaded(&user_id).await?;

        let currently = {
            let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.sync_user(&mut st);
            st.ids.contains(document_id)
        };

        if currently {
            self.provider.remove_bookmark(&user_id, document_id).await?;
            let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.sync_user(&mut st);
            if st.user_id.as_deref() == Some(user_id.as_str()) {
                st.ids.remove(document_id);
            }
            tracing::debug!(document_id, "Bookmark removed");
            Ok(false)
        } else {
            self.provider.add_bookmark(&user_id, document_id).await?;
            let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.sync_user(&mut st);
            if st.user_id.as_deref() == Some(user_id.as_str()) {
                st.ids.insert(document_id.to_string());
            }
            tracing::debug!(document_id, "Bookmark added");
            Ok(true)
        }
    }

    /// Re-list the current user's bookmarks and replace the set. Signed
    /// out: clears the set and returns Ok.
    pub async fn refresh_bookmarks(&self) -> Result<()> {
        let user_id = match self.sessions.user_id() {
            Some(id) => id,
            None => {
                let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                self.sync_user(&mut st);
                return Ok(());
            }
        };

        let records = self.provider.list_bookmarks(&user_id).await?;

        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        if st.user_id.as_deref() == Some(user_id.as_str()) {
            st.ids = records.into_iter().map(|r| r.document_id).collect();
            st.loaded = true;
        }
        Ok(())
    }

    /// Load the set for `user_id` unless it is already loaded.
    async fn ensure_loaded(&self, user_id: &str) -> Result<()> {
        {
            let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            self.sync_user(&mut st);
            if st.loaded && st.user_id.as_deref() == Some(user_id) {
                return Ok(());
            }
        }

        let records = self.provider.list_bookmarks(user_id).await?;

        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        if st.user_id.as_deref() == Some(user_id) {
            st.ids = records.into_iter().map(|r| r.document_id).collect();
            st.loaded = true;
            tracing::debug!(user_id, count = st.ids.len(), "Bookmarks loaded");
        }
        Ok(())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gamification store: per-user stats and badge cache.
//!
//! Handles:
//! - Fetch-and-replace refreshes of stats and badges
//! - Newly-earned badge detection with a FIFO notification queue
//! - Fire-and-forget activity tracking
//! - Cache invalidation when the signed-in user changes

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::models::{Activity, Badge, GamificationStats};
use crate::services::api::ApiClient;
use crate::services::session::SessionStore;

#[derive(Default)]
struct GamificationState {
    /// User the cached values belong to.
    user_id: Option<String>,
    stats: Option<GamificationStats>,
    badges: Vec<Badge>,
    total_earned: u32,
    /// Earned badge IDs from the last fetch. `None` until the first fetch
    /// for this user, so restoring a session never replays old badges.
    earned_baseline: Option<HashSet<String>>,
    /// Earned-but-not-yet-acknowledged badges, oldest first.
    pending_notifications: VecDeque<Badge>,
}

/// Per-user gamification cache over the application API.
pub struct GamificationStore {
    api: ApiClient,
    sessions: Arc<SessionStore>,
    state: Mutex<GamificationState>,
}

impl GamificationStore {
    pub fn new(api: ApiClient, sessions: Arc<SessionStore>) -> Self {
        Self {
            api,
            sessions,
            state: Mutex::new(GamificationState::default()),
        }
    }

    /// Reset the cache when the signed-in user changed since it was filled.
    /// Called under the state lock by every accessor and installer, so a
    /// sign-out is observable immediately.
    fn sync_user(&self, st: &mut GamificationState) {
        let current = self.sessions.user_id();
        if st.user_id != current {
            *st = GamificationState {
                user_id: current,
                ..GamificationState::default()
            };
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn stats(&self) -> Option<GamificationStats> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.stats.clone()
    }

    pub fn badges(&self) -> Vec<Badge> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.badges.clone()
    }

    pub fn total_earned(&self) -> u32 {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.total_earned
    }

    /// Oldest unacknowledged badge notification, if any.
    pub fn next_badge_notification(&self) -> Option<Badge> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.pending_notifications.front().cloned()
    }

    /// Pop the oldest notification once the UI has shown it.
    pub fn acknowledge_badge_notification(&self) -> Option<Badge> {
        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        st.pending_notifications.pop_front()
    }

    // ─── Refreshes ───────────────────────────────────────────────────────────

    /// Fetch the current user's stats and replace the cached value whole.
    /// Signed out: clears the cache and returns Ok.
    pub async fn refresh_stats(&self) -> Result<()> {
        let user_id = match self.sessions.user_id() {
            Some(id) => id,
            None => {
                let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                self.sync_user(&mut st);
                return Ok(());
            }
        };

        let stats = self.api.gamification_stats(&user_id).await?;

        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        if st.user_id.as_deref() == Some(user_id.as_str()) {
            st.stats = Some(stats);
        }
        Ok(())
    }

    /// Fetch the current user's badges, queue notifications for newly
    /// earned ones, and replace the cached list whole.
    pub async fn refresh_badges(&self) -> Result<()> {
        let user_id = match self.sessions.user_id() {
            Some(id) => id,
            None => {
                let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                self.sync_user(&mut st);
                return Ok(());
            }
        };

        let collection = self.api.gamification_badges(&user_id).await?;

        let mut st = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        self.sync_user(&mut st);
        if st.user_id.as_deref() != Some(user_id.as_str()) {
            return Ok(());
        }

        // Newly earned = earned now but absent from the previous earned
        // set. The first fetch only arms the baseline; a fresh page load
        // must not replay every badge the user already has.
        if let Some(baseline) = &st.earned_baseline {
            let mut newly: Vec<Badge> = collection
                .badges
                .iter()
                .filter(|b| b.earned && !baseline.contains(&b.id))
                .cloned()
                .collect();
            newly.sort_by(|a, b| a.earned_at.cmp(&b.earned_at));
            for badge in newly {
                tracing::info!(badge_id = %badge.id, name = %badge.name, "Badge earned");
                st.pending_notifications.push_back(badge);
            }
        }

        st.earned_baseline = Some(
            collection
                .badges
                .iter()
                .filter(|b| b.earned)
                .map(|b| b.id.clone())
                .collect(),
        );
        st.total_earned = collection.total_earned;
        st.badges = collection.badges;
        Ok(())
    }

    // ─── Activity tracking ───────────────────────────────────────────────────

    /// Report a rewarded activity, then refresh stats and badges.
    ///
    /// Fire-and-forget: tracking is a side effect of user actions that must
    /// never fail them, so errors are logged and the cache keeps its
    /// previous values. The refreshes only start after the tracking POST
    /// completed, and run concurrently with each other.
    pub async fn track_activity(&self, activity: Activity, metadata: Option<serde_json::Value>) {
        let user_id = match self.sessions.user_id() {
            Some(id) => id,
            None => return,
        };

        if let Err(e) = self.api.track_activity(&user_id, activity, metadata).await {
            tracing::warn!(
                error = %e,
                activity = activity.as_str(),
                "Activity tracking failed"
            );
            return;
        }

        let (stats, badges) = tokio::join!(self.refresh_stats(), self.refresh_badges());
        if let Err(e) = stats {
            tracing::warn!(error = %e, "Stats refresh after tracking failed");
        }
        if let Err(e) = badges {
            tracing::warn!(error = %e, "Badge refresh after tracking failed");
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gamification models: per-user stats, badges, and tracked activities.
//!
//! All progression math (500 exp per level, badge thresholds, progress
//! percentages) is computed server-side; these models carry the results.

use serde::{Deserialize, Serialize};

/// Per-user gamification stats as computed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationStats {
    pub user_id: String,
    pub level: u32,
    pub total_exp: u64,
    pub questions_asked: u64,
    pub documents_viewed: u64,
    pub bookmarks_created: u64,
    /// ISO 8601 timestamp of the last rewarded activity
    #[serde(default)]
    pub last_activity_at: Option<String>,
    /// Exp remaining until the next level
    pub exp_for_next_level: u64,
    /// Exp earned within the current level
    pub exp_progress: u64,
    /// Progress through the current level, 0-100
    pub exp_progress_percentage: f64,
}

/// Badge definition enriched with the current user's earned state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Icon identifier rendered by the front end
    pub icon: String,
    pub requirement_type: RequirementType,
    pub requirement_value: u64,
    pub exp_reward: u64,
    pub earned: bool,
    /// ISO 8601 earn time; present only when earned. Kept as a string
    /// since lexicographic order matches chronological order.
    #[serde(default)]
    pub earned_at: Option<String>,
    /// Progress toward the requirement, 0-100 (always 100 once earned)
    pub progress: f64,
}

/// Counters the server tracks for badge requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    QuestionsAsked,
    DocumentsViewed,
    BookmarksCreated,
    LevelReached,
    /// Requirement kinds newer than this client
    #[serde(other)]
    Unknown,
}

/// Badge list response with the earned count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BadgeCollection {
    pub badges: Vec<Badge>,
    pub total_earned: u32,
}

/// Activities the server rewards with exp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    QuestionAsked,
    DocumentViewed,
    BookmarkCreated,
}

impl Activity {
    /// Wire name sent to the tracking endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::QuestionAsked => "question_asked",
            Activity::DocumentViewed => "document_viewed",
            Activity::BookmarkCreated => "bookmark_created",
        }
    }
}

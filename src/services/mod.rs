// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - session state, API access, and user-scoped stores.

pub mod api;
pub mod bookmarks;
pub mod gamification;
pub mod session;

pub use api::ApiClient;
pub use bookmarks::BookmarkStore;
pub use gamification::GamificationStore;
pub use session::{SessionSnapshot, SessionStore};

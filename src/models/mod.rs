// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod analytics;
pub mod document;
pub mod faq;
pub mod gamification;
pub mod profile;
pub mod session;

pub use analytics::{DocumentReport, OverviewReport, ReportQuery, UserActivityReport};
pub use document::{
    AccessLevel, BookmarkRecord, Document, DocumentPatch, DocumentUpload, TagCatalog,
};
pub use faq::{Faq, FaqDraft};
pub use gamification::{Activity, Badge, BadgeCollection, GamificationStats, RequirementType};
pub use profile::{Profile, ProfileUpdate, Role};
pub use session::{AuthUser, Session, SignUp};

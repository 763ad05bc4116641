// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Usage report models for the admin analytics endpoints.
//!
//! All aggregation happens server-side; each report arrives as current-period
//! KPIs, the previous-period values they are compared against, and the
//! breakdown lists the charts render.

use serde::{Deserialize, Serialize};

use crate::models::profile::Role;

/// Query filter shared by all report endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// Restrict to one role, or `None` for all users
    pub user_role: Option<Role>,
    /// Reporting window in days
    pub time_range_days: u32,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            user_role: None,
            time_range_days: 30,
        }
    }
}

impl ReportQuery {
    /// Wire value for the `user_role` query parameter.
    pub fn role_param(&self) -> &'static str {
        match self.user_role {
            Some(role) => role.as_str(),
            None => "all",
        }
    }
}

// ─── Overview report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewKpis {
    pub total_questions: u64,
    pub documents_viewed: u64,
    pub total_users: u64,
    pub previous_total_questions: u64,
    pub previous_documents_viewed: u64,
    pub previous_total_users: u64,
}

/// One point on the overview trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTrend {
    /// Axis label as formatted by the server
    pub label: String,
    pub searches: u64,
    #[serde(rename = "documentViews")]
    pub document_views: u64,
    #[serde(rename = "activeUsers")]
    pub active_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub kpis: OverviewKpis,
    pub daily_trends: Vec<DailyTrend>,
}

// ─── Document report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentKpis {
    pub total_documents: u64,
    pub storage_used_mb: f64,
    pub storage_limit_mb: f64,
    pub previous_total_documents: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentViewCount {
    pub filename: String,
    pub total_views: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub kpis: DocumentKpis,
    pub most_viewed_documents: Vec<DocumentViewCount>,
    pub category_distribution: Vec<CategoryCount>,
}

// ─── User activity report ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityKpis {
    pub daily_active_users: f64,
    pub average_badges_per_user: u64,
    pub user_retention_rate: f64,
    pub previous_daily_active_users: f64,
    pub previous_user_retention_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub total_exp: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: Role,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserActivityReport {
    pub kpis: UserActivityKpis,
    pub most_active_users: Vec<ActiveUser>,
    pub role_distribution: Vec<RoleCount>,
}

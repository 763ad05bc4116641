// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile and role models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::document::AccessLevel;

/// User role as stored in the profiles table.
///
/// Role strings the server may add later deserialize to `Unknown` instead
/// of failing, so an older client keeps working against a newer backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "partner")]
    Partner,
    #[serde(rename = "internal-employee")]
    InternalEmployee,
    #[serde(rename = "admin")]
    Admin,
    #[default]
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl Role {
    /// Wire name for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Partner => "partner",
            Role::InternalEmployee => "internal-employee",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        }
    }

    /// Access clearance granted to this role by the server.
    ///
    /// Unknown roles get the lowest authenticated clearance, matching the
    /// server's fallback for unrecognized role strings.
    pub fn clearance(&self) -> u8 {
        match self {
            Role::Partner => 1,
            Role::InternalEmployee => 2,
            Role::Admin => 3,
            Role::Unknown => 1,
        }
    }

    /// Whether this role can read content at the given access level.
    pub fn can_access(&self, level: AccessLevel) -> bool {
        self.clearance() >= level.rank()
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Sign-up role derivation from an email address: recognized admin
    /// addresses get `Admin`, company-domain addresses get
    /// `InternalEmployee`, everyone else starts as `Partner`.
    pub fn for_email(email: &str, company_domain: &str, admin_emails: &[&str]) -> Role {
        let email = email.trim().to_ascii_lowercase();
        if admin_emails
            .iter()
            .any(|a| a.eq_ignore_ascii_case(email.as_str()))
        {
            Role::Admin
        } else if email.ends_with(&company_domain.to_ascii_lowercase()) {
            Role::InternalEmployee
        } else {
            Role::Partner
        }
    }
}

/// User profile row from the profiles table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Matches the auth user ID
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

/// Patch for the editable profile fields.
#[derive(Debug, Clone, Default, Validate, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

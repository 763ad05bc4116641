// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document, tag catalog, and bookmark models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content access levels, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Partner,
    Internal,
    Admin,
}

impl AccessLevel {
    /// Position in the server's access hierarchy.
    pub fn rank(&self) -> u8 {
        match self {
            AccessLevel::Public => 0,
            AccessLevel::Partner => 1,
            AccessLevel::Internal => 2,
            AccessLevel::Admin => 3,
        }
    }

    /// Wire name for query and form fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Public => "public",
            AccessLevel::Partner => "partner",
            AccessLevel::Internal => "internal",
            AccessLevel::Admin => "admin",
        }
    }
}

/// Document metadata from the documents API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
    /// Display date as formatted by the server
    #[serde(rename = "uploadDate", default)]
    pub upload_date: Option<String>,
    /// Human-readable size as formatted by the server
    #[serde(default)]
    pub size: Option<String>,
}

/// Patch for the editable document fields.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentPatch {
    pub tags: Vec<String>,
    pub access_level: AccessLevel,
}

/// Multipart upload of a new document.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    /// MIME type sent with the file part
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub tags: Vec<String>,
    pub access_level: AccessLevel,
}

/// Bookmark row from the provider's records API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub id: String,
    pub user_id: String,
    pub document_id: String,
    pub created_at: DateTime<Utc>,
}

/// Tag catalog body for the tags endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagCatalog {
    pub tags: Vec<String>,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FAQ models.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::document::AccessLevel;

/// FAQ entry as served by the FAQ API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub id: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
}

/// New or updated FAQ payload, validated before sending.
#[derive(Debug, Clone, Validate, Serialize, Deserialize)]
pub struct FaqDraft {
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,
    #[validate(length(min = 1, message = "answer is required"))]
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    pub access_level: AccessLevel,
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authenticated application API client.
//!
//! Every call goes through [`ApiClient::send_authorized`]: attach the current
//! bearer token, and on a 401 refresh the session exactly once and retry
//! exactly once. Typed endpoint helpers sit on top and turn non-2xx statuses
//! into [`ClientError::Api`].

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::multipart;
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::models::{
    Activity, BadgeCollection, Document, DocumentPatch, DocumentReport, DocumentUpload, Faq,
    FaqDraft, GamificationStats, OverviewReport, ReportQuery, TagCatalog, UserActivityReport,
};
use crate::services::session::SessionStore;
use validator::Validate;

/// Application API client with session-aware request authorization.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    sessions: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: String, sessions: Arc<SessionStore>) -> Self {
        Self {
            http,
            base_url,
            sessions,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Authorized send with refresh-once retry ─────────────────────────────

    /// Send a request with the current access token.
    ///
    /// The builder closure is invoked once per attempt so single-use bodies
    /// (multipart) are rebuilt for the retry. Whatever the closure set, the
    /// `Authorization` header is overwritten with exactly one
    /// `Bearer {token}` value.
    ///
    /// On a 401 the session is refreshed once and the request retried once;
    /// the retry's response is returned whatever its status. A failed
    /// refresh surfaces as `SessionExpired` without retrying. Every other
    /// status is returned as-is; interpreting it is the caller's concern.
    pub async fn send_authorized<F>(&self, build: F) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.sessions.access_token().ok_or(ClientError::NoSession)?;

        let response = self.send_with_token(&build, &token).await?;
        if response.status().as_u16() != 401 {
            return Ok(response);
        }

        tracing::debug!("API request returned 401, refreshing session");
        let refreshed = self.sessions.refresh_after_rejection(&token).await?;
        self.send_with_token(&build, &refreshed).await
    }

    async fn send_with_token<F>(&self, build: &F, token: &str) -> Result<reqwest::Response>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let mut request = build(&self.http)
            .build()
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Request build failed: {}", e)))?;

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| ClientError::Internal(anyhow::anyhow!("Invalid bearer token: {}", e)))?;
        value.set_sensitive(true);
        // insert() replaces any caller-supplied Authorization header
        request.headers_mut().insert(AUTHORIZATION, value);

        self.http
            .execute(request)
            .await
            .map_err(ClientError::from_transport)
    }

    /// Send and parse a JSON body, mapping non-2xx to `ClientError::Api`.
    async fn read_json<T, F>(&self, build: F) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let response = self.send_authorized(build).await?;
        let response = check_api_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("API response: {}", e)))
    }

    /// Send and discard the body, mapping non-2xx to `ClientError::Api`.
    async fn expect_success<F>(&self, build: F) -> Result<()>
    where
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let response = self.send_authorized(build).await?;
        check_api_status(response).await?;
        Ok(())
    }

    // ─── Documents ───────────────────────────────────────────────────────────

    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        let url = self.endpoint("/api/documents");
        self.read_json(|http| http.get(&url)).await
    }

    /// Fetch document metadata for a set of IDs in one call.
    pub async fn documents_by_ids(&self, document_ids: &[String]) -> Result<Vec<Document>> {
        let url = self.endpoint("/api/documents/batch");
        let body = serde_json::json!({ "document_ids": document_ids });
        self.read_json(|http| http.post(&url).json(&body)).await
    }

    /// Direct download URL for a document.
    pub fn download_url(&self, document_id: &str) -> String {
        self.endpoint(&format!("/api/documents/{}/download", document_id))
    }

    /// Download a document's content.
    pub async fn download_document(&self, document_id: &str) -> Result<Vec<u8>> {
        let url = self.download_url(document_id);
        let response = self.send_authorized(|http| http.get(&url)).await?;
        let response = check_api_status(response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(ClientError::from_transport)?;
        Ok(bytes.to_vec())
    }

    /// Update a document's tags and access level.
    pub async fn update_document(&self, document_id: &str, patch: &DocumentPatch) -> Result<()> {
        let url = self.endpoint(&format!("/api/documents/{}", document_id));
        self.expect_success(|http| http.patch(&url).json(patch)).await
    }

    /// Upload a new document as multipart form data. Returns the server's
    /// ingest receipt, whose shape varies by pipeline version.
    pub async fn upload_document(&self, upload: &DocumentUpload) -> Result<serde_json::Value> {
        let url = self.endpoint("/api/upload");
        let tags_json = serde_json::to_string(&upload.tags)
            .map_err(|e| ClientError::Decode(format!("Tag list: {}", e)))?;

        self.read_json(|http| {
            // The form is single-use, so it is rebuilt per attempt.
            let file = match multipart::Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.content_type)
            {
                Ok(part) => part,
                Err(_) => multipart::Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone()),
            };
            let form = multipart::Form::new()
                .part("file", file)
                .text("tags", tags_json.clone())
                .text("access_level", upload.access_level.as_str());
            http.post(&url).multipart(form)
        })
        .await
    }

    // ─── Tag catalog ─────────────────────────────────────────────────────────

    pub async fn tags(&self) -> Result<Vec<String>> {
        let url = self.endpoint("/api/tags");
        let catalog: TagCatalog = self.read_json(|http| http.get(&url)).await?;
        Ok(catalog.tags)
    }

    /// Replace the whole tag catalog.
    pub async fn replace_tags(&self, tags: &[String]) -> Result<()> {
        let url = self.endpoint("/api/tags");
        let body = TagCatalog {
            tags: tags.to_vec(),
        };
        self.expect_success(|http| http.put(&url).json(&body)).await
    }

    // ─── FAQs ────────────────────────────────────────────────────────────────

    pub async fn faqs(&self) -> Result<Vec<Faq>> {
        let url = self.endpoint("/api/faqs");
        self.read_json(|http| http.get(&url)).await
    }

    pub async fn create_faq(&self, draft: &FaqDraft) -> Result<()> {
        draft
            .validate()
            .map_err(|e| ClientError::Invalid(e.to_string()))?;
        let url = self.endpoint("/api/faqs");
        self.expect_success(|http| http.post(&url).json(draft)).await
    }

    pub async fn update_faq(&self, faq_id: &str, draft: &FaqDraft) -> Result<()> {
        draft
            .validate()
            .map_err(|e| ClientError::Invalid(e.to_string()))?;
        let url = self.endpoint(&format!("/api/faqs/{}", faq_id));
        self.expect_success(|http| http.put(&url).json(draft)).await
    }

    pub async fn delete_faq(&self, faq_id: &str) -> Result<()> {
        let url = self.endpoint(&format!("/api/faqs/{}", faq_id));
        self.expect_success(|http| http.delete(&url)).await
    }

    // ─── Chat ────────────────────────────────────────────────────────────────

    /// Send a chat message to the assistant and return its reply.
    pub async fn send_chat_message(&self, message: &str) -> Result<String> {
        let url = self.endpoint("/api/chat");
        let body = serde_json::json!({ "message": message });
        let reply: ChatReply = self.read_json(|http| http.post(&url).json(&body)).await?;
        Ok(reply.response)
    }

    // ─── Gamification ────────────────────────────────────────────────────────

    pub async fn gamification_stats(&self, user_id: &str) -> Result<GamificationStats> {
        let url = self.endpoint(&format!("/api/gamification/stats/{}", user_id));
        self.read_json(|http| http.get(&url)).await
    }

    pub async fn gamification_badges(&self, user_id: &str) -> Result<BadgeCollection> {
        let url = self.endpoint(&format!("/api/gamification/badges/{}", user_id));
        self.read_json(|http| http.get(&url)).await
    }

    /// Report a rewarded activity for a user.
    pub async fn track_activity(
        &self,
        user_id: &str,
        activity: Activity,
        metadata: Option<serde_json::Value>,
    ) -> Result<()> {
        let url = self.endpoint("/api/gamification/track");
        let body = serde_json::json!({
            "user_id": user_id,
            "activity_type": activity,
            "metadata": metadata.unwrap_or_else(|| serde_json::json!({})),
        });
        self.expect_success(|http| http.post(&url).json(&body)).await
    }

    // ─── Usage reports (admin) ───────────────────────────────────────────────

    pub async fn analytics_overview(&self, query: &ReportQuery) -> Result<OverviewReport> {
        let url = self.endpoint("/api/analytics/overview");
        self.read_json(|http| http.get(&url).query(&report_params(query)))
            .await
    }

    pub async fn document_report(&self, query: &ReportQuery) -> Result<DocumentReport> {
        let url = self.endpoint("/api/analytics/document-analytics");
        self.read_json(|http| http.get(&url).query(&report_params(query)))
            .await
    }

    pub async fn user_activity_report(&self, query: &ReportQuery) -> Result<UserActivityReport> {
        let url = self.endpoint("/api/analytics/user-activity");
        self.read_json(|http| http.get(&url).query(&report_params(query)))
            .await
    }
}

fn report_params(query: &ReportQuery) -> [(&'static str, String); 2] {
    [
        ("user_role", query.role_param().to_string()),
        ("time_range", query.time_range_days.to_string()),
    ]
}

/// Assistant reply body.
#[derive(Debug, Deserialize)]
struct ChatReply {
    response: String,
}

/// Check status, mapping non-2xx to `ClientError::Api` with the body's
/// `detail` field when one is present.
async fn check_api_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status,
        detail: api_error_detail(status, &body),
    })
}

fn api_error_detail(status: u16, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        detail: Option<serde_json::Value>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        match parsed.detail {
            Some(serde_json::Value::String(detail)) => return detail,
            Some(other) => return other.to_string(),
            None => {}
        }
    }

    if body.is_empty() {
        format!("HTTP {}", status)
    } else {
        body.to_string()
    }
}

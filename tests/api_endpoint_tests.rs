// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed endpoint tests: request shapes and response decoding for
//! documents, tags, FAQs, chat, and the admin reports.

use atlas_client::error::ClientError;
use atlas_client::models::{AccessLevel, DocumentPatch, FaqDraft, ReportQuery, Role};
use atlas_client::Client;
use mockito::{Matcher, Server};
use serde_json::json;

mod common;
use common::{session, test_client, StubProvider};

async fn signed_in_client(server: &Server) -> Client {
    let provider = StubProvider::new();
    provider.set_current(Some(session("u-1", "t-1")));
    let client = test_client(&server.url(), provider);
    client.sessions.restore_session().await;
    client
}

#[tokio::test]
async fn test_batch_document_fetch_posts_id_list() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("POST", "/api/documents/batch")
        .match_body(Matcher::Json(json!({ "document_ids": ["d-1", "d-2"] })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "d-1", "filename": "guide.pdf", "tags": ["hr"] },
                { "id": "d-2", "filename": "policy.pdf", "tags": [] }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let documents = client
        .api
        .documents_by_ids(&["d-1".to_string(), "d-2".to_string()])
        .await
        .expect("Batch fetch should succeed");

    assert_eq!(documents.len(), 2);
    assert_eq!(documents[1].filename, "policy.pdf");
    // Optional metadata the server omitted stays empty
    assert!(documents[0].access_level.is_none());
    m.assert_async().await;
}

#[tokio::test]
async fn test_download_returns_raw_bytes() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let payload = b"%PDF-1.7 fake document content";
    let m = server
        .mock("GET", "/api/documents/d-1/download")
        .with_status(200)
        .with_header("content-type", "application/pdf")
        .with_body(payload.to_vec())
        .create_async()
        .await;

    let bytes = client
        .api
        .download_document("d-1")
        .await
        .expect("Download should succeed");

    assert_eq!(bytes, payload);
    assert!(client.api.download_url("d-1").ends_with("/api/documents/d-1/download"));
    m.assert_async().await;
}

#[tokio::test]
async fn test_document_patch_sends_tags_and_access_level() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("PATCH", "/api/documents/d-1")
        .match_body(Matcher::Json(json!({
            "tags": ["hr", "onboarding"],
            "access_level": "partner"
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let patch = DocumentPatch {
        tags: vec!["hr".to_string(), "onboarding".to_string()],
        access_level: AccessLevel::Partner,
    };
    client
        .api
        .update_document("d-1", &patch)
        .await
        .expect("Patch should succeed");
    m.assert_async().await;
}

#[tokio::test]
async fn test_tag_catalog_round_trip() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let get = server
        .mock("GET", "/api/tags")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"tags": ["hr", "legal"]}"#)
        .create_async()
        .await;
    let put = server
        .mock("PUT", "/api/tags")
        .match_body(Matcher::Json(json!({ "tags": ["hr", "legal", "ops"] })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let tags = client.api.tags().await.expect("Tag fetch should succeed");
    assert_eq!(tags, vec!["hr".to_string(), "legal".to_string()]);

    client
        .api
        .replace_tags(&["hr".to_string(), "legal".to_string(), "ops".to_string()])
        .await
        .expect("Tag replace should succeed");

    get.assert_async().await;
    put.assert_async().await;
}

#[tokio::test]
async fn test_faq_create_validates_before_wire() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("POST", "/api/faqs")
        .expect(0)
        .create_async()
        .await;

    let draft = FaqDraft {
        question: "".to_string(),
        answer: "An answer".to_string(),
        category: None,
        access_level: AccessLevel::Internal,
    };
    let err = client
        .api
        .create_faq(&draft)
        .await
        .expect_err("An empty question should be rejected");

    assert!(matches!(err, ClientError::Invalid(_)));
    m.assert_async().await;
}

#[tokio::test]
async fn test_faq_crud_routes() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let create = server
        .mock("POST", "/api/faqs")
        .match_body(Matcher::Json(json!({
            "question": "How do I reset my password?",
            "answer": "Use the account page.",
            "category": "accounts",
            "access_level": "public"
        })))
        .with_status(201)
        .with_body("{}")
        .create_async()
        .await;
    let update = server
        .mock("PUT", "/api/faqs/f-1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/faqs/f-1")
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let draft = FaqDraft {
        question: "How do I reset my password?".to_string(),
        answer: "Use the account page.".to_string(),
        category: Some("accounts".to_string()),
        access_level: AccessLevel::Public,
    };
    client.api.create_faq(&draft).await.expect("Create should succeed");
    client
        .api
        .update_faq("f-1", &draft)
        .await
        .expect("Update should succeed");
    client.api.delete_faq("f-1").await.expect("Delete should succeed");

    create.assert_async().await;
    update.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_chat_reply_is_extracted() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::Json(json!({ "message": "Where is the handbook?" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "It is in the HR folder."}"#)
        .create_async()
        .await;

    let reply = client
        .api
        .send_chat_message("Where is the handbook?")
        .await
        .expect("Chat should succeed");

    assert_eq!(reply, "It is in the HR folder.");
    m.assert_async().await;
}

#[tokio::test]
async fn test_overview_report_query_and_decoding() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("GET", "/api/analytics/overview")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_role".into(), "all".into()),
            Matcher::UrlEncoded("time_range".into(), "30".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kpis": {
                    "total_questions": 120,
                    "documents_viewed": 340,
                    "total_users": 25,
                    "previous_total_questions": 90,
                    "previous_documents_viewed": 300,
                    "previous_total_users": 22
                },
                "daily_trends": [
                    { "label": "Aug 20", "searches": 14, "documentViews": 9, "activeUsers": 5 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let report = client
        .api
        .analytics_overview(&ReportQuery::default())
        .await
        .expect("Overview report should succeed");

    assert_eq!(report.kpis.total_questions, 120);
    assert_eq!(report.daily_trends.len(), 1);
    assert_eq!(report.daily_trends[0].document_views, 9);
    m.assert_async().await;
}

#[tokio::test]
async fn test_user_activity_report_carries_role_filter() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("GET", "/api/analytics/user-activity")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_role".into(), "internal-employee".into()),
            Matcher::UrlEncoded("time_range".into(), "7".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kpis": {
                    "daily_active_users": 6.5,
                    "average_badges_per_user": 2,
                    "user_retention_rate": 81.0,
                    "previous_daily_active_users": 5.0,
                    "previous_user_retention_rate": 75.5
                },
                "most_active_users": [
                    { "user_id": "u-1", "name": "Pat Doe", "role": "internal-employee", "total_exp": 900 }
                ],
                "role_distribution": [
                    { "role": "internal-employee", "count": 12 },
                    { "role": "partner", "count": 8 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let query = ReportQuery {
        user_role: Some(Role::InternalEmployee),
        time_range_days: 7,
    };
    let report = client
        .api
        .user_activity_report(&query)
        .await
        .expect("User activity report should succeed");

    assert_eq!(report.kpis.average_badges_per_user, 2);
    assert_eq!(report.most_active_users[0].role, Role::InternalEmployee);
    assert_eq!(report.role_distribution.len(), 2);
    m.assert_async().await;
}

#[tokio::test]
async fn test_document_report_route_and_shape() {
    let mut server = Server::new_async().await;
    let client = signed_in_client(&server).await;

    let m = server
        .mock("GET", "/api/analytics/document-analytics")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("user_role".into(), "all".into()),
            Matcher::UrlEncoded("time_range".into(), "30".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "kpis": {
                    "total_documents": 48,
                    "storage_used_mb": 512.5,
                    "storage_limit_mb": 2048.0,
                    "previous_total_documents": 40
                },
                "most_viewed_documents": [
                    { "filename": "handbook.pdf", "total_views": 120 }
                ],
                "category_distribution": [
                    { "category": "hr", "count": 20 }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let report = client
        .api
        .document_report(&ReportQuery::default())
        .await
        .expect("Document report should succeed");

    assert_eq!(report.kpis.total_documents, 48);
    assert_eq!(report.most_viewed_documents[0].total_views, 120);
    m.assert_async().await;
}

//! Integration tests for the backend REST client
//!
//! A wiremock server stands in for the pipeline backend. Every test mounts
//! only the endpoints it exercises, so an unexpected request fails with 404.

use scriptorium_common::client::{DraftQuery, TaskQuery, UploadFile};
use scriptorium_common::model::{AlignTaskCreate, ExtractTaskCreate, TaskKind, TaskStatus};
use scriptorium_common::{ApiClient, Error};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Test Helpers
// ============================================================================

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::new(&format!("{}/api", server.uri()), Duration::from_secs(5)).unwrap();
    (server, client)
}

fn project_json(id: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "full_name": format!("{} Bible", name),
        "iso_code": "abc",
        "lang": "Abc",
        "path": format!("/projects/{}", id),
        "created_at": "2024-05-01T10:00:00",
        "scripture_filename": format!("abc-{}", id),
        "extract_task_id": null
    })
}

fn task_json(id: &str, kind: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "kind": kind,
        "status": status,
        "created_at": "2024-05-01T10:00:00",
        "started_at": null,
        "ended_at": null,
        "result": null,
        "error": null,
        "parameters": {"project_id": "P1"}
    })
}

// ============================================================================
// Projects
// ============================================================================

#[tokio::test]
async fn test_list_projects_sends_paging() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "1000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([project_json("P1", "Alpha"), project_json("P2", "Beta")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let projects = client.list_projects(0, 1000).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert_eq!(projects[1].name, "Beta");
    assert_eq!(projects[0].scripture_filename, "abc-P1");
}

#[tokio::test]
async fn test_projects_by_scripture_encodes_query() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/"))
        .and(query_param("scripture_filename", "en-NIV84 & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([project_json("P9", "Nine")])))
        .expect(1)
        .mount(&server)
        .await;

    let found = client.projects_by_scripture("en-NIV84 & co").await.unwrap();
    assert_eq!(found[0].id, "P9");
}

#[tokio::test]
async fn test_get_project_not_found_is_status_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/MISSING"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Project not found"})))
        .mount(&server)
        .await;

    let err = client.get_project("MISSING").await.unwrap_err();
    assert!(err.is_not_found());
    match err {
        Error::Status { status, detail, url } => {
            assert_eq!(status, 404);
            assert_eq!(detail.as_deref(), Some("Project not found"));
            assert!(url.ends_with("/api/projects/MISSING"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_project_uploads_multipart_files() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/projects/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(project_json("NEW", "Fresh")))
        .expect(1)
        .mount(&server)
        .await;

    let files = vec![
        UploadFile {
            relative_path: "NEW/Settings.xml".to_string(),
            bytes: b"<ScriptureText/>".to_vec(),
        },
        UploadFile {
            relative_path: "NEW/41MATNEW.SFM".to_string(),
            bytes: b"\\id MAT".to_vec(),
        },
    ];
    let created = client.create_project(files).await.unwrap();
    assert_eq!(created.name, "Fresh");

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert_eq!(body.matches(r#"name="files""#).count(), 2);
    assert!(body.contains("Settings.xml"));
    assert!(body.contains("41MATNEW.SFM"));
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn test_create_project_without_files_is_rejected_locally() {
    let (_server, client) = setup().await;
    let err = client.create_project(Vec::new()).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_delete_project_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/projects/P1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_project("P1").await.unwrap();
}

#[tokio::test]
async fn test_download_project_drafts_returns_bytes_and_type() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/projects/P1/download_drafts"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/zip")
                .set_body_bytes(vec![0x50, 0x4b, 0x03, 0x04]),
        )
        .mount(&server)
        .await;

    let download = client.download_project_drafts("P1").await.unwrap();
    assert_eq!(download.content_type, "application/zip");
    assert_eq!(download.bytes, vec![0x50, 0x4b, 0x03, 0x04]);
}

#[tokio::test]
async fn test_download_drafts_by_experiment() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/drafts/download_drafts"))
        .and(query_param("experiment_name", "exp-1"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK".to_vec()))
        .mount(&server)
        .await;

    let download = client
        .download_drafts(&DraftQuery {
            project_id: None,
            experiment_name: Some("exp-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(download.bytes, b"PK".to_vec());
}

// ============================================================================
// Tasks
// ============================================================================

#[tokio::test]
async fn test_list_tasks_with_project_filter() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .and(query_param("project_id", "P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("T1", "extract", "completed"),
            task_json("T2", "train", "exploded")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let tasks = client.list_tasks(&TaskQuery::for_project("P1")).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].kind, TaskKind::Extract);
    assert_eq!(tasks[1].status, TaskStatus::Unknown);
}

#[tokio::test]
async fn test_create_align_task_posts_json() {
    let (server, client) = setup().await;

    let body = AlignTaskCreate {
        project_id: "P1".to_string(),
        target_scripture_file: "abc-P1".to_string(),
        source_scripture_files: vec!["en-NIV84".to_string()],
    };

    Mock::given(method("POST"))
        .and(path("/api/tasks/align_task"))
        .and(body_json(json!({
            "project_id": "P1",
            "target_scripture_file": "abc-P1",
            "source_scripture_files": ["en-NIV84"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json("A1", "align", "queued")))
        .expect(1)
        .mount(&server)
        .await;

    let task = client.create_align_task(&body).await.unwrap();
    assert_eq!(task.id, "A1");
    assert_eq!(task.kind, TaskKind::Align);
}

#[tokio::test]
async fn test_validation_error_detail_is_surfaced() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/tasks/extract_task"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                {"loc": ["body", "project_id"], "msg": "field required", "type": "missing"}
            ]
        })))
        .mount(&server)
        .await;

    let err = client
        .create_extract_task(&ExtractTaskCreate {
            project_id: String::new(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(422));
    assert!(err.to_string().contains("body.project_id: field required"));
}

#[tokio::test]
async fn test_undecodable_body_is_decode_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/tasks/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client.get_task("T1").await.unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
}

// ============================================================================
// Scriptures, drafts, language codes
// ============================================================================

#[tokio::test]
async fn test_get_scripture_takes_first_match() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scriptures/"))
        .and(query_param("query", "abc-P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "abc-P1", "name": "P1", "lang_code": "abc",
             "stats": {"details": {"MAT": 100}, "summary": null}},
            {"id": "abc-P10", "name": "P10", "lang_code": "abc"}
        ])))
        .mount(&server)
        .await;

    let scripture = client.get_scripture("abc-P1").await.unwrap().unwrap();
    assert_eq!(scripture.id, "abc-P1");
    assert_eq!(scripture.stats.details["MAT"], 100.0);
}

#[tokio::test]
async fn test_get_scripture_none_when_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/scriptures/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    assert!(client.get_scripture("nothing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_drafts_by_experiment_and_project() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/drafts/"))
        .and(query_param("project_id", "P1"))
        .and(query_param("experiment_name", "exp-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"project_id": "P1", "source_scripture_name": "en-NIV84",
             "book_name": "MAT", "train_experiment_name": "exp-1", "has_pdf": true}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let drafts = client
        .list_drafts(&DraftQuery {
            project_id: Some("P1".to_string()),
            experiment_name: Some("exp-1".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
    assert!(drafts[0].has_pdf);
}

#[tokio::test]
async fn test_lang_codes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/lang_codes/"))
        .and(query_param("lang_code", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["eng_Latn"])))
        .mount(&server)
        .await;

    assert_eq!(client.lang_codes("en").await.unwrap(), vec!["eng_Latn"]);
}

#[tokio::test]
async fn test_unreachable_backend_is_http_error() {
    let client = ApiClient::new("http://127.0.0.1:1/api", Duration::from_secs(2)).unwrap();
    let err = client.list_projects(0, 1000).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

use std::time::Duration;

use matcher_engine::{
    ClientSettings, FailureKind, IngestRequest, MatchRequest, PaperRecord, ReqwestApi, ResearchApi,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestApi {
    ReqwestApi::new(&ClientSettings {
        base_url: server.uri(),
        ..ClientSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn match_posts_form_values_and_decodes_records() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/match"))
        .and(body_json(json!({
            "profile_text": "protein folding",
            "limit": 50,
            "min_score": 0.4
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "professor": "Grace Hopper",
                "university": "Example U",
                "email": null,
                "max_score": 0.7312,
                "papers": [
                    {"title": "Compilers", "url": "https://doi.org/x", "year": 1952, "score": 0.7312},
                    {"title": "COBOL", "url": null, "year": null, "score": 0.61}
                ]
            },
            {
                "professor": "Alan Turing",
                "university": "Other U",
                "max_score": 0.5,
                "papers": []
            }
        ])))
        .mount(&server)
        .await;

    let records = api_for(&server)
        .match_profile(&MatchRequest {
            profile_text: "protein folding".to_string(),
            limit: 50,
            min_score: 0.4,
        })
        .await
        .expect("match ok");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].professor, "Grace Hopper");
    assert_eq!(records[0].email, None);
    assert_eq!(
        records[0].papers[1],
        PaperRecord {
            title: "COBOL".to_string(),
            url: None,
            year: None,
            score: 0.61,
        }
    );
    assert_eq!(records[1].email, None);
    assert!(records[1].papers.is_empty());
}

#[tokio::test]
async fn ingest_returns_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(body_json(json!({
            "university": "Example U",
            "dept_url": "https://example.edu/people"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-1", "status": "Queued"})),
        )
        .mount(&server)
        .await;

    let accepted = api_for(&server)
        .trigger_ingest(&IngestRequest {
            university: "Example U".to_string(),
            dept_url: "https://example.edu/people".to_string(),
        })
        .await
        .expect("ingest ok");
    assert_eq!(accepted.task_id, "t-1");
}

#[tokio::test]
async fn ingest_with_blank_task_id_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": " "})))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .trigger_ingest(&IngestRequest {
            university: "U".to_string(),
            dept_url: "https://u.example".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingTaskId);
}

#[tokio::test]
async fn job_status_decodes_counts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "job-1",
            "university": "X",
            "status": "processing",
            "total_faculty": 10,
            "processed_faculty": 3,
            "progress": 0.3
        })))
        .mount(&server)
        .await;

    let status = api_for(&server).job_status("job-1").await.expect("status");
    assert_eq!(status.status, "processing");
    assert_eq!(status.processed_faculty, 3);
    assert_eq!(status.total_faculty, 10);
    assert_eq!(status.university, "X");
}

#[tokio::test]
async fn missing_job_maps_to_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Job not found"})))
        .mount(&server)
        .await;

    let err = api_for(&server).job_status("nope").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(404));
}

#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/job-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).job_status("job-1").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"status": "ok"})),
        )
        .mount(&server)
        .await;

    let api = ReqwestApi::new(&ClientSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    })
    .expect("client");

    let err = api.health().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    assert!(api_for(&server).health().await.expect("health").is_ok());
}

#[tokio::test]
async fn export_downloads_bytes_within_cap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export/professors.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04sheet".to_vec()))
        .mount(&server)
        .await;

    let bytes = api_for(&server).export_professors().await.expect("export");
    assert_eq!(bytes, b"PK\x03\x04sheet".to_vec());
}

#[tokio::test]
async fn export_rejects_oversized_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/export/professors.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 64]))
        .mount(&server)
        .await;

    let api = ReqwestApi::new(&ClientSettings {
        base_url: server.uri(),
        max_export_bytes: 16,
        ..ClientSettings::default()
    })
    .expect("client");

    let err = api.export_professors().await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 16,
            actual: Some(64)
        }
    );
}

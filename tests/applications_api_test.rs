use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::DefaultBodyLimit,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use job_portal_backend::services::application_service::MAX_RESUME_BYTES;
use job_portal_backend::storage::memory::MemoryStore;
use job_portal_backend::AppState;

const BOUNDARY: &str = "X-JOB-PORTAL-TEST";

fn setup_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone());

    let public_api = Router::new().route(
        "/api/auth/register",
        post(job_portal_backend::routes::auth::register),
    );

    let session_api = Router::new()
        .route(
            "/api/jobs",
            post(job_portal_backend::routes::jobs::create_job),
        )
        .route(
            "/api/jobs/:id/applications",
            post(job_portal_backend::routes::applications::submit_application),
        )
        .route(
            "/api/applications/received",
            get(job_portal_backend::routes::applications::received_applications),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            job_portal_backend::middleware::auth::require_session,
        ));

    let app = public_api
        .merge(session_api)
        .with_state(state)
        .layer(DefaultBodyLimit::max(8 * 1024 * 1024));
    (app, store)
}

fn multipart_body(fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Body {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((content_type, bytes)) = resume {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"resume\"; filename=\"resume.pdf\"\r\n",
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Body::from(body)
}

fn apply_request(job_id: Uuid, auth: &str, body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/jobs/{}/applications", job_id))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("authorization", auth)
        .body(body)
        .unwrap()
}

async fn register_user(app: &Router, full_name: &str, email: &str) -> String {
    let body = json!({
        "full_name": full_name,
        "email": email,
        "password": "secret123"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let created: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let token = created["session"]["access_token"].as_str().unwrap();
    format!("Bearer {}", token)
}

async fn create_job(app: &Router, auth: &str) -> Uuid {
    let body = json!({
        "title": "Backend Engineer",
        "company_name": "Acme Systems",
        "description": "Own the REST API",
        "employment_type": "full_time",
        "salary_range": "8-10 LPA"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .header("authorization", auth)
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let job: JsonValue = serde_json::from_slice(&bytes).unwrap();
    Uuid::parse_str(job["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn applications_flow_end_to_end() {
    let (app, store) = setup_app();

    let employer_auth = register_user(&app, "Olive Owner", "owner@example.com").await;
    let job_id = create_job(&app, &employer_auth).await;

    let applicant_auth = register_user(&app, "Avery Applicant", "avery@example.com").await;

    let fields = [
        ("name", "Avery Applicant"),
        ("email", "avery@example.com"),
        ("phone", "+996 555 123456"),
        ("cover_letter", "I build APIs."),
    ];
    let pdf: &[u8] = b"%PDF-1.4 test resume";

    let req = apply_request(
        job_id,
        &applicant_auth,
        multipart_body(&fields, Some(("application/pdf", pdf))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let application: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(application["status"], "pending");
    assert_eq!(application["job_id"].as_str().unwrap(), job_id.to_string());
    assert!(application["resume_url"]
        .as_str()
        .unwrap()
        .contains("resumes/"));
    assert_eq!(store.upload_count().await, 1);

    // Second submission to the same posting conflicts before anything is stored.
    let req = apply_request(
        job_id,
        &applicant_auth,
        multipart_body(&fields, Some(("application/pdf", pdf))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "already_applied");
    assert_eq!(store.upload_count().await, 1);

    let second_auth = register_user(&app, "Bao Builder", "bao@example.com").await;
    let second_fields = [
        ("name", "Bao Builder"),
        ("email", "bao@example.com"),
    ];

    let req = apply_request(
        job_id,
        &second_auth,
        multipart_body(&second_fields, Some(("application/msword", pdf))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "wrong_type");
    assert_eq!(body["field"], "resume");

    let req = apply_request(job_id, &second_auth, multipart_body(&second_fields, None));
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "missing");
    assert_eq!(body["field"], "resume");

    let req = apply_request(
        job_id,
        &second_auth,
        multipart_body(
            &[("email", "bao@example.com")],
            Some(("application/pdf", pdf)),
        ),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "required");
    assert_eq!(body["field"], "name");

    let oversized = vec![0u8; MAX_RESUME_BYTES + 1];
    let req = apply_request(
        job_id,
        &second_auth,
        multipart_body(&second_fields, Some(("application/pdf", &oversized))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "too_large");
    assert_eq!(store.upload_count().await, 1);

    let req = apply_request(
        Uuid::new_v4(),
        &second_auth,
        multipart_body(&second_fields, Some(("application/pdf", pdf))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/jobs/{}/applications", job_id))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(multipart_body(&second_fields, Some(("application/pdf", pdf))))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = apply_request(
        job_id,
        &second_auth,
        multipart_body(&second_fields, Some(("application/pdf", pdf))),
    );
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(store.upload_count().await, 2);

    let req = Request::builder()
        .method("GET")
        .uri("/api/applications/received")
        .header("authorization", employer_auth.clone())
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let received: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let items = received["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["applicant_name"], "Bao Builder");
    assert_eq!(items[1]["applicant_name"], "Avery Applicant");
    assert_eq!(items[1]["applicant_email"], "avery@example.com");
    assert_eq!(items[1]["applicant_phone"], "+996 555 123456");
    assert_eq!(items[1]["job_title"], "Backend Engineer");
    assert_eq!(items[1]["cover_letter"], "I build APIs.");
    assert!(items[1]["resume_url"].as_str().unwrap().contains("resumes/"));

    // The applicant owns no postings, so their received feed is empty.
    let req = Request::builder()
        .method("GET")
        .uri("/api/applications/received")
        .header("authorization", applicant_auth)
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let received: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(received["items"].as_array().unwrap().len(), 0);
}

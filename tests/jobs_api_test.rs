use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use job_portal_backend::storage::memory::MemoryStore;
use job_portal_backend::AppState;

fn setup_app() -> Router {
    let state = AppState::new(Arc::new(MemoryStore::new()));

    let public_api = Router::new()
        .route(
            "/api/auth/register",
            post(job_portal_backend::routes::auth::register),
        )
        .route(
            "/api/jobs",
            get(job_portal_backend::routes::jobs::list_jobs),
        )
        .route(
            "/api/jobs/:id",
            get(job_portal_backend::routes::jobs::get_job),
        );

    let session_api = Router::new()
        .route(
            "/api/jobs",
            post(job_portal_backend::routes::jobs::create_job),
        )
        .route(
            "/api/jobs/:id",
            put(job_portal_backend::routes::jobs::update_job),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            job_portal_backend::middleware::auth::require_session,
        ));

    public_api.merge(session_api).with_state(state)
}

async fn register_user(app: &Router, full_name: &str, email: &str) -> (String, Uuid) {
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
    let user_id = Uuid::parse_str(created["user_id"].as_str().unwrap()).unwrap();
    (format!("Bearer {}", token), user_id)
}

#[tokio::test]
async fn jobs_api_end_to_end() {
    let app = setup_app();

    let create_body = json!({
        "title": "Backend Engineer",
        "company_name": "Acme Systems",
        "location": "Bishkek",
        "description": "Own the REST API",
        "employment_type": "full_time",
        "salary_range": "8-10 LPA"
    });

    let req = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .body(Body::from(create_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "missing_authorization");

    let (owner_auth, owner_id) = register_user(&app, "Olive Owner", "owner@example.com").await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .header("authorization", owner_auth.clone())
        .body(Body::from(create_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let job: JsonValue = serde_json::from_slice(&bytes).unwrap();
    let job_id = Uuid::parse_str(job["id"].as_str().unwrap()).unwrap();
    assert_eq!(job["company_name"], "Acme Systems");
    assert_eq!(job["employment_type_label"], "Full-time");
    assert_eq!(job["posted_by"].as_str().unwrap(), owner_id.to_string());

    let req = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .header("authorization", owner_auth.clone())
        .body(Body::from(
            json!({"title": "   ", "description": "Something"}).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["field"], "title");

    let req = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header("content-type", "application/json")
        .header("authorization", owner_auth.clone())
        .body(Body::from(
            json!({
                "title": "QA Intern",
                "description": "Learn the test stack",
                "location": "Remote",
                "employment_type": "internship",
                "salary_range": "Stipend only"
            })
            .to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = Request::builder()
        .method("GET")
        .uri("/api/jobs")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["total_count"], 2);
    assert_eq!(listing["matched_count"], 2);
    assert_eq!(listing["items"][0]["title"], "QA Intern");

    let req = Request::builder()
        .method("GET")
        .uri("/api/jobs?search=backend&salary=5-10")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["matched_count"], 1);
    assert_eq!(listing["total_count"], 2);
    assert_eq!(listing["items"][0]["title"], "Backend Engineer");

    let req = Request::builder()
        .method("GET")
        .uri("/api/jobs?job_type=internship")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["matched_count"], 1);
    assert_eq!(listing["items"][0]["title"], "QA Intern");

    // Unknown filter tokens degrade to no filter instead of erroring.
    let req = Request::builder()
        .method("GET")
        .uri("/api/jobs?job_type=freelance&salary=weird")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let listing: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(listing["matched_count"], 2);

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/jobs/{}", job_id))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let fetched: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(fetched["title"], "Backend Engineer");

    let req = Request::builder()
        .method("GET")
        .uri(format!("/api/jobs/{}", Uuid::new_v4()))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let update_body = json!({
        "title": "Senior Backend Engineer",
        "company_name": "Acme Systems",
        "location": "Bishkek",
        "description": "Own the REST API and mentor",
        "employment_type": "full_time",
        "salary_range": "12-15 LPA"
    });
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/jobs/{}", job_id))
        .header("content-type", "application/json")
        .header("authorization", owner_auth.clone())
        .body(Body::from(update_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let updated: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(updated["title"], "Senior Backend Engineer");
    assert_eq!(updated["posted_by"].as_str().unwrap(), owner_id.to_string());

    let (intruder_auth, _) = register_user(&app, "Ivan Intruder", "intruder@example.com").await;
    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/jobs/{}", job_id))
        .header("content-type", "application/json")
        .header("authorization", intruder_auth)
        .body(Body::from(update_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "Only the posting owner can update it");

    let req = Request::builder()
        .method("PUT")
        .uri(format!("/api/jobs/{}", Uuid::new_v4()))
        .header("content-type", "application/json")
        .header("authorization", owner_auth)
        .body(Body::from(update_body.to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::matching::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/jobs/:job_id/matches",
            post(handlers::handle_run_matches),
        )
        .route("/api/v1/match", post(handlers::handle_compute_match))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::matching::orchestrator::{MatchOrchestrator, OrchestratorSettings};
    use crate::test_support::{application, sample_job, FakeBackend, FakeScorer};

    fn state_with(backend: FakeBackend, scorer: FakeScorer) -> AppState {
        let backend = Arc::new(backend);
        let scorer = Arc::new(scorer);
        let orchestrator = MatchOrchestrator::new(
            backend.clone(),
            backend.clone(),
            scorer.clone(),
            backend,
            OrchestratorSettings {
                workers: 2,
                call_timeout: Duration::from_secs(5),
            },
        );
        AppState {
            orchestrator: Arc::new(orchestrator),
            scorer,
        }
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(state_with(
            FakeBackend::new(sample_job(), vec![]),
            FakeScorer::new(),
        ));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_run_matches_returns_result_and_error_maps() {
        let backend = FakeBackend::new(
            sample_job(),
            vec![
                application(1, 101, true, Some(87)),
                application(2, 102, true, None),
                application(3, 103, true, None),
            ],
        )
        .with_text(102, "rust and kafka");
        let app = build_router(state_with(
            backend,
            FakeScorer::new().with_score("rust and kafka", 77),
        ));

        let response = app
            .oneshot(post_json("/api/v1/jobs/7/matches", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["job_id"], 7);
        assert_eq!(body["results"], json!({"1": 87, "2": 77, "3": 0}));
        assert!(body["errors"]["3"].as_str().unwrap().contains("extraction"));
        assert_eq!(body["summary"]["total"], 3);
    }

    #[tokio::test]
    async fn test_run_matches_retrieval_failure_is_bad_gateway() {
        let backend = FakeBackend::new(sample_job(), vec![]).with_failing_retrieval();
        let app = build_router(state_with(backend, FakeScorer::new()));

        let response = app
            .oneshot(post_json("/api/v1/jobs/7/matches", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "RETRIEVAL_FAILURE");
    }

    #[tokio::test]
    async fn test_run_matches_unknown_job_is_not_found() {
        let app = build_router(state_with(
            FakeBackend::new(sample_job(), vec![]),
            FakeScorer::new(),
        ));

        let response = app
            .oneshot(post_json("/api/v1/jobs/404/matches", json!({})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_compute_match_rejects_empty_resume_text() {
        let app = build_router(state_with(
            FakeBackend::new(sample_job(), vec![]),
            FakeScorer::new(),
        ));

        let response = app
            .oneshot(post_json(
                "/api/v1/match",
                json!({"job": {"id": 7, "title": "Backend Engineer"}, "resume_text": "   "}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compute_match_returns_outcome() {
        let app = build_router(state_with(
            FakeBackend::new(sample_job(), vec![]),
            FakeScorer::new().with_score("ten years of rust", 91),
        ));

        let response = app
            .oneshot(post_json(
                "/api/v1/match",
                json!({"job": {"id": 7, "title": "Backend Engineer"}, "resume_text": "ten years of rust"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["match_percentage"], 91);
        assert_eq!(body["error"], Value::Null);
    }
}

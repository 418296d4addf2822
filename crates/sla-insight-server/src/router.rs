use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let health_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::readiness_check));

    let data_routes = Router::new()
        .route("/reingest", post(handlers::ingest::reingest_handler))
        .route("/diagnostics", get(handlers::ingest::diagnostics_handler))
        .route("/stats/overview", get(handlers::stats::overview_handler));

    let model_routes = Router::new()
        .route("/train", post(handlers::model::train_handler))
        .route("/model/metrics", get(handlers::model::metrics_handler))
        .route("/predict", post(handlers::model::predict_handler));

    Router::new()
        .merge(health_routes)
        .merge(data_routes)
        .merge(model_routes)
        .with_state(state)
        // CORS
        .layer(CorsLayer::permissive())
        // Tracing
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::Connection;
    use std::path::Path;
    use tower::ServiceExt;

    use crate::config::{Settings, SlaPolicy};
    use crate::database::{repository, Customer, Database, Ticket};

    fn settings(dir: &Path) -> Settings {
        let mut settings = Settings::default();
        settings.model.model_path = dir.join("model.json");
        settings.model.encoders_path = dir.join("encoders.json");
        settings.model.metrics_path = dir.join("metrics.json");
        settings.model.n_estimators = 10;
        settings
    }

    async fn app(dir: &Path) -> (Router, Database) {
        let database = Database::from_path(&dir.join("router.db"));
        database.initialize_schema().await.unwrap();
        let state = AppState::new(settings(dir), database.clone(), SlaPolicy::default());
        (build_router(state), database)
    }

    async fn seed(database: &Database, tickets: usize) {
        let mut conn = database.open().await.unwrap();
        for c in 0..4 {
            repository::upsert_customer(
                &mut conn,
                &Customer {
                    customer_id: format!("C_{c}"),
                    region: if c % 2 == 0 { "EU" } else { "NA" }.to_string(),
                    plan: "pro".to_string(),
                    tenure_months: 6 * c,
                    employees: 20,
                },
            )
            .await
            .unwrap();
        }
        for i in 0..tickets {
            let priority = ["low", "medium", "high", "urgent"][i % 4];
            repository::upsert_ticket(
                &mut conn,
                &Ticket {
                    ticket_id: format!("T_{i}"),
                    customer_id: format!("C_{}", i % 4),
                    created_at: Some(format!("2025-01-{:02}T10:00:00", 1 + i % 28)),
                    category: if i % 3 == 0 { "Bug" } else { "Billing" }.to_string(),
                    channel: "email".to_string(),
                    priority: priority.to_string(),
                    first_response_time_hours: Some(2.0),
                    resolution_time_hours: Some((i % 10) as f64),
                    is_open: false,
                    breached_sla: priority == "high" || priority == "urgent",
                    summary: "Invoice mismatch".to_string(),
                },
            )
            .await
            .unwrap();
        }
        conn.close().await.unwrap();
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
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
    async fn test_health_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path()).await;

        let (status, body) = send(&app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = send(&app, get("/health/ready")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_overview_without_data_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path()).await;

        let (status, body) = send(&app, get("/stats/overview")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "No data found for the given filters");
    }

    #[tokio::test]
    async fn test_overview_with_filters() {
        let dir = tempfile::tempdir().unwrap();
        let (app, database) = app(dir.path()).await;
        seed(&database, 40).await;

        let (status, body) = send(&app, get("/stats/overview?category=Bug&start=")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["top_categories"][0][0], "Bug");
        assert_eq!(body["top_categories"][0][1], 14);

        let (status, _) = send(&app, get("/stats/overview?priority=critical")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_diagnostics_shape() {
        let dir = tempfile::tempdir().unwrap();
        let (app, database) = app(dir.path()).await;
        seed(&database, 8).await;

        let (status, body) = send(&app, get("/diagnostics")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["customer_count"], 4);
        assert_eq!(body["ticket_count"], 8);
        assert_eq!(body["dirty_count"], 0);
    }

    #[tokio::test]
    async fn test_model_routes_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _) = app(dir.path()).await;

        let (status, _) = send(&app, get("/model/metrics")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, post_json("/predict", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Model not available");
    }

    #[tokio::test]
    async fn test_train_then_metrics_and_predict() {
        let dir = tempfile::tempdir().unwrap();
        let (app, database) = app(dir.path()).await;
        seed(&database, 80).await;

        let (status, body) = send(&app, post_json("/train", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Model trained");
        for key in ["auc", "f1", "confusion_matrix"] {
            assert!(body["metrics"].get(key).is_some());
        }

        let (status, metrics) = send(&app, get("/model/metrics")).await;
        assert_eq!(status, StatusCode::OK);
        let trained = &body["metrics"];
        assert_eq!(metrics["confusion_matrix"], trained["confusion_matrix"]);
        let persisted_auc = metrics["auc"].as_f64().unwrap();
        let trained_auc = trained["auc"].as_f64().unwrap();
        assert!((persisted_auc - trained_auc).abs() < 1e-9);

        let request = serde_json::json!({"category": "Unheard", "priority": "urgent"});
        let (status, prediction) = send(&app, post_json("/predict", request)).await;
        assert_eq!(status, StatusCode::OK);
        let p = prediction["probability"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&p));
        assert_eq!(prediction["label"].as_u64().unwrap(), u64::from(p >= 0.5));
    }

    #[tokio::test]
    async fn test_reingest_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::from_path(&dir.path().join("router.db"));
        let mut settings = settings(dir.path());
        settings.generator.program = Some(dir.path().join("missing-generator"));
        let app = build_router(AppState::new(settings, database, SlaPolicy::default()));

        let (status, body) = send(&app, post_json("/reingest", serde_json::json!({}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("missing-generator"));
    }
}

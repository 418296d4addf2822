//! Generate → ingest → analyze → train → predict against a temporary database.

use std::sync::Arc;

use sla_insight_server::analytics::{AnalyticsService, OverviewFilters};
use sla_insight_server::config::{GeneratorConfig, ModelConfig, SlaPolicy};
use sla_insight_server::database::Database;
use sla_insight_server::generator;
use sla_insight_server::ingestion::{scan_diagnostics, IngestionService};
use sla_insight_server::prediction::{PredictionRequest, PredictionService};

#[tokio::test]
async fn test_full_pipeline_on_synthetic_data() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");

    let gen_config = GeneratorConfig {
        customers: 60,
        tickets: 1500,
        output_dir: data_dir.clone(),
        ..Default::default()
    };
    let summary = generator::generate_to_dir(&gen_config).unwrap();
    assert_eq!(summary.tickets, 1500);

    let policy = SlaPolicy::load_or_default(&data_dir.join("sla_policy.json")).unwrap();
    let policy = Arc::new(policy);
    let database = Database::from_path(&dir.path().join("tickets.db"));
    database.initialize_schema().await.unwrap();

    // Ingestion
    let ingestion = IngestionService::new(database.clone(), policy.clone(), 1000);
    let customers_csv = data_dir.join("customers.csv");
    let tickets_csv = data_dir.join("tickets.csv");
    let report = ingestion
        .ingest_files(&customers_csv, &tickets_csv)
        .await
        .unwrap();
    assert_eq!(report.customers_ingested, 60);
    assert_eq!(report.tickets_ingested, 1500);
    assert!(report.dirty_rows <= report.tickets_ingested);
    assert!(report.dirty_rows > 0);

    // Re-ingesting the same files replaces rather than accumulates.
    let again = ingestion
        .ingest_files(&customers_csv, &tickets_csv)
        .await
        .unwrap();
    assert_eq!(again, report);

    // "med" is repaired at ingestion, so stored data never carries it.
    let snapshot = scan_diagnostics(&database, &policy).await.unwrap();
    assert_eq!(snapshot.ticket_count, 1500);
    assert_eq!(snapshot.customer_count, 60);
    assert!(snapshot.issues.iter().all(|i| !i.contains("'med'")));
    assert!(snapshot.dirty_count <= report.dirty_rows);

    // Analytics
    let analytics = AnalyticsService::new(database.clone());
    let overview = analytics
        .compute_overview(&OverviewFilters::default())
        .await
        .unwrap()
        .unwrap();
    assert!(overview.top_categories.len() <= 5);
    assert!(overview.problem_customers.len() <= 5);
    assert!(overview
        .problem_customers
        .iter()
        .all(|c| c.total_tickets >= 5));
    assert!((0.0..=100.0).contains(&overview.sla_breach_rate));
    assert!(overview.median_resolution_time <= overview.p95_resolution_time);

    let january = OverviewFilters {
        start: Some("2025-01-01".to_string()),
        end: Some("2025-01-31T23:59:59".to_string()),
        ..Default::default()
    };
    let windowed = analytics
        .compute_overview(&january)
        .await
        .unwrap()
        .unwrap();
    assert!(windowed
        .daily_volume
        .keys()
        .all(|day| day.starts_with("2025-01")));

    let nothing = OverviewFilters {
        category: Some("Nonexistent".to_string()),
        ..Default::default()
    };
    let empty = analytics.compute_overview(&nothing).await.unwrap();
    assert!(empty.is_none());

    // Prediction
    let model_config = ModelConfig {
        model_path: dir.path().join("artifacts/model.json"),
        encoders_path: dir.path().join("artifacts/encoders.json"),
        metrics_path: dir.path().join("artifacts/metrics.json"),
        n_estimators: 30,
        ..Default::default()
    };
    let prediction = PredictionService::new(database.clone(), model_config);

    assert!(prediction.metrics().await.unwrap().is_none());
    assert!(prediction
        .predict(&PredictionRequest::default())
        .await
        .unwrap()
        .is_none());

    let metrics = prediction.train().await.unwrap();
    assert!((0.0..=1.0).contains(&metrics.auc));
    assert!((0.0..=1.0).contains(&metrics.f1));
    let persisted = prediction.metrics().await.unwrap().unwrap();
    assert_eq!(persisted.confusion_matrix, metrics.confusion_matrix);
    assert!((persisted.auc - metrics.auc).abs() < 1e-9);

    let request = PredictionRequest {
        category: Some("Security".to_string()),
        channel: Some("email".to_string()),
        priority: Some("low".to_string()),
        region: Some("LATAM".to_string()),
        plan: Some("free".to_string()),
        tenure_months: Some(2.0),
        employees: Some(15.0),
    };
    let result = prediction.predict(&request).await.unwrap().unwrap();
    assert!((0.0..=1.0).contains(&result.probability));
    assert_eq!(result.label, u8::from(result.probability >= 0.5));

    // Missing metrics file is regenerated by re-training.
    std::fs::remove_file(dir.path().join("artifacts/metrics.json")).unwrap();
    assert!(prediction.metrics().await.unwrap().is_some());
    assert!(dir.path().join("artifacts/metrics.json").exists());
}

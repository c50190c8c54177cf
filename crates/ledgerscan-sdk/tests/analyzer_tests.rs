//! Session-level tests for the Analyzer

use ledgerscan_llm::MockProvider;
use ledgerscan_repository::MemoryResultStore;
use ledgerscan_sdk::{
    AnalyzeOutcome, Analyzer, EngineConfig, LLMConfig, LLMProvider, PersistOutcome, SdkError,
    StageState, StoreConfig, ThresholdPolicy,
};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// 20 ordinary travel claims and two outliers at ids 20 and 21
fn travel_csv() -> String {
    let mut csv = String::from("Business Area,Period,Activity Code,Amount\n");
    for _ in 0..20 {
        csv.push_str("Ops,2024-01,TRAVEL,100\n");
    }
    csv.push_str("Ops,2024-01,TRAVEL,\"5,000\"\n");
    csv.push_str("Sales,2024-01,TRAVEL,\"4,000\"\n");
    csv
}

const SCORES: &str = r#"```json
[{"id": 21, "fraudScore": 0.91, "reason": "round amount"},
 {"id": 20, "fraudScore": 0.62, "reason": "large claim"}]
```"#;

fn analyzer_with(provider: Arc<MockProvider>, store: Arc<MemoryResultStore>) -> Analyzer {
    Analyzer::builder()
        .with_llm_client(provider)
        .with_store(store)
        .build()
}

#[tokio::test]
async fn test_full_session() {
    let provider = Arc::new(MockProvider::with_response(SCORES.to_string()));
    let store = Arc::new(MemoryResultStore::new());
    let analyzer = analyzer_with(provider.clone(), store.clone());

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    assert_eq!(analyzer.candidates().await.len(), 2);

    let outcome = analyzer.analyze().await.unwrap();
    let AnalyzeOutcome::Scored { results } = outcome else {
        panic!("expected scored outcome");
    };
    let ids: Vec<usize> = results.iter().map(|r| r.id()).collect();
    assert_eq!(ids, vec![21, 20]);
    assert_eq!(provider.call_count(), 1);

    let persisted = analyzer.persist().await.unwrap();
    assert_eq!(persisted, PersistOutcome::Saved { count: 2 });

    let batches = store.batches().await;
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0][0].business_area, "Sales");
    assert!(batches[0].iter().all(|row| row.is_flagged));

    let snapshot = analyzer.snapshot().await;
    assert_eq!(snapshot.analyze, StageState::Succeeded);
    assert_eq!(snapshot.persist, StageState::Succeeded);
    assert_eq!(snapshot.scored, 2);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_no_candidates_skips_scorer() {
    let provider = Arc::new(MockProvider::with_response(SCORES.to_string()));
    let analyzer = analyzer_with(provider.clone(), Arc::new(MemoryResultStore::new()));

    let csv = "businessArea,period,activityCode,amount\nA,P,X,10\nA,P,X,12\nB,P,Y,7\n";
    analyzer.load_csv(csv.as_bytes()).await.unwrap();

    let outcome = analyzer.analyze().await.unwrap();
    assert_eq!(outcome, AnalyzeOutcome::NothingSuspicious);
    assert_eq!(provider.call_count(), 0);

    let persisted = analyzer.persist().await.unwrap();
    assert_eq!(persisted, PersistOutcome::NothingToPersist);
}

#[tokio::test]
async fn test_empty_scorer_answer_is_nothing_suspicious() {
    let provider = Arc::new(MockProvider::with_response("[]".to_string()));
    let analyzer = analyzer_with(provider.clone(), Arc::new(MemoryResultStore::new()));

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    let outcome = analyzer.analyze().await.unwrap();

    assert_eq!(outcome, AnalyzeOutcome::NothingSuspicious);
    assert_eq!(provider.call_count(), 1);
    assert_eq!(analyzer.snapshot().await.analyze, StageState::Succeeded);
}

#[tokio::test]
async fn test_scorer_failure_sets_error_slot() {
    let provider = Arc::new(MockProvider::failing("401 invalid key"));
    let analyzer = analyzer_with(provider, Arc::new(MemoryResultStore::new()));

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    let err = analyzer.analyze().await.unwrap_err();

    assert!(matches!(err, SdkError::Scorer { .. }));
    let snapshot = analyzer.snapshot().await;
    assert_eq!(snapshot.analyze, StageState::Failed);
    assert!(snapshot.error.unwrap().contains("401 invalid key"));
    assert!(analyzer.results().await.is_empty());
}

#[tokio::test]
async fn test_missing_scorer_is_not_configured() {
    let analyzer = Analyzer::builder().build();
    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();

    let err = analyzer.analyze().await.unwrap_err();
    assert!(matches!(err, SdkError::NotConfigured(_)));

    let err = analyzer.persist().await.unwrap_err();
    assert!(matches!(err, SdkError::NotConfigured(_)));
}

#[tokio::test]
async fn test_no_candidates_without_scorer_is_nothing_suspicious() {
    let analyzer = Analyzer::builder().build();

    let csv = "businessArea,period,activityCode,amount\nA,P,X,10\nA,P,X,12\n";
    analyzer.load_csv(csv.as_bytes()).await.unwrap();

    let outcome = analyzer.analyze().await.unwrap();
    assert_eq!(outcome, AnalyzeOutcome::NothingSuspicious);

    let snapshot = analyzer.snapshot().await;
    assert!(!snapshot.scorer_ready);
    assert_eq!(snapshot.analyze, StageState::Succeeded);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn test_default_store_config_persist_is_not_configured() {
    let provider = Arc::new(MockProvider::with_response(SCORES.to_string()));
    let config = EngineConfig::new()
        .with_llm(LLMConfig::new(LLMProvider::Mock))
        .with_store(StoreConfig::default());
    let analyzer = Analyzer::builder()
        .with_config(config)
        .with_llm_client(provider)
        .build();
    assert!(!analyzer.snapshot().await.store_ready);

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    assert!(matches!(
        analyzer.analyze().await.unwrap(),
        AnalyzeOutcome::Scored { .. }
    ));

    let err = analyzer.persist().await.unwrap_err();
    assert!(
        matches!(&err, SdkError::NotConfigured(message) if message.contains("SUPABASE_URL")),
        "unexpected error: {err:?}"
    );
    assert_eq!(analyzer.snapshot().await.persist, StageState::Idle);
}

#[tokio::test]
async fn test_store_key_without_url_is_not_configured() {
    let analyzer = Analyzer::builder()
        .with_llm_client(Arc::new(MockProvider::with_response(SCORES.to_string())))
        .with_store_config(StoreConfig::default().with_api_key("service-key"))
        .build();

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    analyzer.analyze().await.unwrap();

    let err = analyzer.persist().await.unwrap_err();
    assert!(matches!(err, SdkError::NotConfigured(_)));
    assert!(err.to_string().contains("SUPABASE_URL"));
}

#[tokio::test]
async fn test_concurrent_analyze_is_busy() {
    let provider = Arc::new(
        MockProvider::with_response(SCORES.to_string()).with_delay(Duration::from_millis(300)),
    );
    let analyzer = analyzer_with(provider.clone(), Arc::new(MemoryResultStore::new()));
    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();

    let first = tokio::spawn({
        let analyzer = analyzer.clone();
        async move { analyzer.analyze().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(analyzer.snapshot().await.analyze, StageState::Running);

    let err = analyzer.analyze().await.unwrap_err();
    assert!(matches!(err, SdkError::Busy("analyze")));

    let outcome = first.await.unwrap().unwrap();
    assert!(matches!(outcome, AnalyzeOutcome::Scored { .. }));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_reupload_supersedes_inflight_analysis() {
    let provider = Arc::new(
        MockProvider::with_response(SCORES.to_string()).with_delay(Duration::from_millis(300)),
    );
    let analyzer = analyzer_with(provider, Arc::new(MemoryResultStore::new()));
    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();

    let inflight = tokio::spawn({
        let analyzer = analyzer.clone();
        async move { analyzer.analyze().await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let snapshot = analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.analyze, StageState::Idle);

    let outcome = inflight.await.unwrap().unwrap();
    assert_eq!(outcome, AnalyzeOutcome::Superseded);

    // the late scores were not applied to the new dataset
    assert!(analyzer.results().await.is_empty());
    assert_eq!(analyzer.snapshot().await.analyze, StageState::Idle);
}

#[tokio::test]
async fn test_header_only_upload_is_no_data_and_clears_dataset() {
    let provider = Arc::new(MockProvider::with_response(SCORES.to_string()));
    let analyzer = analyzer_with(provider, Arc::new(MemoryResultStore::new()));

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    analyzer.analyze().await.unwrap();
    assert_eq!(analyzer.results().await.len(), 2);

    let err = analyzer
        .load_csv(b"businessArea,period,activityCode,amount\n")
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::NoData(_)));

    let snapshot = analyzer.snapshot().await;
    assert!(snapshot.summary.is_none());
    assert!(snapshot.error.is_some());
    assert!(analyzer.results().await.is_empty());
    assert!(analyzer.records(false).await.is_empty());
}

#[tokio::test]
async fn test_persist_failure_is_reported() {
    let provider = Arc::new(MockProvider::with_response(SCORES.to_string()));
    let analyzer = analyzer_with(provider, Arc::new(MemoryResultStore::failing("503 unavailable")));

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    analyzer.analyze().await.unwrap();

    let err = analyzer.persist().await.unwrap_err();
    match err {
        SdkError::Persistence { store, message } => {
            assert_eq!(store, "memory");
            assert!(message.contains("503 unavailable"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(analyzer.snapshot().await.persist, StageState::Failed);
}

#[tokio::test]
async fn test_load_csv_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(travel_csv().as_bytes()).unwrap();

    let analyzer = Analyzer::builder().build();
    let snapshot = analyzer.load_csv_file(file.path()).await.unwrap();
    let summary = snapshot.summary.unwrap();
    assert_eq!(summary.processed, 22);
    assert_eq!(summary.candidate_count, 2);

    let err = analyzer
        .load_csv_file(file.path().with_extension("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Input(_)));
}

#[tokio::test]
async fn test_custom_thresholds_and_limit() {
    let provider = Arc::new(MockProvider::new());
    let analyzer = Analyzer::builder()
        .with_llm_client(provider)
        .with_thresholds(ThresholdPolicy {
            deviation_threshold: 100.0,
            ..ThresholdPolicy::default()
        })
        .build();

    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    assert!(analyzer.records(true).await.is_empty());

    let analyzer = Analyzer::builder()
        .with_policy(|deviation: f64, _frequency: u64| deviation > 1.0)
        .with_candidate_limit(1)
        .build();
    analyzer.load_csv(travel_csv().as_bytes()).await.unwrap();
    assert_eq!(analyzer.records(true).await.len(), 2);
    let candidates = analyzer.candidates().await;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].id, 20);
}

//! Analysis session
//!
//! An [`Analyzer`] owns at most one uploaded dataset at a time and drives it
//! through the user-triggered stages: upload, analyze (external scorer),
//! results, persist.
//!
//! Every upload bumps a generation counter. The scorer and store calls run
//! without holding the session lock; when they complete, their result is
//! applied only if the generation is unchanged, otherwise it is dropped and
//! the caller gets a `Superseded` outcome.

use chrono::{DateTime, Utc};
use ledgerscan_core::{
    merge_results, parse_csv, select_candidates, FeatureEngine, FeatureSet, FinalRecord,
    ProcessedRecord, ScoreResult,
};
use ledgerscan_llm::FraudScorer;
use ledgerscan_repository::ResultStore;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::builder::AnalyzerBuilder;
use crate::error::{Result, SdkError};
use crate::stage::{StageState, StageTracker};
use crate::summary::AnalysisSummary;

/// Outcome of [`Analyzer::analyze`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AnalyzeOutcome {
    /// No candidates were found, or the scorer confirmed none
    NothingSuspicious,
    /// The scorer confirmed risks; merged records ordered by fraud score
    Scored { results: Vec<FinalRecord> },
    /// A new upload replaced the dataset while the scorer was running
    Superseded,
}

/// Outcome of [`Analyzer::persist`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PersistOutcome {
    NothingToPersist,
    Saved { count: usize },
    /// A new upload replaced the dataset while the store call was running
    Superseded,
}

/// Point-in-time view of the session
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub upload_id: Option<Uuid>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub generation: u64,
    pub analyze: StageState,
    pub persist: StageState,
    /// Most recent failure, cleared when a stage is retried
    pub error: Option<String>,
    /// Number of records with a fraud score
    pub scored: usize,
    pub scorer_ready: bool,
    pub store_ready: bool,
    pub summary: Option<AnalysisSummary>,
}

/// A scorer or store, or the reason it is unavailable
pub(crate) enum Collaborator<T> {
    Ready(T),
    Unavailable(String),
}

impl<T: Clone> Collaborator<T> {
    fn get(&self) -> Result<T> {
        match self {
            Collaborator::Ready(value) => Ok(value.clone()),
            Collaborator::Unavailable(reason) => Err(SdkError::NotConfigured(reason.clone())),
        }
    }

    fn is_ready(&self) -> bool {
        matches!(self, Collaborator::Ready(_))
    }
}

struct Dataset {
    upload_id: Uuid,
    uploaded_at: DateTime<Utc>,
    features: Arc<FeatureSet>,
    summary: AnalysisSummary,
}

impl Dataset {
    fn new(features: FeatureSet) -> Self {
        Self {
            upload_id: Uuid::new_v4(),
            uploaded_at: Utc::now(),
            summary: AnalysisSummary::from_features(&features),
            features: Arc::new(features),
        }
    }
}

#[derive(Default)]
struct Session {
    generation: u64,
    dataset: Option<Dataset>,
    scores: Vec<ScoreResult>,
    analyze: StageTracker,
    persist: StageTracker,
    last_error: Option<String>,
}

impl Session {
    /// Swap the dataset, superseding anything in flight
    fn replace_dataset(&mut self, dataset: Option<Dataset>) -> u64 {
        self.generation += 1;
        self.dataset = dataset;
        self.scores.clear();
        self.analyze.reset(self.generation);
        self.persist.reset(self.generation);
        self.last_error = None;
        self.generation
    }

    fn features(&self) -> Option<Arc<FeatureSet>> {
        self.dataset.as_ref().map(|d| Arc::clone(&d.features))
    }

    fn final_records(&self) -> Vec<FinalRecord> {
        match &self.dataset {
            Some(dataset) => merge_results(&dataset.features.records, &self.scores),
            None => Vec::new(),
        }
    }

    fn fail(&mut self, err: SdkError) -> SdkError {
        self.last_error = Some(err.to_string());
        err
    }
}

pub(crate) struct AnalyzerInner {
    pub(crate) engine: FeatureEngine,
    pub(crate) candidate_limit: usize,
    pub(crate) scorer: Collaborator<Arc<FraudScorer>>,
    pub(crate) store: Collaborator<Arc<dyn ResultStore>>,
    session: RwLock<Session>,
}

impl AnalyzerInner {
    pub(crate) fn new(
        engine: FeatureEngine,
        candidate_limit: usize,
        scorer: Collaborator<Arc<FraudScorer>>,
        store: Collaborator<Arc<dyn ResultStore>>,
    ) -> Self {
        Self {
            engine,
            candidate_limit,
            scorer,
            store,
            session: RwLock::new(Session::default()),
        }
    }

    fn compute(&self, bytes: &[u8]) -> Result<FeatureSet> {
        let raw = parse_csv(bytes)?;
        let features = self.engine.process(&raw)?;
        if features.is_empty() {
            return Err(SdkError::NoData(format!(
                "no valid records among {} data rows",
                features.total_rows
            )));
        }
        Ok(features)
    }

    async fn install(&self, computed: Result<FeatureSet>) -> Result<SessionSnapshot> {
        let mut session = self.session.write().await;
        match computed {
            Ok(features) => {
                let dataset = Dataset::new(features);
                let upload_id = dataset.upload_id;
                let records = dataset.summary.processed;
                let candidates = dataset.summary.candidate_count;
                let generation = session.replace_dataset(Some(dataset));
                info!(%upload_id, generation, records, candidates, "Dataset loaded");
                Ok(self.snapshot_of(&session))
            }
            Err(err) => {
                let generation = session.replace_dataset(None);
                warn!(generation, error = %err, "Upload rejected");
                Err(session.fail(err))
            }
        }
    }

    async fn run_analyze(&self) -> Result<AnalyzeOutcome> {
        let (generation, candidates, scorer) = {
            let mut session = self.session.write().await;

            let Some(features) = session.features() else {
                return Err(session.fail(SdkError::NoData("upload a CSV file first".to_string())));
            };
            if session.analyze.is_running() {
                return Err(SdkError::Busy("analyze"));
            }

            // No candidates means no scorer call, configured or not.
            let candidates = select_candidates(&features.records, self.candidate_limit);
            let generation = session.generation;
            if candidates.is_empty() {
                session.last_error = None;
                session.scores.clear();
                session.analyze.complete_immediately(generation);
                info!(generation, "No candidates, scorer not called");
                return Ok(AnalyzeOutcome::NothingSuspicious);
            }

            let scorer = match self.scorer.get() {
                Ok(scorer) => scorer,
                Err(err) => return Err(session.fail(err)),
            };
            session.last_error = None;
            session.scores.clear();

            if !session.analyze.try_start(generation) {
                return Err(SdkError::Busy("analyze"));
            }
            (generation, candidates, scorer)
        };

        debug!(generation, candidates = candidates.len(), "Scoring candidates");
        let scored = scorer.score(&candidates).await;

        let mut session = self.session.write().await;
        if session.generation != generation {
            info!(generation, current = session.generation, "Discarding superseded scores");
            return Ok(AnalyzeOutcome::Superseded);
        }

        match scored {
            Ok(results) => {
                session.analyze.finish(generation, true);
                session.scores = results;
                let finals = session.final_records();
                info!(generation, flagged = finals.len(), "Analysis finished");
                if finals.is_empty() {
                    Ok(AnalyzeOutcome::NothingSuspicious)
                } else {
                    Ok(AnalyzeOutcome::Scored { results: finals })
                }
            }
            Err(err) => {
                session.analyze.finish(generation, false);
                let err = SdkError::from_scorer(scorer.provider(), err);
                warn!(generation, error = %err, "Analysis failed");
                Err(session.fail(err))
            }
        }
    }

    async fn run_persist(&self) -> Result<PersistOutcome> {
        let (generation, finals, store) = {
            let mut session = self.session.write().await;

            if session.persist.is_running() {
                return Err(SdkError::Busy("persist"));
            }
            let store = match self.store.get() {
                Ok(store) => store,
                Err(err) => return Err(session.fail(err)),
            };

            let finals = session.final_records();
            if finals.is_empty() {
                return Ok(PersistOutcome::NothingToPersist);
            }

            let generation = session.generation;
            if !session.persist.try_start(generation) {
                return Err(SdkError::Busy("persist"));
            }
            session.last_error = None;
            (generation, finals, store)
        };

        debug!(generation, records = finals.len(), store = store.name(), "Persisting results");
        let saved = store.save_flagged(&finals).await;

        let mut session = self.session.write().await;
        if session.generation != generation {
            info!(generation, current = session.generation, "Ignoring superseded persist completion");
            return Ok(PersistOutcome::Superseded);
        }

        match saved {
            Ok(count) => {
                session.persist.finish(generation, true);
                info!(generation, count, store = store.name(), "Results persisted");
                Ok(PersistOutcome::Saved { count })
            }
            Err(err) => {
                session.persist.finish(generation, false);
                let err = SdkError::from_store(store.name(), err);
                warn!(generation, error = %err, "Persist failed");
                Err(session.fail(err))
            }
        }
    }

    fn snapshot_of(&self, session: &Session) -> SessionSnapshot {
        let dataset = session.dataset.as_ref();
        SessionSnapshot {
            upload_id: dataset.map(|d| d.upload_id),
            uploaded_at: dataset.map(|d| d.uploaded_at),
            generation: session.generation,
            analyze: session.analyze.state(),
            persist: session.persist.state(),
            error: session.last_error.clone(),
            scored: session.scores.len(),
            scorer_ready: self.scorer.is_ready(),
            store_ready: self.store.is_ready(),
            summary: dataset.map(|d| d.summary.clone()),
        }
    }
}

/// Cheaply clonable handle to an analysis session.
///
/// The analyze and persist stages run on their own task, so dropping the
/// returned future (e.g. a disconnected HTTP client) does not leave a stage
/// stuck in `Running`.
///
/// # Example
///
/// ```no_run
/// use ledgerscan_sdk::{AnalyzeOutcome, Analyzer, LLMConfig, LLMProvider};
///
/// # async fn example() -> ledgerscan_sdk::Result<()> {
/// let analyzer = Analyzer::builder()
///     .with_llm(LLMConfig::new(LLMProvider::Gemini).with_api_key("key"))
///     .build();
///
/// analyzer.load_csv_file("transactions.csv").await?;
/// if let AnalyzeOutcome::Scored { results } = analyzer.analyze().await? {
///     for record in results {
///         println!("{} {:.2} {}", record.id(), record.fraud_score, record.reason);
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Analyzer {
    inner: Arc<AnalyzerInner>,
}

impl Analyzer {
    pub(crate) fn from_inner(inner: AnalyzerInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    /// Parse CSV bytes and replace the current dataset.
    ///
    /// On failure the previous dataset is discarded as well.
    pub async fn load_csv(&self, bytes: &[u8]) -> Result<SessionSnapshot> {
        let computed = self.inner.compute(bytes);
        self.inner.install(computed).await
    }

    /// Read a CSV file and replace the current dataset
    pub async fn load_csv_file(&self, path: impl AsRef<Path>) -> Result<SessionSnapshot> {
        let path = path.as_ref();
        let computed = match tokio::fs::read(path).await {
            Ok(bytes) => self.inner.compute(&bytes),
            Err(e) => Err(SdkError::Input(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        };
        self.inner.install(computed).await
    }

    /// Submit the top candidates to the fraud scorer
    pub async fn analyze(&self) -> Result<AnalyzeOutcome> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_analyze().await })
            .await
            .map_err(|e| SdkError::Computation(format!("analysis task failed: {}", e)))?
    }

    /// Store the current final records
    pub async fn persist(&self) -> Result<PersistOutcome> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run_persist().await })
            .await
            .map_err(|e| SdkError::Computation(format!("persist task failed: {}", e)))?
    }

    /// Final records for the current dataset and scores, ordered by fraud score.
    ///
    /// Recomputed on every call.
    pub async fn results(&self) -> Vec<FinalRecord> {
        self.inner.session.read().await.final_records()
    }

    /// Processed records of the current dataset
    pub async fn records(&self, candidates_only: bool) -> Vec<ProcessedRecord> {
        let session = self.inner.session.read().await;
        match session.features() {
            Some(features) => features
                .records
                .iter()
                .filter(|r| !candidates_only || r.is_candidate)
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Records that the next analyze call would submit
    pub async fn candidates(&self) -> Vec<ProcessedRecord> {
        let features = self.inner.session.read().await.features();
        match features {
            Some(features) => select_candidates(&features.records, self.inner.candidate_limit),
            None => Vec::new(),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.inner.session.read().await;
        self.inner.snapshot_of(&session)
    }

    /// Most recent failure, if any
    pub async fn last_error(&self) -> Option<String> {
        self.inner.session.read().await.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerscan_llm::MockProvider;
    use ledgerscan_repository::MemoryResultStore;

    const CSV: &str = "\
businessArea,period,activityCode,amount
Ops,2024-01,TRAVEL,100
Ops,2024-01,TRAVEL,100
Ops,2024-01,TRAVEL,100
Ops,2024-01,TRAVEL,100
Ops,2024-01,TRAVEL,100
Ops,2024-01,TRAVEL,\"2,500\"
";

    fn analyzer(response: &str) -> Analyzer {
        Analyzer::builder()
            .with_llm_client(Arc::new(MockProvider::with_response(response.to_string())))
            .with_store(Arc::new(MemoryResultStore::new()))
            .build()
    }

    #[tokio::test]
    async fn test_snapshot_before_upload() {
        let snapshot = analyzer("[]").snapshot().await;
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.upload_id.is_none());
        assert!(snapshot.summary.is_none());
        assert!(snapshot.scorer_ready);
        assert_eq!(snapshot.analyze, StageState::Idle);
    }

    #[tokio::test]
    async fn test_load_then_analyze() {
        let analyzer = analyzer(r#"[{"id": 5, "fraudScore": 0.8, "reason": "spike"}]"#);

        let snapshot = analyzer.load_csv(CSV.as_bytes()).await.unwrap();
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.summary.unwrap().candidate_count, 1);

        let outcome = analyzer.analyze().await.unwrap();
        match outcome {
            AnalyzeOutcome::Scored { results } => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].id(), 5);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(analyzer.snapshot().await.analyze, StageState::Succeeded);
        assert_eq!(analyzer.results().await.len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_without_upload_is_no_data() {
        let analyzer = analyzer("[]");
        let err = analyzer.analyze().await.unwrap_err();
        assert!(matches!(err, SdkError::NoData(_)));
        assert!(analyzer.last_error().await.is_some());
    }
}

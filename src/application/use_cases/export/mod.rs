mod worker;

pub use worker::ExportWorker;

use crate::application::use_cases::scenario::ScenarioUseCase;
use crate::domain::error::Result;
use crate::domain::export_job::{ExportJob, ExportResult, TaskRef};
use crate::domain::test_case::{AcceptanceCase, CaseSnapshot};
use crate::infrastructure::jira::{adf, IssueTracker};
use crate::infrastructure::job_store::JobStore;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Exports one scenario tree to the issue tracker in the background:
/// enrich every case that is missing steps or an insight, create the parent
/// epic, then one child task per case. Progress is observable through the
/// job store only.
#[derive(Clone)]
pub struct ExportUseCase {
    scenario: Arc<ScenarioUseCase>,
    tracker: Arc<dyn IssueTracker>,
    store: Arc<dyn JobStore>,
    worker: Arc<ExportWorker>,
}

impl ExportUseCase {
    pub fn new(
        scenario: Arc<ScenarioUseCase>,
        tracker: Arc<dyn IssueTracker>,
        store: Arc<dyn JobStore>,
        worker: Arc<ExportWorker>,
    ) -> Self {
        Self {
            scenario,
            tracker,
            store,
            worker,
        }
    }

    /// Registers the job and hands the workflow to the worker. Returns the
    /// job id immediately; callers poll the store for progress. Total units:
    /// one steps-fill and one insight-fill per case plus the epic creation.
    pub async fn start(&self, case: AcceptanceCase) -> Result<String> {
        let job_id = Uuid::new_v4().to_string();
        let case_count = case.additional_test_cases.len() as u32 + 1;
        let total = case_count * 2 + 1;
        self.store.put(ExportJob::new(job_id.clone(), total)).await?;

        let this = self.clone();
        let id = job_id.clone();
        self.worker.spawn(&job_id, async move {
            let outcome = this.execute(&id, case).await;
            let update = match outcome {
                Ok(result) => {
                    info!(job_id = %id, "Scenario export finished");
                    this.store.complete(&id, result).await
                }
                Err(err) => {
                    warn!(job_id = %id, error = %err, "Scenario export failed");
                    this.store.fail(&id, err.to_string()).await
                }
            };
            if let Err(err) = update {
                error!(job_id = %id, error = %err, "Failed to record export outcome");
            }
            this.worker.finish(&id);
        });

        Ok(job_id)
    }

    pub async fn status(&self, job_id: &str) -> Result<ExportJob> {
        self.store.get(job_id).await
    }

    async fn execute(&self, job_id: &str, case: AcceptanceCase) -> Result<ExportResult> {
        let issue_types = self.tracker.resolve_issue_types().await?;

        let mut all_cases = vec![case.snapshot()];
        all_cases.extend(case.additional_test_cases.iter().map(|c| c.snapshot()));

        // Fan out per-case enrichment; completion order is unspecified, the
        // result vector keeps list order for issue creation below.
        let enriched = join_all(all_cases.into_iter().map(|snapshot| {
            let this = self.clone();
            let id = job_id.to_string();
            async move { this.enrich(&id, snapshot).await }
        }))
        .await
        .into_iter()
        .collect::<Result<Vec<CaseSnapshot>>>()?;

        let epic = self
            .tracker
            .create_issue(
                &format!("[SCENARIO] {}", case.title),
                &issue_types.epic.id,
                None,
                adf::scenario_description(&case.title, &case.description),
            )
            .await?;
        self.store.increment_done(job_id).await?;

        // Children are created sequentially: each needs the parent key.
        let mut tasks = Vec::with_capacity(enriched.len());
        for snapshot in &enriched {
            let issue = self
                .tracker
                .create_issue(
                    &format!("[{}] {}", snapshot.case_type, snapshot.title),
                    &issue_types.task.id,
                    Some(&epic.key),
                    adf::case_description(snapshot),
                )
                .await?;
            tasks.push(TaskRef {
                id: snapshot.id.clone(),
                key: issue.key,
                url: issue.url,
            });
        }

        Ok(ExportResult { epic, tasks })
    }

    /// Both counter increments happen even when nothing had to be generated;
    /// the total was sized the same way.
    async fn enrich(&self, job_id: &str, mut snapshot: CaseSnapshot) -> Result<CaseSnapshot> {
        if snapshot.steps.is_empty() {
            let fill = self
                .scenario
                .generate_steps(snapshot.case_type, &snapshot.title, &snapshot.description)
                .await?;
            snapshot.steps = fill.steps;
            if !fill.expected_result.trim().is_empty() {
                snapshot.expected_result = fill.expected_result;
            }
        }
        self.store.increment_done(job_id).await?;

        if snapshot.qa_insight.is_none() {
            let insight = self
                .scenario
                .generate_insight(snapshot.case_type, &snapshot.title, &snapshot.description)
                .await?;
            snapshot.qa_insight = Some(insight);
        }
        self.store.increment_done(job_id).await?;

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;
    use crate::domain::export_job::{IssueRef, JobStatus};
    use crate::domain::llm_config::LLMConfig;
    use crate::domain::test_case::{AcceptanceTag, AdditionalCase, CaseType, QaInsight};
    use crate::infrastructure::jira::{IssueType, IssueTypePair};
    use crate::infrastructure::job_store::InMemoryJobStore;
    use crate::infrastructure::llm_clients::LLMClient;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct QueueClient {
        responses: Mutex<VecDeque<Result<String>>>,
    }

    #[async_trait]
    impl LLMClient for QueueClient {
        async fn generate(&self, _: &LLMConfig, _: &str, _: &str) -> Result<String> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::EmptyCompletion("exhausted".to_string())))
        }
    }

    struct FakeTracker {
        counter: AtomicUsize,
        created: Mutex<Vec<(String, Option<String>)>>,
        fail_on_create: bool,
    }

    impl FakeTracker {
        fn new(fail_on_create: bool) -> Self {
            Self {
                counter: AtomicUsize::new(0),
                created: Mutex::new(Vec::new()),
                fail_on_create,
            }
        }
    }

    #[async_trait]
    impl IssueTracker for FakeTracker {
        async fn resolve_issue_types(&self) -> Result<IssueTypePair> {
            Ok(IssueTypePair {
                epic: IssueType {
                    id: "10001".to_string(),
                    name: "Epic".to_string(),
                    hierarchy_level: 1,
                },
                task: IssueType {
                    id: "10002".to_string(),
                    name: "Task".to_string(),
                    hierarchy_level: 0,
                },
            })
        }

        async fn create_issue(
            &self,
            summary: &str,
            _issue_type_id: &str,
            parent_key: Option<&str>,
            _description: Value,
        ) -> Result<IssueRef> {
            if self.fail_on_create {
                return Err(AppError::IntegrationError(
                    "Jira error (401): unauthorized".to_string(),
                ));
            }
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            let key = format!("QA-{}", n);
            self.created
                .lock()
                .unwrap()
                .push((summary.to_string(), parent_key.map(String::from)));
            Ok(IssueRef {
                url: format!("https://example.atlassian.net/browse/{}", key),
                key,
            })
        }
    }

    fn scenario_case() -> AcceptanceCase {
        AcceptanceCase {
            id: "TC-ACC-001".to_string(),
            case_type: AcceptanceTag::Acceptance,
            title: "Login".to_string(),
            description: "Happy path".to_string(),
            preconditions: vec!["User exists".to_string()],
            steps: (1..=5).map(|i| format!("Step {}", i)).collect(),
            expected_result: "Dashboard".to_string(),
            qa_insight: Some(QaInsight {
                reasoning: "core flow".to_string(),
                coverage: vec!["auth".to_string()],
                risks: Vec::new(),
                automation_tips: Vec::new(),
            }),
            additional_test_cases: vec![AdditionalCase {
                id: "NEG-1".to_string(),
                case_type: CaseType::Negative,
                title: "Bad password".to_string(),
                description: "must fail".to_string(),
                steps: None,
                expected_result: None,
                qa_insight: None,
            }],
        }
    }

    fn build(
        responses: Vec<Result<String>>,
        fail_on_create: bool,
    ) -> (ExportUseCase, Arc<InMemoryJobStore>, Arc<ExportWorker>, Arc<FakeTracker>) {
        let client = Arc::new(QueueClient {
            responses: Mutex::new(responses.into_iter().collect()),
        });
        let scenario = Arc::new(ScenarioUseCase::new(client, LLMConfig::default()));
        let tracker = Arc::new(FakeTracker::new(fail_on_create));
        let store = Arc::new(InMemoryJobStore::new());
        let worker = Arc::new(ExportWorker::new());
        let export = ExportUseCase::new(
            scenario,
            tracker.clone(),
            store.clone(),
            worker.clone(),
        );
        (export, store, worker, tracker)
    }

    #[tokio::test]
    async fn full_export_reaches_done_with_all_units_counted() {
        let (export, store, worker, tracker) = build(
            vec![
                Ok(r#"{"steps": ["open", "submit"], "expectedResult": "error shown"}"#.to_string()),
                Ok(r#"{"reasoning": "guards auth", "coverage": ["auth"], "risks": [], "automationTips": []}"#.to_string()),
            ],
            false,
        );

        let job_id = export.start(scenario_case()).await.unwrap();
        worker.wait(&job_id).await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.total, 5);
        assert_eq!(job.done, 5);

        let result = job.result.unwrap();
        assert_eq!(result.epic.key, "QA-1");
        assert_eq!(result.tasks.len(), 2);
        assert_eq!(result.tasks[0].id, "TC-ACC-001");
        assert_eq!(result.tasks[1].id, "NEG-1");

        let created = tracker.created.lock().unwrap();
        assert_eq!(created[0].0, "[SCENARIO] Login");
        assert_eq!(created[0].1, None);
        assert_eq!(created[1].0, "[ACCEPTANCE] Login");
        assert_eq!(created[1].1.as_deref(), Some("QA-1"));
        assert_eq!(created[2].0, "[NEGATIVE] Bad password");
    }

    #[tokio::test]
    async fn tracker_failure_marks_the_job_error() {
        let (export, store, worker, _tracker) = build(
            vec![
                Ok(r#"{"steps": ["open"], "expectedResult": "err"}"#.to_string()),
                Ok(r#"{"reasoning": "x", "coverage": [], "risks": [], "automationTips": []}"#.to_string()),
            ],
            true,
        );

        let job_id = export.start(scenario_case()).await.unwrap();
        worker.wait(&job_id).await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.error.unwrap().contains("Jira error (401)"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn enrichment_failure_marks_the_job_error() {
        // Steps generation: three empty completions exhaust the retries.
        let (export, store, worker, _tracker) = build(
            vec![
                Err(AppError::EmptyCompletion("1".to_string())),
                Err(AppError::EmptyCompletion("2".to_string())),
                Err(AppError::EmptyCompletion("3".to_string())),
            ],
            false,
        );

        let job_id = export.start(scenario_case()).await.unwrap();
        worker.wait(&job_id).await;

        let job = store.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.done <= job.total);
    }

    #[tokio::test]
    async fn status_of_unknown_job_is_not_found() {
        let (export, _store, _worker, _tracker) = build(Vec::new(), false);
        assert!(matches!(
            export.status("nope").await,
            Err(AppError::NotFound(_))
        ));
    }
}

pub mod jira;
pub mod playwright;
pub mod scenarios;

use crate::application::use_cases::export::ExportUseCase;
use crate::application::use_cases::scenario::ScenarioUseCase;
use crate::domain::error::AppError;
use crate::infrastructure::jira::IssueTracker;
use crate::infrastructure::playwright::PlaywrightRunner;
use actix_cors::Cors;
use actix_web::error::JsonPayloadError;
use actix_web::{dev::Server, get, web, App, HttpRequest, HttpResponse, HttpServer, Responder, Scope};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub scenario_use_case: Arc<ScenarioUseCase>,
    pub export_use_case: ExportUseCase,
    pub tracker: Arc<dyn IssueTracker>,
    pub runner: PlaywrightRunner,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap();
    logs.push(entry.clone());
    if logs.len() > 100 {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

/// Error taxonomy → status mapping: bad input 400, unknown job 404,
/// everything upstream 500 with the short context plus the cause.
pub(crate) fn error_response(context: &str, err: &AppError) -> HttpResponse {
    match err {
        AppError::ValidationError(msg) => {
            HttpResponse::BadRequest().json(json!({ "error": msg }))
        }
        AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({ "error": msg })),
        _ => HttpResponse::InternalServerError()
            .json(json!({ "error": context, "details": err.to_string() })),
    }
}

/// Malformed or mistyped JSON bodies answer with the same `{error}` shape as
/// handler-level validation, before any handler runs.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = format!("Invalid request body: {}", err);
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(json!({ "error": message })),
    )
    .into()
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap();
    HttpResponse::Ok().json(&*logs)
}

pub(crate) fn api_scope() -> Scope {
    web::scope("/api")
        .service(get_logs)
        .service(scenarios::generate_scenario)
        .service(scenarios::generate_additional_steps)
        .service(scenarios::generate_insight)
        .service(playwright::generate_spec)
        .service(playwright::run_tests)
        .service(jira::export_test_case)
        .service(jira::export_scenario)
        .service(jira::export_status)
}

pub fn start_server(
    state: web::Data<HttpState>,
    host: &str,
    port: u16,
) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for the local dashboard

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(health)
            .service(api_scope())
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::export::ExportWorker;
    use crate::domain::error::Result;
    use crate::domain::export_job::IssueRef;
    use crate::domain::llm_config::LLMConfig;
    use crate::infrastructure::jira::{IssueType, IssueTypePair};
    use crate::infrastructure::job_store::{InMemoryJobStore, JobStore};
    use crate::infrastructure::llm_clients::LLMClient;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and replays one canned completion.
    struct CountingClient {
        calls: Arc<AtomicUsize>,
        response: String,
    }

    #[async_trait]
    impl LLMClient for CountingClient {
        async fn generate(&self, _: &LLMConfig, _: &str, _: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct StubTracker;

    #[async_trait]
    impl IssueTracker for StubTracker {
        async fn resolve_issue_types(&self) -> Result<IssueTypePair> {
            let task = IssueType {
                id: "1".to_string(),
                name: "Task".to_string(),
                hierarchy_level: 0,
            };
            Ok(IssueTypePair {
                epic: task.clone(),
                task,
            })
        }

        async fn create_issue(
            &self,
            _: &str,
            _: &str,
            _: Option<&str>,
            _: Value,
        ) -> Result<IssueRef> {
            Ok(IssueRef {
                key: "QA-9".to_string(),
                url: "https://example.atlassian.net/browse/QA-9".to_string(),
            })
        }
    }

    fn scenario_completion() -> String {
        r#"{
            "testCase": {
                "id": "TC-ACC-001",
                "type": "ACCEPTANCE",
                "title": "Login",
                "description": "Happy path",
                "preconditions": ["User exists"],
                "steps": ["a", "b", "c", "d", "e"],
                "expectedResult": "Dashboard",
                "additionalTestCases": []
            }
        }"#
        .to_string()
    }

    fn state_with(calls: Arc<AtomicUsize>, store: Arc<InMemoryJobStore>) -> web::Data<HttpState> {
        let client = Arc::new(CountingClient {
            calls,
            response: scenario_completion(),
        });
        let scenario = Arc::new(ScenarioUseCase::new(client, LLMConfig::default()));
        let tracker: Arc<dyn IssueTracker> = Arc::new(StubTracker);
        let worker = Arc::new(ExportWorker::new());
        let export = ExportUseCase::new(
            scenario.clone(),
            tracker.clone(),
            store,
            worker,
        );
        let logs = Arc::new(Mutex::new(Vec::new()));
        web::Data::new(HttpState {
            scenario_use_case: scenario,
            export_use_case: export,
            tracker,
            runner: PlaywrightRunner::new(logs.clone()),
            logs,
        })
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state)
                    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
                    .service(health)
                    .service(api_scope()),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;
        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn non_string_intent_is_rejected_before_any_completion_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls.clone(), Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/scenarios")
                .set_json(json!({ "intent": 123 }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn empty_intent_is_rejected() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls.clone(), Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/scenarios")
                .set_json(json!({ "intent": "  " }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 400);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn scenario_response_carries_ai_status() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/scenarios")
                .set_json(json!({ "intent": "user logs in with valid credentials" }))
                .to_request(),
        )
        .await;

        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["aiStatus"], "ok");
        assert_eq!(body["testCase"]["type"], "ACCEPTANCE");
        assert_eq!(body["testCase"]["steps"].as_array().unwrap().len(), 5);
    }

    #[actix_web::test]
    async fn unknown_export_job_is_404() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/integrations/jira/export-status/does-not-exist")
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 404);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Job not found");
    }

    #[actix_web::test]
    async fn spec_generation_requires_steps() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/tests/playwright")
                .set_json(json!({
                    "testCase": { "id": "NEG-1", "type": "NEGATIVE", "title": "Bad password" }
                }))
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), 400);
    }

    #[actix_web::test]
    async fn spec_generation_returns_name_and_content() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/tests/playwright")
                .set_json(json!({
                    "testCase": {
                        "id": "TC-ACC-001",
                        "type": "ACCEPTANCE",
                        "title": "User Logs In",
                        "steps": ["Open page", "Submit"]
                    }
                }))
                .to_request(),
        )
        .await;

        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["specName"], "user-logs-in.spec.ts");
        assert!(body["content"]
            .as_str()
            .unwrap()
            .contains("// 1. Open page"));
    }

    #[actix_web::test]
    async fn export_scenario_returns_a_pollable_job() {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = Arc::new(InMemoryJobStore::new());
        let app = test_app!(state_with(calls, store.clone()));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/integrations/jira/export-scenario")
                .set_json(json!({
                    "testCase": {
                        "id": "TC-ACC-001",
                        "type": "ACCEPTANCE",
                        "title": "Login",
                        "steps": ["a", "b", "c", "d", "e"],
                        "expectedResult": "Dashboard",
                        "qaInsight": {
                            "reasoning": "core",
                            "coverage": [],
                            "risks": [],
                            "automationTips": []
                        },
                        "additionalTestCases": []
                    }
                }))
                .to_request(),
        )
        .await;

        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        let job_id = body["jobId"].as_str().unwrap().to_string();
        assert!(store.get(&job_id).await.is_ok());
    }

    #[actix_web::test]
    async fn run_tests_reports_started() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = test_app!(state_with(calls, Arc::new(InMemoryJobStore::new())));

        let resp = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/tests/run")
                .set_json(json!({ "testFile": "login.spec.ts" }))
                .to_request(),
        )
        .await;

        assert!(resp.status().is_success());
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "started");
        assert_eq!(body["browser"], "chromium");
        assert_eq!(body["testFile"], "login.spec.ts");
    }
}

use std::sync::{Arc, Mutex};

use actix_web::web;
use tracing::info;

use crate::application::use_cases::export::{ExportUseCase, ExportWorker};
use crate::application::use_cases::scenario::ScenarioUseCase;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::jira::{IssueTracker, JiraClient};
use crate::infrastructure::job_store::{InMemoryJobStore, JobStore};
use crate::infrastructure::llm_clients::{LLMClient, OpenAiClient};
use crate::infrastructure::playwright::PlaywrightRunner;
use crate::interfaces::http::{add_log, start_server, HttpState};

pub async fn run() -> std::io::Result<()> {
    let config = AppConfig::load().expect("Failed to load configuration");
    let logs = Arc::new(Mutex::new(Vec::new()));

    let llm_client: Arc<dyn LLMClient + Send + Sync> = Arc::new(OpenAiClient::new());
    let scenario_use_case = Arc::new(ScenarioUseCase::new(llm_client, config.llm_config()));

    let tracker: Arc<dyn IssueTracker> = Arc::new(JiraClient::new(config.jira.clone()));
    let job_store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
    let worker = Arc::new(ExportWorker::new());
    let export_use_case = ExportUseCase::new(
        scenario_use_case.clone(),
        tracker.clone(),
        job_store,
        worker,
    );

    let state = web::Data::new(HttpState {
        scenario_use_case,
        export_use_case,
        tracker,
        runner: PlaywrightRunner::new(logs.clone()),
        logs: logs.clone(),
    });

    info!(
        host = %config.server.host,
        port = config.server.port,
        "Starting HTTP server"
    );
    add_log(
        &logs,
        "INFO",
        "System",
        &format!(
            "Backend initialized, HTTP server listening on {}:{}",
            config.server.host, config.server.port
        ),
    );

    start_server(state, &config.server.host, config.server.port)?.await
}

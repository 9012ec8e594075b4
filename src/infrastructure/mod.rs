pub mod config;
pub mod jira;
pub mod job_store;
pub mod llm_clients;
pub mod playwright;

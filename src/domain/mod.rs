pub mod error;
pub mod export_job;
pub mod llm_config;
pub mod test_case;

use crate::domain::error::{AppError, Result};
use crate::domain::export_job::{ExportJob, ExportResult, JobStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Store for export-job progress records. All mutation goes through the
/// store so the done-counter stays coordinated on a multi-threaded runtime.
/// Invariants enforced here: `done` never exceeds `total`, and a terminal
/// record (done/error) never changes again.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, job: ExportJob) -> Result<()>;
    async fn get(&self, id: &str) -> Result<ExportJob>;
    async fn increment_done(&self, id: &str) -> Result<()>;
    async fn complete(&self, id: &str, result: ExportResult) -> Result<()>;
    async fn fail(&self, id: &str, message: String) -> Result<()>;
}

/// Process-lifetime map. Records are never evicted; the map grows for the
/// life of the process.
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, ExportJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    async fn update<F>(&self, id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut ExportJob),
    {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
        if job.is_terminal() {
            return Ok(());
        }
        apply(job);
        Ok(())
    }
}

impl Default for InMemoryJobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: ExportJob) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<ExportJob> {
        let jobs = self.jobs.read().await;
        jobs.get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    async fn increment_done(&self, id: &str) -> Result<()> {
        self.update(id, |job| {
            if job.done < job.total {
                job.done += 1;
            }
        })
        .await
    }

    async fn complete(&self, id: &str, result: ExportResult) -> Result<()> {
        self.update(id, |job| {
            job.status = JobStatus::Done;
            job.result = Some(result);
        })
        .await
    }

    async fn fail(&self, id: &str, message: String) -> Result<()> {
        self.update(id, |job| {
            job.status = JobStatus::Error;
            job.error = Some(message);
        })
        .await
    }
}

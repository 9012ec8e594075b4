use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;

/// Tracks the join handle of every in-flight export so completion and abort
/// are explicit operations instead of side effects of a dropped closure.
pub struct ExportWorker {
    handles: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ExportWorker {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn spawn<F>(&self, job_id: &str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        self.handles
            .lock()
            .unwrap()
            .insert(job_id.to_string(), handle);
    }

    /// Called by the task itself once the job record is terminal.
    pub fn finish(&self, job_id: &str) {
        self.handles.lock().unwrap().remove(job_id);
    }

    pub fn is_running(&self, job_id: &str) -> bool {
        self.handles.lock().unwrap().contains_key(job_id)
    }

    /// Aborts an in-flight export task. The job record keeps its last state;
    /// nothing marks it terminal on behalf of the aborted task.
    pub fn abort(&self, job_id: &str) -> bool {
        match self.handles.lock().unwrap().remove(job_id) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Waits for an in-flight export to finish. Returns false when no task is
    /// tracked under the id (already finished or never started).
    pub async fn wait(&self, job_id: &str) -> bool {
        let handle = self.handles.lock().unwrap().remove(job_id);
        match handle {
            Some(handle) => {
                let _ = handle.await;
                true
            }
            None => false,
        }
    }
}

impl Default for ExportWorker {
    fn default() -> Self {
        Self::new()
    }
}

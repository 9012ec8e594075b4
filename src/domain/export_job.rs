use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRef {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: String,
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportResult {
    pub epic: IssueRef,
    pub tasks: Vec<TaskRef>,
}

/// Progress record for one background export. Owned by the store; a single
/// workflow mutates a given id, and nothing mutates it once terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: String,
    pub total: u32,
    pub done: u32,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ExportResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportJob {
    pub fn new(id: impl Into<String>, total: u32) -> Self {
        Self {
            id: id.into(),
            total,
            done: 0,
            status: JobStatus::Running,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != JobStatus::Running
    }
}

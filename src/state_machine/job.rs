use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::PollState;
use crate::error::TideError;
use crate::request::DateRange;
use crate::shom::{JobAccepted, StatusResponse};

/// URLs handed out by the service for one accepted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub status_url: String,
    pub download_url: String,
}

impl TryFrom<JobAccepted> for JobHandle {
    type Error = TideError;

    /// Absent and empty URLs are both treated as missing.
    fn try_from(accepted: JobAccepted) -> Result<Self, Self::Error> {
        let status_url = accepted
            .status_url
            .filter(|url| !url.is_empty())
            .ok_or(TideError::IncompleteHandle("status_url"))?;
        let download_url = accepted
            .download_url
            .filter(|url| !url.is_empty())
            .ok_or(TideError::IncompleteHandle("download_url"))?;
        Ok(Self {
            status_url,
            download_url,
        })
    }
}

/// Server-side status of a job, as read on a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Completed,
    Failed,
    /// Anything else the server reports, kept verbatim for logging.
    InProgress(String),
}

impl From<StatusResponse> for JobStatus {
    fn from(resp: StatusResponse) -> Self {
        match resp.status.as_deref() {
            Some("completed") => JobStatus::Completed,
            Some("failed") => JobStatus::Failed,
            Some(other) => JobStatus::InProgress(other.to_string()),
            None => JobStatus::InProgress("unknown".to_string()),
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::InProgress(status) => write!(f, "{status}"),
        }
    }
}

/// Fixed-interval polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between two status queries.
    pub interval: Duration,
    /// Number of status queries before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_attempts: 30,
        }
    }
}

/// One polling session over an accepted job.
#[derive(Debug, Clone)]
pub struct PollSession {
    pub handle: JobHandle,
    pub state: PollState,
    pub state_history: Vec<PollState>,
    pub attempts: u32,
    pub transient_errors: u32,
    pub config: PollConfig,
    pub started_at: DateTime<Utc>,
}

impl PollSession {
    pub fn new(handle: JobHandle, config: PollConfig) -> Self {
        Self {
            handle,
            state: PollState::Polling,
            state_history: Vec::new(),
            attempts: 0,
            transient_errors: 0,
            config,
            started_at: Utc::now(),
        }
    }

    pub fn budget_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollReport {
    pub station: String,
    pub range: DateRange,
    pub output: PathBuf,
    pub bytes_written: usize,
    pub attempts: u32,
    pub transient_errors: u32,
    pub state_transitions: Vec<PollState>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl PollReport {
    /// Builds the report once the result file is on disk.
    pub fn from_session(
        session: &PollSession,
        station: &str,
        range: DateRange,
        output: PathBuf,
        bytes_written: usize,
    ) -> Self {
        let now = Utc::now();
        let mut transitions = session.state_history.clone();
        transitions.push(session.state);

        Self {
            station: station.to_string(),
            range,
            output,
            bytes_written,
            attempts: session.attempts,
            transient_errors: session.transient_errors,
            state_transitions: transitions,
            started_at: session.started_at,
            completed_at: now,
            duration_ms: (now - session.started_at).num_milliseconds(),
        }
    }
}

//! Wire types for the REFMAR asynchronous download endpoints.

use serde::{Deserialize, Serialize};

use crate::request::{JobRequest, OutputFormat};

const WIRE_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Body of the job submission `POST`.
///
/// The service expects the station id as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBody {
    pub station: String,
    pub start: String,
    pub end: String,
    pub format: OutputFormat,
}

impl From<&JobRequest> for SubmitBody {
    fn from(req: &JobRequest) -> Self {
        Self {
            station: req.station.to_string(),
            start: req.start.format(WIRE_TIMESTAMP).to_string(),
            end: req.end.format(WIRE_TIMESTAMP).to_string(),
            format: req.format,
        }
    }
}

/// Body of a `202 Accepted` submission response.
///
/// Both URLs are optional here; completeness is checked by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobAccepted {
    #[serde(default)]
    pub status_url: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Body of a status query response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusResponse {
    /// `None` when the server omitted the field; treated as still running.
    #[serde(default)]
    pub status: Option<String>,
}

use std::path::PathBuf;

use thiserror::Error;

use crate::shom::ApiError;

/// Terminal outcomes of a download run.
///
/// Transient status-query failures are not listed here: they are absorbed by
/// the polling state machine and only count against the attempt budget.
#[derive(Debug, Error)]
pub enum TideError {
    #[error("malformed date '{0}', expected YYYY-MM-DD")]
    MalformedDate(String),

    #[error("submission rejected: {0}")]
    SubmissionRejected(#[source] ApiError),

    #[error("submission accepted but the response has no {0}")]
    IncompleteHandle(&'static str),

    #[error("job failed on the server side")]
    JobFailed,

    #[error("job still not completed after {attempts} status queries")]
    PollTimeout { attempts: u32 },

    #[error("download failed: {0}")]
    Download(#[source] ApiError),

    #[error("failed to write '{}'", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

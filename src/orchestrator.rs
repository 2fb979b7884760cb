use std::path::{Path, PathBuf};

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::TideError;
use crate::output::{output_path, write_payload};
use crate::request::{DateRange, JobRequest, OutputFormat};
use crate::shom::TideApi;
use crate::state_machine::{
    JobHandle, JobStatus, Observation, PollConfig, PollReport, PollSession, PollState,
    StateMachine, Transition, WaitReason,
};
use crate::ui::PollProgress;

/// What to download and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub station_id: u32,
    pub station_name: String,
    pub range: DateRange,
    pub output: PathBuf,
}

impl DownloadPlan {
    pub fn new(station_id: u32, station_name: &str, range: DateRange, output_dir: &Path) -> Self {
        Self {
            station_id,
            station_name: station_name.to_string(),
            range,
            output: output_path(output_dir, station_name, &range, OutputFormat::Csv),
        }
    }
}

/// Drives one job through submission, polling and download.
pub struct TideOrchestrator<A> {
    api: A,
    poll: PollConfig,
    progress: PollProgress,
}

impl<A: TideApi> TideOrchestrator<A> {
    /// Create an orchestrator without terminal feedback.
    #[cfg(test)]
    pub fn new(api: A, poll: PollConfig) -> Self {
        Self::with_progress(api, poll, PollProgress::hidden())
    }

    pub fn with_progress(api: A, poll: PollConfig, progress: PollProgress) -> Self {
        Self {
            api,
            poll,
            progress,
        }
    }

    /// Runs the whole workflow for `plan` and reports on the written file.
    pub async fn run(&self, plan: &DownloadPlan) -> Result<PollReport, TideError> {
        let report = self.execute(plan).await;
        self.progress.finish(&report);
        report
    }

    async fn execute(&self, plan: &DownloadPlan) -> Result<PollReport, TideError> {
        info!(
            start = %plan.range.start_label(),
            end = %plan.range.end_label(),
            "requested period"
        );
        info!(path = %plan.output.display(), "target file");

        let request = JobRequest::new(plan.station_id, &plan.range);
        let handle = self.submit(&request).await?;
        let (session, bytes) = self.poll_and_fetch(handle, &plan.output).await?;

        Ok(PollReport::from_session(
            &session,
            &plan.station_name,
            plan.range,
            plan.output.clone(),
            bytes,
        ))
    }

    /// Submits `request` and turns the acceptance into a [`JobHandle`].
    ///
    /// Exactly one request is sent; nothing is retried here.
    pub async fn submit(&self, request: &JobRequest) -> Result<JobHandle, TideError> {
        info!(station = request.station, "sending asynchronous request");
        let accepted = self
            .api
            .submit_job(request)
            .await
            .map_err(TideError::SubmissionRejected)?;
        let handle = JobHandle::try_from(accepted)?;
        info!("request accepted, job is being processed");
        debug!(status_url = %handle.status_url, download_url = %handle.download_url);
        Ok(handle)
    }

    /// Polls until the job reaches a terminal state, then writes the result
    /// to `target`.
    ///
    /// Returns the finished session and the number of bytes written.
    pub async fn poll_and_fetch(
        &self,
        handle: JobHandle,
        target: &Path,
    ) -> Result<(PollSession, usize), TideError> {
        let mut session = PollSession::new(handle, self.poll);
        let max = self.poll.max_attempts;
        info!("waiting for the job to complete");

        loop {
            let observation = match self.api.job_status(&session.handle.status_url).await {
                Ok(resp) => Observation::Status(JobStatus::from(resp)),
                Err(e) => Observation::Error(e.to_string()),
            };

            match StateMachine::next(&mut session, observation) {
                Transition::Fetch => break,
                Transition::Wait(WaitReason::Pending(status)) => {
                    debug!(%status, attempt = session.attempts, max, "job still running");
                    self.progress.update(session.state, session.attempts, max, &status);
                }
                Transition::Wait(WaitReason::Transient(reason)) => {
                    warn!(attempt = session.attempts, max, %reason, "error while polling");
                    self.progress.transient(session.attempts, max, &reason);
                }
                Transition::Stop(PollState::Failed) => return Err(TideError::JobFailed),
                Transition::Stop(_) => {
                    return Err(TideError::PollTimeout {
                        attempts: session.attempts,
                    });
                }
            }

            sleep(self.poll.interval).await;
        }

        info!("job completed, downloading file");
        let payload = self
            .api
            .download(&session.handle.download_url)
            .await
            .map_err(TideError::Download)?;
        write_payload(target, &payload).await?;
        info!(path = %target.display(), bytes = payload.len(), "file downloaded");

        Ok((session, payload.len()))
    }
}

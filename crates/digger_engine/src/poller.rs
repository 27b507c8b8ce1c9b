use std::future::Future;
use std::time::Duration;

use digger_logging::{digger_debug, digger_info};
use tokio_util::sync::CancellationToken;

use crate::backend::{JobBackend, ProgressSink, ReleaseOwner};
use crate::{
    EngineEvent, JobHandle, JobStatus, PollError, SearchEntry, SearchId, SearchOutcome,
    SearchProgress, SubmitReply,
};

const MIN_POLL_PERCENT: f64 = 10.0;
const MAX_POLL_PERCENT: f64 = 80.0;
const FALLBACK_ERROR: &str = "Unknown error";
const FALLBACK_LABEL: &str = "Processing...";

/// What one status response means for the polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStep {
    Progress { percent: u8, label: String },
    Finished,
    Failed(String),
}

/// Progress shown while a job is running: never below 10% or above 80%.
pub fn clamp_progress(raw: Option<f64>) -> u8 {
    let value = raw.filter(|v| v.is_finite()).unwrap_or(0.0);
    value.clamp(MIN_POLL_PERCENT, MAX_POLL_PERCENT).round() as u8
}

pub fn interpret_status(status: &JobStatus) -> PollStep {
    use crate::JobState;

    let meta = status.meta.clone().unwrap_or_default();
    match status.state {
        JobState::Finished => PollStep::Finished,
        JobState::Failed => PollStep::Failed(
            meta.error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_ERROR.to_string()),
        ),
        JobState::Queued | JobState::Started | JobState::Other => PollStep::Progress {
            percent: clamp_progress(meta.progress),
            label: meta
                .status
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_LABEL.to_string()),
        },
    }
}

/// Drives one search from submission to its terminal result.
///
/// Polls are serialized: the next wait starts only after the previous status
/// response arrived, so updates are applied in order. Every wait and request
/// races against `cancel`, and no progress is emitted once it fires.
pub struct Poller<'a> {
    backend: &'a dyn JobBackend,
    interval: Duration,
}

impl<'a> Poller<'a> {
    pub fn new(backend: &'a dyn JobBackend, interval: Duration) -> Self {
        Self { backend, interval }
    }

    pub async fn run(
        &self,
        search_id: SearchId,
        entry: &SearchEntry,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<SearchOutcome, PollError> {
        let origin = entry.origin().to_string();
        let job = match entry {
            SearchEntry::Query(request) => {
                match until_cancelled(cancel, self.backend.submit_search(request)).await? {
                    SubmitReply::Cached(payload) => {
                        digger_info!("search {} answered from cache ({})", search_id, origin);
                        return Ok(SearchOutcome {
                            origin,
                            payload,
                            cached: true,
                        });
                    }
                    SubmitReply::Job(job) => job,
                }
            }
            SearchEntry::ArtistReleases(id) => {
                until_cancelled(cancel, self.backend.list_releases(ReleaseOwner::Artist, id))
                    .await?
            }
            SearchEntry::LabelReleases(id) => {
                until_cancelled(cancel, self.backend.list_releases(ReleaseOwner::Label, id))
                    .await?
            }
        };

        digger_info!("search {} polling job {}", search_id, job.job_id);
        emit_progress(sink, cancel, search_id, 50, "Processing results...");

        self.wait_for_job(search_id, &job, sink, cancel).await?;

        emit_progress(sink, cancel, search_id, 90, "Fetching results...");
        let payload = until_cancelled(cancel, self.backend.job_result(&job)).await?;
        digger_info!("search {} finished (job {})", search_id, job.job_id);

        Ok(SearchOutcome {
            origin,
            payload,
            cached: false,
        })
    }

    /// Returns once the job reached `finished`; every exit path ends the loop,
    /// so no further status request is issued for this handle.
    async fn wait_for_job(
        &self,
        search_id: SearchId,
        job: &JobHandle,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(), PollError> {
        loop {
            until_cancelled(cancel, async {
                tokio::time::sleep(self.interval).await;
                Ok(())
            })
            .await?;

            let status = until_cancelled(cancel, self.backend.job_status(job)).await?;
            match interpret_status(&status) {
                PollStep::Progress { percent, label } => {
                    digger_debug!("search {} job {} at {}%: {}", search_id, job.job_id, percent, label);
                    emit_progress(sink, cancel, search_id, percent, label);
                }
                PollStep::Finished => return Ok(()),
                PollStep::Failed(message) => return Err(PollError::JobFailed(message)),
            }
        }
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    work: impl Future<Output = Result<T, PollError>>,
) -> Result<T, PollError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PollError::Cancelled),
        result = work => result,
    }
}

fn emit_progress(
    sink: &dyn ProgressSink,
    cancel: &CancellationToken,
    search_id: SearchId,
    percent: u8,
    label: impl Into<String>,
) {
    if cancel.is_cancelled() {
        return;
    }
    sink.emit(EngineEvent::Progress(SearchProgress {
        search_id,
        percent,
        label: label.into(),
    }));
}

//! Poller behaviour against an in-memory backend, on paused tokio time.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use digger_engine::{
    EngineEvent, JobBackend, JobHandle, JobMeta, JobState, JobStatus, PollError, Poller,
    ProgressSink, ReleaseOwner, SearchEntry, SearchRequest, SubmitReply,
};
use serde_json::{json, Value};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const INTERVAL: Duration = Duration::from_millis(2000);

struct ScriptedBackend {
    statuses: Mutex<VecDeque<JobStatus>>,
    status_delay: Duration,
    status_calls: AtomicUsize,
    result_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    status_times: Mutex<Vec<Instant>>,
}

impl ScriptedBackend {
    fn new(statuses: Vec<JobStatus>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            status_delay: Duration::ZERO,
            status_calls: AtomicUsize::new(0),
            result_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            status_times: Mutex::new(Vec::new()),
        }
    }

    fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    fn result_calls(&self) -> usize {
        self.result_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobBackend for ScriptedBackend {
    async fn submit_search(&self, _request: &SearchRequest) -> Result<SubmitReply, PollError> {
        Ok(SubmitReply::Job(JobHandle {
            job_id: "abc".to_string(),
        }))
    }

    async fn list_releases(&self, _owner: ReleaseOwner, id: &str) -> Result<JobHandle, PollError> {
        Ok(JobHandle {
            job_id: id.to_string(),
        })
    }

    async fn job_status(&self, _job: &JobHandle) -> Result<JobStatus, PollError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.status_times.lock().unwrap().push(Instant::now());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.status_delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut statuses = self.statuses.lock().unwrap();
        // The last scripted status repeats forever.
        let next = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        next.ok_or_else(|| PollError::Protocol("script exhausted".to_string()))
    }

    async fn job_result(&self, _job: &JobHandle) -> Result<Value, PollError> {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"mixes": [{"title": "Set A", "date": "2024-01-01", "tracks": []}]}))
    }
}

#[derive(Default)]
struct RecordingSink {
    percents: Mutex<Vec<u8>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        if let EngineEvent::Progress(progress) = event {
            self.percents.lock().unwrap().push(progress.percent);
        }
    }
}

fn running(progress: f64) -> JobStatus {
    JobStatus {
        state: JobState::Started,
        meta: Some(JobMeta {
            progress: Some(progress),
            ..JobMeta::default()
        }),
    }
}

fn terminal(state: JobState) -> JobStatus {
    JobStatus { state, meta: None }
}

fn query() -> SearchEntry {
    SearchEntry::Query(SearchRequest::new("Boiler Room", "mixesdb").unwrap())
}

#[tokio::test(start_paused = true)]
async fn finished_job_fetches_result_exactly_once_and_polling_stops() {
    let backend = ScriptedBackend::new(vec![
        running(-5.0),
        running(95.0),
        running(150.0),
        terminal(JobState::Finished),
    ]);
    let sink = RecordingSink::default();

    let outcome = Poller::new(&backend, INTERVAL)
        .run(1, &query(), &sink, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.payload["mixes"][0]["title"], "Set A");
    assert_eq!(backend.status_calls(), 4);
    assert_eq!(backend.result_calls(), 1);
    assert_eq!(*sink.percents.lock().unwrap(), vec![50, 10, 80, 80, 90]);

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(backend.status_calls(), 4);
    assert_eq!(backend.result_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_job_never_fetches_result() {
    let backend = ScriptedBackend::new(vec![running(20.0), terminal(JobState::Failed)]);

    let err = Poller::new(&backend, INTERVAL)
        .run(1, &query(), &RecordingSink::default(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, PollError::JobFailed("Unknown error".to_string()));

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(backend.status_calls(), 2);
    assert_eq!(backend.result_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn polls_are_spaced_by_the_interval() {
    let backend = ScriptedBackend::new(vec![
        running(10.0),
        running(20.0),
        terminal(JobState::Finished),
    ]);
    let start = Instant::now();

    Poller::new(&backend, INTERVAL)
        .run(1, &query(), &RecordingSink::default(), &CancellationToken::new())
        .await
        .unwrap();

    let offsets: Vec<_> = backend
        .status_times
        .lock()
        .unwrap()
        .iter()
        .map(|t| t.duration_since(start))
        .collect();
    assert_eq!(offsets.len(), 3);
    for (n, offset) in offsets.iter().enumerate() {
        let expected = INTERVAL * (n as u32 + 1);
        assert!(
            *offset >= expected && *offset < expected + Duration::from_millis(5),
            "poll {n} at {offset:?}, expected {expected:?}"
        );
    }
}

#[tokio::test(start_paused = true)]
async fn slow_status_responses_are_never_overlapped() {
    let backend = ScriptedBackend::new(vec![
        running(10.0),
        running(30.0),
        running(50.0),
        terminal(JobState::Finished),
    ])
    .with_status_delay(INTERVAL * 3);
    let sink = RecordingSink::default();

    Poller::new(&backend, INTERVAL)
        .run(1, &query(), &sink, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(*sink.percents.lock().unwrap(), vec![50, 10, 30, 50, 90]);
}

#[tokio::test(start_paused = true)]
async fn cancelled_search_goes_quiet() {
    let backend = ScriptedBackend::new(vec![running(30.0)]);
    let sink = RecordingSink::default();
    let cancel = CancellationToken::new();

    let entry = query();
    let poller = Poller::new(&backend, INTERVAL);
    let run = poller.run(1, &entry, &sink, &cancel);
    let stop = async {
        tokio::time::sleep(INTERVAL * 3 + INTERVAL / 2).await;
        cancel.cancel();
    };
    let (result, ()) = tokio::join!(run, stop);

    assert_eq!(result.unwrap_err(), PollError::Cancelled);
    let calls = backend.status_calls();
    let emitted = sink.percents.lock().unwrap().len();
    assert_eq!(calls, 3);

    tokio::time::sleep(INTERVAL * 10).await;
    assert_eq!(backend.status_calls(), calls);
    assert_eq!(sink.percents.lock().unwrap().len(), emitted);
    assert_eq!(backend.result_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn artist_listing_uses_artist_origin() {
    let backend = ScriptedBackend::new(vec![terminal(JobState::Finished)]);

    let outcome = Poller::new(&backend, INTERVAL)
        .run(
            9,
            &SearchEntry::ArtistReleases("42".to_string()),
            &RecordingSink::default(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(outcome.origin, "discogs-artist");
    assert_eq!(backend.result_calls(), 1);
}

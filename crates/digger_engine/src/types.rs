use serde::Deserialize;
use serde_json::Value;

pub type SearchId = u64;

/// A validated free-text search: `query` is trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    source: String,
}

impl SearchRequest {
    pub fn new(query: &str, source: impl Into<String>) -> Result<Self, PollError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(PollError::Validation);
        }
        Ok(Self {
            query: query.to_string(),
            source: source.into(),
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEntry {
    Query(SearchRequest),
    ArtistReleases(String),
    LabelReleases(String),
}

impl SearchEntry {
    /// Source tag attached to the outcome.
    pub fn origin(&self) -> &str {
        match self {
            SearchEntry::Query(request) => request.source(),
            SearchEntry::ArtistReleases(_) => "discogs-artist",
            SearchEntry::LabelReleases(_) => "discogs-label",
        }
    }
}

/// Backend job owned by exactly one running search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: String,
}

/// Reply of `POST /search_combined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitReply {
    Cached(Value),
    Job(JobHandle),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Started,
    Finished,
    Failed,
    /// Any other queue state (deferred, scheduled, ...); polled like `queued`.
    #[serde(other)]
    Other,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Finished | JobState::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct JobMeta {
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /job/{id}/status`. `state` is the terminal-state field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobStatus {
    pub state: JobState,
    #[serde(default)]
    pub meta: Option<JobMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub origin: String,
    pub payload: Value,
    /// True when the backend answered from its cache and no job ran.
    pub cached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub search_id: SearchId,
    pub percent: u8,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Progress(SearchProgress),
    SearchCompleted {
        search_id: SearchId,
        result: Result<SearchOutcome, PollError>,
    },
}

/// Terminal failure of one search lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("empty search query")]
    Validation,
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {0}")]
    Server(u16),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("job failed: {0}")]
    JobFailed(String),
    #[error("cancelled")]
    Cancelled,
}

/// Failure to set up the engine itself.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

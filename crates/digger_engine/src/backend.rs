use std::time::Duration;

use digger_logging::digger_debug;
use futures_util::StreamExt;
use reqwest::Url;
use serde_json::Value;

use crate::{EngineError, EngineEvent, JobHandle, JobStatus, PollError, SearchRequest, SubmitReply};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub base_url: String,
    pub poll_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            poll_interval: Duration::from_millis(2000),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 16 * 1024 * 1024,
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOwner {
    Artist,
    Label,
}

/// Client-visible contract of the search backend's job queue.
#[async_trait::async_trait]
pub trait JobBackend: Send + Sync {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SubmitReply, PollError>;

    async fn list_releases(&self, owner: ReleaseOwner, id: &str) -> Result<JobHandle, PollError>;

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, PollError>;

    async fn job_result(&self, job: &JobHandle) -> Result<Value, PollError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    base_url: Url,
    client: reqwest::Client,
    max_response_bytes: u64,
}

impl ReqwestBackend {
    pub fn new(settings: &EngineSettings) -> Result<Self, EngineError> {
        let invalid = |message: String| EngineError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            message,
        };
        let base_url = Url::parse(&settings.base_url).map_err(|err| invalid(err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| EngineError::Client(err.to_string()))?;

        Ok(Self {
            base_url,
            client,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    /// Appends path segments to the base url, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json(&self, url: Url) -> Result<Value, PollError> {
        digger_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        self.read_json(response).await
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, PollError> {
        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Server(status.as_u16()));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.max_response_bytes {
                return Err(too_large(self.max_response_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_response_bytes {
                return Err(too_large(self.max_response_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        serde_json::from_slice(&bytes)
            .map_err(|err| PollError::Protocol(format!("invalid json: {err}")))
    }
}

#[async_trait::async_trait]
impl JobBackend for ReqwestBackend {
    async fn submit_search(&self, request: &SearchRequest) -> Result<SubmitReply, PollError> {
        let url = self.endpoint(&["search_combined"]);
        digger_debug!("POST {} source={}", url, request.source());
        let response = self
            .client
            .post(url)
            .form(&[("query", request.query()), ("source", request.source())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = self.read_json(response).await?;
        interpret_submit_reply(body)
    }

    async fn list_releases(&self, owner: ReleaseOwner, id: &str) -> Result<JobHandle, PollError> {
        let route = match owner {
            ReleaseOwner::Artist => "artist_releases",
            ReleaseOwner::Label => "label_releases",
        };
        let body = self.get_json(self.endpoint(&[route, id])).await?;
        job_handle(&body)
    }

    async fn job_status(&self, job: &JobHandle) -> Result<JobStatus, PollError> {
        let body = self
            .get_json(self.endpoint(&["job", &job.job_id, "status"]))
            .await?;
        serde_json::from_value(body)
            .map_err(|err| PollError::Protocol(format!("invalid status response: {err}")))
    }

    async fn job_result(&self, job: &JobHandle) -> Result<Value, PollError> {
        self.get_json(self.endpoint(&["job", &job.job_id, "result"]))
            .await
    }
}

/// Classifies a `/search_combined` body: `{status: "cached", data}` or `{job_id}`.
pub fn interpret_submit_reply(body: Value) -> Result<SubmitReply, PollError> {
    let cached = body.get("status").and_then(Value::as_str) == Some("cached");
    if cached {
        if let Value::Object(mut map) = body {
            if let Some(data) = map.remove("data") {
                return Ok(SubmitReply::Cached(data));
            }
        }
        return Err(invalid_response());
    }
    job_handle(&body).map(SubmitReply::Job)
}

fn job_handle(body: &Value) -> Result<JobHandle, PollError> {
    let job_id = match body.get("job_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => return Err(invalid_response()),
    };
    Ok(JobHandle { job_id })
}

fn invalid_response() -> PollError {
    PollError::Protocol("invalid response".to_string())
}

fn too_large(max_bytes: u64, actual: u64) -> PollError {
    PollError::Protocol(format!("response too large (max {max_bytes}, actual {actual})"))
}

fn map_reqwest_error(err: reqwest::Error) -> PollError {
    if err.is_timeout() {
        return PollError::Network(format!("timeout: {err}"));
    }
    PollError::Network(err.to_string())
}

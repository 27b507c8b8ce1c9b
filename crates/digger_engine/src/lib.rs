//! Digger engine: backend client, job polling lifecycle and effect execution.
mod backend;
mod engine;
mod persist;
mod poller;
mod types;

pub use backend::{
    interpret_submit_reply, EngineSettings, JobBackend, ProgressSink, ReleaseOwner,
    ReqwestBackend,
};
pub use engine::EngineHandle;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{clamp_progress, interpret_status, PollStep, Poller};
pub use types::{
    EngineError, EngineEvent, JobHandle, JobMeta, JobState, JobStatus, PollError, SearchEntry,
    SearchId, SearchOutcome, SearchProgress, SearchRequest, SubmitReply,
};

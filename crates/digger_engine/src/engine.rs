use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use digger_logging::{digger_debug, digger_info, digger_warn};
use tokio_util::sync::CancellationToken;

use crate::backend::{ChannelProgressSink, EngineSettings, JobBackend, ReqwestBackend};
use crate::poller::Poller;
use crate::{EngineError, EngineEvent, PollError, SearchEntry, SearchId};

enum EngineCommand {
    Start {
        search_id: SearchId,
        entry: SearchEntry,
    },
    Cancel {
        search_id: SearchId,
    },
}

/// Runs searches on a background tokio runtime. At most one search is active:
/// starting a new one cancels the previous one. Dropping the handle cancels
/// whatever is still running and stops the runtime.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn spawn(
        settings: EngineSettings,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let backend: Arc<dyn JobBackend> = Arc::new(ReqwestBackend::new(&settings)?);
        Self::with_backend(backend, settings.poll_interval)
    }

    pub fn with_backend(
        backend: Arc<dyn JobBackend>,
        poll_interval: Duration,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>), EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::Builder::new()
            .name("digger-engine".to_string())
            .spawn(move || {
                let mut active: Option<(SearchId, CancellationToken)> = None;
                while let Ok(command) = cmd_rx.recv() {
                    match command {
                        EngineCommand::Start { search_id, entry } => {
                            if let Some((previous, token)) = active.take() {
                                digger_debug!("search {} replaced by {}", previous, search_id);
                                token.cancel();
                            }
                            let token = CancellationToken::new();
                            active = Some((search_id, token.clone()));

                            let backend = backend.clone();
                            let event_tx = event_tx.clone();
                            runtime.spawn(async move {
                                run_search(
                                    backend.as_ref(),
                                    poll_interval,
                                    search_id,
                                    entry,
                                    event_tx,
                                    token,
                                )
                                .await;
                            });
                        }
                        EngineCommand::Cancel { search_id } => {
                            if active.as_ref().is_some_and(|(id, _)| *id == search_id) {
                                if let Some((_, token)) = active.take() {
                                    token.cancel();
                                }
                            }
                        }
                    }
                }

                if let Some((_, token)) = active {
                    token.cancel();
                }
                runtime.shutdown_timeout(Duration::from_secs(1));
            })?;

        Ok((Self { cmd_tx }, event_rx))
    }

    pub fn start(&self, search_id: SearchId, entry: SearchEntry) {
        if self
            .cmd_tx
            .send(EngineCommand::Start { search_id, entry })
            .is_err()
        {
            digger_warn!("engine stopped; search {} not started", search_id);
        }
    }

    pub fn cancel(&self, search_id: SearchId) {
        let _ = self.cmd_tx.send(EngineCommand::Cancel { search_id });
    }
}

async fn run_search(
    backend: &dyn JobBackend,
    poll_interval: Duration,
    search_id: SearchId,
    entry: SearchEntry,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let sink = ChannelProgressSink::new(event_tx.clone());
    let poller = Poller::new(backend, poll_interval);
    let result = poller.run(search_id, &entry, &sink, &cancel).await;

    // A replaced or aborted search must not touch the display surface.
    if cancel.is_cancelled() || matches!(result, Err(PollError::Cancelled)) {
        digger_debug!("search {} cancelled", search_id);
        return;
    }
    if let Err(err) = &result {
        digger_info!("search {} failed: {}", search_id, err);
    }
    let _ = event_tx.send(EngineEvent::SearchCompleted { search_id, result });
}

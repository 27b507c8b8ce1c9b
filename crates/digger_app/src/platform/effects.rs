use std::sync::mpsc;
use std::thread;

use digger_core::{Effect, Msg, SearchEntry, SearchError};
use digger_engine::{EngineError, EngineEvent, EngineHandle, EngineSettings, PollError, SearchRequest};
use digger_logging::{digger_info, digger_warn};

use super::app::AppInput;

pub struct EffectRunner {
    engine: EngineHandle,
    input_tx: mpsc::Sender<AppInput>,
    open_browser: bool,
}

impl EffectRunner {
    pub fn new(
        settings: EngineSettings,
        input_tx: mpsc::Sender<AppInput>,
        open_browser: bool,
    ) -> Result<Self, EngineError> {
        let (engine, events) = EngineHandle::spawn(settings)?;
        spawn_event_loop(events, input_tx.clone());
        Ok(Self {
            engine,
            input_tx,
            open_browser,
        })
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartSearch { search_id, entry } => match engine_entry(entry) {
                    Ok(entry) => {
                        digger_info!("StartSearch search_id={} origin={}", search_id, entry.origin());
                        self.engine.start(search_id, entry);
                    }
                    Err(error) => {
                        let _ = self
                            .input_tx
                            .send(AppInput::Msg(Msg::SearchFailed { search_id, error }));
                    }
                },
                Effect::CancelSearch { search_id } => {
                    digger_info!("CancelSearch search_id={}", search_id);
                    self.engine.cancel(search_id);
                }
                Effect::OpenUrl { url } => self.open_url(&url),
            }
        }
    }

    fn open_url(&self, url: &str) {
        println!("YouTube: {url}");
        if !self.open_browser {
            return;
        }
        if let Err(err) = webbrowser::open(url) {
            digger_warn!("Could not open browser for {}: {}", url, err);
        }
    }
}

fn spawn_event_loop(events: mpsc::Receiver<EngineEvent>, input_tx: mpsc::Sender<AppInput>) {
    thread::spawn(move || {
        for event in events {
            let Some(msg) = event_to_msg(event) else {
                continue;
            };
            if input_tx.send(AppInput::Msg(msg)).is_err() {
                break;
            }
        }
    });
}

fn engine_entry(entry: SearchEntry) -> Result<digger_engine::SearchEntry, SearchError> {
    Ok(match entry {
        SearchEntry::Query { query, source } => digger_engine::SearchEntry::Query(
            SearchRequest::new(&query, source.as_str()).map_err(search_error)?,
        ),
        SearchEntry::ArtistReleases { artist_id } => {
            digger_engine::SearchEntry::ArtistReleases(artist_id)
        }
        SearchEntry::LabelReleases { label_id } => {
            digger_engine::SearchEntry::LabelReleases(label_id)
        }
    })
}

/// Cancelled searches produce no message.
fn event_to_msg(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::Progress(progress) => Some(Msg::SearchProgress {
            search_id: progress.search_id,
            percent: progress.percent,
            label: progress.label,
        }),
        EngineEvent::SearchCompleted { search_id, result } => match result {
            Ok(outcome) => Some(Msg::SearchSucceeded {
                search_id,
                payload: outcome.payload,
            }),
            Err(PollError::Cancelled) => None,
            Err(err) => Some(Msg::SearchFailed {
                search_id,
                error: search_error(err),
            }),
        },
    }
}

fn search_error(err: PollError) -> SearchError {
    match err {
        PollError::Validation => SearchError::Validation,
        PollError::Network(message) => SearchError::Network(message),
        PollError::Server(status) => SearchError::Server(status),
        PollError::Protocol(message) => SearchError::Protocol(message),
        PollError::JobFailed(message) => SearchError::JobFailed(message),
        PollError::Cancelled => SearchError::Network("cancelled".to_string()),
    }
}

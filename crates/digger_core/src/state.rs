use std::collections::BTreeSet;

use serde_json::Value;

use crate::view_model::{AppViewModel, ProgressView, ResultView};
use crate::{ResultSet, SearchError, SearchId, Source};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSearch {
    id: SearchId,
    origin: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    query: String,
    source: Source,
    last_search_id: SearchId,
    active: Option<ActiveSearch>,
    progress: Option<ProgressView>,
    error: Option<SearchError>,
    results: Option<ResultView>,
    expanded: BTreeSet<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            query: self.query.clone(),
            source: self.source,
            search_enabled: self.active.is_none(),
            active_search: self.active.as_ref().map(|active| active.id),
            progress: self.progress.clone(),
            error: self.error.clone(),
            results: self.results.clone(),
            expanded_releases: self.expanded.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_searching(&self) -> bool {
        self.active.is_some()
    }

    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    pub(crate) fn source(&self) -> Source {
        self.source
    }

    pub(crate) fn set_query(&mut self, query: String) {
        if self.query != query {
            self.query = query;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_source(&mut self, source: Source) {
        if self.source != source {
            self.source = source;
            self.mark_dirty();
        }
    }

    pub(crate) fn reject_input(&mut self, error: SearchError) {
        self.error = Some(error);
        self.mark_dirty();
    }

    /// Registers a new active search and resets the display surface for it.
    pub(crate) fn begin_search(&mut self, origin: Source, label: String) -> SearchId {
        self.last_search_id += 1;
        let id = self.last_search_id;
        self.active = Some(ActiveSearch { id, origin });
        self.progress = Some(ProgressView { percent: 10, label });
        self.error = None;
        self.results = None;
        self.expanded.clear();
        self.mark_dirty();
        id
    }

    /// Drops the active search, if any, and returns its id so the caller can
    /// cancel it.
    pub(crate) fn cancel_active(&mut self) -> Option<SearchId> {
        let active = self.active.take()?;
        self.progress = None;
        self.mark_dirty();
        Some(active.id)
    }

    pub(crate) fn apply_progress(&mut self, search_id: SearchId, percent: u8, label: String) {
        if !self.is_active(search_id) {
            return;
        }
        self.progress = Some(ProgressView {
            percent: percent.min(100),
            label,
        });
        self.mark_dirty();
    }

    /// The payload is interpreted by the origin recorded at submission.
    pub(crate) fn apply_success(&mut self, search_id: SearchId, payload: &Value) {
        let Some(active) = self.take_if_active(search_id) else {
            return;
        };
        self.results = Some(ResultView {
            origin: active.origin,
            set: ResultSet::from_payload(active.origin, payload),
        });
        self.progress = Some(ProgressView {
            percent: 100,
            label: "Search complete!".to_string(),
        });
        self.mark_dirty();
    }

    pub(crate) fn apply_failure(&mut self, search_id: SearchId, error: SearchError) {
        if self.take_if_active(search_id).is_none() {
            return;
        }
        self.error = Some(error);
        self.progress = None;
        self.mark_dirty();
    }

    pub(crate) fn toggle_tracklist(&mut self, release_id: &str) {
        if !self.expanded.remove(release_id) {
            self.expanded.insert(release_id.to_string());
        }
        self.mark_dirty();
    }

    fn is_active(&self, search_id: SearchId) -> bool {
        self.active.as_ref().is_some_and(|active| active.id == search_id)
    }

    fn take_if_active(&mut self, search_id: SearchId) -> Option<ActiveSearch> {
        if self.is_active(search_id) {
            self.active.take()
        } else {
            None
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

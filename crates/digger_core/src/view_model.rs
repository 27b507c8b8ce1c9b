use std::collections::BTreeSet;

use crate::{ResultSet, SearchError, SearchId, Source};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub query: String,
    pub source: Source,
    /// False while a search is in flight.
    pub search_enabled: bool,
    pub active_search: Option<SearchId>,
    pub progress: Option<ProgressView>,
    pub error: Option<SearchError>,
    pub results: Option<ResultView>,
    pub expanded_releases: BTreeSet<String>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressView {
    pub percent: u8,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub origin: Source,
    pub set: ResultSet,
}

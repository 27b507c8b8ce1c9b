use crate::{youtube_search_url, AppState, Effect, Msg, SearchEntry, SearchError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::QueryChanged(text) => {
            state.set_query(text);
            Vec::new()
        }
        Msg::SourceSelected(source) => {
            state.set_source(source);
            Vec::new()
        }
        Msg::SearchSubmitted => {
            let query = state.query().trim().to_string();
            if query.is_empty() {
                state.reject_input(SearchError::Validation);
                return (state, Vec::new());
            }
            let source = state.source();
            let label = format!("Starting {source} search...");
            start_search(&mut state, SearchEntry::Query { query, source }, label)
        }
        Msg::ViewArtistReleases { artist_id } => {
            let artist_id = artist_id.trim().to_string();
            if artist_id.is_empty() {
                state.reject_input(SearchError::Validation);
                return (state, Vec::new());
            }
            start_search(
                &mut state,
                SearchEntry::ArtistReleases { artist_id },
                "Loading releases...".to_string(),
            )
        }
        Msg::ViewLabelReleases { label_id } => {
            let label_id = label_id.trim().to_string();
            if label_id.is_empty() {
                state.reject_input(SearchError::Validation);
                return (state, Vec::new());
            }
            start_search(
                &mut state,
                SearchEntry::LabelReleases { label_id },
                "Loading releases...".to_string(),
            )
        }
        Msg::ToggleTracklist { release_id } => {
            state.toggle_tracklist(&release_id);
            Vec::new()
        }
        Msg::YoutubeSearchRequested { term } => youtube_search_url(&term)
            .map(|url| vec![Effect::OpenUrl { url }])
            .unwrap_or_default(),
        Msg::CancelClicked => state
            .cancel_active()
            .map(|search_id| vec![Effect::CancelSearch { search_id }])
            .unwrap_or_default(),
        Msg::SearchProgress {
            search_id,
            percent,
            label,
        } => {
            state.apply_progress(search_id, percent, label);
            Vec::new()
        }
        Msg::SearchSucceeded { search_id, payload } => {
            state.apply_success(search_id, &payload);
            Vec::new()
        }
        Msg::SearchFailed { search_id, error } => {
            state.apply_failure(search_id, error);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// At most one search is active: a running one is cancelled before the new
/// one starts.
fn start_search(state: &mut AppState, entry: SearchEntry, label: String) -> Vec<Effect> {
    let previous = state.cancel_active();
    let search_id = state.begin_search(entry.origin(), label);

    let mut effects = Vec::with_capacity(2);
    if let Some(previous) = previous {
        effects.push(Effect::CancelSearch {
            search_id: previous,
        });
    }
    effects.push(Effect::StartSearch { search_id, entry });
    effects
}

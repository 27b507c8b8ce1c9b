use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the search input.
    QueryChanged(String),
    /// User picked a data source.
    SourceSelected(crate::Source),
    /// User submitted the search form.
    SearchSubmitted,
    /// User asked for the releases of a Discogs artist.
    ViewArtistReleases { artist_id: String },
    /// User asked for the releases of a Discogs label.
    ViewLabelReleases { label_id: String },
    /// User expanded or collapsed a release tracklist.
    ToggleTracklist { release_id: String },
    /// User asked for a YouTube lookup of a track, artist or release.
    YoutubeSearchRequested { term: String },
    /// User aborted the running search.
    CancelClicked,
    /// Engine progress for a search.
    SearchProgress {
        search_id: crate::SearchId,
        percent: u8,
        label: String,
    },
    /// Engine delivered the final payload for a search.
    SearchSucceeded {
        search_id: crate::SearchId,
        payload: Value,
    },
    /// Engine gave up on a search.
    SearchFailed {
        search_id: crate::SearchId,
        error: crate::SearchError,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

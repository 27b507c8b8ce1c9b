use crate::{SearchEntry, SearchId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Run the full lifecycle for `entry` (submit, poll, fetch result).
    StartSearch {
        search_id: SearchId,
        entry: SearchEntry,
    },
    /// Stop polling for a search that is no longer active.
    CancelSearch { search_id: SearchId },
    /// Open an external page (YouTube playback lookup).
    OpenUrl { url: String },
}

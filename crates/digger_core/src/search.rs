use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier handed out by [`crate::AppState`] for every search it starts.
pub type SearchId = u64;

/// Backend data origin. Determines the form field sent to the backend and
/// which result shape the payload has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "discogs")]
    Discogs,
    #[default]
    #[serde(rename = "mixesdb")]
    MixesDb,
    #[serde(rename = "discogs-artist")]
    DiscogsArtist,
    #[serde(rename = "discogs-label")]
    DiscogsLabel,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Discogs => "discogs",
            Source::MixesDb => "mixesdb",
            Source::DiscogsArtist => "discogs-artist",
            Source::DiscogsLabel => "discogs-label",
        }
    }

    /// Sources a user can pick in the search form.
    pub fn selectable() -> [Source; 2] {
        [Source::Discogs, Source::MixesDb]
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source {0:?} (expected discogs or mixesdb)")]
pub struct UnknownSource(pub String);

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "discogs" => Ok(Source::Discogs),
            "mixesdb" => Ok(Source::MixesDb),
            "discogs-artist" => Ok(Source::DiscogsArtist),
            "discogs-label" => Ok(Source::DiscogsLabel),
            _ => Err(UnknownSource(s.to_string())),
        }
    }
}

/// Entry point of a search lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEntry {
    /// Free-text search against one source. `query` is trimmed and non-empty.
    Query { query: String, source: Source },
    ArtistReleases { artist_id: String },
    LabelReleases { label_id: String },
}

impl SearchEntry {
    /// Source tag used to pick the result renderer once the payload arrives.
    pub fn origin(&self) -> Source {
        match self {
            SearchEntry::Query { source, .. } => *source,
            SearchEntry::ArtistReleases { .. } => Source::DiscogsArtist,
            SearchEntry::LabelReleases { .. } => Source::DiscogsLabel,
        }
    }
}

/// Terminal failure of a search, shown in the error region.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Please enter a search term")]
    Validation,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error: {0}")]
    Server(u16),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Job failed: {0}")]
    JobFailed(String),
}

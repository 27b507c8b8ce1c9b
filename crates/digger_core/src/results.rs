use std::cmp::Reverse;

use chrono::NaiveDate;
use serde_json::Value;

use crate::Source;

const UNKNOWN_TRACK: &str = "Unknown track format";
const YOUTUBE_RESULTS: &str = "https://www.youtube.com/results";

/// Typed view of a job result payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultSet {
    Mixes {
        artist: Option<String>,
        mixes: Vec<Mix>,
    },
    Artists(Vec<Entity>),
    Labels(Vec<Entity>),
    Releases {
        owner: Option<String>,
        releases: Vec<Release>,
    },
    /// Payload had none of the recognised collections.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mix {
    pub title: String,
    pub date: Option<String>,
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Artist,
    Label,
}

/// A Discogs artist or label hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub id: String,
    pub name: String,
    pub profile: Option<String>,
    pub country: Option<String>,
    pub year: Option<String>,
    pub thumb: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub id: String,
    pub title: String,
    pub artist: Option<String>,
    pub year: Option<String>,
    pub format: Option<String>,
    pub label: Option<String>,
    pub country: Option<String>,
    pub thumb: String,
    pub tracklist: Vec<ReleaseTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTrack {
    pub position: String,
    pub name: String,
}

impl ResultSet {
    /// Interpret `payload` according to the source that produced it.
    pub fn from_payload(source: Source, payload: &Value) -> Self {
        match source {
            Source::MixesDb => parse_mixes(payload),
            Source::Discogs | Source::DiscogsArtist | Source::DiscogsLabel => {
                parse_discogs(payload)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ResultSet::Mixes { mixes, .. } => mixes.is_empty(),
            ResultSet::Artists(entities) | ResultSet::Labels(entities) => entities.is_empty(),
            ResultSet::Releases { releases, .. } => releases.is_empty(),
            ResultSet::Empty => true,
        }
    }
}

impl Entity {
    pub fn youtube_term(&self) -> &str {
        &self.name
    }
}

impl Release {
    pub fn youtube_term(&self) -> String {
        match &self.artist {
            Some(artist) => format!("{artist} {}", self.title),
            None => self.title.clone(),
        }
    }
}

/// Display text of one mix tracklist entry: plain strings verbatim, objects by
/// their `track` field, then their `id`.
pub fn track_display_text(entry: &Value) -> String {
    match entry {
        Value::String(text) => text.clone(),
        Value::Object(map) => ["track", "id"]
            .iter()
            .find_map(|key| text_field(map.get(*key)))
            .unwrap_or_else(|| UNKNOWN_TRACK.to_string()),
        _ => UNKNOWN_TRACK.to_string(),
    }
}

/// YouTube search page for `term`, or `None` for a blank term.
pub fn youtube_search_url(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    url::Url::parse_with_params(YOUTUBE_RESULTS, &[("search_query", term), ("autoplay", "1")])
        .ok()
        .map(String::from)
}

fn parse_mixes(payload: &Value) -> ResultSet {
    let artist = text_field(payload.get("artist"));
    let items = match payload {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("mixes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    let mut mixes: Vec<Mix> = items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| {
            let tracks = item
                .get("tracklist")
                .or_else(|| item.get("tracks"))
                .and_then(Value::as_array)
                .map(|entries| entries.iter().map(track_display_text).collect())
                .unwrap_or_default();
            Mix {
                title: text_field(item.get("title")).unwrap_or_else(|| "Untitled Mix".to_string()),
                date: text_field(item.get("date")),
                tracks,
            }
        })
        .collect();

    // Newest first; undated mixes keep their order after the dated ones.
    mixes.sort_by_key(|mix| Reverse(mix.date.as_deref().and_then(parse_date)));

    ResultSet::Mixes { artist, mixes }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()))
}

fn parse_discogs(payload: &Value) -> ResultSet {
    if let Some(artists) = payload.get("artists").and_then(Value::as_array) {
        return ResultSet::Artists(parse_entities(artists, EntityKind::Artist));
    }
    if let Some(labels) = payload.get("labels").and_then(Value::as_array) {
        return ResultSet::Labels(parse_entities(labels, EntityKind::Label));
    }
    if let Some(releases) = payload.get("releases").and_then(Value::as_array) {
        let owner = text_field(payload.get("artist_name"))
            .or_else(|| text_field(payload.get("label_name")));
        return ResultSet::Releases {
            owner,
            releases: releases.iter().filter(|r| r.is_object()).map(parse_release).collect(),
        };
    }
    ResultSet::Empty
}

fn parse_entities(items: &[Value], kind: EntityKind) -> Vec<Entity> {
    let default_thumb = match kind {
        EntityKind::Artist => "/static/images/default-artist.png",
        EntityKind::Label => "/static/images/default-label.png",
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| Entity {
            kind,
            id: text_field(item.get("id")).unwrap_or_default(),
            name: text_field(item.get("name")).unwrap_or_default(),
            profile: text_field(item.get("profile")),
            country: text_field(item.get("country")),
            year: text_field(item.get("year")),
            thumb: text_field(item.get("thumb")).unwrap_or_else(|| default_thumb.to_string()),
        })
        .collect()
}

fn parse_release(item: &Value) -> Release {
    let tracklist = item
        .get("tracklist")
        .and_then(Value::as_array)
        .map(|tracks| {
            tracks
                .iter()
                .enumerate()
                .map(|(index, track)| {
                    let title = text_field(track.get("title")).unwrap_or_default();
                    let name = match text_field(track.get("artist")) {
                        Some(artist) => format!("{artist} - {title}"),
                        None => title,
                    };
                    ReleaseTrack {
                        position: text_field(track.get("position"))
                            .unwrap_or_else(|| (index + 1).to_string()),
                        name,
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Release {
        id: text_field(item.get("id")).unwrap_or_default(),
        title: text_field(item.get("title")).unwrap_or_default(),
        artist: text_field(item.get("artist")),
        year: text_field(item.get("year")),
        format: text_field(item.get("format")),
        label: text_field(item.get("label")),
        country: text_field(item.get("country")),
        thumb: text_field(item.get("thumb"))
            .unwrap_or_else(|| "/static/images/default-release.png".to_string()),
        tracklist,
    }
}

/// Non-empty string or number rendered as text.
fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

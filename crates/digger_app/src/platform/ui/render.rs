use std::collections::BTreeSet;

use digger_core::{AppViewModel, Entity, Mix, ProgressView, Release, ResultSet, ResultView};

const BAR_WIDTH: usize = 20;

/// Text the terminal shows for one view model: a one-line status (progress or
/// error) and the result listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    pub status: Option<String>,
    pub body: Vec<String>,
}

pub fn render(view: &AppViewModel) -> Frame {
    let status = match (&view.error, &view.progress) {
        (Some(error), _) => Some(format!("Error: {error}")),
        (None, Some(progress)) => Some(progress_line(progress)),
        (None, None) => None,
    };
    let body = view
        .results
        .as_ref()
        .map(|results| result_lines(results, &view.expanded_releases))
        .unwrap_or_default();
    Frame { status, body }
}

pub fn progress_line(progress: &ProgressView) -> String {
    let percent = usize::from(progress.percent.min(100));
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}% {}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent,
        progress.label
    )
}

pub fn result_lines(results: &ResultView, expanded: &BTreeSet<String>) -> Vec<String> {
    let mut lines = Vec::new();
    match &results.set {
        ResultSet::Mixes { artist, mixes } => {
            lines.push(format!(
                "DJ Sets by {}",
                artist.as_deref().unwrap_or("Artist")
            ));
            if mixes.is_empty() {
                lines.push("No mixes found for this artist.".to_string());
            }
            for mix in mixes {
                push_mix(&mut lines, mix);
            }
        }
        ResultSet::Artists(artists) => {
            lines.push("Artists".to_string());
            if artists.is_empty() {
                lines.push("No artists found.".to_string());
            }
            for artist in artists {
                push_entity(&mut lines, artist, "/artist");
            }
        }
        ResultSet::Labels(labels) => {
            lines.push("Labels".to_string());
            if labels.is_empty() {
                lines.push("No labels found.".to_string());
            }
            for label in labels {
                push_entity(&mut lines, label, "/label");
            }
        }
        ResultSet::Releases { owner, releases } => {
            lines.push(format!(
                "Releases by {}",
                owner.as_deref().unwrap_or("Artist/Label")
            ));
            if releases.is_empty() {
                lines.push("No releases found.".to_string());
            }
            for release in releases {
                push_release(&mut lines, release, expanded.contains(&release.id));
            }
        }
        ResultSet::Empty => lines.push("No results found.".to_string()),
    }
    lines
}

fn push_mix(lines: &mut Vec<String>, mix: &Mix) {
    lines.push(String::new());
    match &mix.date {
        Some(date) => lines.push(format!("{} ({date})", mix.title)),
        None => lines.push(mix.title.clone()),
    }
    if mix.tracks.is_empty() {
        lines.push("  No tracklist available for this mix.".to_string());
        return;
    }
    lines.push(format!("  Tracklist ({} tracks)", mix.tracks.len()));
    for (index, track) in mix.tracks.iter().enumerate() {
        lines.push(format!("  {:>2}. {track}", index + 1));
    }
}

fn push_entity(lines: &mut Vec<String>, entity: &Entity, command: &str) {
    let details = joined(&[entity.country.as_deref(), entity.year.as_deref()]);
    if details.is_empty() {
        lines.push(format!("[{}] {}", entity.id, entity.name));
    } else {
        lines.push(format!("[{}] {} ({details})", entity.id, entity.name));
    }
    if let Some(profile) = entity.profile.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.push(format!("    {}", first_line(profile)));
    }
    if !entity.id.is_empty() {
        lines.push(format!("    releases: {command} {}", entity.id));
    }
}

fn push_release(lines: &mut Vec<String>, release: &Release, expanded: bool) {
    let mut heading = format!("[{}] {}", release.id, release.title);
    if let Some(artist) = &release.artist {
        heading.push_str(&format!(" - {artist}"));
    }
    if let Some(year) = &release.year {
        heading.push_str(&format!(" ({year})"));
    }
    lines.push(heading);

    let details = joined(&[
        release.format.as_deref(),
        release.label.as_deref(),
        release.country.as_deref(),
    ]);
    if !details.is_empty() {
        lines.push(format!("    {details}"));
    }
    lines.push(format!("    play: /youtube {}", release.youtube_term()));

    if release.tracklist.is_empty() {
        lines.push("    No tracklist available for this release.".to_string());
    } else if expanded {
        for track in &release.tracklist {
            lines.push(format!("    {:>3}  {}", track.position, track.name));
        }
    } else {
        lines.push(format!(
            "    {} tracks (/tracks {} to show)",
            release.tracklist.len(),
            release.id
        ));
    }
}

fn joined(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use digger_core::{EntityKind, ReleaseTrack, SearchError, Source};
    use pretty_assertions::assert_eq;

    fn view_with(set: ResultSet, origin: Source) -> AppViewModel {
        AppViewModel {
            results: Some(ResultView { origin, set }),
            ..AppViewModel::default()
        }
    }

    fn release(id: &str, tracks: usize) -> Release {
        Release {
            id: id.to_string(),
            title: "Hessle 01".to_string(),
            artist: Some("Pangaea".to_string()),
            year: Some("2009".to_string()),
            format: Some("Vinyl".to_string()),
            label: Some("Hessle Audio".to_string()),
            country: None,
            thumb: "/static/images/default-release.png".to_string(),
            tracklist: (1..=tracks)
                .map(|n| ReleaseTrack {
                    position: format!("A{n}"),
                    name: format!("Track {n}"),
                })
                .collect(),
        }
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        let line = progress_line(&ProgressView {
            percent: 50,
            label: "Processing results...".to_string(),
        });
        assert_eq!(line, "[##########----------]  50% Processing results...");
    }

    #[test]
    fn error_replaces_progress_in_status() {
        let view = AppViewModel {
            error: Some(SearchError::JobFailed("Unknown error".to_string())),
            progress: Some(ProgressView {
                percent: 40,
                label: "x".to_string(),
            }),
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view).status.as_deref(),
            Some("Error: Job failed: Unknown error")
        );
    }

    #[test]
    fn mixes_list_numbered_tracks_and_note_missing_tracklists() {
        let set = ResultSet::Mixes {
            artist: Some("Ben UFO".to_string()),
            mixes: vec![
                Mix {
                    title: "Set A".to_string(),
                    date: Some("2024-01-01".to_string()),
                    tracks: vec!["One".to_string(), "Two".to_string()],
                },
                Mix {
                    title: "Set B".to_string(),
                    date: None,
                    tracks: Vec::new(),
                },
            ],
        };
        let frame = render(&view_with(set, Source::MixesDb));
        assert_eq!(
            frame.body,
            vec![
                "DJ Sets by Ben UFO",
                "",
                "Set A (2024-01-01)",
                "  Tracklist (2 tracks)",
                "   1. One",
                "   2. Two",
                "",
                "Set B",
                "  No tracklist available for this mix.",
            ]
        );
    }

    #[test]
    fn empty_collections_have_their_own_message() {
        let frame = render(&view_with(ResultSet::Labels(Vec::new()), Source::Discogs));
        assert_eq!(frame.body, vec!["Labels", "No labels found."]);

        let frame = render(&view_with(ResultSet::Empty, Source::Discogs));
        assert_eq!(frame.body, vec!["No results found."]);
    }

    #[test]
    fn artists_show_details_and_release_command() {
        let artist = Entity {
            kind: EntityKind::Artist,
            id: "42".to_string(),
            name: "Joy Orbison".to_string(),
            profile: Some("UK producer.\nMore text".to_string()),
            country: Some("UK".to_string()),
            year: None,
            thumb: "/static/images/default-artist.png".to_string(),
        };
        let frame = render(&view_with(ResultSet::Artists(vec![artist]), Source::Discogs));
        assert_eq!(
            frame.body,
            vec![
                "Artists",
                "[42] Joy Orbison (UK)",
                "    UK producer.",
                "    releases: /artist 42",
            ]
        );
    }

    #[test]
    fn release_tracklist_shows_only_when_expanded() {
        let set = ResultSet::Releases {
            owner: Some("Hessle Audio".to_string()),
            releases: vec![release("1", 2), release("2", 0)],
        };
        let mut view = view_with(set, Source::DiscogsLabel);

        let collapsed = render(&view).body;
        assert!(collapsed.contains(&"    2 tracks (/tracks 1 to show)".to_string()));
        assert!(collapsed.contains(&"    No tracklist available for this release.".to_string()));

        view.expanded_releases.insert("1".to_string());
        let expanded = render(&view).body;
        assert!(expanded.contains(&"     A1  Track 1".to_string()));
        assert!(expanded.contains(&"     A2  Track 2".to_string()));
        assert_eq!(expanded[0], "Releases by Hessle Audio");
        assert_eq!(expanded[1], "[1] Hessle 01 - Pangaea (2009)");
        assert_eq!(expanded[2], "    Vinyl, Hessle Audio");
        assert_eq!(expanded[3], "    play: /youtube Pangaea Hessle 01");
    }
}

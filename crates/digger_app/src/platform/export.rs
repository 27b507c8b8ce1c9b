//! Plain-text export of the current results.
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use digger_core::{ResultSet, ResultView};
use digger_engine::{AtomicFileWriter, PersistError};
use digger_logging::digger_info;

/// Writes `results` to `path`, replacing any existing file.
pub fn export_results(
    path: &Path,
    results: &ResultView,
    exported_at: &str,
) -> Result<PathBuf, PersistError> {
    let content = render_export(results, exported_at);
    let written = AtomicFileWriter::new(path.to_path_buf()).write(&content)?;
    digger_info!("Exported {} results to {:?}", results.origin, written);
    Ok(written)
}

pub fn render_export(results: &ResultView, exported_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# digger export ({}) {exported_at}", results.origin);

    match &results.set {
        ResultSet::Mixes { artist, mixes } => {
            if let Some(artist) = artist {
                let _ = writeln!(out, "# artist: {artist}");
            }
            for mix in mixes {
                out.push('\n');
                let _ = match &mix.date {
                    Some(date) => writeln!(out, "## {} ({date})", mix.title),
                    None => writeln!(out, "## {}", mix.title),
                };
                for (index, track) in mix.tracks.iter().enumerate() {
                    let _ = writeln!(out, "{}. {track}", index + 1);
                }
            }
        }
        ResultSet::Artists(entities) | ResultSet::Labels(entities) => {
            out.push('\n');
            for entity in entities {
                let _ = writeln!(out, "{}\t{}", entity.id, entity.name);
            }
        }
        ResultSet::Releases { owner, releases } => {
            if let Some(owner) = owner {
                let _ = writeln!(out, "# releases by: {owner}");
            }
            for release in releases {
                out.push('\n');
                let _ = match &release.artist {
                    Some(artist) => writeln!(out, "## {} - {}", artist, release.title),
                    None => writeln!(out, "## {}", release.title),
                };
                for track in &release.tracklist {
                    let _ = writeln!(out, "{} {}", track.position, track.name);
                }
            }
        }
        ResultSet::Empty => {}
    }
    out
}

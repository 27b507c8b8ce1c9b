use std::path::PathBuf;

use digger_core::{Msg, Source};

pub const HELP: &str = "\
Type a search term to search the current source.
  /source discogs|mixesdb  switch source
  /artist ID               list releases of a Discogs artist
  /label ID                list releases of a Discogs label
  /tracks ID               show or hide the tracklist of a release
  /youtube TERM            look a track up on YouTube
  /export FILE             write the current results to FILE
  /cancel                  cancel the running search
  /quit                    leave";

/// One line of interactive input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Vec<Msg>),
    Export(PathBuf),
    Help,
    Quit,
    Invalid(String),
    Nothing,
}

pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Nothing;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Dispatch(vec![
            Msg::QueryChanged(line.to_string()),
            Msg::SearchSubmitted,
        ]);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match (name, arg) {
        ("quit" | "exit" | "q", _) => Command::Quit,
        ("help" | "h", _) => Command::Help,
        ("cancel", _) => Command::Dispatch(vec![Msg::CancelClicked]),
        ("source", arg) => match arg.parse::<Source>() {
            Ok(source) if Source::selectable().contains(&source) => {
                Command::Dispatch(vec![Msg::SourceSelected(source)])
            }
            Ok(source) => Command::Invalid(format!("{source} cannot be searched directly")),
            Err(err) => Command::Invalid(err.to_string()),
        },
        (_, "") => Command::Invalid(format!("/{name} needs an argument (try /help)")),
        ("artist", id) => Command::Dispatch(vec![Msg::ViewArtistReleases {
            artist_id: id.to_string(),
        }]),
        ("label", id) => Command::Dispatch(vec![Msg::ViewLabelReleases {
            label_id: id.to_string(),
        }]),
        ("tracks", id) => Command::Dispatch(vec![Msg::ToggleTracklist {
            release_id: id.to_string(),
        }]),
        ("youtube" | "yt", term) => Command::Dispatch(vec![Msg::YoutubeSearchRequested {
            term: term.to_string(),
        }]),
        ("export", path) => Command::Export(PathBuf::from(path)),
        _ => Command::Invalid(format!("unknown command /{name} (try /help)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(
            parse_line("  Ben UFO  "),
            Command::Dispatch(vec![
                Msg::QueryChanged("Ben UFO".to_string()),
                Msg::SearchSubmitted
            ])
        );
        assert_eq!(parse_line("   "), Command::Nothing);
    }

    #[test]
    fn source_accepts_only_selectable_sources() {
        assert_eq!(
            parse_line("/source Discogs"),
            Command::Dispatch(vec![Msg::SourceSelected(Source::Discogs)])
        );
        assert!(matches!(parse_line("/source discogs-label"), Command::Invalid(_)));
        assert!(matches!(parse_line("/source youtube"), Command::Invalid(_)));
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(
            parse_line("/artist 42"),
            Command::Dispatch(vec![Msg::ViewArtistReleases {
                artist_id: "42".to_string()
            }])
        );
        assert_eq!(
            parse_line("/youtube Pangaea - Router"),
            Command::Dispatch(vec![Msg::YoutubeSearchRequested {
                term: "Pangaea - Router".to_string()
            }])
        );
        assert_eq!(
            parse_line("/export out/sets.txt"),
            Command::Export(PathBuf::from("out/sets.txt"))
        );
        assert!(matches!(parse_line("/label"), Command::Invalid(_)));
        assert!(matches!(parse_line("/dance now"), Command::Invalid(_)));
    }

    #[test]
    fn control_commands() {
        assert_eq!(parse_line("/quit"), Command::Quit);
        assert_eq!(parse_line("/help"), Command::Help);
        assert_eq!(parse_line("/cancel"), Command::Dispatch(vec![Msg::CancelClicked]));
    }
}

//! Digger core: pure search-session state machine, typed result payloads and
//! view-model helpers.
mod effect;
mod msg;
mod results;
mod search;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use results::{
    track_display_text, youtube_search_url, Entity, EntityKind, Mix, Release, ReleaseTrack,
    ResultSet,
};
pub use search::{SearchEntry, SearchError, SearchId, Source, UnknownSource};
pub use state::AppState;
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, ResultView};

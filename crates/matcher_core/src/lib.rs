//! Research matcher core: pure state machine and view-model helpers.
mod effect;
mod form;
mod msg;
mod poller;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, SearchQuery};
pub use form::{
    min_score_from_percent, IngestForm, SearchForm, Tab, LIMIT_DEFAULT, LIMIT_MAX, LIMIT_MIN,
    SCORE_PERCENT_DEFAULT, SCORE_PERCENT_MAX,
};
pub use msg::Msg;
pub use poller::{
    percent_complete, JobId, JobSnapshot, JobState, PollSettings, PollTicket, Poller,
    ProgressPhase, ProgressState, POLL_INTERVAL, POLL_RETRY_DELAY,
};
pub use state::{
    AppSettings, AppState, IngestStatus, MatchResult, PaperHit, RequestId, SearchPhase,
    EMPTY_PROFILE_TEXT, INGEST_ERROR_TEXT, NO_MATCHES_TEXT, SEARCH_ERROR_TEXT,
};
pub use update::update;
pub use view_model::{AppViewModel, ProgressView, SearchView};

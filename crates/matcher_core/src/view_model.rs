use crate::{IngestStatus, MatchResult, ProgressPhase, SearchPhase, Tab};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub active_tab: Tab,
    pub profile_text: String,
    pub limit: u32,
    pub limit_label: String,
    pub score_percent: u8,
    pub score_label: String,
    pub search: SearchView,
    pub university: String,
    pub dept_url: String,
    pub ingest_status: IngestStatus,
    pub progress: ProgressView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchView {
    pub phase: SearchPhase,
    pub results: Vec<MatchResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressView {
    pub job_id: Option<String>,
    /// Current lineage may still issue requests.
    pub polling: bool,
    pub phase: ProgressPhase,
    pub percent: u32,
    pub university: String,
    pub processed_faculty: u32,
    pub total_faculty: u32,
    pub consecutive_failures: u32,
    pub unrecognized_status: Option<String>,
}

impl ProgressView {
    pub fn is_visible(&self) -> bool {
        self.phase != ProgressPhase::Hidden
    }
}

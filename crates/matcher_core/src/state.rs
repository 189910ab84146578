use matcher_logging::matcher_warn;

use crate::form::{validate_ingest, IngestForm, SearchForm};
use crate::poller::{JobId, JobSnapshot, PollSettings, PollTicket, Poller};
use crate::view_model::{AppViewModel, ProgressView, SearchView};
use crate::{Effect, SearchQuery, Tab};

pub type RequestId = u64;

pub const NO_MATCHES_TEXT: &str = "No matches found. Try ingesting more data.";
pub const SEARCH_ERROR_TEXT: &str = "Error connecting to API. Ensure backend is running.";
pub const EMPTY_PROFILE_TEXT: &str = "Please describe your research interests.";
pub const INGEST_ERROR_TEXT: &str = "Failed to queue ingestion job.";

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub professor: String,
    pub university: String,
    pub email: Option<String>,
    pub max_score: f64,
    pub papers: Vec<PaperHit>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaperHit {
    pub title: String,
    pub url: Option<String>,
    pub year: Option<i32>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPhase {
    #[default]
    Idle,
    Loading,
    Results,
    NoMatches,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IngestStatus {
    #[default]
    Idle,
    Triggering,
    Queued { job_id: JobId },
    Failed(String),
}

/// Initial slider positions and poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    pub default_limit: u32,
    pub default_score_percent: u8,
    pub poll: PollSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_limit: crate::form::LIMIT_DEFAULT,
            default_score_percent: crate::form::SCORE_PERCENT_DEFAULT,
            poll: PollSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    tab: Tab,
    search_form: SearchForm,
    search_phase: SearchPhase,
    results: Vec<MatchResult>,
    last_search: RequestId,
    ingest_form: IngestForm,
    ingest_status: IngestStatus,
    poller: Poller,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        Self {
            search_form: SearchForm::new(settings.default_limit, settings.default_score_percent),
            poller: Poller::new(settings.poll),
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let progress = self.poller.progress();
        AppViewModel {
            active_tab: self.tab,
            profile_text: self.search_form.profile_text.clone(),
            limit: self.search_form.limit(),
            limit_label: self.search_form.limit_label(),
            score_percent: self.search_form.score_percent(),
            score_label: self.search_form.score_label(),
            search: SearchView {
                phase: self.search_phase.clone(),
                results: self.results.clone(),
            },
            university: self.ingest_form.university.clone(),
            dept_url: self.ingest_form.dept_url.clone(),
            ingest_status: self.ingest_status.clone(),
            progress: ProgressView {
                job_id: self.poller.active_job().map(|id| id.to_string()),
                polling: self.poller.is_polling(),
                phase: progress.phase,
                percent: progress.percent,
                university: progress.university.clone(),
                processed_faculty: progress.processed_faculty,
                total_faculty: progress.total_faculty,
                consecutive_failures: progress.consecutive_failures,
                unrecognized_status: progress.unrecognized_status.clone(),
            },
            dirty: self.dirty,
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn poller(&self) -> &Poller {
        &self.poller
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn select_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_profile_text(&mut self, text: String) {
        if self.search_form.profile_text != text {
            self.search_form.profile_text = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_limit(&mut self, limit: u32) {
        let before = self.search_form.limit();
        self.search_form.set_limit(limit);
        if self.search_form.limit() != before {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_score_percent(&mut self, percent: u8) {
        let before = self.search_form.score_percent();
        self.search_form.set_score_percent(percent);
        if self.search_form.score_percent() != before {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_university(&mut self, university: String) {
        if self.ingest_form.university != university {
            self.ingest_form.university = university;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_dept_url(&mut self, dept_url: String) {
        if self.ingest_form.dept_url != dept_url {
            self.ingest_form.dept_url = dept_url;
            self.mark_dirty();
        }
    }

    /// Starts a search for the current form, or returns the alert text.
    pub(crate) fn begin_search(&mut self) -> Result<(RequestId, SearchQuery), String> {
        let text = self.search_form.profile_text.trim();
        if text.is_empty() {
            return Err(EMPTY_PROFILE_TEXT.to_string());
        }
        let query = SearchQuery {
            profile_text: text.to_string(),
            limit: self.search_form.limit(),
            min_score: self.search_form.min_score(),
        };
        self.last_search += 1;
        self.results.clear();
        self.search_phase = SearchPhase::Loading;
        self.mark_dirty();
        Ok((self.last_search, query))
    }

    /// Only the most recent search may render.
    pub(crate) fn finish_search(
        &mut self,
        request_id: RequestId,
        result: Result<Vec<MatchResult>, String>,
    ) -> bool {
        if request_id != self.last_search || self.search_phase != SearchPhase::Loading {
            return false;
        }
        match result {
            Ok(results) if results.is_empty() => {
                self.search_phase = SearchPhase::NoMatches;
            }
            Ok(results) => {
                self.results = results;
                self.search_phase = SearchPhase::Results;
            }
            Err(message) => {
                matcher_warn!("Search {} failed: {}", request_id, message);
                self.search_phase = SearchPhase::Failed(SEARCH_ERROR_TEXT.to_string());
            }
        }
        self.mark_dirty();
        true
    }

    /// Validates the ingest form, or returns the alert text.
    pub(crate) fn begin_ingest(&mut self) -> Result<(String, String), String> {
        let (university, dept_url) = validate_ingest(&self.ingest_form)?;
        self.ingest_status = IngestStatus::Triggering;
        self.mark_dirty();
        Ok((university, dept_url))
    }

    pub(crate) fn ingest_accepted(&mut self, task_id: &str) -> Vec<Effect> {
        let Some(job_id) = JobId::new(task_id) else {
            self.ingest_failed();
            return Vec::new();
        };
        self.ingest_status = IngestStatus::Queued {
            job_id: job_id.clone(),
        };
        self.mark_dirty();
        self.start_polling(job_id)
    }

    pub(crate) fn ingest_failed(&mut self) {
        self.ingest_status = IngestStatus::Failed(INGEST_ERROR_TEXT.to_string());
        self.mark_dirty();
    }

    pub(crate) fn start_polling(&mut self, job_id: JobId) -> Vec<Effect> {
        self.mark_dirty();
        self.poller.start(job_id)
    }

    pub(crate) fn poll_due(&mut self, ticket: PollTicket) -> Vec<Effect> {
        self.poller.poll_due(ticket)
    }

    pub(crate) fn apply_job_status(
        &mut self,
        ticket: PollTicket,
        result: Result<JobSnapshot, String>,
    ) -> Vec<Effect> {
        let before = self.poller.progress().clone();
        let effects = self.poller.apply_status(ticket, result);
        if *self.poller.progress() != before {
            self.mark_dirty();
        }
        effects
    }
}

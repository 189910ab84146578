//! Job progress poller: one active lineage at a time, fenced by ticket.
//!
//! A lineage is the sequence of poll cycles started by one call to
//! [`Poller::start`]. Every cycle carries a [`PollTicket`] captured by value;
//! the poller only acts on a ticket that matches the current session, so
//! timers and responses from superseded lineages fall through as no-ops.

use std::fmt;
use std::time::Duration;

use matcher_logging::{matcher_debug, matcher_info, matcher_warn};

use crate::Effect;

/// Delay between successful non-terminal polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);
/// Delay before retrying a poll whose request failed.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub retry_delay: Duration,
    /// `None` retries transient failures forever.
    pub max_consecutive_failures: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            retry_delay: POLL_RETRY_DELAY,
            max_consecutive_failures: None,
        }
    }
}

/// Identifier of a backend ingestion job. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(String);

impl JobId {
    /// Returns `None` for blank identifiers. Non-blank ids are kept verbatim.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one poll cycle: the job it polls and the lineage it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PollTicket {
    pub job_id: JobId,
    pub lineage: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
    Unrecognized(String),
}

impl JobState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => JobState::Queued,
            "processing" => JobState::Processing,
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            other => JobState::Unrecognized(other.to_string()),
        }
    }
}

/// Job status as reported by the backend for one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub state: JobState,
    pub processed_faculty: u32,
    pub total_faculty: u32,
    pub university: String,
}

/// `round(100 * processed / total)`, or 0 when `total` is 0.
///
/// Rounds half up like the backend's web client. Values above 100 are passed
/// through when upstream reports `processed > total`.
pub fn percent_complete(processed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let processed = u64::from(processed);
    let total = u64::from(total);
    let rounded = (200 * processed + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressPhase {
    /// No lineage has been started yet.
    #[default]
    Hidden,
    /// Lineage started, first response not yet applied.
    Starting,
    Queued,
    Processing,
    Completed,
    /// Backend reported failure; the processed part stays searchable.
    PartiallyIndexed,
    /// Retry cap reached without a terminal status.
    Stalled,
}

impl ProgressPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProgressPhase::Completed | ProgressPhase::PartiallyIndexed | ProgressPhase::Stalled
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub phase: ProgressPhase,
    pub percent: u32,
    pub university: String,
    pub processed_faculty: u32,
    pub total_faculty: u32,
    pub consecutive_failures: u32,
    /// Raw status of the latest response when the backend sent one we don't know.
    pub unrecognized_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PollerSession {
    ticket: PollTicket,
    finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Poller {
    settings: PollSettings,
    session: Option<PollerSession>,
    next_lineage: u64,
    progress: ProgressState,
}

impl Poller {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> PollSettings {
        self.settings
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn active_job(&self) -> Option<&JobId> {
        self.session.as_ref().map(|session| &session.ticket.job_id)
    }

    /// True while the current lineage may still issue requests.
    pub fn is_polling(&self) -> bool {
        self.session.as_ref().is_some_and(|session| !session.finished)
    }

    pub fn is_current(&self, ticket: &PollTicket) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| !session.finished && session.ticket == *ticket)
    }

    /// Replaces the active session and issues the first fetch immediately.
    pub fn start(&mut self, job_id: JobId) -> Vec<Effect> {
        self.next_lineage += 1;
        let ticket = PollTicket {
            job_id,
            lineage: self.next_lineage,
        };
        matcher_info!(
            "Polling job {} (lineage {})",
            ticket.job_id,
            ticket.lineage
        );
        self.session = Some(PollerSession {
            ticket: ticket.clone(),
            finished: false,
        });
        self.progress = ProgressState {
            phase: ProgressPhase::Starting,
            ..ProgressState::default()
        };

        let mut effects = vec![Effect::CancelPendingPoll];
        effects.extend(self.poll_due(ticket));
        effects
    }

    /// A scheduled cycle fired. Ghost cycles stop here without a request.
    pub fn poll_due(&mut self, ticket: PollTicket) -> Vec<Effect> {
        if !self.is_current(&ticket) {
            matcher_debug!(
                "Dropping ghost poll for job {} (lineage {})",
                ticket.job_id,
                ticket.lineage
            );
            return Vec::new();
        }
        vec![Effect::FetchJobStatus { ticket }]
    }

    /// Applies the outcome of a status request issued for `ticket`.
    pub fn apply_status(
        &mut self,
        ticket: PollTicket,
        result: Result<JobSnapshot, String>,
    ) -> Vec<Effect> {
        if !self.is_current(&ticket) {
            matcher_debug!(
                "Discarding stale status for job {} (lineage {})",
                ticket.job_id,
                ticket.lineage
            );
            return Vec::new();
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(message) => return self.apply_failure(ticket, &message),
        };

        self.progress.consecutive_failures = 0;
        self.progress.percent =
            percent_complete(snapshot.processed_faculty, snapshot.total_faculty);
        self.progress.processed_faculty = snapshot.processed_faculty;
        self.progress.total_faculty = snapshot.total_faculty;
        self.progress.university = snapshot.university;
        self.progress.unrecognized_status = None;

        match snapshot.state {
            JobState::Queued => {
                self.progress.phase = ProgressPhase::Queued;
                self.schedule(ticket, self.settings.interval)
            }
            JobState::Processing => {
                self.progress.phase = ProgressPhase::Processing;
                self.schedule(ticket, self.settings.interval)
            }
            JobState::Completed => {
                matcher_info!("Job {} completed", ticket.job_id);
                self.progress.phase = ProgressPhase::Completed;
                self.progress.percent = 100;
                self.finish();
                Vec::new()
            }
            JobState::Failed => {
                matcher_info!(
                    "Job {} failed after {}/{} faculty",
                    ticket.job_id,
                    self.progress.processed_faculty,
                    self.progress.total_faculty
                );
                self.progress.phase = ProgressPhase::PartiallyIndexed;
                self.finish();
                Vec::new()
            }
            JobState::Unrecognized(status) => {
                matcher_warn!(
                    "Job {} reported unknown status {:?}; polling continues",
                    ticket.job_id,
                    status
                );
                self.progress.unrecognized_status = Some(status);
                self.schedule(ticket, self.settings.interval)
            }
        }
    }

    fn apply_failure(&mut self, ticket: PollTicket, message: &str) -> Vec<Effect> {
        self.progress.consecutive_failures = self.progress.consecutive_failures.saturating_add(1);
        matcher_warn!(
            "Polling job {} failed ({} in a row): {}",
            ticket.job_id,
            self.progress.consecutive_failures,
            message
        );
        if let Some(cap) = self.settings.max_consecutive_failures {
            if self.progress.consecutive_failures >= cap {
                self.progress.phase = ProgressPhase::Stalled;
                self.finish();
                return Vec::new();
            }
        }
        self.schedule(ticket, self.settings.retry_delay)
    }

    fn schedule(&self, ticket: PollTicket, delay: Duration) -> Vec<Effect> {
        vec![Effect::SchedulePoll { ticket, delay }]
    }

    fn finish(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.finished = true;
        }
    }
}

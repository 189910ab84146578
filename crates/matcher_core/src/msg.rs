#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User switched tabs.
    TabSelected(crate::Tab),
    /// User edited the research profile text.
    ProfileTextChanged(String),
    /// "Max papers" slider moved.
    LimitChanged(u32),
    /// Similarity threshold slider moved, in percent.
    ScoreThresholdChanged(u8),
    /// User clicked Search.
    SearchClicked,
    /// Backend answered a search request.
    SearchCompleted {
        request_id: crate::RequestId,
        result: Result<Vec<crate::MatchResult>, String>,
    },
    UniversityChanged(String),
    DeptUrlChanged(String),
    /// User clicked the ingest button.
    IngestClicked,
    /// Backend accepted the ingest request and returned a task id.
    IngestAccepted { task_id: String },
    /// Ingest request failed before a job existed.
    IngestRejected { message: String },
    /// Follow an existing job without triggering ingestion.
    WatchJob(String),
    /// "Search partial results" affordance shown while a job runs.
    SearchPartialResultsClicked,
    /// A scheduled poll timer fired.
    PollDue(crate::PollTicket),
    /// A job status request finished, successfully or not.
    JobStatusReceived {
        ticket: crate::PollTicket,
        result: Result<crate::JobSnapshot, String>,
    },
}

use std::time::Duration;

use crate::{PollTicket, RequestId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Blocking notice for the user; no request was issued.
    Alert { message: String },
    SubmitSearch {
        request_id: RequestId,
        query: SearchQuery,
    },
    TriggerIngest { university: String, dept_url: String },
    /// Drop the timer of the previous lineage, if any is pending.
    CancelPendingPoll,
    FetchJobStatus { ticket: PollTicket },
    SchedulePoll { ticket: PollTicket, delay: Duration },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub profile_text: String,
    pub limit: u32,
    pub min_score: f64,
}

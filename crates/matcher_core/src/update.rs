use matcher_logging::matcher_info;

use crate::{AppState, Effect, JobId, Msg, Tab};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::TabSelected(tab) => {
            state.select_tab(tab);
            Vec::new()
        }
        Msg::SearchPartialResultsClicked => {
            state.select_tab(Tab::Search);
            Vec::new()
        }
        Msg::ProfileTextChanged(text) => {
            state.set_profile_text(text);
            Vec::new()
        }
        Msg::LimitChanged(limit) => {
            state.set_limit(limit);
            Vec::new()
        }
        Msg::ScoreThresholdChanged(percent) => {
            state.set_score_percent(percent);
            Vec::new()
        }
        Msg::SearchClicked => match state.begin_search() {
            Ok((request_id, query)) => vec![Effect::SubmitSearch { request_id, query }],
            Err(message) => vec![Effect::Alert { message }],
        },
        Msg::SearchCompleted { request_id, result } => {
            state.finish_search(request_id, result);
            Vec::new()
        }
        Msg::UniversityChanged(university) => {
            state.set_university(university);
            Vec::new()
        }
        Msg::DeptUrlChanged(dept_url) => {
            state.set_dept_url(dept_url);
            Vec::new()
        }
        Msg::IngestClicked => match state.begin_ingest() {
            Ok((university, dept_url)) => vec![Effect::TriggerIngest {
                university,
                dept_url,
            }],
            Err(message) => vec![Effect::Alert { message }],
        },
        Msg::IngestAccepted { task_id } => state.ingest_accepted(&task_id),
        Msg::IngestRejected { message } => {
            matcher_info!("Ingest request rejected: {}", message);
            state.ingest_failed();
            Vec::new()
        }
        Msg::WatchJob(raw) => match JobId::new(raw) {
            Some(job_id) => state.start_polling(job_id),
            None => vec![Effect::Alert {
                message: "Job id must not be empty.".to_string(),
            }],
        },
        Msg::PollDue(ticket) => state.poll_due(ticket),
        Msg::JobStatusReceived { ticket, result } => state.apply_job_status(ticket, result),
    };

    (state, effects)
}

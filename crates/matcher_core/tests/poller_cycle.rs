use std::sync::Once;
use std::time::Duration;

use matcher_core::{
    update, AppSettings, AppState, Effect, JobSnapshot, JobState, Msg, PollSettings, PollTicket,
    ProgressPhase, POLL_INTERVAL, POLL_RETRY_DELAY,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(matcher_logging::initialize_for_tests);
}

fn snapshot(state: JobState, processed: u32, total: u32) -> JobSnapshot {
    JobSnapshot {
        state,
        processed_faculty: processed,
        total_faculty: total,
        university: "X".to_string(),
    }
}

fn watch(state: AppState, job: &str) -> (AppState, PollTicket) {
    let (state, effects) = update(state, Msg::WatchJob(job.to_string()));
    let ticket = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::FetchJobStatus { ticket } => Some(ticket.clone()),
            _ => None,
        })
        .expect("first fetch is issued immediately");
    (state, ticket)
}

fn receive(
    state: AppState,
    ticket: &PollTicket,
    result: Result<JobSnapshot, String>,
) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::JobStatusReceived {
            ticket: ticket.clone(),
            result,
        },
    )
}

#[test]
fn start_resets_progress_and_fetches_without_delay() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::WatchJob("job-1".to_string()));
    let view = state.view();

    assert_eq!(view.progress.phase, ProgressPhase::Starting);
    assert_eq!(view.progress.percent, 0);
    assert_eq!(view.progress.job_id.as_deref(), Some("job-1"));
    assert!(view.progress.polling);
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::CancelPendingPoll);
    assert!(matches!(effects[1], Effect::FetchJobStatus { .. }));
}

#[test]
fn processing_shows_percent_and_schedules_next_poll() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");

    let (state, effects) = receive(state, &ticket, Ok(snapshot(JobState::Processing, 3, 10)));
    let progress = state.view().progress;

    assert_eq!(progress.percent, 30);
    assert_eq!(progress.phase, ProgressPhase::Processing);
    assert_eq!(progress.university, "X");
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket: ticket.clone(),
            delay: POLL_INTERVAL,
        }]
    );

    let (state, effects) = receive(
        state,
        &ticket,
        Ok(snapshot(JobState::Completed, 10, 10)),
    );
    let progress = state.view().progress;
    assert_eq!(progress.percent, 100);
    assert_eq!(progress.phase, ProgressPhase::Completed);
    assert!(!progress.polling);
    assert!(effects.is_empty());

    // Nothing further is issued for a finished lineage.
    let (_state, effects) = update(state, Msg::PollDue(ticket));
    assert!(effects.is_empty());
}

#[test]
fn queued_schedules_exactly_one_poll() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");

    let (state, effects) = receive(state, &ticket, Ok(snapshot(JobState::Queued, 0, 0)));

    assert_eq!(state.view().progress.phase, ProgressPhase::Queued);
    assert_eq!(state.view().progress.percent, 0);
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket: ticket.clone(),
            delay: POLL_INTERVAL,
        }]
    );

    let (_state, effects) = update(state, Msg::PollDue(ticket.clone()));
    assert_eq!(effects, vec![Effect::FetchJobStatus { ticket }]);
}

#[test]
fn failed_job_is_terminal_and_keeps_processed_count() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");

    let (state, effects) = receive(state, &ticket, Ok(snapshot(JobState::Failed, 4, 9)));
    let progress = state.view().progress;

    assert!(effects.is_empty());
    assert_eq!(progress.phase, ProgressPhase::PartiallyIndexed);
    assert_eq!(progress.processed_faculty, 4);
    assert_eq!(progress.total_faculty, 9);
    assert_eq!(progress.percent, 44);
    assert!(!progress.polling);
}

#[test]
fn transport_failure_retries_after_backoff() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");
    let (state, _) = receive(state, &ticket, Ok(snapshot(JobState::Processing, 2, 10)));

    let (state, effects) = receive(state, &ticket, Err("connection refused".to_string()));
    let view = state.view();

    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket: ticket.clone(),
            delay: POLL_RETRY_DELAY,
        }]
    );
    assert_eq!(view.progress.job_id.as_deref(), Some("job-1"));
    assert_eq!(view.progress.phase, ProgressPhase::Processing);
    assert_eq!(view.progress.percent, 20);
    assert_eq!(view.progress.consecutive_failures, 1);
    assert!(view.progress.polling);
}

#[test]
fn failures_retry_forever_by_default() {
    init_logging();
    let (mut state, ticket) = watch(AppState::new(), "job-1");

    for _ in 0..50 {
        let (next, effects) = receive(state, &ticket, Err("http status 404".to_string()));
        assert_eq!(effects.len(), 1);
        state = next;
    }
    assert!(state.view().progress.polling);
    assert_eq!(state.view().progress.consecutive_failures, 50);
}

#[test]
fn failure_cap_stalls_the_lineage() {
    init_logging();
    let settings = AppSettings {
        poll: PollSettings {
            max_consecutive_failures: Some(2),
            ..PollSettings::default()
        },
        ..AppSettings::default()
    };
    let (state, ticket) = watch(AppState::with_settings(settings), "job-1");

    let (state, effects) = receive(state, &ticket, Err("timeout".to_string()));
    assert_eq!(effects.len(), 1);
    let (state, effects) = receive(state, &ticket, Err("timeout".to_string()));
    assert!(effects.is_empty());
    assert_eq!(state.view().progress.phase, ProgressPhase::Stalled);
    assert!(!state.view().progress.polling);
}

#[test]
fn success_resets_failure_count() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");
    let (state, _) = receive(state, &ticket, Err("timeout".to_string()));
    let (state, _) = receive(state, &ticket, Ok(snapshot(JobState::Queued, 0, 5)));

    assert_eq!(state.view().progress.consecutive_failures, 0);
}

#[test]
fn unknown_status_keeps_polling_at_normal_interval() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");
    let (state, _) = receive(state, &ticket, Ok(snapshot(JobState::Processing, 1, 4)));

    let (state, effects) = receive(
        state,
        &ticket,
        Ok(snapshot(JobState::Unrecognized("paused".to_string()), 2, 4)),
    );

    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket,
            delay: POLL_INTERVAL,
        }]
    );
    let progress = state.view().progress;
    assert_eq!(progress.phase, ProgressPhase::Processing);
    assert_eq!(progress.percent, 50);
    assert_eq!(progress.unrecognized_status.as_deref(), Some("paused"));
    assert!(progress.polling);
}

#[test]
fn known_status_clears_unknown_status_note() {
    init_logging();
    let (state, ticket) = watch(AppState::new(), "job-1");
    let (state, _) = receive(
        state,
        &ticket,
        Ok(snapshot(JobState::Unrecognized("paused".to_string()), 1, 4)),
    );
    assert!(state.view().progress.unrecognized_status.is_some());

    let (state, _) = receive(state, &ticket, Ok(snapshot(JobState::Processing, 2, 4)));

    assert_eq!(state.view().progress.unrecognized_status, None);
}

#[test]
fn custom_intervals_are_used() {
    init_logging();
    let settings = AppSettings {
        poll: PollSettings {
            interval: Duration::from_millis(10),
            retry_delay: Duration::from_millis(20),
            max_consecutive_failures: None,
        },
        ..AppSettings::default()
    };
    let (state, ticket) = watch(AppState::with_settings(settings), "job-1");

    let (state, effects) = receive(state, &ticket, Ok(snapshot(JobState::Queued, 0, 0)));
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket: ticket.clone(),
            delay: Duration::from_millis(10),
        }]
    );
    let (_state, effects) = receive(state, &ticket, Err("boom".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            ticket,
            delay: Duration::from_millis(20),
        }]
    );
}

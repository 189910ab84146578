use std::sync::{mpsc, Arc};

use matcher_core::{
    Effect, JobId, JobSnapshot, JobState, MatchResult, Msg, PaperHit, PollTicket,
};
use matcher_engine::{
    ClientSettings, EngineError, EngineEvent, EngineHandle, EventSink, IngestRequest,
    JobStatusRecord, MatchRecord, MatchRequest, PollTarget,
};
use matcher_logging::{matcher_debug, matcher_info, matcher_warn};

use super::app::LoopEvent;

/// Executes core effects on the engine. Alerts are handed back to the caller.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        settings: &ClientSettings,
        loop_tx: mpsc::Sender<LoopEvent>,
    ) -> Result<Self, EngineError> {
        let sink: Arc<dyn EventSink> = Arc::new(MsgSink { tx: loop_tx });
        let engine = EngineHandle::new(settings, sink)?;
        Ok(Self { engine })
    }

    pub fn run(&self, effects: Vec<Effect>) -> Vec<String> {
        let mut alerts = Vec::new();
        for effect in effects {
            match effect {
                Effect::Alert { message } => alerts.push(message),
                Effect::SubmitSearch { request_id, query } => {
                    matcher_info!(
                        "Search request_id={} limit={} min_score={:.2} text_len={}",
                        request_id,
                        query.limit,
                        query.min_score,
                        query.profile_text.len()
                    );
                    self.engine.search(
                        request_id,
                        MatchRequest {
                            profile_text: query.profile_text,
                            limit: query.limit,
                            min_score: query.min_score,
                        },
                    );
                }
                Effect::TriggerIngest {
                    university,
                    dept_url,
                } => {
                    matcher_info!("Ingest university={} url={}", university, dept_url);
                    self.engine.ingest(IngestRequest {
                        university,
                        dept_url,
                    });
                }
                Effect::CancelPendingPoll => self.engine.cancel_pending_poll(),
                Effect::FetchJobStatus { ticket } => {
                    self.engine.fetch_job_status(to_target(&ticket));
                }
                Effect::SchedulePoll { ticket, delay } => {
                    matcher_debug!(
                        "Next poll for job {} in {:?}",
                        ticket.job_id,
                        delay
                    );
                    self.engine.schedule_poll(to_target(&ticket), delay);
                }
            }
        }
        alerts
    }
}

struct MsgSink {
    tx: mpsc::Sender<LoopEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        if let Some(msg) = map_event(event) {
            let _ = self.tx.send(LoopEvent::Msg(msg));
        }
    }
}

pub(crate) fn map_event(event: EngineEvent) -> Option<Msg> {
    match event {
        EngineEvent::SearchFinished { request_id, result } => Some(Msg::SearchCompleted {
            request_id,
            result: result
                .map(|records| records.into_iter().map(map_match).collect())
                .map_err(|err| err.to_string()),
        }),
        EngineEvent::IngestFinished { result } => Some(match result {
            Ok(accepted) => Msg::IngestAccepted {
                task_id: accepted.task_id,
            },
            Err(err) => Msg::IngestRejected {
                message: err.to_string(),
            },
        }),
        EngineEvent::JobStatus { target, result } => {
            let ticket = to_ticket(target)?;
            Some(Msg::JobStatusReceived {
                ticket,
                result: result.map(map_status).map_err(|err| err.to_string()),
            })
        }
        EngineEvent::PollDue { target } => to_ticket(target).map(Msg::PollDue),
    }
}

fn to_target(ticket: &PollTicket) -> PollTarget {
    PollTarget {
        job_id: ticket.job_id.to_string(),
        lineage: ticket.lineage,
    }
}

fn to_ticket(target: PollTarget) -> Option<PollTicket> {
    match JobId::new(target.job_id) {
        Some(job_id) => Some(PollTicket {
            job_id,
            lineage: target.lineage,
        }),
        None => {
            matcher_warn!("Dropping event for blank job id (lineage {})", target.lineage);
            None
        }
    }
}

fn map_status(record: JobStatusRecord) -> JobSnapshot {
    JobSnapshot {
        state: JobState::parse(&record.status),
        processed_faculty: record.processed_faculty,
        total_faculty: record.total_faculty,
        university: record.university,
    }
}

fn map_match(record: MatchRecord) -> MatchResult {
    MatchResult {
        professor: record.professor,
        university: record.university,
        email: record.email,
        max_score: record.max_score,
        papers: record
            .papers
            .into_iter()
            .map(|paper| PaperHit {
                title: paper.title,
                url: paper.url,
                year: paper.year,
                score: paper.score,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcher_engine::{ApiError, FailureKind, IngestAccepted};

    #[test]
    fn status_events_carry_the_ticket() {
        let msg = map_event(EngineEvent::JobStatus {
            target: PollTarget {
                job_id: "job-1".to_string(),
                lineage: 4,
            },
            result: Ok(JobStatusRecord {
                status: "completed".to_string(),
                processed_faculty: 10,
                total_faculty: 10,
                university: "X".to_string(),
            }),
        });

        assert_eq!(
            msg,
            Some(Msg::JobStatusReceived {
                ticket: PollTicket {
                    job_id: JobId::new("job-1").unwrap(),
                    lineage: 4,
                },
                result: Ok(JobSnapshot {
                    state: JobState::Completed,
                    processed_faculty: 10,
                    total_faculty: 10,
                    university: "X".to_string(),
                }),
            })
        );
    }

    #[test]
    fn poll_errors_become_strings() {
        let msg = map_event(EngineEvent::JobStatus {
            target: PollTarget {
                job_id: "job-1".to_string(),
                lineage: 1,
            },
            result: Err(ApiError {
                kind: FailureKind::HttpStatus(404),
                message: "404 Not Found".to_string(),
            }),
        });

        match msg {
            Some(Msg::JobStatusReceived { result: Err(message), .. }) => {
                assert!(message.contains("http status 404"));
            }
            other => panic!("unexpected msg {other:?}"),
        }
    }

    #[test]
    fn ingest_outcomes_map_to_accept_or_reject() {
        assert_eq!(
            map_event(EngineEvent::IngestFinished {
                result: Ok(IngestAccepted {
                    task_id: "t-9".to_string()
                }),
            }),
            Some(Msg::IngestAccepted {
                task_id: "t-9".to_string()
            })
        );
        assert!(matches!(
            map_event(EngineEvent::IngestFinished {
                result: Err(ApiError {
                    kind: FailureKind::Network,
                    message: "refused".to_string(),
                }),
            }),
            Some(Msg::IngestRejected { .. })
        ));
    }

    #[test]
    fn blank_job_ids_are_dropped() {
        assert_eq!(
            map_event(EngineEvent::PollDue {
                target: PollTarget {
                    job_id: " ".to_string(),
                    lineage: 1,
                },
            }),
            None
        );
    }
}

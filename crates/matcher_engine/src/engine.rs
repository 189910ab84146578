use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use matcher_logging::{matcher_debug, matcher_warn};
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, ReqwestApi, ResearchApi};
use crate::{ApiError, EngineEvent, IngestRequest, MatchRequest, PollTarget, RequestId};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Receives events produced by engine tasks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Search {
        request_id: RequestId,
        request: MatchRequest,
    },
    Ingest {
        request: IngestRequest,
    },
    FetchJobStatus {
        target: PollTarget,
    },
    SchedulePoll {
        target: PollTarget,
        delay: Duration,
    },
    CancelPendingPoll,
}

/// Runs API calls and poll timers on a background tokio runtime.
///
/// Scheduled polls are bound to the cancellation token of the lineage that was
/// current when they were scheduled. Cancelling replaces the token, so timers
/// of earlier lineages never fire. Requests already in flight are not aborted;
/// their results are still emitted and left to the caller to discard.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: &ClientSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let api: Arc<dyn ResearchApi> = Arc::new(ReqwestApi::new(settings)?);
        Self::with_api(api, sink)
    }

    pub fn with_api(
        api: Arc<dyn ResearchApi>,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut lineage_token = CancellationToken::new();
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::CancelPendingPoll => {
                        lineage_token.cancel();
                        lineage_token = CancellationToken::new();
                    }
                    EngineCommand::SchedulePoll { target, delay } => {
                        let token = lineage_token.clone();
                        let sink = sink.clone();
                        runtime.spawn(schedule_poll(target, delay, token, sink));
                    }
                    other => {
                        let api = api.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_request(api.as_ref(), other, sink.as_ref()).await;
                        });
                    }
                }
            }
            lineage_token.cancel();
        });

        Ok(Self { cmd_tx })
    }

    pub fn search(&self, request_id: RequestId, request: MatchRequest) {
        self.send(EngineCommand::Search {
            request_id,
            request,
        });
    }

    pub fn ingest(&self, request: IngestRequest) {
        self.send(EngineCommand::Ingest { request });
    }

    pub fn fetch_job_status(&self, target: PollTarget) {
        self.send(EngineCommand::FetchJobStatus { target });
    }

    pub fn schedule_poll(&self, target: PollTarget, delay: Duration) {
        self.send(EngineCommand::SchedulePoll { target, delay });
    }

    pub fn cancel_pending_poll(&self) {
        self.send(EngineCommand::CancelPendingPoll);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            matcher_warn!("Engine thread has stopped; command dropped");
        }
    }
}

async fn schedule_poll(
    target: PollTarget,
    delay: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    tokio::select! {
        _ = token.cancelled() => {
            matcher_debug!(
                "Cancelled pending poll for job {} (lineage {})",
                target.job_id,
                target.lineage
            );
        }
        _ = tokio::time::sleep(delay) => {
            sink.emit(EngineEvent::PollDue { target });
        }
    }
}

async fn handle_request(api: &dyn ResearchApi, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Search {
            request_id,
            request,
        } => {
            let result = api.match_profile(&request).await;
            sink.emit(EngineEvent::SearchFinished { request_id, result });
        }
        EngineCommand::Ingest { request } => {
            let result = api.trigger_ingest(&request).await;
            sink.emit(EngineEvent::IngestFinished { result });
        }
        EngineCommand::FetchJobStatus { target } => {
            let result = api.job_status(&target.job_id).await;
            sink.emit(EngineEvent::JobStatus { target, result });
        }
        EngineCommand::SchedulePoll { .. } | EngineCommand::CancelPendingPoll => {}
    }
}

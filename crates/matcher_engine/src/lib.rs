//! Research matcher engine: backend API client and effect execution.
mod blocking;
mod client;
mod engine;
mod persist;
mod types;

pub use blocking::{BlockingApi, ExportError};
pub use client::{ClientSettings, ReqwestApi, ResearchApi, DEFAULT_API_BASE_URL};
pub use engine::{ChannelEventSink, EngineError, EngineHandle, EventSink};
pub use persist::{prepare_output_dir, save_export, write_atomic, PersistError, EXPORT_FILENAME};
pub use types::{
    ApiError, EngineEvent, ExportOutput, FailureKind, HealthStatus, IngestAccepted,
    IngestRequest, JobStatusRecord, MatchRecord, MatchRequest, PaperRecord, PollTarget,
    RequestId,
};

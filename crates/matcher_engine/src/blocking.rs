use std::path::Path;

use matcher_logging::matcher_info;

use crate::client::{ClientSettings, ReqwestApi, ResearchApi};
use crate::persist::save_export;
use crate::{ApiError, EngineError, ExportOutput, HealthStatus, PersistError};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("download failed: {0}")]
    Api(#[from] ApiError),
    #[error("could not save export: {0}")]
    Persist(#[from] PersistError),
}

/// Synchronous wrapper for one-shot calls that need no event loop.
pub struct BlockingApi {
    runtime: tokio::runtime::Runtime,
    api: ReqwestApi,
}

impl BlockingApi {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let api = ReqwestApi::new(settings)?;
        Ok(Self { runtime, api })
    }

    pub fn health(&self) -> Result<HealthStatus, ApiError> {
        self.runtime.block_on(self.api.health())
    }

    /// Downloads the professor spreadsheet into `dir`.
    pub fn export_professors(&self, dir: &Path) -> Result<ExportOutput, ExportError> {
        let bytes = self.runtime.block_on(self.api.export_professors())?;
        let output = save_export(dir, &bytes)?;
        matcher_info!(
            "Saved {} bytes to {}",
            output.byte_len,
            output.path.display()
        );
        Ok(output)
    }
}

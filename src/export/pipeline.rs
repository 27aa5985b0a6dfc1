//! # Export Pipeline
//!
//! Source -> transform -> sink composition for file exports.
//!
//! A pipeline is one-shot. It pulls serialized records from its source,
//! feeds them through a single transform and writes whatever the transform
//! emits to the sink as soon as it is available. Any stage failure stops the
//! run and is returned to the caller as a [`PipelineError`]; nothing is
//! logged and dropped.
//!
//! ```text
//! Idle -> Sourcing -> Transforming -> Sinking -> Done
//!            \______________\______________\____-> Failed{stage}
//! ```

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{error, trace};

use super::errors::{ExportResult, ExportState, PipelineError};
use super::source::RecordSource;
use super::transform::{Stage, Transform};

/// Outcome of a completed export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExportSummary {
    pub records: usize,
    pub bytes_written: u64,
}

/// One export run
pub struct ExportPipeline {
    source: RecordSource,
    stage: Stage,
    state: ExportState,
}

impl ExportPipeline {
    pub fn new(source: impl Into<RecordSource>, transform: Transform) -> Self {
        Self {
            source: source.into(),
            stage: transform.into_stage(),
            state: ExportState::Idle,
        }
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    /// Drive the pipeline to completion, writing into `sink`.
    ///
    /// The sink is flushed and shut down on success.
    pub async fn run<W>(&mut self, sink: &mut W) -> ExportResult<ExportSummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        if self.state != ExportState::Idle {
            return Err(PipelineError::sourcing("pipeline already ran"));
        }

        match self.drive(sink).await {
            Ok(summary) => {
                self.enter(ExportState::Done);
                Ok(summary)
            }
            Err(err) => {
                self.enter(ExportState::Failed { stage: err.stage });
                error!(stage = %err.stage, cause = %err.cause, "export failed");
                Err(err)
            }
        }
    }

    async fn drive<W>(&mut self, sink: &mut W) -> ExportResult<ExportSummary>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut summary = ExportSummary::default();

        loop {
            self.enter(ExportState::Sourcing);
            let Some(record) = self.source.next().await? else {
                break;
            };
            summary.records += 1;

            self.enter(ExportState::Transforming);
            let out = self.stage.push(&record)?;
            self.sink(sink, &out, &mut summary).await?;
        }

        self.enter(ExportState::Transforming);
        let tail = self.stage.finish()?;
        self.sink(sink, &tail, &mut summary).await?;

        sink.flush().await.map_err(PipelineError::sinking)?;
        sink.shutdown().await.map_err(PipelineError::sinking)?;

        Ok(summary)
    }

    async fn sink<W>(&mut self, sink: &mut W, bytes: &[u8], summary: &mut ExportSummary) -> ExportResult<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        if bytes.is_empty() {
            return Ok(());
        }
        self.enter(ExportState::Sinking);
        sink.write_all(bytes).await.map_err(PipelineError::sinking)?;
        summary.bytes_written += bytes.len() as u64;
        Ok(())
    }

    fn enter(&mut self, state: ExportState) {
        if self.state != state {
            trace!(from = ?self.state, to = ?state, "export state");
            self.state = state;
        }
    }
}

impl std::fmt::Debug for ExportPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPipeline")
            .field("source", &self.source)
            .field("state", &self.state)
            .finish()
    }
}

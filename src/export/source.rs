//! Record sources feeding the export pipeline

use std::collections::VecDeque;

use super::errors::{ExportResult, PipelineError};
use crate::record::{Collection, Record};
use crate::store::RecordSequence;

/// Where exported records come from
#[derive(Debug)]
pub enum RecordSource {
    /// Streamed from the store, one serialized record at a time
    Sequence(RecordSequence),
    /// Already loaded in memory
    Collection(VecDeque<Record>),
}

impl RecordSource {
    pub fn from_collection(collection: Collection) -> Self {
        RecordSource::Collection(collection.into())
    }

    /// Serialized bytes of the next record
    pub async fn next(&mut self) -> ExportResult<Option<Vec<u8>>> {
        match self {
            RecordSource::Sequence(sequence) => sequence
                .next_record()
                .await
                .map_err(PipelineError::sourcing),
            RecordSource::Collection(records) => match records.pop_front() {
                Some(record) => serde_json::to_vec(&record)
                    .map(Some)
                    .map_err(PipelineError::sourcing),
                None => Ok(None),
            },
        }
    }
}

impl From<RecordSequence> for RecordSource {
    fn from(sequence: RecordSequence) -> Self {
        RecordSource::Sequence(sequence)
    }
}

impl From<Collection> for RecordSource {
    fn from(collection: Collection) -> Self {
        Self::from_collection(collection)
    }
}

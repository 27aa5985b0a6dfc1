//! Transform stages
//!
//! Each transform turns serialized records into output bytes. `push` is
//! called once per record in source order and `finish` once at the end; both
//! may return nothing when the stage is still buffering.

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use super::document::{render_table, DocumentLayout};
use super::errors::{ExportResult, PipelineError};
use super::tabular::TabularEncoder;
use crate::record::Record;

/// Transform selector for one export
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Records re-framed as a JSON array
    None,
    /// JSON array, gzip-compressed
    Compress,
    /// CSV projecting the named fields
    Tabular(Vec<String>),
    /// PDF table rendered from the whole collection
    Documentize(DocumentLayout),
}

impl Transform {
    pub fn tabular<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Transform::Tabular(fields.into_iter().map(Into::into).collect())
    }

    /// MIME type of the produced bytes
    pub fn content_type(&self) -> &'static str {
        match self {
            Transform::None => "application/json",
            Transform::Compress => "application/gzip",
            Transform::Tabular(_) => "text/csv; charset=utf-8",
            Transform::Documentize(_) => "application/pdf",
        }
    }

    pub(crate) fn into_stage(self) -> Stage {
        match self {
            Transform::None => Stage::Json(JsonArray::default()),
            Transform::Compress => Stage::Gzip {
                json: JsonArray::default(),
                encoder: GzEncoder::new(Vec::new(), Compression::default()),
            },
            Transform::Tabular(fields) => Stage::Tabular(TabularEncoder::new(fields)),
            Transform::Documentize(layout) => Stage::Document {
                layout,
                records: Vec::new(),
            },
        }
    }
}

/// Re-frames individual records as one JSON array
#[derive(Debug, Default)]
pub(crate) struct JsonArray {
    opened: bool,
}

impl JsonArray {
    fn push(&mut self, record: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(record.len() + 1);
        out.push(if self.opened { b',' } else { b'[' });
        self.opened = true;
        out.extend_from_slice(record);
        out
    }

    fn finish(&mut self) -> Vec<u8> {
        if self.opened {
            b"]".to_vec()
        } else {
            self.opened = true;
            b"[]".to_vec()
        }
    }
}

/// Running state of a transform
pub(crate) enum Stage {
    Json(JsonArray),
    Gzip {
        json: JsonArray,
        encoder: GzEncoder<Vec<u8>>,
    },
    Tabular(TabularEncoder),
    Document {
        layout: DocumentLayout,
        records: Vec<Record>,
    },
}

impl Stage {
    pub(crate) fn push(&mut self, record: &[u8]) -> ExportResult<Vec<u8>> {
        match self {
            Stage::Json(json) => Ok(json.push(record)),
            Stage::Gzip { json, encoder } => {
                encoder
                    .write_all(&json.push(record))
                    .map_err(PipelineError::transforming)?;
                Ok(std::mem::take(encoder.get_mut()))
            }
            Stage::Tabular(tabular) => {
                let record = parse_record(record)?;
                tabular.encode(&record).map_err(PipelineError::transforming)
            }
            Stage::Document { records, .. } => {
                records.push(parse_record(record)?);
                Ok(Vec::new())
            }
        }
    }

    pub(crate) fn finish(&mut self) -> ExportResult<Vec<u8>> {
        match self {
            Stage::Json(json) => Ok(json.finish()),
            Stage::Gzip { json, encoder } => {
                encoder
                    .write_all(&json.finish())
                    .map_err(PipelineError::transforming)?;
                encoder.try_finish().map_err(PipelineError::transforming)?;
                Ok(std::mem::take(encoder.get_mut()))
            }
            Stage::Tabular(tabular) => tabular.finish().map_err(PipelineError::transforming),
            Stage::Document { layout, records } => {
                render_table(layout, records).map_err(PipelineError::transforming)
            }
        }
    }
}

fn parse_record(bytes: &[u8]) -> ExportResult<Record> {
    serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::transforming(format!("record is not a JSON object: {}", e)))
}

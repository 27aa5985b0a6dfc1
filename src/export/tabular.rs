//! CSV rendering of records
//!
//! The header row lists the projected field names. Each record becomes one
//! row in source order. Missing fields are empty cells, strings are written
//! as-is and any other value as its JSON text. Non-numeric cells are quoted.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde_json::Value;

use crate::record::Record;

/// Row-at-a-time CSV encoder
#[derive(Debug, Clone)]
pub struct TabularEncoder {
    fields: Vec<String>,
    header_written: bool,
}

impl TabularEncoder {
    pub fn new(fields: Vec<String>) -> Self {
        Self {
            fields,
            header_written: false,
        }
    }

    /// Encode one record, preceded by the header on the first call
    pub fn encode(&mut self, record: &Record) -> Result<Vec<u8>, csv::Error> {
        let mut out = self.header()?;
        let row: Vec<String> = self
            .fields
            .iter()
            .map(|field| cell_text(record.get(field)))
            .collect();
        out.extend(write_row(&row)?);
        Ok(out)
    }

    /// Bytes still owed at end of input: the header for an empty source
    pub fn finish(&mut self) -> Result<Vec<u8>, csv::Error> {
        self.header()
    }

    fn header(&mut self) -> Result<Vec<u8>, csv::Error> {
        if self.header_written {
            return Ok(Vec::new());
        }
        self.header_written = true;
        write_row(&self.fields)
    }
}

fn write_row<S: AsRef<[u8]>>(cells: &[S]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(cells)?;
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

//! # Record Sequence
//!
//! Lazy, forward-only iteration over a stored collection. The blob is read in
//! chunks and the top-level JSON array is split into its elements as bytes
//! arrive, so a collection is never fully buffered just to be exported.

use std::collections::VecDeque;

use tokio::io::AsyncReadExt;

use super::backend::BlobReader;
use super::errors::{StoreError, StoreResult};

const READ_CHUNK: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    BeforeArray,
    /// Just after `[`: an element or `]`
    FirstElement,
    /// Just after `,`: an element is required
    NextElement,
    /// Just after an element: `,` or `]`
    AfterElement,
    InElement,
    AfterArray,
}

/// Incremental splitter for a top-level JSON array.
///
/// Yields the raw bytes of each element. It checks the array punctuation and
/// tracks nesting and string boundaries; element contents are left for the
/// consumer to parse.
#[derive(Debug)]
pub struct ArraySplitter {
    phase: Phase,
    depth: usize,
    in_string: bool,
    escaped: bool,
    current: Vec<u8>,
    ready: VecDeque<Vec<u8>>,
}

impl Default for ArraySplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArraySplitter {
    pub fn new() -> Self {
        Self {
            phase: Phase::BeforeArray,
            depth: 0,
            in_string: false,
            escaped: false,
            current: Vec::new(),
            ready: VecDeque::new(),
        }
    }

    /// Feed the next chunk of the blob
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), String> {
        for &byte in chunk {
            self.step(byte)?;
        }
        Ok(())
    }

    /// Signal end of input; fails if the array was never closed
    pub fn finish(&mut self) -> Result<(), String> {
        match self.phase {
            Phase::AfterArray => Ok(()),
            Phase::BeforeArray => Err("empty blob, expected a JSON array".to_string()),
            _ => Err("unexpected end of input inside the collection".to_string()),
        }
    }

    /// Next complete element, if any
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.ready.pop_front()
    }

    fn step(&mut self, byte: u8) -> Result<(), String> {
        if byte.is_ascii_whitespace() && self.phase != Phase::InElement {
            return Ok(());
        }

        match (self.phase, byte) {
            (Phase::BeforeArray, b'[') => self.phase = Phase::FirstElement,
            (Phase::FirstElement, b']') | (Phase::AfterElement, b']') => self.phase = Phase::AfterArray,
            (Phase::AfterElement, b',') => self.phase = Phase::NextElement,
            (Phase::FirstElement, b) | (Phase::NextElement, b) if b != b',' && b != b']' => {
                self.phase = Phase::InElement;
                self.element_byte(b)?;
            }
            (Phase::InElement, b) => self.element_byte(b)?,
            (Phase::BeforeArray, b) => return Err(format!("expected '[' but found '{}'", b as char)),
            (Phase::AfterArray, b) => {
                return Err(format!("trailing '{}' after the collection", b as char))
            }
            (Phase::AfterElement, b) => {
                return Err(format!("expected ',' or ']' but found '{}'", b as char))
            }
            (_, b) => return Err(format!("expected an element but found '{}'", b as char)),
        }
        Ok(())
    }

    fn element_byte(&mut self, byte: u8) -> Result<(), String> {
        if self.in_string {
            self.current.push(byte);
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
                if self.depth == 0 {
                    self.complete_element(Phase::AfterElement);
                }
            }
            return Ok(());
        }

        let starts_value = matches!(byte, b'"' | b'{' | b'[');
        if starts_value && self.depth == 0 && !self.current.is_empty() {
            return Err(format!("unexpected '{}' inside an element", byte as char));
        }

        match byte {
            b'"' => {
                self.in_string = true;
                self.current.push(byte);
            }
            b'{' | b'[' => {
                self.depth += 1;
                self.current.push(byte);
            }
            b'}' | b']' if self.depth > 0 => {
                self.depth -= 1;
                self.current.push(byte);
                if self.depth == 0 {
                    self.complete_element(Phase::AfterElement);
                }
            }
            // Scalar elements end at the first delimiter
            b']' => self.complete_element(Phase::AfterArray),
            b'}' => return Err("unbalanced '}' in the collection".to_string()),
            b',' if self.depth == 0 => self.complete_element(Phase::NextElement),
            b if b.is_ascii_whitespace() && self.depth == 0 => {
                self.complete_element(Phase::AfterElement)
            }
            b => self.current.push(b),
        }
        Ok(())
    }

    fn complete_element(&mut self, next: Phase) {
        if !self.current.is_empty() {
            self.ready.push_back(std::mem::take(&mut self.current));
        }
        self.phase = next;
    }
}

/// Lazy sequence of serialized records read from one blob.
///
/// Finite and not seekable; restart by opening a new sequence.
pub struct RecordSequence {
    resource: String,
    reader: BlobReader,
    splitter: ArraySplitter,
    exhausted: bool,
}

impl RecordSequence {
    pub fn new(resource: impl Into<String>, reader: BlobReader) -> Self {
        Self {
            resource: resource.into(),
            reader,
            splitter: ArraySplitter::new(),
            exhausted: false,
        }
    }

    /// Serialized bytes of the next record, or `None` once the collection ends
    pub async fn next_record(&mut self) -> StoreResult<Option<Vec<u8>>> {
        let mut chunk = vec![0u8; READ_CHUNK];
        loop {
            if let Some(record) = self.splitter.pop() {
                return Ok(Some(record));
            }
            if self.exhausted {
                return Ok(None);
            }

            let read = self
                .reader
                .read(&mut chunk)
                .await
                .map_err(|e| StoreError::unavailable(&self.resource, e))?;

            if read == 0 {
                self.exhausted = true;
                self.splitter
                    .finish()
                    .map_err(|e| StoreError::corrupt(&self.resource, e))?;
            } else {
                self.splitter
                    .feed(&chunk[..read])
                    .map_err(|e| StoreError::corrupt(&self.resource, e))?;
            }
        }
    }
}

impl std::fmt::Debug for RecordSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSequence")
            .field("resource", &self.resource)
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

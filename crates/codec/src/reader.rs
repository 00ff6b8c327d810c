//! Stream reader.
//!
//! Validates the header when constructed, then decodes one page at a time.
//! Any decode error poisons the reader: the stream cannot be resynchronized,
//! so every later call fails with `InvalidOperation`.

use crate::binding::RecordBinding;
use crate::config::CodecConfig;
use crate::header::{StreamHeader, STREAM_HEADER_SIZE};
use crate::page::{PageReader, RowView};
use crate::row::Row;
use crate::stats::StreamStats;
use crate::varint::uvarint_len;
use scrt_core::{Result, Schema, ScrtError};
use std::io::{BufReader, Read};
use std::sync::Arc;
use tracing::{debug, warn};

/// Row-oriented SCRT stream reader.
pub struct Reader<R: Read> {
    src: BufReader<R>,
    header: StreamHeader,
    page: PageReader,
    finished: bool,
    poisoned: bool,
    scratch: Option<Row>,
    stats: StreamStats,
}

impl<R: Read> Reader<R> {
    /// Open a stream written with `schema` (or a schema with the same
    /// fingerprint).
    pub fn new(src: R, schema: Arc<Schema>, config: CodecConfig) -> Result<Self> {
        config.validate()?;
        if !schema.is_resolved() {
            return Err(ScrtError::UnresolvedSchema(schema.name().to_string()));
        }
        let mut src = BufReader::new(src);
        let header = StreamHeader::read_from(&mut src)?;
        header.validate(schema.fingerprint())?;
        debug!(
            schema = schema.name(),
            fingerprint = header.fingerprint,
            "Consumed stream header"
        );
        let page = PageReader::new(schema, config.max_page_bytes)?;
        Ok(Reader {
            src,
            header,
            page,
            finished: false,
            poisoned: false,
            scratch: None,
            stats: StreamStats {
                bytes: STREAM_HEADER_SIZE as u64,
                ..StreamStats::default()
            },
        })
    }

    /// The validated stream header.
    pub fn header(&self) -> &StreamHeader {
        &self.header
    }

    /// The schema rows are decoded with.
    pub fn schema(&self) -> &Arc<Schema> {
        self.page.schema()
    }

    /// Counters since the reader was opened.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Read the next row into `row`. Returns `Ok(false)` at end of stream.
    ///
    /// String and byte values are copied, so `row` outlives the page.
    pub fn read_row(&mut self, row: &mut Row) -> Result<bool> {
        self.check_row(row)?;
        if !self.advance()? {
            return Ok(false);
        }
        let result = self.page.read_row(row);
        self.guard(result)
    }

    /// Borrow the next row straight out of the page buffer. Returns
    /// `Ok(None)` at end of stream.
    ///
    /// The view must be dropped before the reader is used again.
    pub fn read_row_view(&mut self) -> Result<Option<RowView<'_>>> {
        if !self.advance()? {
            return Ok(None);
        }
        Ok(self.page.next_view())
    }

    /// Read the next row into `record` through `binding`.
    pub fn read_record<T>(&mut self, binding: &RecordBinding<T>, record: &mut T) -> Result<bool> {
        let mut row = match self.scratch.take() {
            Some(row) if Arc::ptr_eq(row.schema(), binding.schema()) => row,
            _ => Row::new(Arc::clone(binding.schema())),
        };
        let result = self.read_row(&mut row);
        if let Ok(true) = result {
            binding.apply_row(&row, record);
        }
        self.scratch = Some(row);
        result
    }

    /// Iterate over the remaining rows as owned values.
    pub fn rows(&mut self) -> Rows<'_, R> {
        Rows {
            reader: self,
            failed: false,
        }
    }

    fn check_row(&self, row: &Row) -> Result<()> {
        let schema = self.page.schema();
        if row.len() != schema.len() {
            return Err(ScrtError::ColumnCountMismatch {
                expected: schema.len(),
                actual: row.len(),
            });
        }
        if !Arc::ptr_eq(row.schema(), schema) && row.schema().fingerprint() != schema.fingerprint()
        {
            return Err(ScrtError::SchemaFingerprintMismatch {
                expected: schema.fingerprint(),
                actual: row.schema().fingerprint(),
            });
        }
        Ok(())
    }

    /// Make sure the current page has a row left, loading pages as needed.
    /// Returns `Ok(false)` at end of stream.
    fn advance(&mut self) -> Result<bool> {
        if self.poisoned {
            return Err(ScrtError::InvalidOperation(
                "reader is poisoned by an earlier decode error".into(),
            ));
        }
        while self.page.remaining() == 0 {
            if self.finished {
                return Ok(false);
            }
            let loaded = self.page.load_page(&mut self.src);
            match self.guard(loaded)? {
                true => {
                    let len = self.page.page_len() as u64;
                    self.stats.pages += 1;
                    self.stats.bytes += uvarint_len(len) as u64 + len;
                }
                false => {
                    self.finished = true;
                    if self.page.reached_terminator() {
                        self.stats.bytes += 1;
                    } else {
                        warn!(
                            schema = self.page.schema().name(),
                            rows = self.stats.rows,
                            pages = self.stats.pages,
                            bytes = self.stats.bytes,
                            "Stream ended without terminator"
                        );
                    }
                    debug!(
                        rows = self.stats.rows,
                        pages = self.stats.pages,
                        "Reached end of stream"
                    );
                }
            }
        }
        self.stats.rows += 1;
        Ok(true)
    }

    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(error = %e, "Decode error, reader poisoned");
            self.poisoned = true;
        }
        result
    }
}

/// Iterator over owned rows, from [`Reader::rows`].
pub struct Rows<'r, R: Read> {
    reader: &'r mut Reader<R>,
    failed: bool,
}

impl<R: Read> Iterator for Rows<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = match self.reader.read_row_view() {
            Ok(Some(view)) => view.to_row(),
            Ok(None) => return None,
            Err(e) => Err(e),
        };
        // Yield the first error, then stop.
        self.failed = item.is_err();
        Some(item)
    }
}

//! Stream writer.
//!
//! Writes the header before the first page, then one length-prefixed page
//! per `page_rows` rows, then a zero-length terminator on [`Writer::close`].
//! The header and each framed page go out in a single `write_all`, so an
//! interrupted writer never leaves half a frame behind a complete one.

use crate::binding::RecordBinding;
use crate::config::CodecConfig;
use crate::header::StreamHeader;
use crate::page::PageBuilder;
use crate::pool::BuilderPool;
use crate::row::Row;
use crate::stats::StreamStats;
use crate::varint::put_uvarint;
use scrt_core::{Result, Schema, ScrtError};
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

/// Row-oriented SCRT stream writer.
pub struct Writer<W: Write> {
    dst: W,
    schema: Arc<Schema>,
    builder: Option<PageBuilder>,
    pool: Option<Arc<BuilderPool>>,
    header_written: bool,
    closed: bool,
    page: Vec<u8>,
    frame: Vec<u8>,
    scratch: Option<Row>,
    stats: StreamStats,
}

impl<W: Write> Writer<W> {
    /// Writer for a finalized `schema`.
    ///
    /// With `config.pooling` set the page builder comes from the
    /// process-wide [`BuilderPool`].
    pub fn new(dst: W, schema: Arc<Schema>, config: CodecConfig) -> Result<Self> {
        let pool = config.pooling.then(BuilderPool::global);
        Self::build(dst, schema, &config, pool)
    }

    /// Writer drawing its page builder from `pool`.
    pub fn with_pool(
        dst: W,
        schema: Arc<Schema>,
        config: CodecConfig,
        pool: Arc<BuilderPool>,
    ) -> Result<Self> {
        Self::build(dst, schema, &config, Some(pool))
    }

    fn build(
        dst: W,
        schema: Arc<Schema>,
        config: &CodecConfig,
        pool: Option<Arc<BuilderPool>>,
    ) -> Result<Self> {
        config.validate()?;
        if !schema.is_resolved() {
            return Err(ScrtError::UnresolvedSchema(schema.name().to_string()));
        }
        let builder = match &pool {
            Some(pool) => pool.acquire(&schema, config.page_rows)?,
            None => PageBuilder::new(Arc::clone(&schema), config.page_rows)?,
        };
        Ok(Writer {
            dst,
            schema,
            builder: Some(builder),
            pool,
            header_written: false,
            closed: false,
            page: Vec::new(),
            frame: Vec::new(),
            scratch: None,
            stats: StreamStats::default(),
        })
    }

    /// The schema rows are written with.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Counters since the writer was created.
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &W {
        &self.dst
    }

    /// Append one row. Unset fields are written as their default with a
    /// cleared presence bit.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        self.ensure_open()?;
        if row.len() != self.schema.len() {
            return Err(ScrtError::ColumnCountMismatch {
                expected: self.schema.len(),
                actual: row.len(),
            });
        }
        if !Arc::ptr_eq(row.schema(), &self.schema)
            && row.schema().fingerprint() != self.schema.fingerprint()
        {
            return Err(ScrtError::SchemaFingerprintMismatch {
                expected: self.schema.fingerprint(),
                actual: row.schema().fingerprint(),
            });
        }
        self.write_header()?;

        let builder = self.builder_mut()?;
        builder.append_row(row)?;
        let full = builder.is_full();
        self.stats.rows += 1;
        if full {
            self.flush_page()?;
        }
        Ok(())
    }

    /// Append one record through `binding`.
    pub fn write_record<T>(&mut self, binding: &RecordBinding<T>, record: &T) -> Result<()> {
        let mut row = match self.scratch.take() {
            Some(row) => row,
            None => Row::new(Arc::clone(binding.schema())),
        };
        if !Arc::ptr_eq(row.schema(), binding.schema()) {
            row = Row::new(Arc::clone(binding.schema()));
        }
        let result = binding
            .fill_row(record, &mut row)
            .and_then(|()| self.write_row(&row));
        self.scratch = Some(row);
        result
    }

    /// Write the buffered partial page and flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.write_header()?;
        self.flush_page()?;
        self.dst.flush()?;
        Ok(())
    }

    /// Finish the stream: header (if no row was written), final page and
    /// terminator. The page builder goes back to its pool. Closing twice is
    /// a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.write_header()?;
        self.flush_page()?;
        self.dst.write_all(&[0])?;
        self.stats.bytes += 1;
        self.dst.flush()?;
        self.closed = true;
        if let (Some(pool), Some(builder)) = (&self.pool, self.builder.take()) {
            pool.release(builder);
        }
        debug!(
            schema = self.schema.name(),
            rows = self.stats.rows,
            pages = self.stats.pages,
            bytes = self.stats.bytes,
            "Closed stream"
        );
        Ok(())
    }

    /// Close the stream and return the sink.
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        Ok(self.dst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ScrtError::InvalidOperation("writer is closed".into()));
        }
        Ok(())
    }

    fn builder_mut(&mut self) -> Result<&mut PageBuilder> {
        self.builder
            .as_mut()
            .ok_or_else(|| ScrtError::InvalidOperation("writer is closed".into()))
    }

    fn write_header(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        let header = StreamHeader::new(self.schema.fingerprint());
        header.write_to(&mut self.dst)?;
        self.header_written = true;
        self.stats.bytes += crate::header::STREAM_HEADER_SIZE as u64;
        debug!(
            schema = self.schema.name(),
            fingerprint = header.fingerprint,
            "Wrote stream header"
        );
        Ok(())
    }

    fn flush_page(&mut self) -> Result<()> {
        let builder = match self.builder.as_mut() {
            Some(b) if !b.is_empty() => b,
            _ => return Ok(()),
        };
        let rows = builder.rows();
        self.page.clear();
        builder.encode(&mut self.page)?;

        self.frame.clear();
        put_uvarint(&mut self.frame, self.page.len() as u64);
        self.frame.extend_from_slice(&self.page);
        // The rows stay buffered until the sink has taken the whole frame.
        self.dst.write_all(&self.frame)?;
        builder.reset();

        self.stats.pages += 1;
        self.stats.bytes += self.frame.len() as u64;
        debug!(rows, bytes = self.frame.len(), "Flushed page");
        Ok(())
    }
}

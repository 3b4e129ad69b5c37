//! CSV input reader and the output [`RecordSink`].

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use kabkota_geocoder_models::{EnrichedRecord, InputRecord};

use crate::EnrichError;

/// Output columns, in order.
pub const OUTPUT_HEADER: [&str; 6] = [
    "id",
    "name",
    "province_id",
    "latitude",
    "longitude",
    "source",
];

/// Reads the whole input table from `path`.
///
/// The file is closed before this returns, on success or failure.
///
/// # Errors
///
/// Returns [`EnrichError`] if the file cannot be opened, is not valid CSV,
/// or lacks the `id`, `name`, or `province_id` columns.
pub fn read_input(path: &Path) -> Result<Vec<InputRecord>, EnrichError> {
    let file = File::open(path)?;
    read_records(file)
}

/// Reads comma-delimited [`InputRecord`]s with a header row. Extra columns
/// are ignored.
///
/// # Errors
///
/// Returns [`EnrichError::Csv`] on the first malformed row.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<InputRecord>, EnrichError> {
    let mut reader = csv::Reader::from_reader(reader);
    let records = reader
        .deserialize()
        .collect::<Result<Vec<InputRecord>, _>>()?;
    Ok(records)
}

/// Destination for enriched records.
pub trait RecordSink {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError`] if the record cannot be written.
    fn write(&mut self, record: &EnrichedRecord) -> Result<(), EnrichError>;

    /// Flushes everything written so far.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError`] if the flush fails.
    fn finish(&mut self) -> Result<(), EnrichError>;
}

/// Writes every record to `sink`, then finishes it.
///
/// # Errors
///
/// Returns the first [`EnrichError`] raised by the sink.
pub fn write_all(sink: &mut dyn RecordSink, records: &[EnrichedRecord]) -> Result<(), EnrichError> {
    for record in records {
        sink.write(record)?;
    }
    sink.finish()
}

/// Comma-delimited CSV sink with an [`OUTPUT_HEADER`] row.
///
/// Unresolved coordinates are written as empty fields.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    /// Creates (or truncates) `path` and writes the header row.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError`] if the file cannot be created or the header
    /// cannot be written.
    pub fn from_path(path: &Path) -> Result<Self, EnrichError> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvSink<W> {
    /// Wraps `inner` and writes the header row.
    ///
    /// The header is written eagerly so an empty run still produces a
    /// well-formed table.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Csv`] if the header cannot be written.
    pub fn new(inner: W) -> Result<Self, EnrichError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(OUTPUT_HEADER)?;
        Ok(Self { writer })
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Io`] if the final flush fails.
    pub fn into_inner(self) -> Result<W, EnrichError> {
        self.writer
            .into_inner()
            .map_err(|e| EnrichError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write(&mut self, record: &EnrichedRecord) -> Result<(), EnrichError> {
        self.writer.serialize(record)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), EnrichError> {
        self.writer.flush()?;
        Ok(())
    }
}

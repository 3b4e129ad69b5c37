#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Generates `UPDATE` statements from a finalized coordinate table.
//!
//! The input is a delimited table whose columns are read by position
//! (`id, name, province_id, latitude, longitude`); its first row is
//! skipped as a header. Every usable row becomes one statement setting
//! `latitude` and `longitude` by id.
//!
//! The output is advisory: nothing is executed, there is no transaction
//! wrapper, and ids are not checked against the target table. Review the
//! script before running it.

use std::fmt;
use std::io::{Read, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Default input table, relative to the working directory.
pub const DEFAULT_INPUT: &str = "kabupaten-kota-dengan-koordinat-db.csv";

/// Default output script, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "update-coordinates.sql";

/// Default schema of the target table.
pub const DEFAULT_SCHEMA: &str = "public";

/// Default target table.
pub const DEFAULT_TABLE: &str = "kabupaten-kota";

/// Errors that abort SQL generation.
#[derive(Debug, Error)]
pub enum SqlError {
    /// I/O error (file open/read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid delimited text.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The delimiter is not a single ASCII character.
    #[error("Invalid delimiter {delimiter:?}: expected a single ASCII character")]
    InvalidDelimiter {
        /// The rejected value.
        delimiter: String,
    },
}

/// Parses a CLI delimiter argument. Accepts one ASCII character or `\t`.
///
/// # Errors
///
/// Returns [`SqlError::InvalidDelimiter`] for anything else.
pub fn parse_delimiter(value: &str) -> Result<u8, SqlError> {
    if value == "\\t" {
        return Ok(b'\t');
    }
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ => Err(SqlError::InvalidDelimiter {
            delimiter: value.to_string(),
        }),
    }
}

/// A row with usable coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateRow {
    pub id: String,
    pub name: String,
    pub province_id: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Rows read from the input, plus how many were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadRows {
    pub rows: Vec<CoordinateRow>,
    /// Rows with a missing id or an empty/unparseable coordinate.
    pub skipped: usize,
}

fn coordinate(field: Option<&str>) -> Option<f64> {
    field?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Reads positional rows, skipping the header row.
///
/// Rows that cannot produce a valid statement (unresolved coordinates,
/// short rows, blank ids) are logged and counted in
/// [`ReadRows::skipped`] rather than emitted.
///
/// # Errors
///
/// Returns [`SqlError::Csv`] if the input is not valid delimited text.
pub fn read_rows<R: Read>(reader: R, delimiter: u8) -> Result<ReadRows, SqlError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut out = ReadRows::default();

    for (i, result) in reader.records().enumerate() {
        let record = result?;
        // +2: one for the header, one for 1-based line numbers.
        let line = i + 2;

        let id = record.get(0).map(str::trim).unwrap_or_default();
        if id.is_empty() {
            log::warn!("Line {line}: missing id, skipping");
            out.skipped += 1;
            continue;
        }

        let (Some(latitude), Some(longitude)) =
            (coordinate(record.get(3)), coordinate(record.get(4)))
        else {
            log::warn!("Line {line}: id {id} has no usable coordinates, skipping");
            out.skipped += 1;
            continue;
        };

        out.rows.push(CoordinateRow {
            id: id.to_string(),
            name: record.get(1).unwrap_or_default().to_string(),
            province_id: record.get(2).unwrap_or_default().to_string(),
            latitude,
            longitude,
        });
    }

    Ok(out)
}

/// A schema-qualified table name, rendered with quoted identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    #[must_use]
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl Default for TableRef {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA, DEFAULT_TABLE)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.table)
        )
    }
}

/// Line comment naming the row, so a reviewer can match ids to places.
fn row_comment(row: &CoordinateRow) -> String {
    let name: String = row
        .name
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    format!("-- {} (province {})", name.trim(), row.province_id.trim())
}

/// Renders one `UPDATE` statement followed by a comment naming the row,
/// terminated by a newline.
#[must_use]
pub fn update_statement(table: &TableRef, row: &CoordinateRow) -> String {
    format!(
        "UPDATE {table} SET latitude = {}, longitude = {} WHERE id = {}; {}\n",
        row.latitude,
        row.longitude,
        quote_literal(&row.id),
        row_comment(row)
    )
}

/// Renders the comment header stamped with `generated_at`.
#[must_use]
pub fn script_header(generated_at: DateTime<Utc>) -> String {
    format!(
        "-- AUTO-GENERATED COORDINATE UPDATE SCRIPT\n-- Generated at {}\n\n",
        generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Writes the header followed by one statement per row.
///
/// # Errors
///
/// Returns [`SqlError::Io`] if writing fails.
pub fn write_script<W: Write>(
    mut writer: W,
    table: &TableRef,
    rows: &[CoordinateRow],
    generated_at: DateTime<Utc>,
) -> Result<(), SqlError> {
    writer.write_all(script_header(generated_at).as_bytes())?;
    for row in rows {
        writer.write_all(update_statement(table, row).as_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn bogor() -> CoordinateRow {
        CoordinateRow {
            id: "3201".to_string(),
            name: "Bogor".to_string(),
            province_id: "32".to_string(),
            latitude: -6.59,
            longitude: 106.79,
        }
    }

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn renders_update_for_row() {
        assert_eq!(
            update_statement(&TableRef::default(), &bogor()),
            "UPDATE \"public\".\"kabupaten-kota\" SET latitude = -6.59, longitude = 106.79 WHERE id = '3201'; -- Bogor (province 32)\n"
        );
    }

    #[test]
    fn comment_cannot_break_out_of_its_line() {
        let row = CoordinateRow {
            name: "Bogor\nDROP TABLE x;".to_string(),
            ..bogor()
        };
        let statement = update_statement(&TableRef::default(), &row);
        assert_eq!(statement.lines().count(), 1);
        assert!(statement.ends_with("-- Bogor DROP TABLE x; (province 32)\n"));
    }

    #[test]
    fn reads_semicolon_rows_skipping_header() {
        let input = "id;name;province_id;latitude;longitude\n3201;Bogor;32;-6.59;106.79\n";
        let read = read_rows(input.as_bytes(), b';').unwrap();
        assert_eq!(read.rows, vec![bogor()]);
        assert_eq!(read.skipped, 0);
    }

    #[test]
    fn header_names_are_ignored() {
        let input = "kode;nama;provinsi;lat;lng\n3201;Bogor;32;-6.59;106.79\n";
        let read = read_rows(input.as_bytes(), b';').unwrap();
        assert_eq!(read.rows, vec![bogor()]);
    }

    #[test]
    fn end_to_end_script_contains_statement() {
        let input = "id;name;province_id;latitude;longitude\n3201;Bogor;32;-6.59;106.79\n";
        let read = read_rows(input.as_bytes(), b';').unwrap();

        let mut out = Vec::new();
        write_script(&mut out, &TableRef::default(), &read.rows, timestamp()).unwrap();
        let script = String::from_utf8(out).unwrap();

        assert!(script.starts_with(
            "-- AUTO-GENERATED COORDINATE UPDATE SCRIPT\n-- Generated at 2025-03-01T08:30:00.000Z\n\n"
        ));
        assert!(script.contains(
            "UPDATE \"public\".\"kabupaten-kota\" SET latitude = -6.59, longitude = 106.79 WHERE id = '3201';"
        ));
    }

    #[test]
    fn skips_rows_without_coordinates() {
        let input = "id;name;province_id;latitude;longitude\n\
                     9999;Nonexistentville;99;;\n\
                     3201;Bogor;32;-6.59;106.79\n\
                     1;Short;11\n\
                     2;Bad;11;north;east\n\
                     ;Anon;11;1.0;2.0\n";
        let read = read_rows(input.as_bytes(), b';').unwrap();
        assert_eq!(read.rows, vec![bogor()]);
        assert_eq!(read.skipped, 4);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let input = "h\n1;A;11;NaN;inf\n";
        let read = read_rows(input.as_bytes(), b';').unwrap();
        assert!(read.rows.is_empty());
        assert_eq!(read.skipped, 1);
    }

    #[test]
    fn reads_comma_delimited_enrichment_output() {
        let input = "id,name,province_id,latitude,longitude,source\n3201,Bogor,32,-6.59,106.79,Reference\n";
        let read = read_rows(input.as_bytes(), b',').unwrap();
        assert_eq!(read.rows, vec![bogor()]);
    }

    #[test]
    fn escapes_quotes() {
        let row = CoordinateRow {
            id: "32'01".to_string(),
            ..bogor()
        };
        let table = TableRef::new("pub\"lic", "kota");
        assert_eq!(
            update_statement(&table, &row),
            "UPDATE \"pub\"\"lic\".\"kota\" SET latitude = -6.59, longitude = 106.79 WHERE id = '32''01'; -- Bogor (province 32)\n"
        );
    }

    #[test]
    fn empty_input_yields_header_only() {
        let read = read_rows("id;name;province_id;latitude;longitude\n".as_bytes(), b';').unwrap();
        let mut out = Vec::new();
        write_script(&mut out, &TableRef::default(), &read.rows, timestamp()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-- AUTO-GENERATED COORDINATE UPDATE SCRIPT\n-- Generated at 2025-03-01T08:30:00.000Z\n\n"
        );
    }

    #[test]
    fn parses_delimiters() {
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert_eq!(parse_delimiter(",").unwrap(), b',');
        assert_eq!(parse_delimiter("\\t").unwrap(), b'\t');
        assert!(matches!(
            parse_delimiter(";;"),
            Err(SqlError::InvalidDelimiter { .. })
        ));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("é").is_err());
    }
}

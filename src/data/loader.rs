//! CSV Sample Loader Module
//! Reads delimited telemetry exports into typed records using Polars.

use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::records::{BumpSample, LocationSample, Point};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Row {row}: missing or non-integer field {value:?}")]
    MalformedRow { row: usize, value: String },
}

/// A row is accepted as data only when its first field parses as an integer.
/// Header rows and other junk fall out here by policy, not as an error.
pub fn is_data_row(first_field: &str) -> bool {
    int_field(first_field).is_some()
}

fn int_field(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// `NoData` check that sees through the `Context` wrapper the lazy CSV scan
/// adds around the underlying error.
fn is_no_data(error: &PolarsError) -> bool {
    match error {
        PolarsError::NoData(_) => true,
        PolarsError::Context { error, .. } => is_no_data(error),
        _ => false,
    }
}

/// Loads location and bump sample files with a configurable delimiter.
pub struct SampleLoader {
    delimiter: u8,
}

impl SampleLoader {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Load `X;Y;VALUE` rows (position plus a scalar such as speed).
    pub fn load_location_samples(&self, path: &Path) -> Result<Vec<LocationSample>, LoaderError> {
        let Some(df) = self.read_raw(path, 3)? else {
            return Ok(Vec::new());
        };
        let cols = df.get_columns();

        let mut samples = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let Some(x) = Self::leading_int(&cols[0], row) else {
                continue;
            };
            let y = Self::required_int(&cols[1], row)?;
            let value = Self::required_int(&cols[2], row)?;
            samples.push(LocationSample {
                point: Point::new(x, y),
                value,
            });
        }
        Ok(samples)
    }

    /// Load `X;Y` rows (position only).
    pub fn load_bump_samples(&self, path: &Path) -> Result<Vec<BumpSample>, LoaderError> {
        let Some(df) = self.read_raw(path, 2)? else {
            return Ok(Vec::new());
        };
        let cols = df.get_columns();

        let mut samples = Vec::with_capacity(df.height());
        for row in 0..df.height() {
            let Some(x) = Self::leading_int(&cols[0], row) else {
                continue;
            };
            let y = Self::required_int(&cols[1], row)?;
            samples.push(BumpSample {
                point: Point::new(x, y),
            });
        }
        Ok(samples)
    }

    /// Read the file as `column_count` string columns; `None` means an empty
    /// file.
    ///
    /// The schema is fixed up front rather than inferred, so a junk first
    /// line with the wrong field count cannot change the file's width: short
    /// rows pad with nulls, long rows truncate, and the per-row acceptance
    /// predicate alone decides what counts as data.
    fn read_raw(&self, path: &Path, column_count: usize) -> Result<Option<DataFrame>, LoaderError> {
        let schema = Schema::from_iter(
            (0..column_count).map(|i| Field::new(format!("field_{i}").into(), DataType::String)),
        );
        let result = LazyCsvReader::new(path)
            .with_has_header(false)
            .with_separator(self.delimiter)
            .with_schema(Some(Arc::new(schema)))
            .with_truncate_ragged_lines(true)
            .finish()
            .and_then(|lf| lf.collect());

        match result {
            Ok(df) => Ok(Some(df)),
            Err(e) if is_no_data(&e) => Ok(None),
            Err(e) => Err(LoaderError::Csv(e)),
        }
    }

    /// First-field check: `Some` when the row is accepted as data.
    fn leading_int(col: &Column, row: usize) -> Option<i64> {
        let text = Self::field_text(col, row)?;
        if !is_data_row(&text) {
            return None;
        }
        int_field(&text)
    }

    /// Required field of an accepted row; missing or non-integer is fatal.
    fn required_int(col: &Column, row: usize) -> Result<i64, LoaderError> {
        let text = Self::field_text(col, row).ok_or_else(|| LoaderError::MalformedRow {
            row,
            value: String::new(),
        })?;
        match int_field(&text) {
            Some(v) => Ok(v),
            None => Err(LoaderError::MalformedRow { row, value: text }),
        }
    }

    fn field_text(col: &Column, row: usize) -> Option<String> {
        match col.get(row) {
            Ok(AnyValue::Null) | Err(_) => None,
            Ok(val) => Some(val.to_string().trim_matches('"').to_string()),
        }
    }
}

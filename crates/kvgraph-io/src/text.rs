//! Text-import source: column selectors, line reading, field parsing.
//!
//! Selectors are explicit tagged variants, not sentinel indices: `WholeLine`
//! and `LineNumber` cannot be confused with a real column. A malformed line
//! aborts the whole import; callers stage pairs before mutating a table, so
//! an aborted import is invisible.

use std::fs::File;
use std::io::{BufRead, BufReader};

use serde::{Deserialize, Serialize};

use kvgraph_core::dtype::ElementType;
use kvgraph_core::error::{Error, Result};
use kvgraph_core::value::Scalar;

/// Where the key of each line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyColumn {
    /// Zero-based field index after splitting on the delimiter.
    Field(usize),
    /// The entire unsplit line.
    WholeLine,
}

/// Where the value of each line comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueColumn {
    /// Zero-based field index after splitting on the delimiter.
    Field(usize),
    /// The zero-based line number over the whole source. Requires an int64
    /// value type.
    LineNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSource {
    /// One or more files, read in order with a single running line counter.
    pub paths: Vec<String>,
    /// Upper bound on lines consumed; `None` reads to end of input.
    pub vocab_size: Option<u64>,
    pub key_column: KeyColumn,
    pub value_column: ValueColumn,
    /// Field separator; a single character or a short string.
    pub delimiter: String,
}

impl TextSource {
    pub fn new(
        paths: Vec<String>,
        key_column: KeyColumn,
        value_column: ValueColumn,
        delimiter: impl Into<String>,
    ) -> Self {
        Self {
            paths,
            vocab_size: None,
            key_column,
            value_column,
            delimiter: delimiter.into(),
        }
    }

    /// Bound the number of lines consumed. Zero means unbounded.
    pub fn with_vocab_size(mut self, vocab_size: u64) -> Self {
        self.vocab_size = if vocab_size == 0 {
            None
        } else {
            Some(vocab_size)
        };
        self
    }

    /// Static validation against the table's declared element types; run at
    /// graph build, before any file is touched.
    pub fn validate(&self, value_type: ElementType) -> Result<()> {
        if self.paths.is_empty() {
            return Err(Error::Configuration(
                "text source needs at least one file".to_string(),
            ));
        }
        if self.delimiter.is_empty() {
            return Err(Error::Configuration(
                "text source delimiter must be non-empty".to_string(),
            ));
        }
        if self.value_column == ValueColumn::LineNumber && value_type != ElementType::Int64 {
            return Err(Error::Configuration(format!(
                "line-number values require an int64 value type, table declares {value_type}"
            )));
        }
        Ok(())
    }

    fn needs_split(&self) -> bool {
        matches!(self.key_column, KeyColumn::Field(_))
            || matches!(self.value_column, ValueColumn::Field(_))
    }
}

/// Read and parse every (key, value) pair from `source`.
///
/// Stops at the vocabulary bound or end of input. An unreadable file aborts
/// with `SourceNotFound`; a missing column or unparseable field aborts the
/// whole import with `Parse`.
pub fn read_pairs(
    source: &TextSource,
    key_type: ElementType,
    value_type: ElementType,
) -> Result<Vec<(Scalar, Scalar)>> {
    source.validate(value_type)?;
    let bound = source.vocab_size.unwrap_or(u64::MAX);
    let mut pairs = Vec::new();
    let mut line_no: u64 = 0;

    'files: for path in &source.paths {
        let file =
            File::open(path).map_err(|e| Error::SourceNotFound(format!("{path}: {e}")))?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            if line_no >= bound {
                break 'files;
            }
            let line = line.map_err(|e| Error::SourceNotFound(format!("{path}: {e}")))?;
            let fields: Vec<&str> = if source.needs_split() {
                line.split(source.delimiter.as_str()).collect()
            } else {
                Vec::new()
            };

            let key = match source.key_column {
                KeyColumn::Field(idx) => {
                    parse_scalar(field_at(&fields, idx, path, line_no)?, key_type, path, line_no)?
                }
                KeyColumn::WholeLine => parse_scalar(&line, key_type, path, line_no)?,
            };
            let value = match source.value_column {
                ValueColumn::Field(idx) => parse_scalar(
                    field_at(&fields, idx, path, line_no)?,
                    value_type,
                    path,
                    line_no,
                )?,
                ValueColumn::LineNumber => Scalar::I64(line_no as i64),
            };

            pairs.push((key, value));
            line_no += 1;
        }
    }
    Ok(pairs)
}

fn field_at<'a>(fields: &[&'a str], idx: usize, path: &str, line_no: u64) -> Result<&'a str> {
    fields.get(idx).copied().ok_or_else(|| {
        Error::Parse(format!(
            "{path}:{line_no}: column {idx} out of range ({} fields)",
            fields.len()
        ))
    })
}

fn parse_scalar(text: &str, dtype: ElementType, path: &str, line_no: u64) -> Result<Scalar> {
    match dtype {
        ElementType::Int64 => text
            .trim()
            .parse::<i64>()
            .map(Scalar::I64)
            .map_err(|e| Error::Parse(format!("{path}:{line_no}: '{text}' is not an int64: {e}"))),
        ElementType::Float64 => text
            .trim()
            .parse::<f64>()
            .map(Scalar::F64)
            .map_err(|e| {
                Error::Parse(format!("{path}:{line_no}: '{text}' is not a float64: {e}"))
            }),
        ElementType::Utf8 => Ok(Scalar::Str(text.to_string())),
        ElementType::TableHandle => Err(Error::Invariant(
            "handle elements cannot be parsed from text".to_string(),
        )),
    }
}

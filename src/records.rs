//! Flat record source: one `subject,teacher,class` triple per line.

use crate::error::{Result, SchedulerError};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Records needed before crossover and selection have anything to pair.
pub const MIN_RECORDS: usize = 2;

const FIELDS: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassRecord {
    pub subject: String,
    pub teacher: String,
    pub class_name: String,
}

impl ClassRecord {
    pub fn new(
        subject: impl Into<String>,
        teacher: impl Into<String>,
        class_name: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            teacher: teacher.into(),
            class_name: class_name.into(),
        }
    }
}

/// Reads every triple from `source`.
///
/// Fields are taken verbatim: there is no quoting, escaping or trimming, and
/// no check on content beyond the field count. Blank lines are skipped.
pub fn load_records<R: Read>(source: R) -> Result<Vec<ClassRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(source);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() != FIELDS {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(SchedulerError::MalformedRecord {
                line,
                fields: row.len(),
            });
        }

        records.push(row.deserialize::<ClassRecord>(None)?);
    }

    if records.len() < MIN_RECORDS {
        return Err(SchedulerError::InsufficientData {
            found: records.len(),
        });
    }

    Ok(records)
}

pub fn load_records_from_path(path: impl AsRef<Path>) -> Result<Vec<ClassRecord>> {
    let path = path.as_ref();
    let records = load_records(File::open(path)?)?;
    info!(path = %path.display(), records = records.len(), "Loaded class records");
    Ok(records)
}

/// Appends one triple to the record file, creating it when missing.
pub fn append_record(path: impl AsRef<Path>, record: &ClassRecord) -> Result<()> {
    check_field("subject", &record.subject)?;
    check_field("teacher", &record.teacher)?;
    check_field("class", &record.class_name)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    writer.serialize(record)?;
    writer.flush()?;

    Ok(())
}

fn check_field(field: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SchedulerError::EmptyField(field));
    }

    if value.contains([',', '\n', '\r']) {
        return Err(SchedulerError::InvalidField {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

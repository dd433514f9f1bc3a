//! Row codec for the applications CSV file.
//!
//! This is not a general CSV parser. Rows are split on every
//! separator, quoted or not, so a field containing a comma or a line break
//! will shift the columns of its row on the next read.

use thiserror::Error;

use super::record::{Record, DEFAULT_STATUS};

/// Field separator.
pub const SEPARATOR: char = ',';

/// Quote character wrapped around string fields.
pub const QUOTE: char = '"';

/// Header line of the applications file, without the line terminator.
pub const HEADER: &str = "ID,Job Title,Company,Points Earned,Tailored CV,Referred,Date Applied,Status,Follow Up Date,Interview Date,Job Link,Notes";

/// Number of columns in [`HEADER`].
pub const COLUMN_COUNT: usize = 12;

const POINTS_COLUMN: usize = 3;

/// Why a row was skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected {expected} values, got {found}")]
    TooFewFields { found: usize, expected: usize },

    #[error("invalid points value: {0:?}")]
    InvalidPoints(String),
}

/// Split a row into unquoted, trimmed fields.
pub fn split_fields(line: &str) -> Vec<String> {
    line.split(SEPARATOR).map(unquote).collect()
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let opened = trimmed.strip_prefix(QUOTE);
    let inner = opened.unwrap_or(trimmed);
    match inner.strip_suffix(QUOTE) {
        Some(body) if opened.is_some() => body.replace("\"\"", "\""),
        Some(body) => body.to_string(),
        None => inner.to_string(),
    }
}

/// Decode one data row.
///
/// Rows with fewer than `expected` fields or a non-integer points column
/// are rejected; extra trailing fields are ignored.
pub fn decode_line(line: &str, expected: usize) -> Result<Record, DecodeError> {
    let mut fields = split_fields(line);
    let needed = expected.max(COLUMN_COUNT);
    if fields.len() < needed {
        return Err(DecodeError::TooFewFields {
            found: fields.len(),
            expected: needed,
        });
    }

    let points_earned = fields[POINTS_COLUMN]
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidPoints(fields[POINTS_COLUMN].clone()))?;

    fields.truncate(COLUMN_COUNT);
    let mut it = fields.into_iter();
    let mut next = || it.next().unwrap_or_default();

    let id = next();
    let job_title = next();
    let company_name = next();
    let _points = next();
    let is_tailored = next() == "true";
    let has_referral = next() == "true";
    let timestamp = next();
    let status = match next() {
        s if s.is_empty() => DEFAULT_STATUS.to_string(),
        s => s,
    };

    Ok(Record {
        id,
        job_title,
        company_name,
        points_earned,
        is_tailored,
        has_referral,
        timestamp,
        status,
        follow_up_date: next(),
        interview_date: next(),
        job_link: next(),
        notes: next(),
    })
}

/// Quote a string field, doubling embedded quotes.
pub fn quote(value: &str) -> String {
    format!("{QUOTE}{}{QUOTE}", value.replace('"', "\"\""))
}

/// Encode one record as a row in header order.
pub fn encode_record(record: &Record) -> String {
    let separator = SEPARATOR.to_string();
    [
        quote(&record.id),
        quote(&record.job_title),
        quote(&record.company_name),
        record.points_earned.to_string(),
        record.is_tailored.to_string(),
        record.has_referral.to_string(),
        quote(&record.timestamp),
        quote(&record.status),
        quote(&record.follow_up_date),
        quote(&record.interview_date),
        quote(&record.job_link),
        quote(&record.notes),
    ]
    .join(separator.as_str())
}

/// Full file contents: header, one row per record, trailing newline.
pub fn encode_file(header: &str, records: &[Record]) -> String {
    let mut out = String::from(header.trim_end());
    out.push('\n');
    for record in records {
        out.push_str(&encode_record(record));
        out.push('\n');
    }
    out
}

//! Lenient CSV parser for price rows
//!
//! # Format
//!
//! ```text
//! product_id,name,category,<ignored>,price,create_date
//! 1,apple,fruit,7,10.00,2024-01-15
//! ```
//!
//! Columns are positional; header contents are never inspected. The first
//! row is always dropped. Rows with fewer than [`MIN_FIELDS`] fields, rows
//! the CSV reader cannot decode and rows with malformed quoting are skipped
//! with a warning. Inside a row, unparseable values fall back to zero:
//! product id `0`, price `0`, date `0001-01-01`.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::{Reader, ReaderBuilder, StringRecord};
use thiserror::Error;
use tracing::{debug, warn};

use super::models::PriceRecord;

/// Fewest fields a data row may have
pub const MIN_FIELDS: usize = 6;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const PRODUCT_ID: usize = 0;
const NAME: usize = 1;
const CATEGORY: usize = 2;
const PRICE: usize = 4;
const CREATE_DATE: usize = 5;

/// Quoting the CSV reader tolerates but a strict reader rejects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("bare \" in non-quoted field")]
    BareQuote,
    #[error("extraneous or missing \" in quoted field")]
    Unbalanced,
}

/// Lazy iterator of [`PriceRecord`]s over an in-memory CSV buffer
///
/// The raw bytes of every row are kept reachable so quoting can be checked
/// against what the reader silently repairs.
pub struct PriceRecordParser<'a> {
    data: &'a [u8],
    reader: Reader<&'a [u8]>,
    row: StringRecord,
    header_skipped: bool,
    skipped: usize,
}

impl<'a> PriceRecordParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        Self {
            data,
            reader,
            row: StringRecord::new(),
            header_skipped: false,
            skipped: 0,
        }
    }

    /// Rows dropped so far, the header excluded
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn skip(&mut self) {
        if self.header_skipped {
            self.skipped += 1;
        } else {
            self.header_skipped = true;
        }
    }
}

impl Iterator for PriceRecordParser<'_> {
    type Item = PriceRecord;

    fn next(&mut self) -> Option<PriceRecord> {
        loop {
            let start = self.reader.position().byte() as usize;
            let line = self.reader.position().line();
            let read = self.reader.read_record(&mut self.row);
            let end = self.reader.position().byte() as usize;

            match read {
                Ok(false) => return None,
                Ok(true) if !self.header_skipped => self.header_skipped = true,
                Ok(true) => {
                    let data = self.data;
                    let raw = data.get(start..end).unwrap_or_default();
                    if let Err(e) = check_quoting(raw) {
                        self.skip();
                        warn!(line, error = %e, "Skipping price row with malformed quoting");
                    } else if self.row.len() < MIN_FIELDS {
                        self.skip();
                        warn!(line, fields = self.row.len(), "Skipping price row with too few fields");
                    } else {
                        return Some(parse_row(&self.row));
                    }
                },
                Err(e) if !self.header_skipped => {
                    self.skip();
                    debug!(error = %e, "Header row unreadable, dropped anyway");
                },
                Err(e) => {
                    self.skip();
                    warn!(line, error = %e, "Skipping unreadable price row");
                },
            }
        }
    }
}

/// Validate the quoting of one raw CSV row
///
/// A `"` may only open a field, close it, or appear doubled inside a quoted
/// field. A closing quote must be followed by a comma or the end of the row.
pub fn check_quoting(raw: &[u8]) -> Result<(), QuoteError> {
    let is_terminator = |b: &u8| *b == b'\n' || *b == b'\r';
    let first = raw.iter().position(|b| !is_terminator(b)).unwrap_or(raw.len());
    let last = raw.iter().rposition(|b| !is_terminator(b)).map_or(first, |i| i + 1);
    let row = raw.get(first..last).unwrap_or_default();

    let mut i = 0;
    loop {
        if row.get(i) == Some(&b'"') {
            i += 1;
            loop {
                match (row.get(i), row.get(i + 1)) {
                    (None, _) => return Err(QuoteError::Unbalanced),
                    (Some(b'"'), Some(b'"')) => i += 2,
                    (Some(b'"'), None) => return Ok(()),
                    (Some(b'"'), Some(b',')) => {
                        i += 2;
                        break;
                    },
                    (Some(b'"'), Some(_)) => return Err(QuoteError::Unbalanced),
                    (Some(_), _) => i += 1,
                }
            }
        } else {
            loop {
                match row.get(i) {
                    None => return Ok(()),
                    Some(b',') => {
                        i += 1;
                        break;
                    },
                    Some(b'"') => return Err(QuoteError::BareQuote),
                    Some(_) => i += 1,
                }
            }
        }
    }
}

fn parse_row(row: &StringRecord) -> PriceRecord {
    let field = |index: usize| row.get(index).unwrap_or_default();

    PriceRecord {
        product_id: field(PRODUCT_ID).parse().unwrap_or(0),
        name: field(NAME).to_string(),
        category: field(CATEGORY).to_string(),
        price: BigDecimal::from_str(field(PRICE)).unwrap_or_default(),
        create_date: NaiveDate::parse_from_str(field(CREATE_DATE), DATE_FORMAT)
            .unwrap_or_else(|_| zero_date()),
    }
}

/// Date used when a row's date cannot be parsed
pub fn zero_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or(NaiveDate::MIN)
}

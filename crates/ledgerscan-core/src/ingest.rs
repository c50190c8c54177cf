//! CSV row decoding
//!
//! Maps a header row onto the four [`RawRecord`] fields. Header names are
//! compared after lowercasing and dropping every non-alphanumeric character,
//! so `Business Area`, `business_area` and `businessArea` are equivalent.

use crate::error::{CoreError, Result};
use crate::types::RawRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::warn;

/// Column positions resolved from the header row
#[derive(Debug, Default, Clone, Copy)]
struct ColumnMap {
    business_area: Option<usize>,
    period: Option<usize>,
    activity_code: Option<usize>,
    amount: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let mut map = Self::default();
        for (idx, header) in headers.iter().enumerate() {
            let slot = match normalize_header(header).as_str() {
                "businessarea" => &mut map.business_area,
                "period" => &mut map.period,
                "activitycode" => &mut map.activity_code,
                "amount" => &mut map.amount,
                _ => continue,
            };
            // First matching column wins
            slot.get_or_insert(idx);
        }
        map
    }

    fn is_empty(&self) -> bool {
        self.business_area.is_none()
            && self.period.is_none()
            && self.activity_code.is_none()
            && self.amount.is_none()
    }

    fn extract(&self, row: &StringRecord) -> RawRecord {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::to_string)
                .unwrap_or_default()
        };

        RawRecord {
            business_area: field(self.business_area),
            period: field(self.period),
            activity_code: field(self.activity_code),
            amount: field(self.amount),
        }
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Decode CSV bytes into raw records, one per data row.
///
/// A data row that cannot be decoded is kept as an all-empty record so the
/// positions of the rows after it are unchanged.
pub fn parse_csv(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(CoreError::MissingHeader);
    }

    let columns = ColumnMap::from_headers(&headers);
    if columns.is_empty() {
        warn!(
            headers = ?headers.iter().collect::<Vec<_>>(),
            "No recognized columns in CSV header"
        );
    }

    let mut records = Vec::new();
    for (position, result) in reader.records().enumerate() {
        match result {
            Ok(row) => records.push(columns.extract(&row)),
            Err(e) => {
                warn!(position, error = %e, "Undecodable CSV row replaced with empty record");
                records.push(RawRecord::default());
            }
        }
    }

    Ok(records)
}

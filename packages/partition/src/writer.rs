//! CSV serialization of one day's rows.

use std::path::Path;

use chrono::{NaiveDateTime, NaiveTime};
use crime_split_dataset::{DATETIME_OCC, Dataset, IncidentRow};
use csv::StringRecord;

use crate::PartitionError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes `rows` to `path` and returns the number of rows written.
///
/// Layout: an unnamed index column holding each row's source position, the
/// source columns in order (with `Date Rptd` rewritten in ISO form), then
/// `DateTime OCC`. An empty selection still writes the header.
///
/// # Errors
///
/// Returns [`PartitionError::Csv`] if the file cannot be created or written.
pub fn write_rows(
    path: &Path,
    dataset: &Dataset,
    rows: &[&IncidentRow],
) -> Result<u64, PartitionError> {
    let mut writer = csv::Writer::from_path(path)?;

    let mut header = StringRecord::with_capacity(0, dataset.headers().len() + 2);
    header.push_field("");
    for name in dataset.headers() {
        header.push_field(name);
    }
    header.push_field(DATETIME_OCC);
    writer.write_record(&header)?;

    let reported_format = column_format(rows.iter().map(|r| r.reported_at));
    let occurred_format = column_format(rows.iter().map(|r| r.occurred_at));
    let reported_column = dataset.reported_column();

    let mut record = StringRecord::new();
    for row in rows {
        record.clear();
        record.push_field(&row.index.to_string());
        for (i, field) in row.fields.iter().enumerate() {
            if i == reported_column {
                record.push_field(&row.reported_at.format(reported_format).to_string());
            } else {
                record.push_field(field);
            }
        }
        record.push_field(&row.occurred_at.format(occurred_format).to_string());
        writer.write_record(&record)?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(rows.len() as u64)
}

/// Date-only when every value in the column is at midnight.
fn column_format(mut values: impl Iterator<Item = NaiveDateTime>) -> &'static str {
    if values.all(|v| v.time() == NaiveTime::MIN) {
        DATE_FORMAT
    } else {
        DATETIME_FORMAT
    }
}

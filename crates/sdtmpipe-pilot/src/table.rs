//! Arrow table building and date coercion for pilot datasets

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, StringArray, TimestampSecondArray};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::xpt::{ColumnValues, XptDataset};

/// Column-name suffix marking ISO 8601 date/time character variables.
const DATETIME_SUFFIX: &str = "DTC";

/// A loaded pilot domain: dataset metadata plus an arrow table.
#[derive(Debug, Clone)]
pub struct DomainTable {
    pub name: String,
    pub label: String,
    pub batch: RecordBatch,
}

impl DomainTable {
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }
}

/// Build a table from a parsed transport member.
///
/// Numeric variables become Float64 columns, character variables Utf8,
/// and `--DTC` variables are reinterpreted as timestamps. A malformed
/// date value is a hard error, not a null.
pub fn to_domain_table(dataset: XptDataset) -> Result<DomainTable> {
    let XptDataset {
        name,
        label,
        variables,
        columns,
    } = dataset;

    let mut fields = Vec::with_capacity(variables.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(variables.len());

    for (variable, column) in variables.iter().zip(columns) {
        match column {
            ColumnValues::Numeric(values) => {
                fields.push(Field::new(&variable.name, DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(values)));
            }
            ColumnValues::Char(values) if variable.name.ends_with(DATETIME_SUFFIX) => {
                let mut seconds = Vec::with_capacity(values.len());
                for value in &values {
                    seconds.push(match value {
                        Some(text) => Some(parse_iso_datetime(text).with_context(|| {
                            format!("column {} of dataset {name}", variable.name)
                        })?),
                        None => None,
                    });
                }
                fields.push(Field::new(
                    &variable.name,
                    DataType::Timestamp(TimeUnit::Second, None),
                    true,
                ));
                arrays.push(Arc::new(TimestampSecondArray::from(seconds)));
            }
            ColumnValues::Char(values) => {
                fields.push(Field::new(&variable.name, DataType::Utf8, true));
                arrays.push(Arc::new(StringArray::from(values)));
            }
        }
    }

    let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .context("assembling record batch")?;
    Ok(DomainTable { name, label, batch })
}

/// Parse an SDTM `--DTC` value: `YYYY[-MM[-DD[THH:MM[:SS]]]]`, resolved
/// to the start of the period, as seconds since the Unix epoch.
fn parse_iso_datetime(text: &str) -> Result<i64> {
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(datetime.and_utc().timestamp());
        }
    }
    let parsed = match text.len() {
        10 => NaiveDate::parse_from_str(text, "%Y-%m-%d"),
        7 => NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d"),
        4 => NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d"),
        _ => bail!("malformed date/time value {text:?}"),
    };
    match parsed {
        Ok(date) => Ok(date.and_time(NaiveTime::MIN).and_utc().timestamp()),
        Err(_) => bail!("malformed date/time value {text:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xpt::{fixtures, read_xpt};
    use arrow::array::Array;

    const AUG_1_2013: i64 = 1375315200;

    #[test]
    fn dtc_grammar_resolves_to_period_start() {
        assert_eq!(parse_iso_datetime("2013-08-01").unwrap(), AUG_1_2013);
        assert_eq!(parse_iso_datetime("2013-08").unwrap(), AUG_1_2013);
        assert_eq!(
            parse_iso_datetime("2013").unwrap(),
            AUG_1_2013 - 212 * 86_400
        );
        assert_eq!(
            parse_iso_datetime("2013-08-01T10:30").unwrap(),
            AUG_1_2013 + 10 * 3600 + 30 * 60
        );
        assert_eq!(
            parse_iso_datetime("2013-08-01T10:30:15").unwrap(),
            AUG_1_2013 + 10 * 3600 + 30 * 60 + 15
        );
    }

    #[test]
    fn malformed_dtc_values_are_errors() {
        assert!(parse_iso_datetime("01AUG2013").is_err());
        assert!(parse_iso_datetime("2013-13-01").is_err());
        assert!(parse_iso_datetime("not a date").is_err());
    }

    #[test]
    fn builds_typed_columns_from_member() {
        let dataset = read_xpt(&fixtures::transport_dm()).unwrap();
        let table = to_domain_table(dataset).unwrap();

        assert_eq!(table.name, "DM");
        assert_eq!(table.num_rows(), 2);

        let schema = table.batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(1).data_type(), &DataType::Float64);
        assert_eq!(
            schema.field(2).data_type(),
            &DataType::Timestamp(TimeUnit::Second, None)
        );

        let ages = table
            .batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(ages.value(0), 34.0);
        assert!(ages.is_null(1));

        let starts = table
            .batch
            .column(2)
            .as_any()
            .downcast_ref::<TimestampSecondArray>()
            .unwrap();
        assert_eq!(starts.value(0), AUG_1_2013);
        assert!(starts.is_null(1));
    }

    #[test]
    fn malformed_dtc_column_fails_the_load() {
        let mut dataset = read_xpt(&fixtures::transport_dm()).unwrap();
        if let crate::xpt::ColumnValues::Char(values) = &mut dataset.columns[2] {
            values[0] = Some("08/01/2013".to_string());
        }
        let err = to_domain_table(dataset).unwrap_err();
        assert!(format!("{err:#}").contains("RFSTDTC"));
    }
}

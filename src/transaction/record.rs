//! Validation of raw CSV records into transaction candidates.

use csv::StringRecord;
use time::{Date, PrimitiveDateTime};

use crate::Error;

use super::models::{DATE_FORMAT, DATE_TIME_FORMAT, NewTransaction};

/// The number of fields a transaction record must have.
///
/// In order: `msisdn, trx_id, trx_date, item, voucher_code, status`. Fields
/// beyond the sixth are ignored.
pub const RECORD_FIELD_COUNT: usize = 6;

/// Validate one raw CSV record and produce a transaction candidate.
///
/// The transaction date accepts a full date-time first and a plain date
/// second; a date-only value is interpreted as midnight.
///
/// This function is pure: it performs no I/O and is deterministic given its
/// input.
///
/// # Errors
/// - [Error::InsufficientColumns] if the record has fewer than six fields.
/// - [Error::InvalidDateFormat] if the date field parses as neither format.
/// - [Error::InvalidStatus] if the status field is not an integer.
pub fn parse_record(record: &StringRecord) -> Result<NewTransaction, Error> {
    if record.len() < RECORD_FIELD_COUNT {
        return Err(Error::InsufficientColumns(record.len()));
    }

    let date_text = &record[2];
    let trx_date = PrimitiveDateTime::parse(date_text, DATE_TIME_FORMAT)
        .or_else(|_| Date::parse(date_text, DATE_FORMAT).map(Date::midnight))
        .map_err(|_| Error::InvalidDateFormat(date_text.to_owned()))?;

    let status_text = &record[5];
    let status = status_text
        .parse::<i64>()
        .map_err(|_| Error::InvalidStatus(status_text.to_owned()))?;

    Ok(NewTransaction {
        msisdn: record[0].to_owned(),
        trx_id: record[1].to_owned(),
        trx_date,
        item: record[3].to_owned(),
        voucher_code: record[4].to_owned(),
        status,
    })
}

#[cfg(test)]
mod parse_record_tests {
    use csv::StringRecord;
    use time::macros::datetime;

    use crate::Error;

    use super::parse_record;

    #[test]
    fn parses_valid_record_verbatim() {
        let record = StringRecord::from(vec![
            "6281122334455",
            "TRX001",
            "2024-01-15 10:30:00",
            "Data 1GB",
            "VC-ABC123",
            "1",
        ]);

        let candidate = parse_record(&record).unwrap();

        assert_eq!(candidate.msisdn, "6281122334455");
        assert_eq!(candidate.trx_id, "TRX001");
        assert_eq!(candidate.trx_date, datetime!(2024-01-15 10:30:00));
        assert_eq!(candidate.item, "Data 1GB");
        assert_eq!(candidate.voucher_code, "VC-ABC123");
        assert_eq!(candidate.status, 1);
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let record = StringRecord::from(vec![
            "6281122334455",
            "TRX002",
            "2024-01-15",
            "Data 1GB",
            "VC-ABC123",
            "0",
        ]);

        let candidate = parse_record(&record).unwrap();

        assert_eq!(candidate.trx_date, datetime!(2024-01-15 00:00:00));
    }

    #[test]
    fn ignores_fields_beyond_the_sixth() {
        let record = StringRecord::from(vec![
            "6281122334455",
            "TRX003",
            "2024-01-15 10:30:00",
            "Data 1GB",
            "VC-ABC123",
            "1",
            "extra",
            "fields",
        ]);

        let candidate = parse_record(&record).unwrap();

        assert_eq!(candidate.trx_id, "TRX003");
        assert_eq!(candidate.status, 1);
    }

    #[test]
    fn rejects_short_records() {
        let record = StringRecord::from(vec!["6281122334455", "TRX004", "2024-01-15"]);

        let result = parse_record(&record);

        assert_eq!(result, Err(Error::InsufficientColumns(3)));
    }

    #[test]
    fn rejects_unparsable_dates() {
        let record = StringRecord::from(vec![
            "6281122334455",
            "TRX005",
            "15/01/2024 10:30",
            "Data 1GB",
            "VC-ABC123",
            "1",
        ]);

        let result = parse_record(&record);

        assert_eq!(
            result,
            Err(Error::InvalidDateFormat("15/01/2024 10:30".to_owned()))
        );
    }

    #[test]
    fn rejects_unparsable_status() {
        let record = StringRecord::from(vec![
            "6281122334455",
            "TRX006",
            "2024-01-15 10:30:00",
            "Data 1GB",
            "VC-ABC123",
            "ok",
        ]);

        let result = parse_record(&record);

        assert_eq!(result, Err(Error::InvalidStatus("ok".to_owned())));
    }
}

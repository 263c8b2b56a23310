//! Transaction record line format.
//!
//! One record per line, shared by the current log (`server.txt`) and the
//! history log (`history.txt`):
//!
//! ```text
//! ID,TYPE,REF,MM/DD/YYYY,HH:MM:SS,"PRODUCT","VERSION","COMMENT",""
//! ```
//!
//! The serializer and deserializer form a pair: `parse_line(to_line(r)) == r`
//! for every valid record, and parsing never panics on arbitrary input.

use crate::types::TransactionId;
use chrono::NaiveDateTime;
use std::fmt;
use thiserror::Error;

const TIMESTAMP_FORMAT: &str = "%m/%d/%Y,%H:%M:%S";

/// Operation recorded by a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Add,
    Del,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Add => "add",
            TransactionKind::Del => "del",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the transaction references its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionRef {
    File,
    Ptr,
}

impl TransactionRef {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionRef::File => "file",
            TransactionRef::Ptr => "ptr",
        }
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a record line failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RecordParseError {
    #[error("missing field")]
    MissingField,
    #[error("invalid transaction id")]
    InvalidId,
    #[error("invalid transaction type")]
    InvalidKind,
    #[error("invalid reference type")]
    InvalidRef,
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("bad field quoting")]
    BadQuoting,
}

/// One transaction as recorded in the log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub kind: TransactionKind,
    pub reference: TransactionRef,
    /// Second-precision publish start time, local clock.
    pub timestamp: NaiveDateTime,
    pub product: String,
    pub version: String,
    pub comment: String,
}

impl TransactionRecord {
    /// Serialize to the exact on-disk line shape, without a line terminator.
    ///
    /// The trailing `""` field is reserved for future use.
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{},\"{}\",\"{}\",\"{}\",\"\"",
            self.id,
            self.kind,
            self.reference,
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.product,
            self.version,
            self.comment,
        )
    }

    /// Parse one log line. Anything after the comment field is ignored.
    pub fn parse_line(line: &str) -> Result<TransactionRecord, RecordParseError> {
        let mut rest = line.strip_suffix('\r').unwrap_or(line);

        let id_field = take_field(&mut rest)?;
        if id_field.is_empty() || !id_field.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordParseError::InvalidId);
        }
        let id: TransactionId = id_field.parse().map_err(|_| RecordParseError::InvalidId)?;

        let kind = match take_field(&mut rest)? {
            "add" => TransactionKind::Add,
            "del" => TransactionKind::Del,
            _ => return Err(RecordParseError::InvalidKind),
        };
        let reference = match take_field(&mut rest)? {
            "file" => TransactionRef::File,
            "ptr" => TransactionRef::Ptr,
            _ => return Err(RecordParseError::InvalidRef),
        };

        let date = take_field(&mut rest)?;
        let time = take_field(&mut rest)?;
        let timestamp = NaiveDateTime::parse_from_str(&format!("{date},{time}"), TIMESTAMP_FORMAT)
            .map_err(|_| RecordParseError::InvalidTimestamp)?;

        let product = take_quoted(&mut rest)?.to_string();
        let version = take_quoted(&mut rest)?.to_string();
        let comment = take_quoted(&mut rest)?.to_string();

        Ok(TransactionRecord {
            id,
            kind,
            reference,
            timestamp,
            product,
            version,
            comment,
        })
    }
}

fn take_field<'a>(rest: &mut &'a str) -> Result<&'a str, RecordParseError> {
    let index = rest.find(',').ok_or(RecordParseError::MissingField)?;
    let field = &rest[..index];
    *rest = &rest[index + 1..];
    Ok(field)
}

fn take_quoted<'a>(rest: &mut &'a str) -> Result<&'a str, RecordParseError> {
    let body = rest.strip_prefix('"').ok_or(RecordParseError::BadQuoting)?;
    let end = body.find('"').ok_or(RecordParseError::BadQuoting)?;
    let field = &body[..end];
    let after = &body[end + 1..];
    // A quoted field is followed by a comma unless it ends the line.
    *rest = match after.strip_prefix(',') {
        Some(tail) => tail,
        None if after.is_empty() => after,
        None => return Err(RecordParseError::BadQuoting),
    };
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn sample() -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(1),
            kind: TransactionKind::Add,
            reference: TransactionRef::File,
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 59)
                .unwrap(),
            product: "MyApp".into(),
            version: "1.0".into(),
            comment: String::new(),
        }
    }

    #[test]
    fn serializes_exact_line_shape() {
        assert_eq!(
            sample().to_line(),
            "0000000001,add,file,03/09/2024,14:05:59,\"MyApp\",\"1.0\",\"\",\"\""
        );
    }

    #[test]
    fn parse_inverts_serialize() {
        let record = sample();
        assert_eq!(TransactionRecord::parse_line(&record.to_line()).unwrap(), record);
    }

    #[test]
    fn parse_ignores_trailing_reserved_fields() {
        let line = "0000000002,del,ptr,12/31/1999,23:59:59,\"P\",\"V\",\"C\",\"\",\"extra\",junk";
        let record = TransactionRecord::parse_line(line).unwrap();
        assert_eq!(record.id, TransactionId::new(2));
        assert_eq!(record.kind, TransactionKind::Del);
        assert_eq!(record.reference, TransactionRef::Ptr);
        assert_eq!(record.comment, "C");
    }

    #[test]
    fn parse_accepts_carriage_return() {
        let line = format!("{}\r", sample().to_line());
        assert!(TransactionRecord::parse_line(&line).is_ok());
    }

    #[test]
    fn parse_rejects_structural_damage() {
        let cases = [
            "",
            "0000000001",
            "0000000001,add",
            "x,add,file,03/09/2024,14:05:59,\"P\",\"V\",\"\",\"\"",
            "1,mov,file,03/09/2024,14:05:59,\"P\",\"V\",\"\",\"\"",
            "1,add,dir,03/09/2024,14:05:59,\"P\",\"V\",\"\",\"\"",
            "1,add,file,2024-03-09,14:05:59,\"P\",\"V\",\"\",\"\"",
            "1,add,file,03/09/2024,14:05:59,P,\"V\",\"\",\"\"",
            "1,add,file,03/09/2024,14:05:59,\"P\",\"V\"",
            "1,add,file,03/09/2024,14:05:59,\"P\",\"V\",\"unterminated",
        ];
        for line in cases {
            assert!(
                TransactionRecord::parse_line(line).is_err(),
                "line should fail: {line:?}"
            );
        }
    }

    proptest! {
        #[test]
        fn parse_never_panics(line in ".*") {
            let _ = TransactionRecord::parse_line(&line);
        }

        #[test]
        fn round_trip_over_valid_records(
            id in 1u64..=9_999_999_999,
            del in proptest::bool::ANY,
            ptr in proptest::bool::ANY,
            secs in 0i64..4_102_444_800,
            product in "[A-Za-z0-9 ._-]{0,24}",
            version in "[A-Za-z0-9 ._-]{0,16}",
            comment in "[A-Za-z0-9 ._-]{0,24}",
        ) {
            let record = TransactionRecord {
                id: TransactionId::new(id),
                kind: if del { TransactionKind::Del } else { TransactionKind::Add },
                reference: if ptr { TransactionRef::Ptr } else { TransactionRef::File },
                timestamp: chrono::DateTime::from_timestamp(secs, 0).unwrap().naive_utc(),
                product,
                version,
                comment,
            };
            prop_assert_eq!(
                TransactionRecord::parse_line(&record.to_line()).unwrap(),
                record
            );
        }
    }
}

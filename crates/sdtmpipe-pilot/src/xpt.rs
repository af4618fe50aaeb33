//! Reader for SAS XPORT (version 5) transport files
//!
//! The pilot datasets are published as single-member V5 transport files:
//! a stream of 80-byte records holding library and member headers, one
//! 140-byte NAMESTR entry per variable, then fixed-width observation
//! rows packed across record boundaries and blank-padded at the end.

const RECORD_LEN: usize = 80;
const NAMESTR_LEN: usize = 140;

/// Parse failure with enough context to locate the defect.
#[derive(Debug)]
pub enum XptError {
    /// Input ended before a complete record or section.
    Truncated { expected: usize, actual: usize },
    /// A header record did not carry the expected tag.
    BadHeader { record: usize, expected: &'static str },
    /// A numeric header field did not parse.
    BadField { field: &'static str, detail: String },
    /// A NAMESTR entry declared a type other than numeric or character.
    UnsupportedType { variable: String, code: u16 },
}

impl std::fmt::Display for XptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Truncated { expected, actual } => {
                write!(f, "truncated transport file: need {expected} bytes, have {actual}")
            }
            Self::BadHeader { record, expected } => {
                write!(f, "record {record} is not a {expected} header")
            }
            Self::BadField { field, detail } => write!(f, "bad {field}: {detail}"),
            Self::UnsupportedType { variable, code } => {
                write!(f, "variable {variable} has unsupported type code {code}")
            }
        }
    }
}

impl std::error::Error for XptError {}

/// Variable type code from the NAMESTR entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    Numeric,
    Char,
}

/// One variable (column) described by a NAMESTR entry.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub label: String,
    pub var_type: VarType,
    /// Field width within an observation row.
    pub length: usize,
    /// Byte offset within an observation row.
    pub position: usize,
}

/// Column values in variable order, one entry per observation.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Char(Vec<Option<String>>),
}

/// A parsed transport-file member.
#[derive(Debug)]
pub struct XptDataset {
    pub name: String,
    pub label: String,
    pub variables: Vec<Variable>,
    pub columns: Vec<ColumnValues>,
}

impl XptDataset {
    pub fn num_rows(&self) -> usize {
        match self.columns.first() {
            Some(ColumnValues::Numeric(values)) => values.len(),
            Some(ColumnValues::Char(values)) => values.len(),
            None => 0,
        }
    }
}

/// Cursor over the 80-byte records of a transport file.
struct Records<'a> {
    bytes: &'a [u8],
    index: usize,
}

impl<'a> Records<'a> {
    fn next(&mut self) -> Result<&'a [u8], XptError> {
        let start = self.index * RECORD_LEN;
        let end = start + RECORD_LEN;
        if end > self.bytes.len() {
            return Err(XptError::Truncated {
                expected: end,
                actual: self.bytes.len(),
            });
        }
        self.index += 1;
        Ok(&self.bytes[start..end])
    }

    fn expect_header(&mut self, tag: &'static str) -> Result<&'a [u8], XptError> {
        let record = self.index;
        let rec = self.next()?;
        let mut prefix = Vec::from(&b"HEADER RECORD*******"[..]);
        prefix.extend_from_slice(tag.as_bytes());
        if !rec.starts_with(&prefix) {
            return Err(XptError::BadHeader {
                record,
                expected: tag,
            });
        }
        Ok(rec)
    }

    /// Everything from the current record to the end of input.
    fn rest(&self) -> &'a [u8] {
        &self.bytes[(self.index * RECORD_LEN).min(self.bytes.len())..]
    }
}

/// Read the first member of a V5 transport file.
///
/// The pilot files hold one dataset per file; additional members are
/// ignored. Numeric values are IBM hexadecimal floats, possibly
/// truncated to 2-7 bytes; character values are blank-padded text.
pub fn read_xpt(bytes: &[u8]) -> Result<XptDataset, XptError> {
    let mut records = Records { bytes, index: 0 };

    records.expect_header("LIBRARY")?;
    records.next()?; // SAS vendor/version record
    records.next()?; // library creation timestamp

    let member = records.expect_header("MEMBER")?;
    let namestr_len = ascii_usize(&member[74..78], "NAMESTR entry length")?;
    if namestr_len != NAMESTR_LEN {
        return Err(XptError::BadField {
            field: "NAMESTR entry length",
            detail: format!("unsupported size {namestr_len}"),
        });
    }
    records.expect_header("DSCRPTR")?;

    let descriptor = records.next()?;
    let name = ascii_trimmed(&descriptor[8..16]);
    let label_record = records.next()?;
    let label = ascii_trimmed(&label_record[32..72]);

    let namestr_header = records.expect_header("NAMESTR")?;
    let var_count = ascii_usize(&namestr_header[54..58], "variable count")?;

    // NAMESTR entries are packed, then padded out to a record boundary
    let table_start = records.index * RECORD_LEN;
    let table_len = var_count * NAMESTR_LEN;
    let table_records = table_len.div_ceil(RECORD_LEN);
    if table_start + table_records * RECORD_LEN > bytes.len() {
        return Err(XptError::Truncated {
            expected: table_start + table_records * RECORD_LEN,
            actual: bytes.len(),
        });
    }
    let table = &bytes[table_start..table_start + table_len];
    let mut variables = Vec::with_capacity(var_count);
    for i in 0..var_count {
        variables.push(parse_namestr(&table[i * NAMESTR_LEN..(i + 1) * NAMESTR_LEN])?);
    }
    records.index += table_records;

    records.expect_header("OBS")?;
    let data = records.rest();

    let row_len = variables
        .iter()
        .map(|v| v.position + v.length)
        .max()
        .unwrap_or(0);
    let mut columns: Vec<ColumnValues> = variables
        .iter()
        .map(|v| match v.var_type {
            VarType::Numeric => ColumnValues::Numeric(Vec::new()),
            VarType::Char => ColumnValues::Char(Vec::new()),
        })
        .collect();

    if row_len > 0 {
        let mut offset = 0;
        while offset + row_len <= data.len() {
            let row = &data[offset..offset + row_len];
            // an all-blank row inside the final record is trailing pad
            if row.iter().all(|b| *b == b' ') && data.len() - offset < row_len + RECORD_LEN {
                break;
            }
            for (variable, column) in variables.iter().zip(columns.iter_mut()) {
                let field = &row[variable.position..variable.position + variable.length];
                match column {
                    ColumnValues::Numeric(values) => values.push(parse_numeric(field)),
                    ColumnValues::Char(values) => values.push(parse_char(field)),
                }
            }
            offset += row_len;
        }
    }

    Ok(XptDataset {
        name,
        label,
        variables,
        columns,
    })
}

fn parse_namestr(entry: &[u8]) -> Result<Variable, XptError> {
    let name = ascii_trimmed(&entry[8..16]);
    let var_type = match be_u16(&entry[0..2]) {
        1 => VarType::Numeric,
        2 => VarType::Char,
        code => return Err(XptError::UnsupportedType { variable: name, code }),
    };
    Ok(Variable {
        name,
        label: ascii_trimmed(&entry[16..56]),
        var_type,
        length: be_u16(&entry[4..6]) as usize,
        position: be_u32(&entry[84..88]) as usize,
    })
}

/// Decode an IBM System/360 hexadecimal float field. A first byte of
/// `.`, `_`, or `A`-`Z` with a zero remainder is a missing value.
fn parse_numeric(field: &[u8]) -> Option<f64> {
    let mut raw = [0u8; 8];
    let len = field.len().min(8);
    raw[..len].copy_from_slice(&field[..len]);
    let sentinel = matches!(raw[0], b'.' | b'_' | b'A'..=b'Z');
    if sentinel && raw[1..].iter().all(|b| *b == 0) {
        return None;
    }
    Some(ibm_to_f64(raw))
}

/// IBM format: 1 sign bit, 7-bit base-16 exponent biased by 64, and a
/// 56-bit fraction interpreted as 0.F.
fn ibm_to_f64(raw: [u8; 8]) -> f64 {
    let mantissa = u64::from_be_bytes(raw) & 0x00FF_FFFF_FFFF_FFFF;
    if mantissa == 0 {
        return 0.0;
    }
    let exponent = (raw[0] & 0x7F) as i32;
    let value = mantissa as f64 * 2f64.powi((exponent - 64) * 4 - 56);
    if raw[0] & 0x80 != 0 { -value } else { value }
}

/// Blank-padded text field; all-blank is missing.
fn parse_char(field: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(field);
    let trimmed = text.trim_end_matches([' ', '\0']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn ascii_trimmed(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches([' ', '\0'])
        .to_string()
}

fn ascii_usize(bytes: &[u8], field: &'static str) -> Result<usize, XptError> {
    let text = String::from_utf8_lossy(bytes);
    text.trim().parse().map_err(|_| XptError::BadField {
        field,
        detail: format!("{:?} is not a number", text.as_ref()),
    })
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Hand-built transport fixtures shared with the converter tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::{NAMESTR_LEN, RECORD_LEN};

    pub(crate) fn record(content: &str) -> Vec<u8> {
        let mut rec = content.as_bytes().to_vec();
        assert!(rec.len() <= RECORD_LEN, "record content too long");
        rec.resize(RECORD_LEN, b' ');
        rec
    }

    pub(crate) fn namestr(
        var_type: u16,
        length: u16,
        number: u16,
        name: &str,
        label: &str,
        position: u32,
    ) -> Vec<u8> {
        let mut entry = vec![0u8; NAMESTR_LEN];
        entry[8..56].fill(b' ');
        entry[0..2].copy_from_slice(&var_type.to_be_bytes());
        entry[4..6].copy_from_slice(&length.to_be_bytes());
        entry[6..8].copy_from_slice(&number.to_be_bytes());
        entry[8..8 + name.len()].copy_from_slice(name.as_bytes());
        entry[16..16 + label.len()].copy_from_slice(label.as_bytes());
        entry[84..88].copy_from_slice(&position.to_be_bytes());
        entry
    }

    fn pad_to_record(bytes: &mut Vec<u8>) {
        let over = bytes.len() % RECORD_LEN;
        if over != 0 {
            bytes.resize(bytes.len() + RECORD_LEN - over, b' ');
        }
    }

    /// 34.0 in IBM hexadecimal float
    pub(crate) const IBM_34: [u8; 8] = [0x42, 0x22, 0, 0, 0, 0, 0, 0];
    /// Standard missing value
    pub(crate) const IBM_MISSING: [u8; 8] = [0x2E, 0, 0, 0, 0, 0, 0, 0];

    /// A DM member with USUBJID (char), AGE (numeric), RFSTDTC (char):
    /// row 1 = ("CDISC001", 34.0, "2013-08-01"), row 2 = ("CDISC002", ., "").
    pub(crate) fn transport_dm() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend(record(
            "HEADER RECORD*******LIBRARY HEADER RECORD!!!!!!!000000000000000000000000000000",
        ));
        bytes.extend(record("SAS     SAS     SASLIB  9.4     Linux"));
        bytes.extend(record("01JAN20:00:00:00"));
        bytes.extend(record(
            "HEADER RECORD*******MEMBER  HEADER RECORD!!!!!!!000000000000000001600000000140",
        ));
        bytes.extend(record(
            "HEADER RECORD*******DSCRPTR HEADER RECORD!!!!!!!000000000000000000000000000000",
        ));
        bytes.extend(record("SAS     DM      SASDATA 9.4     Linux"));
        bytes.extend(record(&format!("{:32}Demographics", "")));
        bytes.extend(record(&format!(
            "HEADER RECORD*******NAMESTR HEADER RECORD!!!!!!!000000{:04}{}",
            3,
            "0".repeat(22)
        )));
        bytes.extend(namestr(2, 12, 1, "USUBJID", "Unique Subject Identifier", 0));
        bytes.extend(namestr(1, 8, 2, "AGE", "Age", 12));
        bytes.extend(namestr(2, 10, 3, "RFSTDTC", "Subject Reference Start Date/Time", 20));
        pad_to_record(&mut bytes);
        bytes.extend(record(
            "HEADER RECORD*******OBS     HEADER RECORD!!!!!!!000000000000000000000000000000",
        ));
        let mut data = Vec::new();
        data.extend(b"CDISC001    ");
        data.extend(IBM_34);
        data.extend(b"2013-08-01");
        data.extend(b"CDISC002    ");
        data.extend(IBM_MISSING);
        data.extend(b"          ");
        bytes.extend(&data);
        pad_to_record(&mut bytes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{IBM_MISSING, transport_dm};
    use super::*;

    #[test]
    fn ibm_float_known_values() {
        assert_eq!(ibm_to_f64([0x41, 0x10, 0, 0, 0, 0, 0, 0]), 1.0);
        assert_eq!(ibm_to_f64([0xC1, 0x20, 0, 0, 0, 0, 0, 0]), -2.0);
        assert_eq!(ibm_to_f64([0x42, 0x64, 0, 0, 0, 0, 0, 0]), 100.0);
        assert_eq!(ibm_to_f64([0x40, 0x80, 0, 0, 0, 0, 0, 0]), 0.5);
        assert_eq!(ibm_to_f64([0u8; 8]), 0.0);
    }

    #[test]
    fn numeric_missing_sentinels() {
        assert_eq!(parse_numeric(&IBM_MISSING), None);
        assert_eq!(parse_numeric(&[b'_', 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(parse_numeric(&[b'A', 0, 0, 0, 0, 0, 0, 0]), None);
        assert_eq!(parse_numeric(&[b'Z', 0, 0, 0, 0, 0, 0, 0]), None);
        // 0x41 with a nonzero mantissa is the number 1.0, not missing .A
        assert_eq!(parse_numeric(&[0x41, 0x10, 0, 0, 0, 0, 0, 0]), Some(1.0));
    }

    #[test]
    fn numeric_truncated_field_is_zero_extended() {
        assert_eq!(parse_numeric(&[0x42, 0x64]), Some(100.0));
    }

    #[test]
    fn char_fields_strip_trailing_blanks() {
        assert_eq!(parse_char(b"DM      "), Some("DM".to_string()));
        assert_eq!(parse_char(b"        "), None);
    }

    #[test]
    fn namestr_round_trip() {
        let entry = fixtures::namestr(1, 8, 2, "AGE", "Age", 12);
        let variable = parse_namestr(&entry).unwrap();
        assert_eq!(variable.name, "AGE");
        assert_eq!(variable.label, "Age");
        assert_eq!(variable.var_type, VarType::Numeric);
        assert_eq!(variable.length, 8);
        assert_eq!(variable.position, 12);
    }

    #[test]
    fn namestr_rejects_unknown_type() {
        let entry = fixtures::namestr(3, 8, 1, "X", "", 0);
        let err = parse_namestr(&entry).unwrap_err();
        assert!(matches!(err, XptError::UnsupportedType { code: 3, .. }));
    }

    #[test]
    fn reads_member_end_to_end() {
        let dataset = read_xpt(&transport_dm()).unwrap();
        assert_eq!(dataset.name, "DM");
        assert_eq!(dataset.label, "Demographics");
        assert_eq!(dataset.num_rows(), 2);

        let names: Vec<&str> = dataset.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["USUBJID", "AGE", "RFSTDTC"]);

        assert_eq!(
            dataset.columns[0],
            ColumnValues::Char(vec![
                Some("CDISC001".to_string()),
                Some("CDISC002".to_string())
            ])
        );
        assert_eq!(dataset.columns[1], ColumnValues::Numeric(vec![Some(34.0), None]));
        assert_eq!(
            dataset.columns[2],
            ColumnValues::Char(vec![Some("2013-08-01".to_string()), None])
        );
    }

    #[test]
    fn truncated_input_is_an_error() {
        let bytes = transport_dm();
        let err = read_xpt(&bytes[..100]).unwrap_err();
        assert!(matches!(err, XptError::Truncated { .. }));
    }

    #[test]
    fn garbage_input_is_a_bad_header() {
        let err = read_xpt(&[b'X'; 80]).unwrap_err();
        assert!(matches!(
            err,
            XptError::BadHeader {
                record: 0,
                expected: "LIBRARY"
            }
        ));
    }
}

/*!
# CSV Validation & I/O

Reading allow-lists and reading/writing claim reports with header and version checks.
*/

use airdrop_merkle::Address;
use csv::{ReaderBuilder, Trim, Writer};
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::{
    errors::{CsvError, CsvResult},
    schemas::{
        AllowListRow, ClaimsRow, ALLOWLIST_CSV_HEADERS, CLAIMS_CSV_HEADERS,
        CURRENT_SCHEMA_VERSION, VERSION_HEADER,
    },
};

// ================================================================================================
// Allow-list Reading
// ================================================================================================

/// Read and validate an allow-list CSV file, returning addresses in file order
pub fn read_allowlist_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<Address>> {
    let file = File::open(path)?;
    parse_allowlist_csv(file)
}

/// Parse and validate allow-list CSV data from any reader
pub fn parse_allowlist_csv<R: Read>(mut reader: R) -> CsvResult<Vec<Address>> {
    let mut data = String::new();
    reader.read_to_string(&mut data)?;
    validate_version(&data)?;

    let mut rdr = ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    // Validate headers
    let headers = rdr.headers()?;
    validate_headers(headers.iter(), ALLOWLIST_CSV_HEADERS, "allowlist.csv")?;

    // Read and deserialize rows
    let mut addresses = Vec::new();
    for result in rdr.deserialize() {
        let row: AllowListRow = result?;
        addresses.push(row.address);
    }

    if addresses.is_empty() {
        return Err(CsvError::SchemaValidation(
            "Allow-list CSV file is empty".to_string(),
        ));
    }

    Ok(addresses)
}

/// Addresses that appear more than once, in order of their second appearance.
///
/// Duplicates are legal (each occurrence becomes its own leaf) but are almost
/// always a tooling mistake worth reporting.
pub fn find_duplicate_addresses(addresses: &[Address]) -> Vec<Address> {
    let mut seen = HashSet::with_capacity(addresses.len());
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for address in addresses {
        if !seen.insert(*address) && reported.insert(*address) {
            duplicates.push(*address);
        }
    }

    duplicates
}

// ================================================================================================
// Claims Report
// ================================================================================================

/// Write a claims report with a version header
pub fn write_claims_csv<P: AsRef<Path>>(path: P, rows: &[ClaimsRow]) -> CsvResult<()> {
    let file = File::create(path)?;
    write_claims_csv_to(file, rows)
}

/// Write a claims report to any writer
pub fn write_claims_csv_to<W: Write>(mut writer: W, rows: &[ClaimsRow]) -> CsvResult<()> {
    writeln!(writer, "{VERSION_HEADER}: {CURRENT_SCHEMA_VERSION}")?;

    let mut wtr = Writer::from_writer(writer);
    if rows.is_empty() {
        // csv only emits headers alongside the first serialized row
        wtr.write_record(CLAIMS_CSV_HEADERS)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read and validate a claims report
pub fn read_claims_csv<P: AsRef<Path>>(path: P) -> CsvResult<Vec<ClaimsRow>> {
    let file = File::open(path)?;
    parse_claims_csv(file)
}

/// Parse and validate claims report data from any reader
pub fn parse_claims_csv<R: Read>(mut reader: R) -> CsvResult<Vec<ClaimsRow>> {
    let mut data = String::new();
    reader.read_to_string(&mut data)?;
    validate_version(&data)?;

    let mut rdr = ReaderBuilder::new()
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    let headers = rdr.headers()?;
    validate_headers(headers.iter(), CLAIMS_CSV_HEADERS, "claims.csv")?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: ClaimsRow = result?;
        rows.push(row);
    }

    Ok(rows)
}

// ================================================================================================
// Header Validation
// ================================================================================================

fn validate_version(data: &str) -> CsvResult<()> {
    let first_line = data.lines().map(str::trim).find(|line| !line.is_empty());

    let Some(version) = first_line.and_then(|line| line.strip_prefix(VERSION_HEADER)) else {
        return Ok(());
    };

    let found = version.trim_start_matches(':').trim();
    if found != CURRENT_SCHEMA_VERSION {
        return Err(CsvError::VersionMismatch {
            expected: CURRENT_SCHEMA_VERSION.to_string(),
            found: found.to_string(),
        });
    }

    Ok(())
}

fn validate_headers<'a, I>(actual: I, expected: &[&str], file_type: &str) -> CsvResult<()>
where
    I: Iterator<Item = &'a str>,
{
    let actual_headers: Vec<&str> = actual.collect();

    if actual_headers.len() != expected.len() {
        return Err(CsvError::SchemaValidation(format!(
            "{}: expected {} headers, found {}",
            file_type,
            expected.len(),
            actual_headers.len()
        )));
    }

    for (i, (actual, expected)) in actual_headers.iter().zip(expected.iter()).enumerate() {
        if actual != expected {
            return Err(CsvError::SchemaValidation(format!(
                "{}: header {} should be '{}', found '{}'",
                file_type,
                i + 1,
                expected,
                actual
            )));
        }
    }

    Ok(())
}

// ================================================================================================
// Tests
// ================================================================================================

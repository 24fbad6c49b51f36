// Roster exchange - CSV export/import
//
// Header is `Title,TaxNumber`. Reading validates every record; a file with a
// single bad record is rejected as a whole.

use crate::entities::TaxPayer;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Deserialize, Serialize)]
struct TaxPayerRecord {
    #[serde(rename = "Title")]
    title: String,

    #[serde(rename = "TaxNumber")]
    tax_number: String,
}

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    InvalidRecord {
        line: u64,
        #[source]
        source: ValidationError,
    },
}

/// Write `taxpayers` as CSV. Returns the number of records written.
pub fn export_csv<W: Write>(taxpayers: &[TaxPayer], writer: W) -> Result<usize, ExchangeError> {
    let mut wtr = csv::Writer::from_writer(writer);

    for taxpayer in taxpayers {
        wtr.serialize(TaxPayerRecord {
            title: taxpayer.title().to_string(),
            tax_number: taxpayer.tax_number().to_string(),
        })?;
    }
    wtr.flush()?;

    Ok(taxpayers.len())
}

/// Read and validate taxpayers from CSV.
///
/// Later records win over earlier ones with the same tax number, the same
/// way repeated upserts behave. Order of first appearance is kept.
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<TaxPayer>, ExchangeError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut taxpayers: Vec<TaxPayer> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for result in rdr.records() {
        let raw = result?;
        let record: TaxPayerRecord = raw.deserialize(Some(&headers))?;
        let line = raw.position().map_or(0, |pos| pos.line());

        let taxpayer = TaxPayer::new(record.title, &record.tax_number)
            .map_err(|source| ExchangeError::InvalidRecord { line, source })?;

        match positions.get(taxpayer.tax_number()) {
            Some(&index) => taxpayers[index] = taxpayer,
            None => {
                positions.insert(taxpayer.tax_number().to_string(), taxpayers.len());
                taxpayers.push(taxpayer);
            }
        }
    }

    Ok(taxpayers)
}

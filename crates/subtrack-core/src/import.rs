//! Transaction file import
//!
//! Reads exported transactions as JSON (a bare array, or the aggregator's
//! `{"transactions": [...]}` envelope) or CSV with the columns
//! `date,name,merchant_name,amount,category`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use tracing::{debug, info};

use crate::dates::{self, format_iso_date};
use crate::error::{Error, Result};
use crate::models::RawTransaction;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Json,
    Csv,
}

impl ImportFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("csv") => Ok(Self::Csv),
            _ => Err(Error::Import(format!(
                "Unsupported file type: {} (expected .json or .csv)",
                path.display()
            ))),
        }
    }
}

/// Load every transaction in an export file
pub fn load_transactions(path: impl AsRef<Path>) -> Result<Vec<RawTransaction>> {
    let path = path.as_ref();
    let format = ImportFormat::from_path(path)?;
    let file = File::open(path)?;

    let transactions = match format {
        ImportFormat::Json => parse_json(file)?,
        ImportFormat::Csv => parse_csv(file)?,
    };

    info!(
        "Loaded {} transactions from {}",
        transactions.len(),
        path.display()
    );
    Ok(transactions)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonExport {
    Bare(Vec<RawTransaction>),
    Envelope { transactions: Vec<RawTransaction> },
}

/// Parse a JSON export
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let export: JsonExport = serde_json::from_reader(reader)?;
    Ok(match export {
        JsonExport::Bare(transactions) => transactions,
        JsonExport::Envelope { transactions } => transactions,
    })
}

/// Column positions resolved from the CSV header row
struct Columns {
    date: Option<usize>,
    name: Option<usize>,
    merchant_name: Option<usize>,
    amount: usize,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |wanted: &[&str]| {
            headers
                .iter()
                .position(|h| wanted.iter().any(|w| h.trim().eq_ignore_ascii_case(w)))
        };

        Ok(Self {
            date: find(&["date"]),
            name: find(&["name", "description"]),
            merchant_name: find(&["merchant_name", "merchant"]),
            amount: find(&["amount"])
                .ok_or_else(|| Error::Import("CSV is missing an 'amount' column".into()))?,
            category: find(&["category"]),
        })
    }
}

/// Parse a CSV export
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .filter(|v| !v.is_empty())
                .map(String::from)
        };

        let raw_amount = record.get(columns.amount).unwrap_or_default();
        let amount = parse_amount(raw_amount).map_err(|e| {
            Error::Import(format!("row {}: {}", line + 2, e))
        })?;

        let category = field(columns.category).map(|c| {
            c.split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });

        transactions.push(RawTransaction {
            amount,
            merchant_name: field(columns.merchant_name),
            name: field(columns.name),
            date: field(columns.date).map(|d| normalize_date(&d)),
            category,
        });
    }

    debug!("Parsed {} CSV rows", transactions.len());
    Ok(transactions)
}

/// Rewrite recognizable bank date formats as ISO days; anything else is kept
/// verbatim so detection can drop it
fn normalize_date(s: &str) -> String {
    if let Some(day) = dates::parse_calendar_day(s) {
        return format_iso_date(day);
    }

    let formats = [
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(format_iso_date)
        .unwrap_or_else(|| s.to_string())
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("-123.45").unwrap(), -123.45);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.00);
        assert!(parse_amount("lots").is_err());
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-01-15"), "2024-01-15");
        assert_eq!(normalize_date("01/15/2024"), "2024-01-15");
        assert_eq!(normalize_date("2024-01-15T08:00:00Z"), "2024-01-15");
        assert_eq!(normalize_date("yesterday"), "yesterday");
    }

    #[test]
    fn test_parse_csv() {
        let csv = "date,name,merchant_name,amount,category
2024-01-15,NETFLIX.COM,Netflix,$15.99,Service;Subscription
01/14/2024,STARBUCKS #123,,5.50,
2024-01-13,REFUND,Amazon,-25.00,Shops";

        let transactions = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 3);

        assert_eq!(transactions[0].merchant_name.as_deref(), Some("Netflix"));
        assert_eq!(transactions[0].amount, 15.99);
        assert_eq!(
            transactions[0].category,
            Some(vec!["Service".to_string(), "Subscription".to_string()])
        );

        assert_eq!(transactions[1].merchant_name, None);
        assert_eq!(transactions[1].merchant_key(), Some("STARBUCKS #123"));
        assert_eq!(transactions[1].date.as_deref(), Some("2024-01-14"));
        assert_eq!(transactions[1].category, None);

        assert_eq!(transactions[2].amount, -25.0);
    }

    #[test]
    fn test_parse_csv_requires_amount_column() {
        let csv = "date,name\n2024-01-15,NETFLIX";
        assert!(matches!(parse_csv(csv.as_bytes()), Err(Error::Import(_))));
    }

    #[test]
    fn test_parse_csv_bad_amount_reports_row() {
        let csv = "date,name,amount\n2024-01-15,NETFLIX,15.99\n2024-02-15,NETFLIX,n/a";
        match parse_csv(csv.as_bytes()) {
            Err(Error::Import(msg)) => assert!(msg.contains("row 3"), "{}", msg),
            other => panic!("expected import error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_json_shapes() {
        let bare = r#"[{"amount": 9.99, "merchant_name": "Spotify", "date": "2024-01-01"}]"#;
        assert_eq!(parse_json(bare.as_bytes()).unwrap().len(), 1);

        let envelope = r#"{"transactions": [
            {"amount": 9.99, "name": "SPOTIFY", "date": "2024-01-01", "category": ["Service"]},
            {"amount": 9.99, "name": "SPOTIFY", "date": "2024-02-01", "pending": false}
        ], "total_transactions": 2}"#;
        let transactions = parse_json(envelope.as_bytes()).unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].primary_category(), "Service");
    }

    #[test]
    fn test_load_transactions_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let csv_path = dir.path().join("export.CSV");
        let mut f = File::create(&csv_path).unwrap();
        writeln!(f, "date,name,amount").unwrap();
        writeln!(f, "2024-01-15,NETFLIX,15.99").unwrap();
        assert_eq!(load_transactions(&csv_path).unwrap().len(), 1);

        let json_path = dir.path().join("export.json");
        std::fs::write(&json_path, "[]").unwrap();
        assert!(load_transactions(&json_path).unwrap().is_empty());

        let txt_path = dir.path().join("export.txt");
        std::fs::write(&txt_path, "").unwrap();
        assert!(matches!(load_transactions(&txt_path), Err(Error::Import(_))));
    }
}

//! Stock rows from outside the database: CSV exports and generated demo data.

use crate::model::StockRow;
use chrono::{Duration as ChronoDuration, NaiveDate};
use fake::faker::company::raw::CompanyName;
use fake::faker::name::raw::LastName;
use fake::locales::EN;
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::path::Path;

#[derive(Debug)]
pub enum SeedError {
    /// File could not be opened or read
    Io(std::io::Error),
    /// A record did not match the stock view's columns
    Record { line: Option<u64>, message: String },
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(e) => write!(f, "I/O error: {e}"),
            SeedError::Record { line: Some(line), message } => write!(f, "line {line}: {message}"),
            SeedError::Record { line: None, message } => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<csv::Error> for SeedError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line());
        match err.into_kind() {
            csv::ErrorKind::Io(io) => SeedError::Io(io),
            other => SeedError::Record {
                line,
                message: format!("{other:?}"),
            },
        }
    }
}

/// Read a CSV export of the stock view (headers are the view's column names).
///
/// Rows without an item code are skipped. Unknown columns are ignored;
/// missing optional columns read as absent.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<StockRow>, SeedError> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for record in reader.deserialize::<StockRow>() {
        let row = record?;
        if row.item_code.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }
    log::info!(
        "loaded {} stock rows from {} ({skipped} without item code skipped)",
        rows.len(),
        path.display()
    );
    Ok(rows)
}

const UOMS: &[&str] = &["M", "YDS", "KG", "PCS"];
const WAREHOUSES: &[&str] = &["FAB-STORE", "ACC-STORE", "CUT-BUFFER"];
const INSPECTION: &[&str] = &["PASSED", "PENDING", "FAILED"];

/// `n` location rows spread over plausible items, orders and racks.
///
/// The same `seed` always yields the same rows.
pub fn demo_rows(n: usize, seed: u64) -> Vec<StockRow> {
    let mut rng = StdRng::seed_from_u64(seed);
    let items = (n / 3).max(1);
    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(8, 0, 0));

    (0..n)
        .map(|i| {
            let item = i % items;
            let supplier: String = CompanyName(EN).fake_with_rng(&mut rng);
            let buyer: String = LastName(EN).fake_with_rng(&mut rng);
            let mut row = StockRow::new(format!("FAB-{item:05}"))
                .supplier(supplier)
                .buyer(buyer)
                .bar_code(format!("BC{:08}", rng.gen_range(0..100_000_000u32)))
                .location(
                    pick(WAREHOUSES, &mut rng),
                    &format!("R{:02}", rng.gen_range(1..40)),
                    &format!("S{}", rng.gen_range(1..8)),
                )
                .qty((rng.gen_range(0.0..500.0f64) * 100.0).round() / 100.0);
            if rng.gen_bool(0.8) {
                row = row.po(format!("PO-{:04}", item % 97));
            }
            if rng.gen_bool(0.1) {
                row.rack_no = None;
            }
            row.uom = Some(pick(UOMS, &mut rng).to_string());
            row.inspection_status = rng.gen_bool(0.7).then(|| pick(INSPECTION, &mut rng).to_string());
            row.invoice_no = Some(format!("INV-{}", rng.gen_range(1000..9999)));
            row.received_date = base_date.map(|d| d + ChronoDuration::days(rng.gen_range(0..365)));
            row
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(choices: &[&'static str], rng: &mut R) -> &'static str {
    choices.choose(rng).copied().unwrap_or_default()
}

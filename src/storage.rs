use crate::table::{TradeRow, TradeTable};
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write serde rows (catalog tables, long trade rows) as CSV under `header`.
///
/// The header is written even when there are no rows.
pub fn write_csv<T: Serialize, W: Write>(header: &[&str], rows: &[T], writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(header)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a trade table as CSV.
///
/// Long form uses the row columns. Wide form writes `Period`, `Country`,
/// then one `<Variable> (<counterpart>)` column per data column; empty
/// cells stay empty.
pub fn write_table_csv<W: Write>(table: &TradeTable, writer: W) -> Result<()> {
    match table {
        TradeTable::Long(rows) => write_csv(&TradeRow::COLUMNS, rows, writer)?,
        TradeTable::Wide(w) => {
            let mut wtr = WriterBuilder::new().from_writer(writer);
            wtr.write_record(w.header())?;
            for row in &w.rows {
                let mut record = vec![row.period.clone(), w.country.clone()];
                record.extend(
                    row.values
                        .iter()
                        .map(|v| v.map(|x| format!("{:?}", x)).unwrap_or_default()),
                );
                wtr.write_record(&record)?;
            }
            wtr.flush()?;
        }
    }
    Ok(())
}

/// Save a trade table as CSV with header.
pub fn save_csv<P: AsRef<Path>>(table: &TradeTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    write_table_csv(table, f)
}

/// Save a trade table as pretty JSON (an array of rows for long form, an
/// object with `country`, `columns`, `rows` for wide form).
pub fn save_json<P: AsRef<Path>>(table: &TradeTable, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(table)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

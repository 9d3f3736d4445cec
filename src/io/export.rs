use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::application::{AppError, ExpenseService};
use crate::domain::format_cents;

/// File name used when no export target is given.
pub const DEFAULT_EXPORT_FILE: &str = "expenses.csv";

/// Exporter for writing the ledger out as CSV
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Write every expense, in the order it was recorded, as CSV.
    pub fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["date", "category", "amount", "description"])?;

        let mut count = 0;
        for record in self.service.records() {
            csv_writer.write_record([
                record.date.as_str(),
                record.category.as_str(),
                format_cents(record.amount_cents).as_str(),
                record.description.as_str(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Write the per-category breakdown as CSV, largest total first.
    pub fn export_breakdown_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.service.category_report();
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["category", "total", "count", "percentage"])?;
        for cat in &report.categories {
            csv_writer.write_record([
                cat.category.clone(),
                format_cents(cat.total),
                cat.count.to_string(),
                format!("{:.2}", cat.percentage),
            ])?;
        }

        csv_writer.flush()?;
        Ok(report.categories.len())
    }

    /// Export to a file. Refuses when the ledger is empty.
    pub fn export_to_file(&self, path: &Path) -> Result<usize, AppError> {
        if self.service.records().is_empty() {
            return Err(AppError::NothingToExport);
        }

        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        let count = self
            .export_expenses_csv(file)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!(path = %path.display(), count, "exported expenses");
        Ok(count)
    }
}

/// Resolve the export target: the default name when blank, and a `.csv`
/// extension appended when missing.
pub fn csv_target(name: Option<&str>) -> PathBuf {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    match name {
        None => PathBuf::from(DEFAULT_EXPORT_FILE),
        Some(n) if n.ends_with(".csv") => PathBuf::from(n),
        Some(n) => PathBuf::from(format!("{}.csv", n)),
    }
}

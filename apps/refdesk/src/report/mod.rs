use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::report::ReferralReportRow;

/// Report columns: name, email, phone, years_of_experience, job_id. Fixed
/// regardless of which fields were found.
pub const HEADERS: [&str; 5] = ["Name", "Email", "Phone", "Years of Experience", "Job ID"];

/// Collects normalized rows in arrival order and lays them out in the fixed
/// schema. Values are written as given.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    rows: Vec<ReferralReportRow>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: ReferralReportRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ReferralReportRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of every row in `HEADERS` order.
    pub fn records(&self) -> impl Iterator<Item = [String; 5]> + '_ {
        self.rows.iter().map(|row| {
            [
                row.name.clone(),
                row.email.clone(),
                row.phone.clone(),
                row.years_of_experience.to_string(),
                row.job_id.clone(),
            ]
        })
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), AppError> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(HEADERS)?;
        for record in self.records() {
            csv.write_record(&record)?;
        }
        csv.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        if self.is_empty() {
            warn!("No report rows; writing headers only to {}", path.display());
        }
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        info!("Wrote {} report rows to {}", self.len(), path.display());
        Ok(())
    }
}

impl FromIterator<ReferralReportRow> for ReportAssembler {
    fn from_iter<I: IntoIterator<Item = ReferralReportRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

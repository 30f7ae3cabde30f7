use crate::cli::output::findings;
use eipcleanup::{Result, RunReport};
use std::path::Path;

/*-------------------------------------------------------------------------------------------------
  Save Findings to CSV File
-------------------------------------------------------------------------------------------------*/

pub fn save(report: &RunReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.serialize([
        "Scanned At",
        "Region",
        "Public IP",
        "Allocation ID",
        "Status",
        "Detail",
    ])?;

    let scanned_at = report.started_at.to_rfc3339();

    // Write finding records
    for finding in findings(report) {
        let record = (
            &scanned_at,
            finding.region,
            finding.public_ip,
            finding.allocation_id,
            finding.status,
            &finding.detail,
        );
        writer.serialize(record)?;
    }

    writer.flush()?;

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

use eipcleanup::{
    AddressRecord, Mode, RegionOutcome, RegionResult, ReleaseOutcome, Result, RunReport, SkipReason,
};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::{NOTHING, UTF8_FULL};
use comfy_table::*;

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Findings
--------------------------------------------------------------------------------------*/

/// One output row per candidate address, plus one row per region that failed to list.
#[derive(Debug, Eq, PartialEq)]
pub struct Finding<'r> {
    pub region: &'r str,
    pub public_ip: &'r str,
    pub allocation_id: &'r str,
    pub status: &'static str,
    pub detail: String,
}

pub fn findings(report: &RunReport) -> Vec<Finding<'_>> {
    let mut findings = Vec::new();
    for region_report in &report.regions {
        match &region_report.outcome {
            RegionOutcome::Scanned(result) => {
                for candidate in &result.candidates {
                    let (status, detail) = candidate_status(report.mode, result, candidate);
                    findings.push(Finding {
                        region: &region_report.region,
                        public_ip: &candidate.public_ip,
                        allocation_id: &candidate.allocation_id,
                        status,
                        detail,
                    });
                }
            }
            RegionOutcome::Failed(error) => findings.push(Finding {
                region: &region_report.region,
                public_ip: "",
                allocation_id: "",
                status: "region error",
                detail: error.to_string(),
            }),
        }
    }
    findings
}

fn candidate_status(
    mode: Mode,
    result: &RegionResult,
    candidate: &AddressRecord,
) -> (&'static str, String) {
    match (mode, result.release_outcome(&candidate.allocation_id)) {
        (Mode::DryRun, _) => ("unassociated", String::new()),
        (Mode::Apply, Some(ReleaseOutcome::Released)) => ("released", String::new()),
        (Mode::Apply, Some(ReleaseOutcome::Failed(error))) => ("failed", error.to_string()),
        (Mode::Apply, Some(ReleaseOutcome::Skipped(SkipReason::Declined))) => {
            ("skipped", "declined".to_string())
        }
        (Mode::Apply, Some(ReleaseOutcome::Skipped(SkipReason::Cancelled))) => {
            ("skipped", "cancelled".to_string())
        }
        (Mode::Apply, None) => ("unassociated", String::new()),
    }
}

/*--------------------------------------------------------------------------------------
  Findings Table
--------------------------------------------------------------------------------------*/

pub fn findings_table(report: &RunReport) {
    let findings = findings(report);

    if !findings.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Region")
                .add_attribute(Attribute::Bold)
                .fg(Color::Green),
            Cell::new("Public IP")
                .add_attribute(Attribute::Bold)
                .fg(Color::Green),
            Cell::new("Allocation ID")
                .add_attribute(Attribute::Bold)
                .fg(Color::Green),
            Cell::new("Status")
                .add_attribute(Attribute::Bold)
                .fg(Color::Green),
        ]);

        for finding in &findings {
            let status = if finding.detail.is_empty() {
                finding.status.to_string()
            } else {
                format!("{}: {}", finding.status, finding.detail)
            };
            let status_color = match finding.status {
                "released" => Color::Green,
                "failed" | "region error" => Color::Red,
                _ => Color::Yellow,
            };

            table.add_row(vec![
                Cell::new(finding.region),
                Cell::new(finding.public_ip).add_attribute(Attribute::Bold),
                Cell::new(finding.allocation_id),
                Cell::new(status).fg(status_color),
            ]);
        }

        // Right-align the Public IP column
        if let Some(column) = table.column_mut(1) {
            column.set_cell_alignment(CellAlignment::Right);
        }

        println!("{table}");
    }

    summary_table(report);
}

/*--------------------------------------------------------------------------------------
  Summary Table
--------------------------------------------------------------------------------------*/

fn summary_table(report: &RunReport) {
    let summary = report.summary();

    let mut rows = vec![
        (summary.regions_scanned, "Regions scanned"),
        (summary.regions_failed, "Regions failed"),
        (summary.addresses, "Elastic IPs"),
        (summary.associated, "Associated"),
        (summary.excluded, "Excluded (whitelist)"),
        (summary.candidates, "Unassociated candidates"),
    ];
    if report.mode.is_apply() {
        rows.push((summary.released, "Released"));
        rows.push((summary.release_failures, "Release failures"));
        rows.push((summary.skipped, "Skipped"));
    }

    let mut summary_table = Table::new();
    summary_table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic);

    for (count, label) in rows {
        summary_table.add_row(vec![Cell::new(count), Cell::new(label)]);
    }

    if let Some(column) = summary_table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }

    println!("{summary_table}");
}

/*--------------------------------------------------------------------------------------
  JSON Report
--------------------------------------------------------------------------------------*/

#[derive(serde::Serialize)]
struct JsonReport<'r> {
    #[serde(flatten)]
    report: &'r RunReport,
    summary: eipcleanup::RunSummary,
}

pub fn json_report(report: &RunReport) -> Result<String> {
    let json_report = JsonReport {
        report,
        summary: report.summary(),
    };
    Ok(serde_json::to_string_pretty(&json_report)?)
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

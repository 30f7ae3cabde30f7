use eipcleanup::RunReport;
use log::{error, info, warn};

/*-------------------------------------------------------------------------------------------------
  Logging Functions
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  Run Summary
--------------------------------------------------------------------------------------*/

pub fn run_summary(report: &RunReport) {
    let summary = report.summary();
    let regions = summary.regions_scanned + summary.regions_failed;

    info!(
        "Scanned {} of {regions} region(s): {} Elastic IP(s), {} associated, {} excluded, {} unassociated candidate(s)",
        summary.regions_scanned,
        summary.addresses,
        summary.associated,
        summary.excluded,
        summary.candidates
    );

    if report.mode.is_apply() {
        info!(
            "Released {} Elastic IP(s); {} failed, {} skipped",
            summary.released, summary.release_failures, summary.skipped
        );
    } else if summary.candidates > 0 {
        info!("Dry run; use --apply to release the unassociated Elastic IPs");
    }

    if summary.regions_failed > 0 {
        error!("{} region(s) could not be scanned", summary.regions_failed);
    }
    if report.aborted {
        error!("Run aborted after a fatal provider error");
    }
    if report.cancelled {
        warn!("Run cancelled");
    }
}

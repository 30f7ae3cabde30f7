use crate::core::address::AddressRecord;
use crate::core::errors::ProviderError;
use crate::core::results::{RegionResult, SkipReason};
use log::{error, info, warn};

/*-------------------------------------------------------------------------------------------------
  Reporter
-------------------------------------------------------------------------------------------------*/

/// Receives scan progress from the [Scanner](crate::Scanner). Injected so the scanner never
/// reaches into global logging state.
pub trait Reporter {
    /// The region's addresses were listed and classified.
    fn region_scanned(&self, result: &RegionResult);

    fn region_failed(&self, region: &str, error: &ProviderError);

    fn released(&self, region: &str, address: &AddressRecord);

    fn release_failed(&self, region: &str, address: &AddressRecord, error: &ProviderError);

    /// Release calls for `count` candidates in the region were not issued.
    fn releases_skipped(&self, region: &str, count: usize, reason: SkipReason);

    /// Release attempts for the region are complete.
    fn region_completed(&self, result: &RegionResult);
}

/*-------------------------------------------------------------------------------------------------
  Log Reporter
-------------------------------------------------------------------------------------------------*/

/// [Reporter] that writes human-readable progress through the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn region_scanned(&self, result: &RegionResult) {
        let region = &result.region;
        info!(
            "[{region}] {} address(es): {} associated, {} unassociated, {} excluded",
            result.total, result.associated, result.unassociated, result.excluded
        );

        if result.candidates.is_empty() {
            info!("[{region}] No unassociated Elastic IPs found");
            return;
        }

        info!(
            "[{region}] Unassociated Elastic IPs found ({}):",
            result.candidates.len()
        );
        for candidate in &result.candidates {
            info!(
                "[{region}] - IP: {}, ID: {}",
                candidate.public_ip, candidate.allocation_id
            );
        }
    }

    fn region_failed(&self, region: &str, error: &ProviderError) {
        error!("[{region}] Unable to list addresses: {error}");
    }

    fn released(&self, region: &str, address: &AddressRecord) {
        info!(
            "[{region}] Released {} ({})",
            address.public_ip, address.allocation_id
        );
    }

    fn release_failed(&self, region: &str, address: &AddressRecord, error: &ProviderError) {
        error!(
            "[{region}] FAILED to release {} ({}): {error}",
            address.public_ip, address.allocation_id
        );
    }

    fn releases_skipped(&self, region: &str, count: usize, reason: SkipReason) {
        match reason {
            SkipReason::Declined => warn!("[{region}] Release of {count} address(es) declined"),
            SkipReason::Cancelled => {
                warn!("[{region}] Cancelled; {count} address(es) not released")
            }
        }
    }

    fn region_completed(&self, result: &RegionResult) {
        info!(
            "[{}] Released {}, failed {}, skipped {}",
            result.region,
            result.released(),
            result.failed(),
            result.skipped()
        );
    }
}

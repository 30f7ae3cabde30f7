use crate::core::address::AddressRecord;
use crate::core::errors::ProviderError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/*-------------------------------------------------------------------------------------------------
  Scan Mode
-------------------------------------------------------------------------------------------------*/

/// Whether a scan only reports its findings or also releases the candidates.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    DryRun,
    Apply,
}

impl Mode {
    pub fn is_apply(&self) -> bool {
        matches!(self, Mode::Apply)
    }
}

impl From<bool> for Mode {
    /// `true` enables apply mode.
    fn from(apply: bool) -> Self {
        if apply {
            Mode::Apply
        } else {
            Mode::DryRun
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Release Records
-------------------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Releases for the region were not approved.
    Declined,
    /// The run was cancelled before the release call was issued.
    Cancelled,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released,
    Failed(ProviderError),
    Skipped(SkipReason),
}

/// Outcome of the release attempt for one candidate address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ReleaseRecord {
    pub address: AddressRecord,
    pub outcome: ReleaseOutcome,
}

/*-------------------------------------------------------------------------------------------------
  Region Result
-------------------------------------------------------------------------------------------------*/

/// Per-region scan summary.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RegionResult {
    pub region: String,
    pub total: usize,
    pub associated: usize,
    pub unassociated: usize,
    pub excluded: usize,

    /// Unassociated, non-excluded addresses.
    pub candidates: Vec<AddressRecord>,

    /// One record per candidate in apply mode; empty for a dry run.
    pub releases: Vec<ReleaseRecord>,
}

impl RegionResult {
    pub fn released(&self) -> usize {
        self.count_releases(|outcome| matches!(outcome, ReleaseOutcome::Released))
    }

    pub fn failed(&self) -> usize {
        self.count_releases(|outcome| matches!(outcome, ReleaseOutcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count_releases(|outcome| matches!(outcome, ReleaseOutcome::Skipped(_)))
    }

    /// Release outcome recorded for a candidate, if any.
    pub fn release_outcome(&self, allocation_id: &str) -> Option<&ReleaseOutcome> {
        self.releases
            .iter()
            .find(|release| release.address.allocation_id == allocation_id)
            .map(|release| &release.outcome)
    }

    fn count_releases(&self, predicate: impl Fn(&ReleaseOutcome) -> bool) -> usize {
        self.releases
            .iter()
            .filter(|release| predicate(&release.outcome))
            .count()
    }
}

/*-------------------------------------------------------------------------------------------------
  Run Report
-------------------------------------------------------------------------------------------------*/

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum RegionOutcome {
    Scanned(RegionResult),
    Failed(ProviderError),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RegionReport {
    pub region: String,
    pub outcome: RegionOutcome,
}

impl RegionReport {
    pub fn result(&self) -> Option<&RegionResult> {
        match &self.outcome {
            RegionOutcome::Scanned(result) => Some(result),
            RegionOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ProviderError> {
        match &self.outcome {
            RegionOutcome::Scanned(_) => None,
            RegionOutcome::Failed(error) => Some(error),
        }
    }
}

/// Ordered per-region reports for one invocation.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub mode: Mode,

    /// Region reports in the order the regions were given.
    pub regions: Vec<RegionReport>,

    /// A fatal (authorization) error stopped the run before all regions were scanned.
    pub aborted: bool,

    /// The run was cancelled externally.
    pub cancelled: bool,
}

impl RunReport {
    pub fn summary(&self) -> RunSummary {
        self.regions
            .iter()
            .fold(RunSummary::default(), |mut summary, report| {
                match &report.outcome {
                    RegionOutcome::Scanned(result) => {
                        summary.regions_scanned += 1;
                        summary.addresses += result.total;
                        summary.associated += result.associated;
                        summary.excluded += result.excluded;
                        summary.candidates += result.candidates.len();
                        summary.released += result.released();
                        summary.release_failures += result.failed();
                        summary.skipped += result.skipped();
                    }
                    RegionOutcome::Failed(_) => summary.regions_failed += 1,
                }
                summary
            })
    }

    pub fn has_region_failures(&self) -> bool {
        self.aborted || self.regions.iter().any(|report| report.error().is_some())
    }

    pub fn has_release_failures(&self) -> bool {
        self.regions
            .iter()
            .filter_map(RegionReport::result)
            .any(|result| result.failed() > 0)
    }
}

/// Cross-region totals.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RunSummary {
    pub regions_scanned: usize,
    pub regions_failed: usize,
    pub addresses: usize,
    pub associated: usize,
    pub excluded: usize,
    pub candidates: usize,
    pub released: usize,
    pub release_failures: usize,
    pub skipped: usize,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

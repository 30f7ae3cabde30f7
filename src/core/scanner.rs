use crate::core::address::{self, AddressRecord};
use crate::core::errors::ProviderError;
use crate::core::exclusion::ExclusionSet;
use crate::core::provider::AddressProvider;
use crate::core::reporter::{LogReporter, Reporter};
use crate::core::results::{
    Mode, RegionOutcome, RegionReport, RegionResult, ReleaseOutcome, ReleaseRecord, RunReport,
    SkipReason,
};
use chrono::Utc;
use log::{error, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/*-------------------------------------------------------------------------------------------------
  Approval
-------------------------------------------------------------------------------------------------*/

/// Decides whether a region's candidates may be released. Consulted once per region in apply
/// mode, after the candidates are known and before any release call is issued.
pub trait Approval {
    fn approve(&self, region: &str, candidates: &[AddressRecord]) -> bool;
}

/// Approve every release.
#[derive(Clone, Copy, Debug, Default)]
pub struct AutoApprove;

impl Approval for AutoApprove {
    fn approve(&self, _region: &str, _candidates: &[AddressRecord]) -> bool {
        true
    }
}

impl<F> Approval for F
where
    F: Fn(&str, &[AddressRecord]) -> bool,
{
    fn approve(&self, region: &str, candidates: &[AddressRecord]) -> bool {
        self(region, candidates)
    }
}

/*-------------------------------------------------------------------------------------------------
  Cancel Flag
-------------------------------------------------------------------------------------------------*/

/// Shared cancellation flag. Once raised, the scanner issues no further release calls and scans
/// no further regions; a release call already in flight completes.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/*-------------------------------------------------------------------------------------------------
  Scanner
-------------------------------------------------------------------------------------------------*/

/// Finds unassociated addresses and, in apply mode, releases them.
///
/// ```
/// use eipcleanup::{AddressProvider, AddressRecord, ExclusionSet, Mode, ProviderError, Scanner};
///
/// struct Fixed;
///
/// impl AddressProvider for Fixed {
///     fn list_addresses(&self, _region: &str) -> Result<Vec<AddressRecord>, ProviderError> {
///         Ok(vec![AddressRecord::new("eipalloc-1", "192.0.2.1", None)])
///     }
///
///     fn release_address(&self, _region: &str, _id: &str) -> Result<(), ProviderError> {
///         Ok(())
///     }
/// }
///
/// let scanner = Scanner::new(Fixed);
/// let result = scanner
///     .scan_region("us-east-1", &ExclusionSet::default(), Mode::DryRun)
///     .unwrap();
/// assert_eq!(result.candidates.len(), 1);
/// ```
pub struct Scanner<'a, P: AddressProvider> {
    provider: P,
    reporter: Box<dyn Reporter + 'a>,
    approval: Box<dyn Approval + 'a>,
    cancel: CancelFlag,
}

impl<'a, P: AddressProvider> Scanner<'a, P> {
    /// Create a scanner that logs through [LogReporter], approves every release, and is never
    /// cancelled.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            reporter: Box::new(LogReporter),
            approval: Box::new(AutoApprove),
            cancel: CancelFlag::new(),
        }
    }

    pub fn reporter(mut self, reporter: impl Reporter + 'a) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    pub fn approval(mut self, approval: impl Approval + 'a) -> Self {
        self.approval = Box::new(approval);
        self
    }

    pub fn cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /*-------------------------------------------------------------------------
      Scan Region
    -------------------------------------------------------------------------*/

    /// Scan one region: list its addresses, classify them, drop excluded addresses, and in
    /// [Mode::Apply] release the remaining candidates.
    ///
    /// A list failure is returned as the region's error. Release failures never abort the batch;
    /// each is recorded in [RegionResult::releases].
    pub fn scan_region(
        &self,
        region: &str,
        exclusion_set: &ExclusionSet,
        mode: Mode,
    ) -> Result<RegionResult, ProviderError> {
        if !is_region_name(region) {
            return Err(ProviderError::Region(format!(
                "invalid region identifier {region:?}"
            )));
        }
        let records = self.provider.list_addresses(region)?;
        let total = records.len();

        let (associated, unassociated) = address::partition(records);
        let unassociated_count = unassociated.len();

        let (excluded, candidates): (Vec<AddressRecord>, Vec<AddressRecord>) = unassociated
            .into_iter()
            .partition(|record| exclusion_set.contains(&record.allocation_id));
        trace!("[{region}] Excluded: {:?}", excluded);

        let mut result = RegionResult {
            region: region.to_string(),
            total,
            associated: associated.len(),
            unassociated: unassociated_count,
            excluded: excluded.len(),
            candidates,
            releases: Vec::new(),
        };
        self.reporter.region_scanned(&result);

        if mode.is_apply() && !result.candidates.is_empty() {
            result.releases = self.release_candidates(region, &result.candidates);
            self.reporter.region_completed(&result);
        }

        Ok(result)
    }

    fn release_candidates(&self, region: &str, candidates: &[AddressRecord]) -> Vec<ReleaseRecord> {
        let skip_all = |reason: SkipReason| -> Vec<ReleaseRecord> {
            self.reporter
                .releases_skipped(region, candidates.len(), reason);
            candidates
                .iter()
                .map(|candidate| ReleaseRecord {
                    address: candidate.clone(),
                    outcome: ReleaseOutcome::Skipped(reason),
                })
                .collect()
        };

        if self.cancel.is_cancelled() {
            return skip_all(SkipReason::Cancelled);
        }
        let approved = self.approval.approve(region, candidates);
        // Interrupted while the approval was pending
        if self.cancel.is_cancelled() {
            return skip_all(SkipReason::Cancelled);
        }
        if !approved {
            return skip_all(SkipReason::Declined);
        }

        let mut releases = Vec::with_capacity(candidates.len());
        let mut cancelled = 0;
        for candidate in candidates {
            let outcome = if self.cancel.is_cancelled() {
                cancelled += 1;
                ReleaseOutcome::Skipped(SkipReason::Cancelled)
            } else {
                match self
                    .provider
                    .release_address(region, &candidate.allocation_id)
                {
                    Ok(()) => {
                        self.reporter.released(region, candidate);
                        ReleaseOutcome::Released
                    }
                    Err(error) => {
                        self.reporter.release_failed(region, candidate, &error);
                        ReleaseOutcome::Failed(error)
                    }
                }
            };
            releases.push(ReleaseRecord {
                address: candidate.clone(),
                outcome,
            });
        }

        if cancelled > 0 {
            self.reporter
                .releases_skipped(region, cancelled, SkipReason::Cancelled);
        }

        releases
    }

    /*-------------------------------------------------------------------------
      Run
    -------------------------------------------------------------------------*/

    /// Scan each region in the order given. A region that fails to list is recorded and the run
    /// continues with the next region, unless the failure is fatal (authorization), which stops
    /// the run.
    pub fn run<S: AsRef<str>>(
        &self,
        regions: &[S],
        exclusion_set: &ExclusionSet,
        mode: Mode,
    ) -> RunReport {
        let mut report = RunReport {
            started_at: Utc::now(),
            mode,
            regions: Vec::with_capacity(regions.len()),
            aborted: false,
            cancelled: false,
        };

        for region in regions.iter().map(AsRef::as_ref) {
            if self.cancel.is_cancelled() {
                break;
            }

            let outcome = match self.scan_region(region, exclusion_set, mode) {
                Ok(result) => RegionOutcome::Scanned(result),
                Err(error) => {
                    self.reporter.region_failed(region, &error);
                    report.aborted = error.is_fatal();
                    RegionOutcome::Failed(error)
                }
            };
            report.regions.push(RegionReport {
                region: region.to_string(),
                outcome,
            });

            if report.aborted {
                error!("[{region}] Fatal provider error; remaining regions not scanned");
                break;
            }
        }

        report.cancelled = self.cancel.is_cancelled();
        report
    }
}

/// Region identifiers are lower-case ASCII letters, digits, and hyphens (`us-east-1`).
fn is_region_name(region: &str) -> bool {
    !region.is_empty()
        && region
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use test_log::test;

    /*-------------------------------------------------------------------------
      Test Doubles
    -------------------------------------------------------------------------*/

    #[derive(Default)]
    struct FakeProvider {
        regions: BTreeMap<String, Result<Vec<AddressRecord>, ProviderError>>,
        release_errors: BTreeMap<String, ProviderError>,
        list_calls: RefCell<Vec<String>>,
        release_calls: RefCell<Vec<(String, String)>>,
        cancel_after_release: Option<CancelFlag>,
    }

    impl FakeProvider {
        fn region(mut self, region: &str, records: Vec<AddressRecord>) -> Self {
            self.regions.insert(region.to_string(), Ok(records));
            self
        }

        fn failing_region(mut self, region: &str, error: ProviderError) -> Self {
            self.regions.insert(region.to_string(), Err(error));
            self
        }

        fn failing_release(mut self, allocation_id: &str, error: ProviderError) -> Self {
            self.release_errors.insert(allocation_id.to_string(), error);
            self
        }

        fn release_calls(&self) -> Vec<String> {
            self.release_calls
                .borrow()
                .iter()
                .map(|(_, id)| id.clone())
                .collect()
        }
    }

    impl AddressProvider for FakeProvider {
        fn list_addresses(&self, region: &str) -> Result<Vec<AddressRecord>, ProviderError> {
            self.list_calls.borrow_mut().push(region.to_string());
            self.regions
                .get(region)
                .cloned()
                .unwrap_or_else(|| Err(ProviderError::Region(format!("unknown region {region}"))))
        }

        fn release_address(&self, region: &str, allocation_id: &str) -> Result<(), ProviderError> {
            self.release_calls
                .borrow_mut()
                .push((region.to_string(), allocation_id.to_string()));
            if let Some(cancel) = &self.cancel_after_release {
                cancel.cancel();
            }
            match self.release_errors.get(allocation_id) {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: RefCell<Vec<String>>,
    }

    impl RecordingReporter {
        fn push(&self, event: String) {
            self.events.borrow_mut().push(event);
        }
    }

    impl Reporter for &RecordingReporter {
        fn region_scanned(&self, result: &RegionResult) {
            self.push(format!("scanned {} {}", result.region, result.candidates.len()));
        }

        fn region_failed(&self, region: &str, _error: &ProviderError) {
            self.push(format!("failed {region}"));
        }

        fn released(&self, region: &str, address: &AddressRecord) {
            self.push(format!("released {region} {}", address.allocation_id));
        }

        fn release_failed(&self, region: &str, address: &AddressRecord, _error: &ProviderError) {
            self.push(format!("release_failed {region} {}", address.allocation_id));
        }

        fn releases_skipped(&self, region: &str, count: usize, reason: SkipReason) {
            self.push(format!("skipped {region} {count} {reason:?}"));
        }

        fn region_completed(&self, result: &RegionResult) {
            self.push(format!("completed {}", result.region));
        }
    }

    fn unassociated(id: &str) -> AddressRecord {
        AddressRecord::new(id, "192.0.2.10", None)
    }

    fn associated(id: &str) -> AddressRecord {
        AddressRecord::new(id, "192.0.2.20", Some(format!("eipassoc-{id}")))
    }

    fn candidate_ids(result: &RegionResult) -> Vec<&str> {
        result
            .candidates
            .iter()
            .map(|candidate| candidate.allocation_id.as_str())
            .collect()
    }

    /// A1 associated, A2 unassociated, A3 unassociated and excluded.
    fn scenario_provider() -> FakeProvider {
        FakeProvider::default().region(
            "us-east-1",
            vec![associated("A1"), unassociated("A2"), unassociated("A3")],
        )
    }

    /*-------------------------------------------------------------------------
      Scan Region
    -------------------------------------------------------------------------*/

    #[test]
    fn test_scan_region_dry_run() {
        let provider = scenario_provider();
        let exclusion_set = ExclusionSet::from_iter(["A3"]);
        let scanner = Scanner::new(&provider);

        let result = scanner
            .scan_region("us-east-1", &exclusion_set, Mode::DryRun)
            .unwrap();

        assert_eq!(candidate_ids(&result), ["A2"]);
        assert_eq!(result.total, 3);
        assert_eq!(result.associated, 1);
        assert_eq!(result.unassociated, 2);
        assert_eq!(result.excluded, 1);
        assert!(result.releases.is_empty());
        assert!(provider.release_calls().is_empty());
    }

    #[test]
    fn test_scan_region_apply() {
        let provider = scenario_provider();
        let exclusion_set = ExclusionSet::from_iter(["A3"]);
        let scanner = Scanner::new(&provider);

        let result = scanner
            .scan_region("us-east-1", &exclusion_set, Mode::Apply)
            .unwrap();

        assert_eq!(result.released(), 1);
        assert_eq!(result.failed(), 0);
        assert_eq!(result.excluded, 1);
        assert_eq!(result.associated, 1);
        assert_eq!(result.release_outcome("A2"), Some(&ReleaseOutcome::Released));
        assert_eq!(provider.release_calls(), ["A2"]);
    }

    #[test]
    fn test_scan_region_empty() {
        let provider = FakeProvider::default().region("eu-west-1", Vec::new());
        let scanner = Scanner::new(&provider);

        let result = scanner
            .scan_region("eu-west-1", &ExclusionSet::default(), Mode::Apply)
            .unwrap();

        assert_eq!(
            result,
            RegionResult {
                region: "eu-west-1".to_string(),
                ..RegionResult::default()
            }
        );
        assert!(provider.release_calls().is_empty());
    }

    #[test]
    fn test_candidates_are_unassociated_minus_excluded() {
        let records: Vec<AddressRecord> = (0..10)
            .map(|n| {
                let id = format!("eipalloc-{n}");
                if n % 3 == 0 {
                    associated(&id)
                } else {
                    unassociated(&id)
                }
            })
            .collect();
        let provider = FakeProvider::default().region("us-west-2", records);
        let exclusion_set =
            ExclusionSet::from_iter(["eipalloc-1", "eipalloc-3", "eipalloc-8", "eipalloc-99"]);
        let scanner = Scanner::new(&provider);

        let result = scanner
            .scan_region("us-west-2", &exclusion_set, Mode::DryRun)
            .unwrap();

        // eipalloc-3 is associated, eipalloc-99 does not exist
        assert_eq!(
            candidate_ids(&result),
            ["eipalloc-2", "eipalloc-4", "eipalloc-5", "eipalloc-7"]
        );
        assert!(result
            .candidates
            .iter()
            .all(|candidate| !exclusion_set.contains(&candidate.allocation_id)));
        assert_eq!(result.excluded, 2);
        assert_eq!(result.associated + result.unassociated, result.total);
    }

    #[test]
    fn test_repeated_dry_runs_are_identical() {
        let provider = scenario_provider();
        let exclusion_set = ExclusionSet::from_iter(["A3"]);
        let scanner = Scanner::new(&provider);

        let first = scanner
            .scan_region("us-east-1", &exclusion_set, Mode::DryRun)
            .unwrap();
        let second = scanner
            .scan_region("us-east-1", &exclusion_set, Mode::DryRun)
            .unwrap();

        assert_eq!(first, second);
        assert!(provider.release_calls().is_empty());
    }

    #[test]
    fn test_release_failure_does_not_abort_batch() {
        let provider = FakeProvider::default()
            .region(
                "us-east-1",
                vec![unassociated("A1"), unassociated("A2"), unassociated("A3")],
            )
            .failing_release("A2", ProviderError::Rejected("InvalidIPAddress.InUse".into()));
        let reporter = RecordingReporter::default();
        let scanner = Scanner::new(&provider).reporter(&reporter);

        let result = scanner
            .scan_region("us-east-1", &ExclusionSet::default(), Mode::Apply)
            .unwrap();

        assert_eq!(provider.release_calls(), ["A1", "A2", "A3"]);
        assert_eq!(result.released(), 2);
        assert_eq!(result.failed(), 1);
        assert!(matches!(
            result.release_outcome("A2"),
            Some(ReleaseOutcome::Failed(ProviderError::Rejected(_)))
        ));
        assert_eq!(
            *reporter.events.borrow(),
            [
                "scanned us-east-1 3",
                "released us-east-1 A1",
                "release_failed us-east-1 A2",
                "released us-east-1 A3",
                "completed us-east-1",
            ]
        );
    }

    #[test]
    fn test_scan_region_list_error() {
        let provider = FakeProvider::default()
            .failing_region("us-east-1", ProviderError::Throttle("slow down".into()));
        let scanner = Scanner::new(&provider);

        let result = scanner.scan_region("us-east-1", &ExclusionSet::default(), Mode::Apply);

        assert_eq!(result, Err(ProviderError::Throttle("slow down".into())));
        assert!(provider.release_calls().is_empty());
    }

    /*-------------------------------------------------------------------------
      Approval and Cancellation
    -------------------------------------------------------------------------*/

    #[test]
    fn test_declined_approval_releases_nothing() {
        let provider = scenario_provider();
        let approvals = RefCell::new(Vec::new());
        let decline = |region: &str, candidates: &[AddressRecord]| {
            approvals
                .borrow_mut()
                .push((region.to_string(), candidates.len()));
            false
        };
        let scanner = Scanner::new(&provider).approval(decline);

        let result = scanner
            .scan_region("us-east-1", &ExclusionSet::default(), Mode::Apply)
            .unwrap();

        assert!(provider.release_calls().is_empty());
        assert_eq!(result.skipped(), 2);
        assert_eq!(
            result.release_outcome("A2"),
            Some(&ReleaseOutcome::Skipped(SkipReason::Declined))
        );
        assert_eq!(*approvals.borrow(), [("us-east-1".to_string(), 2)]);
    }

    #[test]
    fn test_approval_not_consulted_for_dry_run() {
        let provider = scenario_provider();
        let scanner = Scanner::new(&provider)
            .approval(|_: &str, _: &[AddressRecord]| -> bool { panic!("approval consulted") });

        let result = scanner.scan_region("us-east-1", &ExclusionSet::default(), Mode::DryRun);
        assert!(result.is_ok());
    }

    #[test]
    fn test_cancellation_stops_further_releases() {
        let cancel = CancelFlag::new();
        let provider = FakeProvider {
            cancel_after_release: Some(cancel.clone()),
            ..FakeProvider::default()
        }
        .region(
            "us-east-1",
            vec![unassociated("A1"), unassociated("A2"), unassociated("A3")],
        )
        .region("us-west-2", vec![unassociated("B1")]);
        let reporter = RecordingReporter::default();
        let scanner = Scanner::new(&provider)
            .reporter(&reporter)
            .cancel_flag(cancel.clone());

        let report = scanner.run(
            &["us-east-1", "us-west-2"],
            &ExclusionSet::default(),
            Mode::Apply,
        );

        assert!(report.cancelled);
        assert_eq!(provider.release_calls(), ["A1"]);
        assert_eq!(report.regions.len(), 1);

        let result = report.regions[0].result().unwrap();
        assert_eq!(result.released(), 1);
        assert_eq!(
            result.release_outcome("A3"),
            Some(&ReleaseOutcome::Skipped(SkipReason::Cancelled))
        );
        assert!(reporter
            .events
            .borrow()
            .contains(&"skipped us-east-1 2 Cancelled".to_string()));
    }

    #[test]
    fn test_interrupt_during_approval_is_cancelled() {
        let cancel = CancelFlag::new();
        let interrupt = cancel.clone();
        // The prompt returns "no" once Ctrl-C is pressed and Enter releases the read
        let interrupted_prompt = move |_: &str, _: &[AddressRecord]| {
            interrupt.cancel();
            false
        };
        let provider = scenario_provider();
        let reporter = RecordingReporter::default();
        let scanner = Scanner::new(&provider)
            .reporter(&reporter)
            .approval(interrupted_prompt)
            .cancel_flag(cancel);

        let report = scanner.run(&["us-east-1"], &ExclusionSet::default(), Mode::Apply);

        assert!(report.cancelled);
        assert!(provider.release_calls().is_empty());
        let result = report.regions[0].result().unwrap();
        assert_eq!(result.skipped(), 2);
        assert_eq!(
            result.release_outcome("A2"),
            Some(&ReleaseOutcome::Skipped(SkipReason::Cancelled))
        );
        assert!(reporter
            .events
            .borrow()
            .contains(&"skipped us-east-1 2 Cancelled".to_string()));
    }

    /*-------------------------------------------------------------------------
      Run
    -------------------------------------------------------------------------*/

    #[test]
    fn test_region_names() {
        assert!(is_region_name("us-east-1"));
        assert!(is_region_name("us-gov-west-1"));
        assert!(!is_region_name(""));
        assert!(!is_region_name("us east 1"));
        assert!(!is_region_name("US-EAST-1"));
        assert!(!is_region_name("us-east-1/../x"));
    }

    #[test]
    fn test_run_invalid_region_is_not_sent_to_provider() {
        let provider = scenario_provider();
        let scanner = Scanner::new(&provider);

        let report = scanner.run(
            &["us east 1", "us-east-1"],
            &ExclusionSet::default(),
            Mode::Apply,
        );

        assert_eq!(*provider.list_calls.borrow(), ["us-east-1"]);
        assert!(matches!(
            report.regions[0].error(),
            Some(ProviderError::Region(_))
        ));
        assert!(!report.aborted);
        assert_eq!(report.regions[1].result().unwrap().released(), 2);
        assert!(report.has_region_failures());
    }

    #[test]
    fn test_run_region_failure_does_not_stop_later_regions() {
        let provider = FakeProvider::default()
            .failing_region("ap-south-1", ProviderError::Region("unreachable".into()))
            .region("us-east-1", vec![unassociated("A1")]);
        let scanner = Scanner::new(&provider);

        let report = scanner.run(
            &["ap-south-1", "us-east-1"],
            &ExclusionSet::default(),
            Mode::DryRun,
        );

        let regions: Vec<&str> = report
            .regions
            .iter()
            .map(|report| report.region.as_str())
            .collect();
        assert_eq!(regions, ["ap-south-1", "us-east-1"]);
        assert!(report.regions[0].error().is_some());
        assert_eq!(report.regions[1].result().unwrap().candidates.len(), 1);
        assert!(!report.aborted);
        assert!(report.has_region_failures());

        let summary = report.summary();
        assert_eq!(summary.regions_failed, 1);
        assert_eq!(summary.regions_scanned, 1);
        assert_eq!(summary.candidates, 1);
    }

    #[test]
    fn test_run_auth_error_is_fatal() {
        let provider = FakeProvider::default()
            .failing_region("us-east-1", ProviderError::Auth("AuthFailure".into()))
            .region("us-west-2", vec![unassociated("B1")]);
        let scanner = Scanner::new(&provider);

        let report = scanner.run(
            &["us-east-1", "us-west-2"],
            &ExclusionSet::default(),
            Mode::Apply,
        );

        assert!(report.aborted);
        assert_eq!(report.regions.len(), 1);
        assert!(provider.release_calls().is_empty());
        assert!(report.has_region_failures());
    }

    #[test]
    fn test_run_summary_totals() {
        let provider = scenario_provider().region(
            "eu-central-1",
            vec![unassociated("B1"), associated("B2")],
        );
        let exclusion_set = ExclusionSet::from_iter(["A3"]);
        let scanner = Scanner::new(&provider);

        let report = scanner.run(&["us-east-1", "eu-central-1"], &exclusion_set, Mode::Apply);
        let summary = report.summary();

        assert_eq!(summary.regions_scanned, 2);
        assert_eq!(summary.addresses, 5);
        assert_eq!(summary.associated, 2);
        assert_eq!(summary.excluded, 1);
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.released, 2);
        assert_eq!(summary.release_failures, 0);
        assert!(!report.has_region_failures());
        assert!(!report.has_release_failures());
    }
}

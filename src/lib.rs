//! Find, and optionally release, AWS Elastic IP addresses that are not associated with any
//! instance or network interface.
//!
//! The [Scanner] lists the allocated addresses in each region through an [AddressProvider],
//! classifies them as associated or unassociated, drops addresses named in an [ExclusionSet],
//! and reports the remaining candidates. Candidates are only released in [Mode::Apply].
//!
//! ```no_run
//! use eipcleanup::{Ec2Provider, ExclusionSet, Mode, Scanner};
//!
//! let provider = Ec2Provider::new()?;
//! let exclusion_set = ExclusionSet::from_file("whitelist.txt")?;
//!
//! let report = Scanner::new(&provider).run(&["us-east-1", "eu-west-1"], &exclusion_set, Mode::DryRun);
//! println!("{} idle address(es)", report.summary().candidates);
//! # Ok::<(), eipcleanup::Error>(())
//! ```

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

mod core;

/*-------------------------------------------------------------------------------------------------
  Primary Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::address::AddressRecord;
pub use crate::core::ec2::{Ec2Provider, Ec2ProviderBuilder};
pub use crate::core::errors::{Error, Operation, ProviderError, Result};
pub use crate::core::exclusion::ExclusionSet;
pub use crate::core::provider::AddressProvider;
pub use crate::core::reporter::{LogReporter, Reporter};
pub use crate::core::results::{
    Mode, RegionOutcome, RegionReport, RegionResult, ReleaseOutcome, ReleaseRecord, RunReport,
    RunSummary, SkipReason,
};
pub use crate::core::scanner::{Approval, AutoApprove, CancelFlag, Scanner};

/// The default region scanned when none are given.
pub const DEFAULT_REGION: &str = "us-east-1";

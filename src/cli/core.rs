use crate::cli;
use eipcleanup::{Ec2Provider, Ec2ProviderBuilder, ExclusionSet, Result, RunReport};

/*-------------------------------------------------------------------------------------------------
  Core functions
-------------------------------------------------------------------------------------------------*/

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_CANCELLED: u8 = 130;

/*--------------------------------------------------------------------------------------
  Load the exclusion set named by the CLI arguments
--------------------------------------------------------------------------------------*/

pub fn load_exclusion_set(args: &cli::Args) -> Result<ExclusionSet> {
    match &args.whitelist {
        Some(path) => ExclusionSet::from_file(path),
        None => Ok(ExclusionSet::default()),
    }
}

/*--------------------------------------------------------------------------------------
  Build the EC2 provider from the environment and CLI arguments
--------------------------------------------------------------------------------------*/

pub fn build_provider(args: &cli::Args) -> Result<Ec2Provider> {
    let mut builder = Ec2ProviderBuilder::new();
    if let Some(profile) = &args.profile {
        builder.profile(profile);
    }
    builder.build()
}

/*--------------------------------------------------------------------------------------
  Process exit status for a completed run
--------------------------------------------------------------------------------------*/

/// Region-level failures always fail the run; release failures only fail it when
/// `fail_on_release_error` is set.
pub fn exit_status(report: &RunReport, fail_on_release_error: bool) -> u8 {
    if report.cancelled {
        EXIT_CANCELLED
    } else if report.has_region_failures()
        || (fail_on_release_error && report.has_release_failures())
    {
        EXIT_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::InfoLevel;
use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find unassociated AWS Elastic IPs (dry run by default).",
    long_about = None
)]
pub struct Args {
    /// Comma-separated list of AWS Regions to scan
    #[arg(
        short = 'r',
        long,
        value_delimiter = ',',
        default_value = eipcleanup::DEFAULT_REGION
    )]
    pub regions: Vec<String>,

    /// File of allocation IDs (one per line) that must never be released
    #[arg(short = 'w', long)]
    pub whitelist: Option<PathBuf>,

    /// Release unassociated Elastic IPs (careful)
    #[arg(long)]
    pub apply: bool,

    /// Release without asking for confirmation in each region
    #[arg(short = 'y', long, requires = "apply")]
    pub yes: bool,

    /// Exit with a failure status when any release call fails
    #[arg(long)]
    pub fail_on_release_error: bool,

    /// Named AWS profile used to resolve credentials
    #[arg(long)]
    pub profile: Option<String>,

    /// Output format for the findings written to stdout
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Save the findings to a CSV file
    #[arg(long = "csv")]
    pub csv_file: Option<PathBuf>,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<InfoLevel>,
}

/*--------------------------------------------------------------------------------------
  Output Format
--------------------------------------------------------------------------------------*/

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    /// Findings table followed by a summary
    Table,
    /// Run report as JSON
    Json,
    /// No stdout output; logs only
    None,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["eipcleanup"]).unwrap();
        assert_eq!(args.regions, ["us-east-1"]);
        assert!(args.whitelist.is_none());
        assert!(!args.apply);
        assert!(!args.yes);
        assert!(!args.fail_on_release_error);
        assert_eq!(args.output, OutputFormat::Table);
    }

    #[test]
    fn test_comma_separated_regions() {
        let args =
            Args::try_parse_from(["eipcleanup", "--regions", "us-east-1,eu-west-1,sa-east-1"])
                .unwrap();
        assert_eq!(args.regions, ["us-east-1", "eu-west-1", "sa-east-1"]);
    }

    #[test]
    fn test_apply_flags() {
        let args = Args::try_parse_from([
            "eipcleanup",
            "--apply",
            "-y",
            "--whitelist",
            "keep.txt",
            "--fail-on-release-error",
        ])
        .unwrap();
        assert!(args.apply);
        assert!(args.yes);
        assert!(args.fail_on_release_error);
        assert_eq!(args.whitelist, Some(PathBuf::from("keep.txt")));
    }

    #[test]
    fn test_yes_requires_apply() {
        assert!(Args::try_parse_from(["eipcleanup", "--yes"]).is_err());
    }

    #[test]
    fn test_output_format() {
        let args = Args::try_parse_from(["eipcleanup", "-o", "json"]).unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        assert!(Args::try_parse_from(["eipcleanup", "-o", "yaml"]).is_err());
    }
}

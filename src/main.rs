mod cli;

use clap::Parser;
use cli::OutputFormat;
use eipcleanup::{AutoApprove, CancelFlag, LogReporter, Mode, Scanner};
use log::{error, info, warn};
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Initialize logging
    if let Err(error) = stderrlog::new()
        .module(module_path!())
        .verbosity(args.verbose.log_level_filter())
        .timestamp(stderrlog::Timestamp::Second)
        .init()
    {
        eprintln!("Unable to initialize logging: {error}");
    }

    let regions = cli::utils::normalize_regions(&args.regions);
    if regions.is_empty() {
        error!("No regions to scan");
        return ExitCode::from(cli::EXIT_FAILURE);
    }

    let exclusion_set = match cli::load_exclusion_set(&args) {
        Ok(exclusion_set) => exclusion_set,
        Err(error) => {
            error!("{error}");
            return ExitCode::from(cli::EXIT_FAILURE);
        }
    };

    let provider = match cli::build_provider(&args) {
        Ok(provider) => provider,
        Err(error) => {
            error!("Unable to initialize the EC2 client: {error}");
            return ExitCode::from(cli::EXIT_FAILURE);
        }
    };

    // Stop issuing release calls on Ctrl-C; in-flight calls complete
    let cancel = CancelFlag::new();
    let interrupt = cancel.clone();
    provider.handle().spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!(
                "Interrupted; finishing in-flight requests (press Enter to dismiss a pending prompt)"
            );
            interrupt.cancel();
        }
    });

    let mode = Mode::from(args.apply);
    match mode {
        Mode::DryRun => info!("Dry run; no Elastic IPs will be released"),
        Mode::Apply => warn!("Apply mode; unassociated Elastic IPs will be released"),
    }

    let scanner = Scanner::new(&provider)
        .reporter(LogReporter)
        .cancel_flag(cancel);
    let scanner = if args.yes {
        scanner.approval(AutoApprove)
    } else {
        scanner.approval(cli::confirm::Prompt)
    };

    let report = scanner.run(&regions, &exclusion_set, mode);
    cli::log::run_summary(&report);

    let mut status = cli::exit_status(&report, args.fail_on_release_error);

    match args.output {
        OutputFormat::Table => cli::output::findings_table(&report),
        OutputFormat::Json => match cli::output::json_report(&report) {
            Ok(json) => println!("{json}"),
            Err(error) => {
                error!("Unable to serialize the run report: {error}");
                status = status.max(cli::EXIT_FAILURE);
            }
        },
        OutputFormat::None => {}
    }

    if let Some(csv_file) = &args.csv_file {
        match cli::csv::save(&report, csv_file) {
            Ok(()) => info!("Saved findings to {:?}", csv_file),
            Err(error) => {
                error!("Unable to save findings to {:?}: {error}", csv_file);
                status = status.max(cli::EXIT_FAILURE);
            }
        }
    }

    ExitCode::from(status)
}

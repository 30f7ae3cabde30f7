use eipcleanup::{AddressRecord, Approval};
use log::warn;
use std::io::{self, BufRead, IsTerminal, Write};

/*-------------------------------------------------------------------------------------------------
  Interactive Release Confirmation
-------------------------------------------------------------------------------------------------*/

/// Ask on the terminal before releasing a region's candidates. Declines when stdin is not a
/// terminal so unattended runs never block on a prompt.
#[derive(Clone, Copy, Debug, Default)]
pub struct Prompt;

impl Approval for Prompt {
    fn approve(&self, region: &str, candidates: &[AddressRecord]) -> bool {
        if !io::stdin().is_terminal() {
            warn!("[{region}] stdin is not a terminal; use --yes to release without confirmation");
            return false;
        }

        let mut stderr = io::stderr().lock();
        for candidate in candidates {
            let _ = writeln!(
                stderr,
                "  {:<15}  {}",
                candidate.public_ip, candidate.allocation_id
            );
        }
        let _ = write!(
            stderr,
            "Release {} Elastic IP(s) in {region}? [y/N] ",
            candidates.len()
        );
        let _ = stderr.flush();

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(error) => {
                warn!("[{region}] Unable to read confirmation: {error}");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

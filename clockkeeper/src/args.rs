//! CLI argument parsing.

use clap::Parser;

/// Restart supervisor for the e-paper Spotify clock.
///
/// Only the three flags below are accepted; anything else, including
/// `--help`, is a usage error.
#[derive(Parser, Debug)]
#[command(
    name = "clockkeeper",
    disable_help_flag = true,
    disable_version_flag = true,
    args_override_self = true
)]
pub struct Args {
    /// Leave the child's stderr on the terminal and run it verbosely
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Run the child in clock mode
    #[arg(long)]
    pub clock: bool,

    /// Run the child without the e-paper display
    #[arg(long = "local_run")]
    pub local_run: bool,
}

/// The parsed flags, fixed for the lifetime of the supervisor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub verbose: bool,
    pub clock: bool,
    pub local_run: bool,
}

impl Args {
    pub fn flags(&self) -> Flags {
        Flags {
            verbose: self.verbose,
            clock: self.clock,
            local_run: self.local_run,
        }
    }
}

impl Flags {
    /// Flags forwarded to the child, mirrored 1:1 and in a fixed order.
    pub fn child_args(&self) -> Vec<&'static str> {
        let mut args = Vec::with_capacity(3);
        if self.verbose {
            args.push("-v");
        }
        if self.clock {
            args.push("--clock");
        }
        if self.local_run {
            args.push("--local_run");
        }
        args
    }
}

//! Configuration for mailtree: CLI options and the dispatch retry policy.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;

/// Batch mail sender driven by a tree-structured YAML specification.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source YAML file; reads standard input when omitted.
    #[arg(long, value_name = "FILE")]
    pub source: Option<PathBuf>,

    /// Resolve and validate the source without sending anything.
    #[arg(long)]
    pub test: bool,

    /// Verbose output for debugging.
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// Log level implied by the flags.
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}

/// Retry policy for the dispatch queue.
///
/// Configured through the optional `retry:` section of the source
/// document. A failed send is retried with exponential backoff until
/// the attempt budget runs out, then the mail is dead-lettered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    /// Maximum delivery attempts per mail.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff in milliseconds, doubled per failed attempt.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Upper bound on a single backoff in milliseconds.
    #[serde(default = "default_backoff_cap_ms")]
    pub backoff_cap_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_backoff_cap_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            backoff_cap_ms: default_backoff_cap_ms(),
        }
    }
}

impl RetryConfig {
    /// Backoff before requeueing after the given failed attempt count
    /// (1-based): `backoff_ms * 2^(attempt-1)`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(20);
        let ms = self
            .backoff_ms
            .saturating_mul(1u64 << doublings)
            .min(self.backoff_cap_ms);
        Duration::from_millis(ms)
    }
}

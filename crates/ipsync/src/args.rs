//! Command-line arguments

use clap::{ArgAction, Parser};
use ipsync_core::backup::DEFAULT_BACKUP_FILE;
use std::path::PathBuf;

const ENV_HELP: &str = "\
Environment (a .env file in the working directory is loaded first):
  CLOUDFLARE_API_TOKEN     API token (required)
  NEW_IP                   IP address records should point at (required)
  OLD_IP                   IP to replace inside non-A records
  TARGET_DOMAIN            Only process this zone
  DRY_RUN                  1/true/yes to preview without changing anything
  DEBUG                    1/true/yes for debug logging
  CENSOR                   Mask identifiers and names in output (default: on)
  RECORD_TYPES             Comma-separated record types (default: all)
  LOG_LEVEL                trace, debug, info, warn or error (default: info)
  CLOUDFLARE_API_BASE      API base URL override";

/// What the invocation asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Reconcile,
    Backup,
    Restore,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "ipsync")]
#[command(version, about = "Point Cloudflare DNS records at a new IP address")]
#[command(disable_version_flag = true)]
#[command(after_help = ENV_HELP)]
pub struct Args {
    /// Back up all records of the selected zones and exit
    #[arg(long, conflicts_with = "restore")]
    pub backup: bool,

    /// Restore records from the backup file and exit
    #[arg(long)]
    pub restore: bool,

    /// Backup file path
    #[arg(long, value_name = "PATH", default_value = DEFAULT_BACKUP_FILE)]
    pub backup_file: PathBuf,

    /// Write an HTML change report after the run
    #[arg(long, value_name = "PATH")]
    pub html_report: Option<PathBuf>,

    /// Write the JSON change ledger after the run
    #[arg(long, value_name = "PATH")]
    pub json_report: Option<PathBuf>,

    /// Print the version and exit
    #[arg(short = 'v', long, action = ArgAction::Version)]
    version: Option<bool>,
}

impl Args {
    pub fn mode(&self) -> Mode {
        if self.backup {
            Mode::Backup
        } else if self.restore {
            Mode::Restore
        } else {
            Mode::Reconcile
        }
    }
}

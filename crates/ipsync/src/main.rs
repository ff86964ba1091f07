// # ipsync
//
// Points Cloudflare DNS records at a new IP address.
//
// This binary is a thin integration layer: it parses arguments, loads
// configuration, initializes logging and the runtime, then hands off to
// `ipsync-core`. No DNS logic lives here.
//
// ## Modes
//
// - default: reconcile records, print the summary, optionally write reports
// - `--backup`: snapshot records of the selected zones to the backup file
// - `--restore`: replay the backup file against the provider
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=...
// export NEW_IP=203.0.113.10
// export OLD_IP=198.51.100.4
// export DRY_RUN=1
//
// ipsync --html-report changes.html
// ```

mod args;
mod prompt;

use anyhow::{Context, Result};
use args::{Args, Mode};
use clap::Parser;
use ipsync_core::backup::{self, BackupSnapshot};
use ipsync_core::{ConfigSource, DnsProvider, EnvConfigSource, Error, Reconciler, RunConfig};
use ipsync_provider_cloudflare::CloudflareProvider;
use prompt::PromptConfigSource;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Success, including runs where individual records failed
/// - 1: Configuration or usage error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy)]
enum IpsyncExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<IpsyncExitCode> for ExitCode {
    fn from(code: IpsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version come through here too, on stdout
            let _ = e.print();
            return if e.use_stderr() {
                IpsyncExitCode::ConfigError.into()
            } else {
                IpsyncExitCode::Success.into()
            };
        }
    };

    dotenvy::dotenv().ok();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return IpsyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&config))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return IpsyncExitCode::ConfigError.into();
    }

    info!("Starting ipsync {}", env!("CARGO_PKG_VERSION"));
    for (name, value) in config.censor().describe_config(&config) {
        info!("  {} = {}", name, value);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return IpsyncExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run(&args, &config).await {
            error!("{:#}", e);
            IpsyncExitCode::RuntimeError
        } else {
            IpsyncExitCode::Success
        }
    });

    result.into()
}

/// Build the run configuration from the environment, prompting if needed
fn load_config() -> ipsync_core::Result<RunConfig> {
    let env_source = EnvConfigSource::process();
    let raw = env_source.raw();
    let missing = raw.missing_required();

    if missing.is_empty() {
        return env_source.load();
    }

    if std::io::stdin().is_terminal() {
        eprintln!(
            "Missing {}; starting interactive setup",
            missing.join(", ")
        );
        return PromptConfigSource::new(raw).load();
    }

    Err(Error::config(format!(
        "Missing required environment variable(s): {}",
        missing.join(", ")
    )))
}

fn log_level(config: &RunConfig) -> Level {
    if config.debug {
        return Level::DEBUG;
    }
    match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

async fn run(args: &Args, config: &RunConfig) -> Result<()> {
    let provider = CloudflareProvider::from_config(config)?;

    match args.mode() {
        Mode::Restore => run_restore(&provider, args, config).await,
        Mode::Backup => run_backup(&provider, args, config).await,
        Mode::Reconcile => run_reconcile(&provider, args, config).await,
    }
}

async fn run_reconcile(provider: &dyn DnsProvider, args: &Args, config: &RunConfig) -> Result<()> {
    if config.dry_run {
        warn!("DRY RUN: no records will be changed");
    }

    let report = Reconciler::new(provider, config)
        .run()
        .await
        .context("Failed to list zones")?;

    println!("{}", report.summary_line());

    if let Some(path) = &args.html_report {
        report.ledger.write_html(path).await?;
    }
    if let Some(path) = &args.json_report {
        report.ledger.write_json(path).await?;
    }
    Ok(())
}

async fn run_backup(provider: &dyn DnsProvider, args: &Args, config: &RunConfig) -> Result<()> {
    let zones = provider
        .list_zones(config.target_domain.as_deref())
        .await
        .context("Failed to list zones")?;

    if zones.is_empty() {
        warn!("No zones to back up");
    }

    let snapshot = backup::snapshot(provider, &zones, &config.record_types, config.censor()).await;
    snapshot.write(&args.backup_file).await?;

    println!(
        "Backed up {} records from {} zones to {}",
        snapshot.record_count(),
        snapshot.zone_count(),
        args.backup_file.display()
    );
    Ok(())
}

async fn run_restore(provider: &dyn DnsProvider, args: &Args, config: &RunConfig) -> Result<()> {
    info!("Restoring records from {}", args.backup_file.display());

    let snapshot = BackupSnapshot::load(&args.backup_file).await?;
    let summary = backup::restore(provider, &snapshot, config.censor()).await;

    println!(
        "Restored {} records ({} failed) from {}",
        summary.restored,
        summary.failed,
        args.backup_file.display()
    );
    Ok(())
}

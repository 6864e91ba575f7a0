//! Keygate CLI - run a command only when the key drive is plugged in
//!
//! Looks up the key drive by volume label, checks its serial fingerprint and
//! runs the protected action on a match. Exit status: 0 when authenticated,
//! 2 when the drive is absent or rejected, 1 on any error.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keygate_cli::{load_config, with_timeout, Overrides};
use keygate_core::{
    AuthOutcome, Authenticator, CommandTask, DeviceFinder, DeviceRecord, DeviceSource, Error,
    Fingerprint, GateConfig, LabelFinder, SerialValidator,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when the key drive is absent or does not match
const EXIT_REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "keygate")]
#[command(about = "Hardware-bound gate: run a command only when the key drive is present", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Read devices from a JSON file instead of querying the system.
    /// For testing only: whoever writes the file decides which devices exist,
    /// so this is not a security boundary
    #[arg(long, global = true)]
    devices_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate the key drive and run the protected action
    ///
    /// The gate is only as strong as its device source. With --devices-file,
    /// or a config whose source is a file, the device list is whatever that
    /// file says; use those for testing, not as a security boundary.
    Auth {
        /// Volume label of the key drive
        #[arg(short, long)]
        label: Option<String>,

        /// Expected volume serial number
        #[arg(short, long)]
        seed: Option<String>,

        /// Program (and arguments) to run once authenticated
        #[arg(last = true)]
        command: Vec<String>,
    },

    /// List visible devices
    List {
        /// Only show devices with this label
        #[arg(short, long)]
        label: Option<String>,

        /// Print devices as JSON (readable by --devices-file)
        #[arg(long)]
        json: bool,
    },

    /// Report whether a device with the label is present
    Check {
        /// Volume label to look for
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print the fingerprint of a serial number or seed
    Fingerprint {
        /// Value to fingerprint
        value: String,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "keygate=debug,keygate_core=debug,keygate_cli=debug"
    } else {
        "keygate=info,keygate_core=info,keygate_cli=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create runtime")?;

    let result = rt.block_on(run(cli));

    // A timed-out query may still be blocked in the device service
    rt.shutdown_timeout(Duration::from_millis(100));

    result
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let command = cli.command.unwrap_or(Commands::Auth {
        label: None,
        seed: None,
        command: Vec::new(),
    });

    let mut overrides = Overrides {
        devices_file: cli.devices_file,
        ..Default::default()
    };

    match command {
        Commands::Auth {
            label,
            seed,
            command,
        } => {
            overrides.label = label;
            overrides.seed = seed;
            let config = load_config(cli.config.as_deref(), &overrides)?;
            handle_auth(&config, command).await
        }
        Commands::List { label, json } => {
            let config = load_config(cli.config.as_deref(), &overrides)?;
            handle_list(&config, label, json).await
        }
        Commands::Check { label } => {
            overrides.label = label;
            let config = load_config(cli.config.as_deref(), &overrides)?;
            handle_check(&config).await
        }
        Commands::Fingerprint { value } => {
            println!("{}", Fingerprint::of(&value));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn finder(config: &GateConfig) -> LabelFinder<Box<dyn DeviceSource>> {
    LabelFinder::new(config.device_source())
}

fn timeout(config: &GateConfig) -> Duration {
    Duration::from_secs(config.enumeration_timeout_secs)
}

async fn handle_auth(config: &GateConfig, command: Vec<String>) -> Result<ExitCode> {
    let finder = finder(config);
    let label = config.label.clone();

    let record = match with_timeout(timeout(config), move || {
        finder.require_device_by_label(&label)
    })
    .await
    {
        Ok(record) => record,
        Err(Error::DeviceNotFound(label)) => {
            warn!("No device with label {:?}; authentication not attempted", label);
            return Ok(ExitCode::from(EXIT_REJECTED));
        }
        Err(e) => return Err(e).context("failed to look up key drive"),
    };

    info!("Found key drive {}", record.display_name());

    // The protected command may run for a long time
    let seed = config.expected_seed.clone();
    let outcome = tokio::task::spawn_blocking(move || authenticate(&seed, record, &command))
        .await
        .context("authentication task aborted")??;

    Ok(match outcome {
        AuthOutcome::Authenticated => ExitCode::SUCCESS,
        AuthOutcome::Rejected => {
            eprintln!("Authentication failed");
            ExitCode::from(EXIT_REJECTED)
        }
    })
}

/// Check `record` against `seed` and run the protected action on a match
fn authenticate(
    seed: &str,
    record: DeviceRecord,
    command: &[String],
) -> keygate_core::Result<AuthOutcome> {
    let auth = Authenticator::new(SerialValidator::new(seed), record);

    match command.split_first() {
        None => auth.authenticate_then(|| println!("Authentication succeeded")),
        Some((program, args)) => {
            let task = CommandTask::new(program, args);
            let mut status = Ok(());
            let outcome = auth.authenticate_then(|| status = task.execute())?;
            status?;
            Ok(outcome)
        }
    }
}

async fn handle_list(config: &GateConfig, label: Option<String>, json: bool) -> Result<ExitCode> {
    let finder = finder(config);

    let devices = with_timeout(timeout(config), move || match label {
        Some(label) => Ok(finder.list_devices_with_label(&label)?.collect::<Vec<_>>()),
        None => finder.list_devices(),
    })
    .await
    .context("failed to list devices")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&devices)?);
        return Ok(ExitCode::SUCCESS);
    }

    if devices.is_empty() {
        println!("No devices found.");
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:<20} {:<16} {:<10} {:<10}", "DEVICE", "LABEL", "FS", "SERIAL");
    for device in devices {
        println!(
            "{:<20} {:<16} {:<10} {:<10}",
            device.device_id.as_deref().unwrap_or("-"),
            device.volume_name.as_deref().unwrap_or("-"),
            device.file_system.as_deref().unwrap_or("-"),
            device.volume_serial_number.as_deref().unwrap_or("-"),
        );
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_check(config: &GateConfig) -> Result<ExitCode> {
    let finder = finder(config);
    let label = config.label.clone();

    let present = with_timeout(timeout(config), move || finder.has_device_named(&label))
        .await
        .context("failed to query devices")?;

    if present {
        println!("Device {:?} present", config.label);
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Device {:?} not found", config.label);
        Ok(ExitCode::from(EXIT_REJECTED))
    }
}

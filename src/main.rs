//! Fingerprint Probe - Main Entry Point
//!
//! Collects a fingerprint from a simulated host (or re-analyzes a saved
//! record) and writes the result to stdout as JSON. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fingerprint_probe::{
    config::{CliArgs, ProbeSettings},
    fingerprint::{reanalyze, AnalysisRequest, Collector, DeviceReview, FingerprintRecord},
    host::{HostProfile, SimulatedEnvironment},
    NAME, VERSION,
};

/// Build the CLI command parser
fn build_cli() -> Command {
    Command::new(NAME)
        .version(VERSION)
        .author("Fingerprint Probe Team")
        .about("Device fingerprint collection and consistency analysis")
        .long_about(
            "Fingerprint Probe collects a device fingerprint and reports:\n\
             - a stable identity hash over non-volatile signals\n\
             - heuristic inconsistency tags (automation, spoofing, tampering)\n\
             - optionally, a device review or an analysis request body",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Path to configuration file (TOML or JSON)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("profile")
                .short('p')
                .long("profile")
                .value_name("PROFILE")
                .help("Simulated host profile (e.g., windows-chrome, headless-chrome)")
                .value_parser(|s: &str| s.parse::<HostProfile>()),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("STRING")
                .help("Seed for the simulated host (random host when omitted)"),
        )
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Re-analyze a saved fingerprint record instead of collecting")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("envelope")
                .long("envelope")
                .help("Wrap the record in an analysis request body")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("review")
                .long("review")
                .help("Print a device review instead of the record")
                .action(ArgAction::SetTrue)
                .conflicts_with("envelope"),
        )
        .arg(
            Arg::new("user-id")
                .long("user-id")
                .value_name("ID")
                .help("User id for the request envelope"),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .value_name("ADDRESS")
                .help("Email for the request envelope"),
        )
        .arg(
            Arg::new("ip")
                .long("ip")
                .value_name("ADDRESS")
                .help("Client IP address for the request envelope"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print JSON output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress logging except errors")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
}

/// Parse CLI arguments into CliArgs struct
fn parse_cli_args(matches: &clap::ArgMatches) -> CliArgs {
    let mut args = CliArgs::default();

    args.config_file = matches.get_one::<PathBuf>("config").cloned();
    args.profile = matches.get_one::<HostProfile>("profile").copied();
    args.seed = matches.get_one::<String>("seed").cloned();
    args.input = matches.get_one::<PathBuf>("input").cloned();
    args.user_id = matches.get_one::<String>("user-id").cloned();
    args.email = matches.get_one::<String>("email").cloned();
    args.ip_address = matches.get_one::<String>("ip").cloned();

    // Flags only override when set
    if matches.get_flag("envelope") {
        args.envelope = Some(true);
    }
    if matches.get_flag("review") {
        args.review = Some(true);
    }
    if matches.get_flag("pretty") {
        args.pretty = Some(true);
    }

    args
}

/// Initialize the tracing/logging subsystem
fn init_tracing(verbosity: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(filter)
        .init();
}

/// Produce the record: either load and re-analyze a saved one, or collect
/// from the simulated host.
async fn obtain_record(settings: &ProbeSettings) -> Result<FingerprintRecord> {
    if let Some(ref path) = settings.input {
        info!("Re-analyzing saved record {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let mut record: FingerprintRecord = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record {}", path.display()))?;
        reanalyze(&mut record);
        return Ok(record);
    }

    info!(
        profile = %settings.profile,
        seeded = settings.seed.is_some(),
        "Collecting fingerprint from simulated host"
    );
    let env = SimulatedEnvironment::from_profile(settings.profile, settings.seed.as_deref());
    Ok(Collector::new(env).collect_all().await)
}

fn render<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

/// Main application entry point
#[tokio::main]
async fn main() -> Result<()> {
    let matches = build_cli().get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    init_tracing(verbosity, quiet);

    let cli_args = parse_cli_args(&matches);
    let settings = cli_args
        .load_settings()
        .context("Failed to load configuration")?;
    debug!(?settings, "Settings loaded");

    let record = obtain_record(&settings).await?;

    let output = if settings.review {
        render(&DeviceReview::new().assess(&record), settings.pretty)?
    } else if settings.envelope {
        let mut request = AnalysisRequest::new(record);
        if let Some(ref user_id) = settings.user_id {
            request = request.with_user_id(user_id);
        }
        if let Some(ref email) = settings.email {
            request = request.with_email(email);
        }
        if let Some(ref ip) = settings.ip_address {
            request = request.with_ip_address(ip);
        }
        render(&request, settings.pretty)?
    } else {
        render(&record, settings.pretty)?
    };

    println!("{}", output);
    Ok(())
}

//! herakles-user-cpu - version 0.1.0
//!
//! Per-user CPU time accounting with tracing logging.
//! This is the main entry point: argument handling, logging setup, and the
//! run lifecycle around the sampling loop.

use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use herakles_user_cpu::accounting::Accountant;
use herakles_user_cpu::cli::{Args, LogLevel, OutputFormat};
use herakles_user_cpu::{report, sampler, system};

/// Initializes tracing logging subsystem with configured log level.
///
/// Logs go to stderr; stdout is reserved for the final ranking.
fn setup_logging(args: &Args) {
    let log_level = match args.log_level {
        LogLevel::Off => LevelFilter::OFF,
        LogLevel::Error => LevelFilter::ERROR,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Trace => LevelFilter::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

async fn run(args: Args) -> anyhow::Result<()> {
    let clk_tck =
        system::clock_ticks_per_second().context("Failed to determine kernel clock tick rate")?;

    // Doubles as the reachability check for the process table root: without
    // uptime there is no window boundary and no run.
    let monitor_start_uptime = system::read_uptime_seconds(&args.proc_root)
        .context("Failed to read host uptime from the process table root")?;

    let shutdown =
        sampler::spawn_shutdown_listener().context("Failed to install signal handlers")?;

    debug!(
        clk_tck,
        monitor_start_uptime,
        duration_secs = args.duration_secs,
        proc_root = %args.proc_root.display(),
        "starting observation window"
    );

    let mut accountant = Accountant::new(clk_tck, monitor_start_uptime);
    sampler::run(
        &mut accountant,
        &args.proc_root,
        args.duration_secs,
        shutdown,
    )
    .await;

    let ranking = report::build_ranking(accountant.totals(), report::resolve_username);

    match args.format {
        OutputFormat::Table => print!("{}", report::render_table(&ranking)),
        OutputFormat::Json => {
            let json = report::render_json(&ranking).context("Failed to serialize ranking")?;
            println!("{json}");
        }
    }

    Ok(())
}

/// Main application entry point.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version are not usage errors and keep exit code 0;
            // everything else is a usage error and exits 1.
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    setup_logging(&args);

    if let Err(e) = run(args).await {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}

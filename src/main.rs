use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use portal_tester::runner::{ConsoleEventListener, TestSummary};
use portal_tester::{report, Catalog, Config, HttpTransport, Runner};

#[derive(Parser)]
#[command(name = "portal-tester")]
#[command(version)]
#[command(about = "Role-based API conformance checks for the portal backend", long_about = None)]
struct Cli {
    /// YAML config file (base URL, timeout, roles, catalog)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API root, e.g. https://host/api
    #[arg(long)]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Endpoint catalog replacing the built-in checks
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Only run these roles (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    role: Option<Vec<String>>,

    /// Write JSON and JUnit reports to this directory
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG)
    #[arg(short, long, default_value = "false")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    ctrlc::set_handler(|| {
        println!("\n\nTesting interrupted by user");
        std::process::exit(1);
    })
    .unwrap_or_else(|e| log::warn!("failed to install Ctrl+C handler: {}", e));

    let outcome = run(cli).await;
    if let Err(e) = &outcome {
        eprintln!(
            "\n\n{} Unexpected error during testing: {:#}",
            "✗".red().bold(),
            e
        );
    }
    std::process::exit(exit_code(&outcome));
}

/// 0 only when the run completed and every result passed
fn exit_code(outcome: &anyhow::Result<TestSummary>) -> i32 {
    match outcome {
        Ok(summary) if summary.all_passed() => 0,
        _ => 1,
    }
}

async fn run(cli: Cli) -> anyhow::Result<TestSummary> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(catalog) = cli.catalog {
        config.catalog = Some(catalog);
    }
    if let Some(roles) = &cli.role {
        config.retain_roles(roles)?;
    }
    config.validate()?;

    let catalog = Catalog::resolve(config.catalog.as_deref())?;
    let transport = HttpTransport::new(&config.base_url, config.timeout_ms)
        .context("Failed to build HTTP client")?;

    log::debug!(
        "running {} checks for {} roles against {}",
        catalog.check_count(),
        config.roles.len(),
        config.base_url
    );

    let mut runner = Runner::new(Box::new(transport), config.roles, catalog)
        .with_listener(ConsoleEventListener::new());

    runner.run_all().await;
    runner.summarize();

    let report = runner.report();
    if let Some(dir) = &cli.report_dir {
        report::write_reports(&report, dir)?;
    }

    Ok(report.summary)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if verbose {
        builder.filter_module("portal_tester", log::LevelFilter::Debug);
    }
    builder.init();
}

mod config;

use clap::{Args, Parser};
use config::{CommonConfig, Config, ConfigError, MetricsConfig};
use intake::payment::Tag;
use metrics_exporter_statsd::StatsdBuilder;
use sheets::Spreadsheet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "paysheet", version, about = "Records payments in a Google spreadsheet")]
enum CliCommand {
    /// Serve `POST /submit-payment/`
    Intake(CliArgs),
    /// Check the spreadsheet is reachable and report which tag worksheets exist
    CheckSheets(CliArgs),
}

#[derive(Args)]
struct CliArgs {
    #[arg(long)]
    config_file_path: Option<PathBuf>,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] intake::ServiceError),
    #[error("could not set up metrics: {0}")]
    Metrics(String),
    #[error("could not start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let cli = CliCommand::parse();

    let args = match &cli {
        CliCommand::Intake(args) | CliCommand::CheckSheets(args) => args,
    };

    let config = match Config::load(args.config_file_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let _sentry = init_logging(&config);

    let result = match cli {
        CliCommand::Intake(_) => run_intake(config),
        CliCommand::CheckSheets(_) => check_sheets(config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config) -> Option<sentry::ClientInitGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));

    let guard = config
        .common
        .logging
        .as_ref()
        .and_then(|l| l.sentry_dsn.as_deref())
        .map(|dsn| {
            sentry::init((
                dsn,
                sentry::ClientOptions {
                    release: sentry::release_name!(),
                    ..Default::default()
                },
            ))
        });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(guard.as_ref().map(|_| sentry::integrations::tracing::layer()))
        .init();

    guard
}

fn init_metrics(common: &CommonConfig) -> Result<(), CliError> {
    let Some(MetricsConfig {
        statsd_host,
        statsd_port,
    }) = &common.metrics
    else {
        return Ok(());
    };

    let recorder = StatsdBuilder::from(statsd_host.as_str(), *statsd_port)
        .build(Some("paysheet"))
        .map_err(|e| CliError::Metrics(e.to_string()))?;
    metrics::set_global_recorder(recorder)
        .map_err(|_| CliError::Metrics("a metrics recorder is already installed".into()))?;

    shared::metrics_defs::describe_metrics(intake::metrics_defs::ALL_METRICS);
    shared::metrics_defs::describe_metrics(sheets::metrics_defs::ALL_METRICS);

    tracing::info!(host = %statsd_host, port = statsd_port, "Sending metrics to statsd");
    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn run_intake(config: Config) -> Result<(), CliError> {
    init_metrics(&config.common)?;

    tracing::info!(
        listener = %format!("{}:{}", config.intake.listener.host, config.intake.listener.port),
        admin_listener = %format!(
            "{}:{}",
            config.intake.admin_listener.host, config.intake.admin_listener.port
        ),
        "Starting intake"
    );

    runtime()?.block_on(intake::run(config.intake))?;
    Ok(())
}

fn check_sheets(config: Config) -> Result<(), CliError> {
    let client = intake::connect(&config.intake.sheets, |name| std::env::var(name).ok())?;

    let titles = runtime()?
        .block_on(client.worksheet_titles())
        .map_err(intake::ServiceError::from)?;

    println!("spreadsheet {}", client.spreadsheet_id());
    for line in worksheet_report(&titles) {
        println!("  {line}");
    }

    Ok(())
}

/// One line per tag saying whether its worksheet is among `titles`.
fn worksheet_report(titles: &[String]) -> Vec<String> {
    Tag::ALL
        .iter()
        .map(|tag| {
            let worksheet = tag.worksheet();
            let state = if titles.iter().any(|t| t == worksheet) {
                "present"
            } else {
                "missing, created on first payment"
            };
            format!("{tag} -> {worksheet}: {state}")
        })
        .collect()
}

mod args;
mod config;

use std::io;
use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use usage_app::Config;

const LOG_LEVEL_ENV: &str = "USAGE_LOG_LEVEL";

#[tokio::main]
async fn main() -> ExitCode {
    let args = match args::parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err}");
            args::print_help();
            return ExitCode::from(2);
        }
    };
    if args.help {
        args::print_help();
        return ExitCode::SUCCESS;
    }

    if let Err(err) = init_tracing(args.log_level.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let loaded = match config::load(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = &loaded.file {
        info!(path = %path.display(), "loaded config file");
    }

    match args.interval {
        None => match run_once(&loaded.config, args.report).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                error!(error = %err, "usage collection failed");
                ExitCode::FAILURE
            }
        },
        Some(period) => {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(interval_secs = period.as_secs(), "running on a fixed interval");
            let shutdown = shutdown_signal();
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = run_once(&loaded.config, args.report).await {
                            warn!(error = %err, "usage collection failed, retrying next interval");
                        }
                    }
                    _ = &mut shutdown => {
                        info!("shutting down");
                        return ExitCode::SUCCESS;
                    }
                }
            }
        }
    }
}

async fn run_once(config: &Config, report: bool) -> usage_app::Result<()> {
    let summary = usage_app::run(config).await?;
    for issue in &summary.issues {
        warn!(
            entity = %issue.entity,
            kind = %issue.kind,
            stage = ?issue.stage,
            message = %issue.message,
            "entity skipped"
        );
    }
    if report {
        let records = usage_app::load_ledger(config).await?;
        println!("{}", usage_app::ledger_json(&records)?);
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) -> Result<(), io::Error> {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_env(LOG_LEVEL_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .or_else(|_| EnvFilter::try_new("info")),
    }
    .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|err| io::Error::other(err.to_string()))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

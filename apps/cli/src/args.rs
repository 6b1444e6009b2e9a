use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub interval: Option<Duration>,
    pub report: bool,
    pub log_level: Option<String>,
    pub help: bool,
}

pub fn parse_args<I>(args: I) -> Result<CliArgs, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut parsed = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_string())?;
                parsed.config = Some(PathBuf::from(value));
            }
            "--interval" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --interval".to_string())?;
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("invalid interval value: {value}"))?;
                parsed.interval = Some(Duration::from_secs(secs));
            }
            "--report" => {
                parsed.report = true;
            }
            "--log-level" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --log-level".to_string())?;
                parsed.log_level = Some(value);
            }
            "--help" | "-h" => {
                parsed.help = true;
            }
            _ => {
                return Err(format!("unknown argument: {arg}"));
            }
        }
    }

    Ok(parsed)
}

pub fn print_help() {
    println!(
        "timescale-usage\n\n\
Records storage size and growth of TimescaleDB hypertables and continuous aggregates.\n\n\
Usage:\n  timescale-usage [--config <path>] [--interval <secs>] [--report] [--log-level <level>]\n\n\
Options:\n  --config <path>     TOML config file (env POSTGRES_* values override it)\n  --interval <secs>   Keep running, one collection every <secs> seconds\n  --report            Print the usage ledger as JSON after each run\n  --log-level <level> Log filter, e.g. info or debug (default: USAGE_LOG_LEVEL or info)\n  -h, --help          Show this help message\n"
    );
}

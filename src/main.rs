use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info, warn};
use thiserror::Error;

use cron_syslog::{
    Config, ConfigError, CronScheduler, DEFAULT_CONFIG_PATH, DEFAULT_QUEUE_CAPACITY, FormatError,
    Forwarder, ForwarderConfig, JobCallback, JobExecutor, MessageQueue, PingConfig,
    PingDispatcher, ScheduleError, Scheduler, SharedFormatter, SyslogFormatter,
    duration::parse_duration,
};

#[derive(Debug, Parser)]
#[command(
    name = "cron-syslog",
    version,
    about = "Run commands on a cron schedule and ship their output to syslog"
)]
struct Cli {
    /// Cron definition file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Overwrite system hostname
    #[arg(long)]
    hostname: Option<String>,
    /// Timeout for success / failure pings (e.g. 500ms, 1s, 1m30s)
    #[arg(long, default_value = "1s", value_parser = parse_duration)]
    ping_timeout: Duration,
    /// Messages buffered before job output blocks
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
}

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid log_template: {0}")]
    Template(#[from] FormatError),
    #[error("unable to add job {job:?}: {source}")]
    Register {
        job: String,
        #[source]
        source: ScheduleError,
    },
    #[error("unable to start scheduler: {0}")]
    Start(#[source] ScheduleError),
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stdout)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), StartupError> {
    let config = Config::load(&cli.config)?;
    let template = config.template()?;
    let hostname = resolve_hostname(cli.hostname);

    let queue = MessageQueue::bounded(cli.queue_capacity);
    let pings = PingDispatcher::new(&PingConfig::default().with_timeout(cli.ping_timeout));

    let mut scheduler = CronScheduler::new();
    for job in config.jobs {
        let name = job.name.clone();
        let schedule = job.schedule.clone();
        let executor = JobExecutor::new(job, queue.clone(), pings.clone());
        let callback: JobCallback = Arc::new(move || {
            executor.run();
        });
        scheduler
            .register(&schedule, callback)
            .map_err(|source| StartupError::Register { job: name, source })?;
    }
    scheduler.start().map_err(StartupError::Start)?;

    info!(
        "cron-syslog {} running {} jobs as {hostname}, shipping to {}",
        env!("CARGO_PKG_VERSION"),
        scheduler.len(),
        config.rsyslog_target
    );
    let formatter = SharedFormatter::new(SyslogFormatter::new(template, hostname));
    Forwarder::new(queue, formatter, ForwarderConfig::new(config.rsyslog_target)).run();
    Ok(())
}

fn resolve_hostname(flag: Option<String>) -> String {
    if let Some(name) = flag.filter(|name| !name.trim().is_empty()) {
        return name;
    }
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(err) => {
            warn!("unable to read system hostname, using localhost: {err}");
            "localhost".to_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn cli_defaults_match_documented_values() {
        let cli = Cli::try_parse_from(["cron-syslog"]).expect("defaults parse");
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.hostname, None);
        assert_eq!(cli.ping_timeout, Duration::from_secs(1));
        assert_eq!(cli.queue_capacity, 1_000);
    }

    #[rstest]
    fn cli_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "cron-syslog",
            "--config",
            "/etc/cron.yaml",
            "--hostname",
            "web-1",
            "--ping-timeout",
            "500ms",
            "--queue-capacity",
            "16",
        ])
        .expect("overrides parse");
        assert_eq!(cli.config, PathBuf::from("/etc/cron.yaml"));
        assert_eq!(cli.hostname.as_deref(), Some("web-1"));
        assert_eq!(cli.ping_timeout, Duration::from_millis(500));
        assert_eq!(cli.queue_capacity, 16);
    }

    #[rstest]
    fn explicit_hostname_wins() {
        assert_eq!(resolve_hostname(Some("web-1".into())), "web-1");
        assert!(!resolve_hostname(Some("  ".into())).is_empty());
    }
}

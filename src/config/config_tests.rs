//! Loading and validation of the YAML configuration.

use std::io::Write;

use rstest::rstest;
use tempfile::NamedTempFile;

use super::*;

const FULL: &str = r#"
rsyslog_target: logs.example.com:514
log_template: "{job}[{severity}] {message}"
jobs:
  - name: backup
    schedule: "0 0 3 * * *"
    cmd: /usr/local/bin/backup
    args: ["--full", "--quiet"]
    ping_success: https://hc.example/ok
    ping_failure: https://hc.example/fail
  - name: heartbeat
    schedule: "@hourly"
    cmd: "true"
"#;

#[rstest]
fn parses_every_documented_key() {
    let config: Config = FULL.parse().expect("valid config");
    assert_eq!(config.rsyslog_target, "logs.example.com:514");
    assert_eq!(config.template_source(), "{job}[{severity}] {message}");
    assert_eq!(config.jobs.len(), 2);

    let backup = &config.jobs[0];
    assert_eq!(
        backup,
        &JobSpec::new("backup", "0 0 3 * * *", "/usr/local/bin/backup")
            .with_args(["--full", "--quiet"])
            .with_ping_success("https://hc.example/ok")
            .with_ping_failure("https://hc.example/fail")
    );
    let heartbeat = &config.jobs[1];
    assert!(heartbeat.args.is_empty());
    assert_eq!(heartbeat.ping_success, None);
    assert_eq!(heartbeat.ping_failure, None);
}

#[rstest]
#[case::absent("rsyslog_target: h:514\n")]
#[case::blank("rsyslog_target: h:514\nlog_template: '  '\n")]
fn missing_template_falls_back_to_default(#[case] body: &str) {
    let config: Config = body.parse().expect("valid config");
    assert_eq!(config.template_source(), DEFAULT_TEMPLATE);
    assert!(config.jobs.is_empty());
}

#[rstest]
fn unknown_keys_are_ignored() {
    let body = "rsyslog_target: h:514\nverbose: true\njobs: []\n";
    assert!(body.parse::<Config>().is_ok());
}

#[rstest]
#[case::no_target("jobs: []\n")]
#[case::empty_target("rsyslog_target: ''\n")]
fn missing_target_is_rejected(#[case] body: &str) {
    assert!(matches!(
        body.parse::<Config>(),
        Err(ConfigError::MissingTarget)
    ));
}

#[rstest]
fn bad_template_is_rejected_at_load() {
    let body = "rsyslog_target: h:514\nlog_template: '{nope} {message}'\n";
    let err = body.parse::<Config>().expect_err("unknown placeholder");
    assert!(
        matches!(err, ConfigError::Template(FormatError::UnknownPlaceholder(ref name)) if name == "nope"),
        "{err:?}"
    );
}

#[rstest]
fn bad_schedule_names_the_job() {
    let body = r#"
rsyslog_target: h:514
jobs:
  - name: broken
    schedule: "whenever"
    cmd: "true"
"#;
    let err = body.parse::<Config>().expect_err("bad schedule");
    assert!(matches!(err, ConfigError::Schedule { ref job, .. } if job == "broken"));
    assert!(err.to_string().contains("broken"), "{err}");
}

#[rstest]
#[case::unnamed("  - name: ''\n    schedule: '* * * * * *'\n    cmd: 'true'\n")]
#[case::no_command("  - name: x\n    schedule: '* * * * * *'\n    cmd: ''\n")]
fn incomplete_jobs_are_rejected(#[case] job: &str) {
    let body = format!("rsyslog_target: h:514\njobs:\n{job}");
    let err = body.parse::<Config>().expect_err("incomplete job");
    assert!(
        matches!(
            err,
            ConfigError::UnnamedJob { index: 0 } | ConfigError::MissingCommand { .. }
        ),
        "{err:?}"
    );
}

#[rstest]
fn malformed_yaml_is_a_parse_error() {
    assert!(matches!(
        "jobs: [".parse::<Config>(),
        Err(ConfigError::Parse(_))
    ));
}

#[rstest]
fn load_reads_file_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(FULL.as_bytes()).expect("write config");
    let config = Config::load(file.path()).expect("load config");
    assert_eq!(config.jobs[0].name, "backup");
}

#[rstest]
fn load_reports_missing_file_with_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.yaml");
    let err = Config::load(&path).expect_err("missing file");
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.yaml"), "{err}");
}

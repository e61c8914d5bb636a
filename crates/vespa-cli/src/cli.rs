//! Argument parsing and command dispatch.

use std::io::{self, Write};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use reqwest::Url;
use tracing::Instrument;
use uuid::Uuid;
use vespa_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, command_span, init_logging};

use crate::client::{AppContext, BUILD_VERSION, CliError, CliResult, build_http_client, parse_url};
use crate::commands::{handle_log, handle_version};
use crate::target::{ApplicationId, Target, TargetError, TargetKind, Zone};
use crate::version::{LocalMinimum, Version};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TARGET_URL: &str = "http://127.0.0.1:19071";
const DEFAULT_CLOUD_URL: &str = "https://api-ctl.vespa-cloud.com:4443";
const DEFAULT_ZONE: &str = "dev.aws-us-east-1c";

/// Parses CLI arguments, executes the requested command, and reports errors
/// on stderr. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
    let logging = LoggingConfig {
        level,
        format: cli.log_format,
        build_version: BUILD_VERSION,
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("Warning: {err}");
    }

    let client_version = BUILD_VERSION.parse().unwrap_or(Version::new(0, 0, 0));
    execute(cli, client_version, &mut io::stdout(), &mut io::stderr()).await
}

/// Run one command with explicit output streams, returning the exit code.
pub(crate) async fn execute<O: Write, E: Write>(
    cli: Cli,
    client_version: Version,
    out: &mut O,
    err: &mut E,
) -> i32 {
    let trace_id = Uuid::new_v4().to_string();
    let span = command_span(cli.command.label(), &trace_id);

    match dispatch(cli, client_version, &trace_id, out, err)
        .instrument(span)
        .await
    {
        Ok(()) => 0,
        Err(error) => {
            report_error(err, &error);
            error.exit_code()
        }
    }
}

async fn dispatch<O: Write, E: Write>(
    cli: Cli,
    client_version: Version,
    trace_id: &str,
    out: &mut O,
    err: &mut E,
) -> CliResult<()> {
    match &cli.command {
        Command::Version => handle_version(&client_version, out),
        Command::Log(args) => {
            let ctx = build_context(&cli, client_version, trace_id)?;
            tracing::debug!(target_kind = %ctx.target.kind, "dispatching log command");
            handle_log(&ctx, args, out, err).await
        }
    }
}

fn build_context(cli: &Cli, client_version: Version, trace_id: &str) -> CliResult<AppContext> {
    let target = match cli.target {
        TargetKind::Local => Target::local(&cli.target_url, cli.local_min_version.clone()),
        TargetKind::Cloud => cli
            .application
            .as_ref()
            .ok_or(TargetError::MissingApplication)
            .and_then(|application| {
                Target::cloud(
                    &cli.cloud_url,
                    application,
                    &cli.zone,
                    client_version.clone(),
                )
            }),
    }
    .map_err(|error| CliError::validation(error.to_string()))?;

    Ok(AppContext {
        client: build_http_client(Duration::from_secs(cli.timeout), trace_id)?,
        target,
        client_version,
    })
}

fn report_error<E: Write>(err: &mut E, error: &CliError) {
    let _ = writeln!(err, "Error: {}", error.display_message());
    for hint in error.hints() {
        let _ = writeln!(err, "Hint: {hint}");
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    LogFormat::from_name(input).ok_or_else(|| format!("unknown log format '{input}'"))
}

#[derive(Parser)]
#[command(name = "vespa", about = "Command-line client for the Vespa platform")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_TARGET",
        value_enum,
        default_value_t = TargetKind::Local,
        help = "Deployment target to talk to"
    )]
    target: TargetKind,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_TARGET_URL",
        value_parser = parse_url,
        default_value = DEFAULT_TARGET_URL,
        help = "Config server URL of a local target"
    )]
    target_url: Url,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_CLOUD_URL",
        value_parser = parse_url,
        default_value = DEFAULT_CLOUD_URL,
        help = "Control plane URL of a cloud target"
    )]
    cloud_url: Url,
    #[arg(
        short = 'a',
        long,
        global = true,
        env = "VESPA_CLI_APPLICATION",
        help = "Cloud application as tenant.application[.instance]"
    )]
    application: Option<ApplicationId>,
    #[arg(
        short = 'z',
        long,
        global = true,
        env = "VESPA_CLI_ZONE",
        default_value = DEFAULT_ZONE,
        help = "Cloud zone as environment.region"
    )]
    zone: Zone,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_LOCAL_MIN_VERSION",
        default_value = "8.359.0",
        help = "Minimum platform version of a local target: a version, 'next-patch', or 'reported'"
    )]
    local_min_version: LocalMinimum,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_LOG_LEVEL",
        help = "Diagnostic log filter (overridden by RUST_LOG)"
    )]
    log_level: Option<String>,
    #[arg(
        long,
        global = true,
        env = "VESPA_CLI_LOG_FORMAT",
        value_parser = parse_log_format,
        default_value = "pretty"
    )]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the application log
    Log(LogArgs),
    /// Show the version of this client
    Version,
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Log(_) => "log",
            Self::Version => "version",
        }
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct LogArgs {
    #[arg(long, help = "Include logs since this timestamp (RFC 3339)")]
    pub(crate) from: Option<String>,
    #[arg(long, help = "Include logs until this timestamp (RFC 3339)")]
    pub(crate) to: Option<String>,
    #[arg(
        value_name = "RELATIVE-PERIOD",
        allow_hyphen_values = true,
        help = "Include logs for this long before now, e.g. 1h or 30m"
    )]
    pub(crate) period: Option<String>,
    #[arg(long, help = "Show timestamps in UTC instead of the local time zone")]
    pub(crate) utc: bool,
    #[arg(long, help = "Expand escaped newlines and tabs in log messages")]
    pub(crate) dequote: bool,
}

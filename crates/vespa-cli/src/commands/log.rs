use std::io::Write;

use anyhow::Context;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use crate::cli::LogArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::compat::{CompatibilityGate, preflight_check};
use crate::logs::{DEFAULT_LOOKBACK, PeriodFlags, TimeWindow, parse_log_records, resolve_window};
use crate::output::{DisplayZone, LogRenderOptions, render_log_records};

/// Result of a single log retrieval request.
#[derive(Debug)]
pub(crate) enum FetchOutcome {
    Success(Vec<u8>),
    Failure(FetchFailure),
}

/// Reason a log retrieval request did not produce a body.
#[derive(Debug, Error)]
pub(crate) enum FetchFailure {
    #[error("got status {}", .0.as_u16())]
    Status(StatusCode),
    #[error(transparent)]
    Transport(reqwest::Error),
}

impl FetchFailure {
    pub(crate) fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Transport(err) => err.status(),
        }
    }
}

pub(crate) async fn handle_log<O: Write, E: Write>(
    ctx: &AppContext,
    args: &LogArgs,
    out: &mut O,
    err: &mut E,
) -> CliResult<()> {
    let flags = PeriodFlags {
        from: args.from.as_deref(),
        to: args.to.as_deref(),
        relative: args.period.as_deref(),
    };
    let window = resolve_window(&flags, Utc::now(), DEFAULT_LOOKBACK)
        .map_err(|error| CliError::validation(error.to_string()))?;
    tracing::debug!(from = %window.from, to = %window.to, "resolved log window");

    if let Some(descriptor) = &ctx.target.compatibility_url {
        preflight_check(&ctx.client, descriptor, &ctx.client_version, err)
            .await
            .context("failed to write version warning")
            .map_err(CliError::failure)?;
    }

    match fetch_logs(&ctx.client, &ctx.target.logs_url, &window).await {
        FetchOutcome::Success(body) => {
            let text = String::from_utf8_lossy(&body);
            let records = parse_log_records(&text);
            tracing::debug!(records = records.len(), "rendering log records");
            let options = LogRenderOptions {
                zone: if args.utc {
                    DisplayZone::Utc
                } else {
                    DisplayZone::Local
                },
                dequote: args.dequote,
            };
            render_log_records(out, &records, options)
                .context("failed to write logs")
                .map_err(CliError::failure)
        }
        FetchOutcome::Failure(failure) => {
            tracing::debug!(status = ?failure.status(), "log request failed; probing target version");
            let cause = anyhow::Error::new(failure).context("failed to read logs");
            let diagnosis = CompatibilityGate::new(&ctx.client, ctx.target.probe.as_ref())
                .explain(cause)
                .await;
            let error = CliError::failure(diagnosis.error.context("could not retrieve logs"));
            Err(match diagnosis.hint {
                Some(hint) => error.with_hint(hint),
                None => error,
            })
        }
    }
}

pub(crate) async fn fetch_logs(client: &Client, logs_url: &Url, window: &TimeWindow) -> FetchOutcome {
    let mut url = logs_url.clone();
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in window.query_pairs() {
            pairs.append_pair(key, &value);
        }
    }
    tracing::debug!(%url, "requesting logs");

    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => return FetchOutcome::Failure(FetchFailure::Transport(err)),
    };

    let status = response.status();
    if status != StatusCode::OK {
        return FetchOutcome::Failure(FetchFailure::Status(status));
    }

    match response.bytes().await {
        Ok(body) => FetchOutcome::Success(body.to_vec()),
        Err(err) => FetchOutcome::Failure(FetchFailure::Transport(err)),
    }
}

//! Read command implementation.
//!
//! Streams every series matching the filter from the remote source and writes
//! each one as soon as it arrives, so memory use does not grow with the range.

use crate::commands::ConnectionArgs;
use crate::display::{Format, SeriesWriter};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use promread_lib::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Range read when no start time is given.
const DEFAULT_RANGE_MS: i64 = 60 * 60 * 1000;

/// Stream series from the remote source.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn read(
    conn: &ConnectionArgs,
    start_str: Option<&str>,
    end_str: Option<&str>,
    label: Option<&str>,
    label_value: Option<&str>,
    output: Option<PathBuf>,
    format: Format,
    attempts: u32,
    resume: bool,
    quiet: bool,
) -> Result<()> {
    // Parse end time (default to now)
    let end = match end_str {
        Some(s) => parse_time(s).with_context(|| format!("Invalid end time: {s}"))?,
        None => Utc::now().timestamp_millis(),
    };

    // Parse start time (default to one hour before end)
    let start = match start_str {
        Some(s) => parse_time(s).with_context(|| format!("Invalid start time: {s}"))?,
        None => end.saturating_sub(DEFAULT_RANGE_MS),
    };

    if start >= end {
        bail!("Start time {start} must be before end time {end}");
    }

    let filter = match label {
        Some(label) => Filter::new(start, end).with_label(label, label_value.unwrap_or_default()),
        None => Filter::new(start, end),
    };
    tracing::debug!(%filter, "resolved read filter");

    let config = ClientConfig {
        max_attempts: attempts,
        resume_on_retry: resume,
        ..conn.client_config()
    };
    let client = RemoteReadClient::new(config).context("Failed to create client")?;

    let sink: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer = SeriesWriter::new(BufWriter::new(sink), format);

    // Setup spinner
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {msg}",
        )?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("{} {filter}", client.addr()));
        pb
    };

    // Ctrl-C stops the read, including any pending retry
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let mut series_count = 0u64;
    let mut sample_count = 0u64;
    let result = client
        .read(&cancel, &filter, |series| {
            series_count += 1;
            sample_count += series.len() as u64;
            writer.write(&series)?;
            progress.set_message(format!("{series_count} series, {sample_count} samples"));
            Ok(())
        })
        .await;

    // Keep whatever was written before a failure
    let flushed = writer.finish();

    match result {
        Ok(()) => progress.finish_with_message(format!(
            "Read {series_count} series, {sample_count} samples"
        )),
        Err(e) => {
            progress.abandon_with_message(format!(
                "Stopped after {series_count} series, {sample_count} samples"
            ));
            return Err(e).context("Remote read failed");
        }
    }
    flushed.context("Failed to write output")?;

    if !quiet && let Some(path) = &output {
        eprintln!("Output written to: {}", path.display());
    }

    Ok(())
}

/// Parses a timestamp given as Unix milliseconds or RFC 3339.
fn parse_time(s: &str) -> Result<i64> {
    if let Ok(ms) = s.parse::<i64>() {
        return Ok(ms);
    }
    let time: DateTime<Utc> = DateTime::parse_from_rfc3339(s)?.into();
    Ok(time.timestamp_millis())
}

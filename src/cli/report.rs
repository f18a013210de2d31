//! The feed report command.
//!
//! Progress goes to stderr; stdout carries only the report and its closing
//! lines.

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use chrono::Local;

use super::args::Cli;
use super::menu::{prompt_file_name, prompt_view, report_file_name};
use crate::auth::{AmbientSources, CredentialResolver, LocalServerFlow};
use crate::core::http::build_client;
use crate::core::models::{ReportRow, ViewMode};
use crate::core::{ContentApiClient, aggregate};
use crate::error::{FeedstatError, Result};
use crate::render::{page, render_table, write_csv};
use crate::storage::{ResolvedConfig, load_accounts};
use crate::util::time::{default_report_file, format_elapsed, report_timestamp};

/// What to produce and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    pub view: ViewMode,
    /// CSV destination; set for [`ViewMode::SaveFile`] only.
    pub file_name: Option<String>,
    /// Request time, `%Y-%m-%d_%H-%M-%S`.
    pub timestamp: String,
}

impl ReportRequest {
    /// From `--auto`/`--file-name`, or from the interactive menu when
    /// `--auto` is absent.
    ///
    /// # Errors
    ///
    /// `InvalidView` for an unknown `--auto` value; `Prompt` when the menu
    /// cannot run.
    pub fn from_cli(cli: &Cli, timestamp: String) -> Result<Self> {
        let (view, file_name) = match cli.auto.as_deref() {
            Some(raw) => {
                let view = ViewMode::from_arg(raw)?;
                let file_name = (view == ViewMode::SaveFile).then(|| {
                    cli.file_name
                        .as_deref()
                        .filter(|n| !n.trim().is_empty())
                        .map_or_else(|| default_report_file(&timestamp), |n| report_file_name(n, None))
                });
                (view, file_name)
            }
            None => {
                let view = prompt_view()?;
                let file_name = if view == ViewMode::SaveFile {
                    Some(prompt_file_name(&timestamp)?)
                } else {
                    None
                };
                (view, file_name)
            }
        };

        Ok(Self {
            view,
            file_name,
            timestamp,
        })
    }
}

/// Drive `work` to completion unless `interrupt` resolves first.
///
/// `interrupt` is polled first so a signal handler behind it is installed
/// before `work` starts.
///
/// # Errors
///
/// `Interrupted` when `interrupt` wins, otherwise whatever `work` returns.
pub async fn until_interrupted<W, S>(work: W, interrupt: S) -> Result<()>
where
    W: Future<Output = Result<()>>,
    S: Future,
{
    tokio::select! {
        biased;
        _ = interrupt => Err(FeedstatError::Interrupted),
        result = work => result,
    }
}

/// Run the report end to end.
///
/// # Errors
///
/// Credential, remote, prompt and output failures.
pub async fn execute(cli: &Cli, config: ResolvedConfig) -> Result<()> {
    tracing::debug!(
        profile = ?config.profile.as_ref().map(|p| p.dir().to_path_buf()),
        profile_source = %config.sources.profile,
        api_base = %config.api_base,
        timeout = ?config.timeout,
        "Resolved configuration"
    );

    // The menu blocks on the terminal; keep it off the runtime thread so an
    // interrupt is still observed.
    let menu_cli = cli.clone();
    let timestamp = report_timestamp(&Local::now());
    let request = tokio::task::spawn_blocking(move || ReportRequest::from_cli(&menu_cli, timestamp))
        .await
        .map_err(|e| FeedstatError::Other(anyhow::anyhow!("report selection task failed: {e}")))??;

    eprintln!("Configuring authorization and services...");
    // Read the account list first so a broken profile fails before any
    // interactive authorization.
    let accounts = config
        .profile
        .as_ref()
        .map(|profile| load_accounts(&profile.accounts_file()))
        .transpose()?;

    let http = build_client(config.timeout)?;
    let resolver = CredentialResolver::new(
        AmbientSources::from_env(config.metadata_probe),
        LocalServerFlow::new(config.redirect_port),
        http.clone(),
    );
    let resolved = resolver.authorize(config.profile.as_ref()).await?;
    eprintln!("Using {}.", resolved.kind.label());

    let accounts = accounts.ok_or_else(|| {
        FeedstatError::Config(
            "the merchant account list (merchant-ids.json) needs a profile directory; \
             use --config-path instead of --noconfig"
                .to_string(),
        )
    })?;

    let service = ContentApiClient::new(http, &config.api_base, resolved.credential)?
        .with_page_size(config.page_size)
        .with_timeout(config.timeout);

    eprintln!("Analyzing feeds...");
    let started = Instant::now();
    let rows = aggregate(&service, &accounts, request.view).await?;
    eprintln!(
        "Feeds analysis complete.\nTotal execution time: {}",
        format_elapsed(started.elapsed())
    );

    emit_report(&mut std::io::stdout(), &rows, &request, true)
}

/// Write the report for `rows` to `out`.
///
/// With `use_pager`, the display-all table goes through [`page`] instead
/// of `out`.
///
/// # Errors
///
/// I/O and CSV failures.
pub fn emit_report<W: Write>(
    out: &mut W,
    rows: &[ReportRow],
    request: &ReportRequest,
    use_pager: bool,
) -> Result<()> {
    if rows.is_empty() {
        writeln!(out, "Feed report complete - No feed errors reported!")?;
    } else {
        match request.view {
            ViewMode::ListErrors => {
                writeln!(out, "{}", render_table(rows, request.view))?;
                writeln!(out, "Feed report complete - Feed errors listed above")?;
            }
            ViewMode::DisplayAll => {
                let table = render_table(rows, request.view);
                if use_pager {
                    out.flush()?;
                    page(&table)?;
                } else {
                    writeln!(out, "{table}")?;
                }
            }
            ViewMode::SaveFile => {
                let name = request
                    .file_name
                    .clone()
                    .unwrap_or_else(|| default_report_file(&request.timestamp));
                let path = Path::new(&name);
                write_csv(path, rows, request.view)?;
                let shown = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
                writeln!(out, "Saving output to {}", shown.display())?;
            }
        }
    }
    writeln!(out, "Date and time of report request: {}", request.timestamp)?;
    Ok(())
}

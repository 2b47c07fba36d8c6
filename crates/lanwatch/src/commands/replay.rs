//! `lanwatch replay`: run a recorded feed through the engine.

use std::io::ErrorKind;

use futures_util::stream;
use tokio_util::sync::CancellationToken;

use lanwatch_core::{StateStore, run_ingest};

use crate::cli::ReplayArgs;
use crate::commands::Context;
use crate::commands::dashboard::{self, DashboardReport};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &ReplayArgs, ctx: &Context) -> Result<(), CliError> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => CliError::RecordingNotFound {
                path: args.file.display().to_string(),
            },
            _ => CliError::Io(e),
        })?;

    let frames: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect();
    tracing::debug!(file = %args.file.display(), frames = frames.len(), "replaying recording");

    let store = StateStore::new(ctx.resolved.engine);
    let report = run_ingest(&store, stream::iter(frames), &CancellationToken::new()).await;

    let snapshot = store.snapshot();
    let page_size = args.page_size.unwrap_or(ctx.resolved.page_size);
    let view = DashboardReport::new(
        &snapshot,
        &ctx.resolved.profile,
        args.file.display().to_string(),
        Some(report),
        args.page,
        page_size,
    );
    output::print_output(&dashboard::render(ctx.format, &view, ctx.color)?, ctx.quiet);
    Ok(())
}

//! `lanwatch watch`: follow the live feed.

use std::time::Duration;

use tokio::time::Instant;

use lanwatch_core::{ConnectionState, Monitor};

use crate::cli::WatchArgs;
use crate::commands::Context;
use crate::commands::dashboard::{self, DashboardReport};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: &WatchArgs, ctx: &Context) -> Result<(), CliError> {
    let resolved = &ctx.resolved;
    let url = resolved.feed.url.clone();
    let monitor = Monitor::new(resolved.feed.clone(), resolved.engine);

    let mut status = monitor.connection_state();
    let mut state = monitor.subscribe();
    monitor.connect().await?;

    let refresh = Duration::from_secs(args.refresh_secs);
    let stop_at = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let stop = async move {
        match stop_at {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    };
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(stop, ctrl_c);

    let mut last_line: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                break;
            }
            () = &mut stop => {
                tracing::debug!("watch duration elapsed");
                break;
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                tracing::info!(state = %current, url = %url, "feed connection state");
                if current == ConnectionState::Closed {
                    break;
                }
            }
            Some(snap) = state.changed() => {
                let due = last_line.is_none_or(|at| at.elapsed() >= refresh);
                if due && !ctx.quiet {
                    let line = dashboard::summary_line(&snap, *status.borrow(), ctx.color);
                    eprintln!("{line}");
                    last_line = Some(Instant::now());
                }
            }
        }
    }

    let ingest = monitor.disconnect().await;
    if !monitor.was_opened() {
        return Err(CliError::ConnectionFailed {
            url: url.to_string(),
            source: "the WebSocket handshake did not complete".into(),
        });
    }

    let snapshot = monitor.store().snapshot();
    let page_size = args.events.unwrap_or(resolved.page_size);
    let report = DashboardReport::new(
        &snapshot,
        &resolved.profile,
        url.to_string(),
        ingest,
        1,
        page_size,
    );
    output::print_output(&dashboard::render(ctx.format, &report, ctx.color)?, ctx.quiet);
    Ok(())
}

use std::{io::BufRead, time::Duration};

use axum_server::Handle;
use tokio::sync::watch;

/// How long in-flight requests get to finish once a stop is requested.
pub const DRAIN_PERIOD: Duration = Duration::from_secs(10);

/// Reads operator commands line by line until `stop` arrives or the input ends.
/// Blocking, so it gets a thread of its own.
pub fn watch_commands<R: BufRead>(input: R, stop: watch::Sender<bool>) {
    for line in input.lines() {
        match line {
            Ok(line) if line.trim() == "stop" => {
                tracing::info!("Stopping...");
                let _ = stop.send(true);
                return;
            }
            Ok(line) => tracing::debug!("ignoring unknown command `{line}`"),
            Err(err) => {
                tracing::warn!("failed to read commands: {err}");
                return;
            }
        }
    }
}

pub async fn watch_ctrl_c(stop: watch::Sender<bool>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received ctrl-c, stopping...");
        let _ = stop.send(true);
    }
}

pub async fn drain_on_stop(mut stop: watch::Receiver<bool>, handle: Handle) {
    while stop.changed().await.is_ok() {
        if *stop.borrow() {
            handle.graceful_shutdown(Some(DRAIN_PERIOD));
            return;
        }
    }
}

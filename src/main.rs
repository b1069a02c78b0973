mod config;
mod error;
mod limit;
mod report;
mod shutdown;

use std::{io, net::SocketAddr};

use axum::{http::Method, middleware, routing::get, Router};
use axum_server::{Handle, HttpConfig};
use clap::Parser;
use config::{Cli, Config};
use error::Error;
use limit::ConnLimiter;
use report::mc::PingState;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "multi_thread", worker_threads = 4)]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mc_status_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();

    let config = Config::load(Cli::parse())?;
    tracing::debug!("using configuration {config}");

    let (stop_tx, stop_rx) = watch::channel(false);
    let commands_tx = stop_tx.clone();
    std::thread::spawn(move || shutdown::watch_commands(io::stdin().lock(), commands_tx));
    tokio::spawn(shutdown::watch_ctrl_c(stop_tx));

    let handle = Handle::new();
    tokio::spawn(shutdown::drain_on_stop(stop_rx, handle.clone()));

    let app = router(
        PingState {
            timeout: config.ping_timeout(),
        },
        ConnLimiter::new(config.max_conns_per_ip),
    );

    let addr = config.socket_addr();
    tracing::info!("listening on {addr}");
    serve(addr, app, handle).await?;
    tracing::info!("server stopped");

    Ok(())
}

fn router(state: PingState, limiter: ConnLimiter) -> Router {
    Router::new()
        .route("/:server", get(report::mc::status_route))
        .route("/:server/", get(report::mc::status_route))
        .route("/:server/:port", get(report::mc::status_route))
        .route_layer(middleware::from_fn_with_state(limiter, limit::limit_per_ip))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET])
                .allow_origin(Any),
        )
        .with_state(state)
}

/// One request per connection: keep-alive is off, so every ping gets a fresh connection.
async fn serve(addr: SocketAddr, app: Router, handle: Handle) -> io::Result<()> {
    axum_server::bind(addr)
        .http_config(HttpConfig::new().http1_keep_alive(false).build())
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<SocketAddr>())
        .await
}

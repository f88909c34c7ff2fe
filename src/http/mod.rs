//! The HTTP server, handler and routes.
//!
//! This file itself contains fairly little business logic and just sets up the
//! `hyper` server and catches errors. The main logic is in `handlers.rs`.

use bytes::Bytes;
use futures::FutureExt;
use http_body_util::Full;
use hyper::{body::Incoming, service::service_fn};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
};
use std::{
    convert::Infallible,
    future::Future,
    net::{IpAddr, SocketAddr},
    panic::AssertUnwindSafe,
    sync::Arc,
    time::Duration,
};
use tokio::net::TcpListener;

use crate::{api, prelude::*};
use self::{handlers::handle, response::internal_server_error};


mod handlers;
mod log;
mod response;


/// HTTP server configuration.
#[derive(Debug, Clone, confique::Config)]
pub(crate) struct HttpConfig {
    /// The TCP port the HTTP server should listen on. Can also be set via the
    /// `PORT` environment variable, which takes precedence.
    #[config(env = "PORT", default = 3001)]
    pub(crate) port: u16,

    /// The bind address to listen on.
    #[config(default = "127.0.0.1")]
    pub(crate) address: IpAddr,
}


// All our responses have their body fully in memory.
type Body = Full<Bytes>;
type Response<T = Body> = hyper::Response<T>;
type Request<T = Incoming> = hyper::Request<T>;

/// How long open connections may take to finish after a shutdown was requested.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);


/// Context that the request handler has access to.
struct Context {
    api_root: Arc<api::RootNode>,
    api: Arc<api::Context>,
    log_headers: bool,
}


/// Starts the HTTP server and runs it until a shutdown signal (Ctrl+C) is
/// received.
pub(crate) async fn serve(
    config: &HttpConfig,
    log_headers: bool,
    api_root: api::RootNode,
    api: api::Context,
) -> Result<()> {
    let ctx = Arc::new(Context {
        api_root: Arc::new(api_root),
        api: Arc::new(api),
        log_headers,
    });

    let addr = SocketAddr::new(config.address, config.port);
    let listener = TcpListener::bind(addr).await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let builder = Builder::new(TokioExecutor::new());
    let graceful = GracefulShutdown::new();
    let mut shutdown = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            conn = listener.accept() => {
                let (stream, peer) = match conn {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Failed to accept TCP connection: {e}");
                        continue;
                    }
                };

                let ctx = Arc::clone(&ctx);
                let service = service_fn(move |req| {
                    handle_internal_errors(handle(req, Arc::clone(&ctx)))
                });
                let conn = builder.serve_connection_with_upgrades(TokioIo::new(stream), service);
                let conn = graceful.watch(conn.into_owned());
                tokio::spawn(async move {
                    if let Err(e) = conn.await {
                        debug!("Error serving connection from {peer}: {e}");
                    }
                });
            }

            res = &mut shutdown => {
                res.context("failed to listen for shutdown signal")?;
                info!("Received shutdown signal, stopping HTTP server");
                break;
            }
        }
    }

    // Stop accepting and give open connections a bit of time to finish.
    drop(listener);
    tokio::select! {
        _ = graceful.shutdown() => debug!("All connections closed"),
        _ = tokio::time::sleep(SHUTDOWN_GRACE_PERIOD) => {
            warn!("Timed out waiting for connections to close after {SHUTDOWN_GRACE_PERIOD:?}");
        }
    }

    Ok(())
}

/// Wraps another future and catches all panics that might occur when
/// resolving/polling that given future. This ensures that we always answer with
/// `500` instead of just crashing the thread and closing the connection.
async fn handle_internal_errors(
    future: impl Future<Output = Response>,
) -> Result<Response, Infallible> {
    // We assert that the remaining application state is not broken if the
    // future panics. Hyper catches panics anyway; this just improves the reply.
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(response) => Ok(response),
        Err(panic) => {
            // For most panics (which use `panic!` like `println!`), the payload
            // is either `&str` or `String`.
            let msg = panic.downcast_ref::<String>()
                .map(|s| s.as_str())
                .or(panic.downcast_ref::<&str>().copied());

            match msg {
                Some(msg) => error!("INTERNAL SERVER ERROR: HTTP handler panicked: '{msg}'"),
                None => error!("INTERNAL SERVER ERROR: HTTP handler panicked"),
            }

            Ok(internal_server_error())
        }
    }
}

//! # `api`
//!
//! HTTP surface of the verifier.
//!
//! ## `POST /verify`
//!
//! ```json
//! {
//!     "component": "http",
//!     "options": { "httpUri": "https://example.com" },
//!     "scope": "REMOTE",
//!     "gav": "org.apache.camel/camel-http/2.19.0"
//! }
//! ```
//!
//! `gav` is optional. When present (and the component is allowed) the
//! library is fetched and recorded before verification.
//!
//! #### Response
//!
//! ```json
//! {
//!     "scope": "REMOTE",
//!     "status": "error",
//!     "errors": [
//!         {
//!             "code": "unsupported-component",
//!             "description": "Unsupported component: twitter",
//!             "attributes": { "component": "twitter" }
//!         }
//!     ]
//! }
//! ```
//!
//! A component that cannot be verified is a `200` with an `error` status.
//! Request failures answer with
//! `{"error": {"code", "message", "request_id"}}`:
//!
//! - 400 `invalid-json`, `missing-field`, `invalid-coordinates`
//! - 413 `payload-too-large`
//! - 502 `dependency-fetch`
//!
//! ## `GET /installed`
//!
//! JSON array of the coordinates grabbed so far, in install order.
//!
//! ## `GET /health`
//!
//! Always `ok`.

pub mod accept;
pub mod process_request;

use std::{
    net::SocketAddr,
    sync::Arc,
};

use anyhow::Result;
use hyper_util::rt::TokioIo;
use tokio::net::{
    TcpListener,
    TcpStream,
};
use tokio_util::sync::CancellationToken;

use crate::route::VerifierRoute;

/// State shared by every connection.
#[derive(Clone)]
pub struct ApiState {
    pub route: Arc<VerifierRoute>,
    /// When false `/verify` answers 404.
    pub verify_enabled: bool,
}

/// Start the API server
pub async fn serve(
    listener: TcpListener,
    state: ApiState,
    cancel_token: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                tracing::info!("Api received cancellation signal, shutting down...");
                break;
            }
            res = listener.accept() => {
                match res {
                    Ok((stream, socketaddr)) => serve_connection(socketaddr, &state, stream),
                    Err(err) => {
                        tracing::error!(?err, "Error accepting connection");
                    }
                }
            }
        }
    }

    Ok(())
}

fn serve_connection(socketaddr: SocketAddr, state: &ApiState, stream: TcpStream) {
    tracing::debug!("Connection from: {}", socketaddr);

    // Adapts `tokio::io` traits to the `hyper::rt` ones.
    let io = TokioIo::new(stream);
    let state = state.clone();

    tokio::task::spawn(async move {
        crate::accept!(io, state, socketaddr);
    });
}

use core::convert::Infallible;

use hyper::{
    Error,
    Method,
    Request,
    StatusCode,
};

use crate::api::{
    ApiState,
    process_request::{
        ApiResponse,
        json_response,
        process_verify,
        text_response,
    },
};

/// Accepts an incoming HTTP request and routes it to the matching handler.
#[tracing::instrument(level = "info", skip_all, target = "api::accept_request")]
pub async fn accept_request<B>(
    req: Request<B>,
    state: ApiState,
    client_addr: std::net::SocketAddr,
) -> Result<ApiResponse, Infallible>
where
    B: hyper::body::Body<Error = Error>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    tracing::debug!(target: "api::accept_request", %method, %path, "Incoming request");

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") => text_response(StatusCode::OK, "ok"),
        (Method::GET, "/installed") => json_response(StatusCode::OK, &state.route.ledger().list()),
        (Method::POST, "/verify") if state.verify_enabled => {
            process_verify(req, &state.route, client_addr).await
        }
        _ => text_response(StatusCode::NOT_FOUND, "not found"),
    };
    Ok(response)
}

/// Serves one connection, dispatching every request to [`accept_request`].
#[macro_export]
macro_rules! accept {
    (
        $io:expr,
        $state:expr,
        $client_addr:expr
    ) => {
        let state = $state.clone();
        let client_addr = $client_addr;
        if let Err(err) = hyper::server::conn::http1::Builder::new()
            .serve_connection(
                $io,
                hyper::service::service_fn(move |req| {
                    let state = state.clone();
                    async move {
                        $crate::api::accept::accept_request(req, state, client_addr).await
                    }
                }),
            )
            .await
        {
            tracing::error!(?err, "Error serving connection");
        }
    };
}

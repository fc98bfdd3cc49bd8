use std::{
    net::SocketAddr,
    time::Instant,
};

use component_verifier_core::{
    Headers,
    VerifyRequest,
};
use http_body_util::{
    BodyExt,
    Full,
    LengthLimitError,
    Limited,
};
use hyper::{
    Request,
    Response,
    StatusCode,
    body::Bytes,
    header::{
        CONTENT_TYPE,
        HeaderValue,
    },
};
use metrics::{
    counter,
    histogram,
};
use serde::Serialize;
use serde_json::json;
use tracing::{
    error,
    info,
    warn,
};
use uuid::Uuid;

use crate::{
    error::DispatchError,
    producer::Exchange,
    route::VerifierRoute,
};

/// Maximum accepted `/verify` body (1 MiB).
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

pub type ApiResponse = Response<Full<Bytes>>;

pub fn text_response(status: StatusCode, body: &'static str) -> ApiResponse {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
}

pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> ApiResponse {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(err) => {
            error!(target: "api", error = %err, "Failed to serialize response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    }
}

fn error_response(status: StatusCode, code: &str, message: &str, request_id: &Uuid) -> ApiResponse {
    json_response(
        status,
        &json!({
            "error": {
                "code": code,
                "message": message,
                "request_id": request_id.to_string(),
            }
        }),
    )
}

const fn status_for(err: &DispatchError) -> StatusCode {
    match err {
        DispatchError::InvalidCoordinates(_) | DispatchError::MissingField(_) => {
            StatusCode::BAD_REQUEST
        }
        DispatchError::DependencyFetch { .. } => StatusCode::BAD_GATEWAY,
        DispatchError::MissingResult => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handles `POST /verify`: reads the JSON body, maps it onto the request
/// headers and runs the route.
#[tracing::instrument(
    level = "debug",
    skip_all,
    target = "api::process_verify",
    fields(request_id, client_addr)
)]
pub async fn process_verify<B>(
    req: Request<B>,
    route: &VerifierRoute,
    client_addr: SocketAddr,
) -> ApiResponse
where
    B: hyper::body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));
    tracing::Span::current().record("client_addr", tracing::field::display(&client_addr));

    // Reading stops as soon as the limit is crossed.
    let body = match Limited::new(req.into_body(), MAX_BODY_SIZE).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) if err.is::<LengthLimitError>() => {
            warn!(target: "api", %request_id, limit = MAX_BODY_SIZE, "Request payload too large");
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload-too-large",
                "Request too large",
                &request_id,
            );
        }
        Err(err) => {
            warn!(target: "api", %request_id, error = %err, "Failed to read request body");
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid-body",
                "Failed to read request body",
                &request_id,
            );
        }
    };

    let verify_request: VerifyRequest = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(target: "api", %request_id, error = %err, "Failed to parse request");
            return error_response(
                StatusCode::BAD_REQUEST,
                "invalid-json",
                &err.to_string(),
                &request_id,
            );
        }
    };

    info!(
        target: "api",
        %request_id,
        component = verify_request.component.as_deref().unwrap_or_default(),
        scope = ?verify_request.scope,
        gav = verify_request.gav.as_deref().unwrap_or_default(),
        "Received verify request"
    );

    let started = Instant::now();
    let outcome = route.process(Exchange::new(Headers::from(verify_request))).await;
    histogram!("verify_request_duration_seconds").record(started.elapsed().as_secs_f64());

    match outcome {
        Ok(result) => {
            let status = if result.is_success() { "success" } else { "error" };
            counter!("verify_requests_count", "status" => status).increment(1);
            info!(target: "api", %request_id, status, errors = result.errors.len(), "Verification finished");
            json_response(StatusCode::OK, &result)
        }
        Err(err) => {
            counter!("verify_requests_count", "status" => err.code()).increment(1);
            warn!(target: "api", %request_id, error = %err, "Verify request failed");
            error_response(status_for(&err), err.code(), &err.to_string(), &request_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        allow_list::AllowList,
        fetcher::{
            FetchContext,
            MockDependencyFetcher,
        },
        grab::GrabProducer,
        registry::StaticRegistry,
        verify::VerifyProducer,
    };
    use core::{
        convert::Infallible,
        pin::Pin,
        task::{
            Context,
            Poll,
        },
    };
    use hyper::body::Frame;
    use serde_json::Value;
    use std::sync::{
        Arc,
        atomic::{
            AtomicUsize,
            Ordering,
        },
    };

    const CHUNK_SIZE: usize = 16 * 1024;

    /// Yields `CHUNK_SIZE` bytes forever, counting how many frames were read.
    struct EndlessBody {
        frames_read: Arc<AtomicUsize>,
    }

    impl hyper::body::Body for EndlessBody {
        type Data = Bytes;
        type Error = Infallible;

        fn poll_frame(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Bytes>, Infallible>>> {
            self.frames_read.fetch_add(1, Ordering::SeqCst);
            Poll::Ready(Some(Ok(Frame::data(Bytes::from(vec![b' '; CHUNK_SIZE])))))
        }
    }

    fn route() -> VerifierRoute {
        let allow_list = Arc::new(AllowList::Any);
        VerifierRoute::new(
            allow_list.clone(),
            GrabProducer::new(
                Arc::new(MockDependencyFetcher::new()),
                FetchContext::new("/tmp/grape"),
            ),
            VerifyProducer::new(Arc::new(StaticRegistry::new()), allow_list),
        )
    }

    #[tokio::test]
    async fn test_oversized_body_stops_reading_at_limit() {
        let frames_read = Arc::new(AtomicUsize::new(0));
        let req = Request::new(EndlessBody {
            frames_read: frames_read.clone(),
        });

        let response = process_verify(req, &route(), "127.0.0.1:1".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: Value =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        assert_eq!(body["error"]["code"], "payload-too-large");
        assert!(frames_read.load(Ordering::SeqCst) <= MAX_BODY_SIZE / CHUNK_SIZE + 1);
    }

    #[tokio::test]
    async fn test_body_at_limit_is_read() {
        let mut padded = br#"{"component": "twitter", "options": {}, "scope": "local"}"#.to_vec();
        padded.resize(MAX_BODY_SIZE, b' ');

        let response = process_verify(
            Request::new(Full::new(Bytes::from(padded))),
            &route(),
            "127.0.0.1:1".parse().unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value =
            serde_json::from_slice(&response.into_body().collect().await.unwrap().to_bytes())
                .unwrap();
        assert_eq!(body["scope"], "LOCAL");
        assert_eq!(body["errors"][0]["code"], "unsupported-component");
    }
}

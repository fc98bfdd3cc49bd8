use std::{
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use component_verifier_core::{
    Options,
    ResultError,
    Scope,
    VerificationResult,
    codes,
};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::registry::{
    Component,
    ComponentVerifier,
};

/// Option naming the endpoint to call.
pub const HTTP_URI: &str = "httpUri";

const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Plain HTTP(S) endpoint component.
pub struct HttpComponent {
    verifier: Arc<HttpVerifier>,
}

impl HttpComponent {
    pub const NAME: &'static str = "http";

    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REMOTE_TIMEOUT).build()?;
        Ok(Self {
            verifier: Arc::new(HttpVerifier { client }),
        })
    }
}

impl Component for HttpComponent {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn verifier(&self) -> Option<Arc<dyn ComponentVerifier>> {
        Some(self.verifier.clone())
    }
}

pub struct HttpVerifier {
    client: Client,
}

fn verify_parameters(options: &Options) -> Result<Url, ResultError> {
    let raw = options.get(HTTP_URI).ok_or_else(|| {
        ResultError::new(
            codes::MISSING_PARAMETER,
            format!("Missing parameter: {HTTP_URI}"),
        )
        .with_attribute("parameter", HTTP_URI)
    })?;

    let illegal = |reason: String| {
        ResultError::new(codes::ILLEGAL_PARAMETER_VALUE, reason)
            .with_attribute("parameter", HTTP_URI)
            .with_attribute("value", raw.clone())
    };

    let Value::String(uri) = raw else {
        return Err(illegal(format!("{HTTP_URI} must be a string")));
    };
    let url = Url::parse(uri).map_err(|e| illegal(format!("Invalid {HTTP_URI}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(illegal(format!(
            "Unsupported scheme for {HTTP_URI}: {}",
            url.scheme()
        )));
    }
    Ok(url)
}

impl HttpVerifier {
    async fn check_connectivity(&self, url: Url) -> Option<ResultError> {
        debug!(target: "components::http", %url, "Checking connectivity");
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => None,
            Ok(response) => Some(
                ResultError::new(
                    codes::GENERIC,
                    format!("Endpoint answered {}", response.status()),
                )
                .with_attribute("http_code", response.status().as_u16()),
            ),
            Err(err) => Some(ResultError::new(codes::EXCEPTION, err.to_string())),
        }
    }
}

#[async_trait]
impl ComponentVerifier for HttpVerifier {
    async fn verify(&self, scope: Scope, options: &Options) -> VerificationResult {
        let url = match verify_parameters(options) {
            Ok(url) => url,
            Err(error) => return VerificationResult::error(scope, vec![error]),
        };
        if scope != Scope::Remote {
            return VerificationResult::success(scope);
        }

        let errors = self.check_connectivity(url).await.into_iter().collect();
        VerificationResult::from_errors(scope, errors)
    }
}

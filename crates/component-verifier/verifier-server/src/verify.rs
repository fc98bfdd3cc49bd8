use std::sync::Arc;

use async_trait::async_trait;
use component_verifier_core::{
    VerificationRequest,
    VerificationResult,
};
use tracing::debug;

use crate::{
    allow_list::AllowList,
    error::Result,
    producer::{
        Exchange,
        Producer,
    },
    registry::SharedRegistry,
};

/// Hands the request options to the named component's verifier.
pub struct VerifyProducer {
    registry: SharedRegistry,
    allow_list: Arc<AllowList>,
}

impl VerifyProducer {
    pub fn new(registry: SharedRegistry, allow_list: Arc<AllowList>) -> Self {
        Self {
            registry,
            allow_list,
        }
    }

    /// Returns the delegate's result untouched, or an `unsupported-component`
    /// error when the component is not allowed, unknown, or has no verifier.
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationResult {
        let name = request.component_name.as_str();

        let verifier = if self.allow_list.is_allowed(name) {
            self.registry
                .resolve(name)
                .and_then(|component| component.verifier())
        } else {
            None
        };

        match verifier {
            Some(verifier) => verifier.verify(request.scope, &request.options).await,
            None => {
                debug!(target: "verify", component = name, "Component is not verifiable");
                VerificationResult::unsupported_component(request.scope, name)
            }
        }
    }
}

#[async_trait]
impl Producer for VerifyProducer {
    async fn process(&self, exchange: &mut Exchange) -> Result<()> {
        let request = VerificationRequest::try_from(&exchange.headers)?;
        exchange.body = Some(self.verify(&request).await);
        Ok(())
    }
}

use async_trait::async_trait;
use component_verifier_core::{
    Headers,
    VerificationResult,
};

use crate::error::Result;

/// A request travelling through the route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exchange {
    pub headers: Headers,
    /// Set by the verify step.
    pub body: Option<VerificationResult>,
}

impl Exchange {
    pub fn new(headers: Headers) -> Self {
        Self {
            headers,
            body: None,
        }
    }
}

/// One step of the route. Producers are built once and shared by every
/// request.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn process(&self, exchange: &mut Exchange) -> Result<()>;
}

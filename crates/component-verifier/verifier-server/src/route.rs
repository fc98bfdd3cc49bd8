use std::sync::Arc;

use component_verifier_core::{
    VerificationRequest,
    VerificationResult,
};
use tracing::debug;

use crate::{
    allow_list::AllowList,
    error::{
        DispatchError,
        Result,
    },
    grab::GrabProducer,
    ledger::InstallLedger,
    producer::{
        Exchange,
        Producer,
    },
    verify::VerifyProducer,
};

/// The `/verify` pipeline: validate, filter on the allow-list, grab, verify.
pub struct VerifierRoute {
    allow_list: Arc<AllowList>,
    grab: Arc<GrabProducer>,
    steps: Vec<Arc<dyn Producer>>,
}

impl VerifierRoute {
    pub fn new(allow_list: Arc<AllowList>, grab: GrabProducer, verify: VerifyProducer) -> Self {
        let grab = Arc::new(grab);
        let steps = vec![
            grab.clone() as Arc<dyn Producer>,
            Arc::new(verify) as Arc<dyn Producer>,
        ];
        Self {
            allow_list,
            grab,
            steps,
        }
    }

    pub fn ledger(&self) -> &InstallLedger {
        self.grab.ledger()
    }

    /// Missing fields fail before anything is fetched. Components outside
    /// the allow-list get the unsupported result without a grab.
    pub async fn process(&self, mut exchange: Exchange) -> Result<VerificationResult> {
        let request = VerificationRequest::try_from(&exchange.headers)?;
        if !self.allow_list.is_allowed(&request.component_name) {
            debug!(target: "route", component = %request.component_name, "Component filtered out");
            return Ok(VerificationResult::unsupported_component(
                request.scope,
                &request.component_name,
            ));
        }

        for step in &self.steps {
            step.process(&mut exchange).await?;
        }
        exchange.body.ok_or(DispatchError::MissingResult)
    }
}

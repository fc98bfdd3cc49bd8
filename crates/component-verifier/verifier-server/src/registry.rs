use std::{
    collections::HashMap,
    sync::Arc,
};

use async_trait::async_trait;
use component_verifier_core::{
    Options,
    Scope,
    VerificationResult,
};

/// Validates component options without running the component.
#[async_trait]
pub trait ComponentVerifier: Send + Sync {
    async fn verify(&self, scope: Scope, options: &Options) -> VerificationResult;
}

/// A named component that may expose a verifier.
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    fn verifier(&self) -> Option<Arc<dyn ComponentVerifier>>;

    fn has_verifier(&self) -> bool {
        self.verifier().is_some()
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait ComponentRegistry: Send + Sync {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Component>>;
}

pub type SharedRegistry = Arc<dyn ComponentRegistry>;

/// Registry backed by a fixed name to component map.
#[derive(Default)]
pub struct StaticRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `component` under its own name, replacing any previous one.
    pub fn register(&mut self, component: Arc<dyn Component>) {
        self.components
            .insert(component.name().to_string(), component);
    }
}

impl ComponentRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Option<Arc<dyn Component>> {
        self.components.get(name).cloned()
    }
}

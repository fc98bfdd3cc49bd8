//! Components shipped with the server.

pub mod http;

use std::sync::Arc;

pub use http::HttpComponent;

use crate::registry::StaticRegistry;

/// A registry holding every built-in component.
pub fn builtin_registry() -> Result<StaticRegistry, reqwest::Error> {
    let mut registry = StaticRegistry::new();
    registry.register(Arc::new(HttpComponent::new()?));
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ComponentRegistry;

    #[test]
    fn test_builtin_http_is_verifiable() {
        let registry = builtin_registry().unwrap();
        assert!(registry.resolve(HttpComponent::NAME).unwrap().has_verifier());
    }
}

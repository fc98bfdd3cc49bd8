//! Wire types shared by the component verifier server and its clients.

use std::{
    fmt,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};

/// Header carrying the name of the component to verify.
pub const VERIFIER_COMPONENT: &str = "CamelVerifierComponent";
/// Header carrying the component options to verify.
pub const VERIFIER_OPTIONS: &str = "CamelVerifierOptions";
/// Header carrying the verification scope.
pub const VERIFIER_SCOPE: &str = "CamelVerifierScope";
/// Header carrying the optional `group/module/version[/classifier]` coordinates.
pub const GRAPE_MAVEN_COORDINATES: &str = "CamelGrapeMavenCoordinates";

/// Error codes used in [`ResultError::code`].
pub mod codes {
    pub const UNSUPPORTED_COMPONENT: &str = "unsupported-component";
    pub const MISSING_PARAMETER: &str = "missing-parameter";
    pub const ILLEGAL_PARAMETER_VALUE: &str = "illegal-parameter-value";
    pub const EXCEPTION: &str = "exception";
    pub const GENERIC: &str = "generic";
}

/// Component options, as an arbitrary JSON object.
pub type Options = Map<String, Value>;

/// How far a verification goes.
///
/// Deserializes through [`FromStr`], so names are case-insensitive and the
/// `PARAMETERS`/`CONNECTIVITY` aliases are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Scope {
    /// Checks against the running context only.
    Context,
    /// Parameter checks, no I/O.
    Local,
    /// Live connectivity checks against the remote system.
    Remote,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Context => "CONTEXT",
            Self::Local => "LOCAL",
            Self::Remote => "REMOTE",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CONTEXT" => Ok(Self::Context),
            "LOCAL" | "PARAMETERS" => Ok(Self::Local),
            "REMOTE" | "CONNECTIVITY" => Ok(Self::Remote),
            _ => Err(format!("unknown verification scope: {s}")),
        }
    }
}

impl TryFrom<String> for Scope {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Success,
    Error,
}

/// A single verification failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultError {
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ResultError {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            attributes: Map::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// The error reported for a component that cannot be verified.
    pub fn unsupported_component(component: &str) -> Self {
        Self::new(
            codes::UNSUPPORTED_COMPONENT,
            format!("Unsupported component: {component}"),
        )
        .with_attribute("component", component)
    }
}

/// Outcome of a verification, echoed back to the caller as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub scope: Scope,
    pub status: VerificationStatus,
    #[serde(default)]
    pub errors: Vec<ResultError>,
}

impl VerificationResult {
    pub const fn success(scope: Scope) -> Self {
        Self {
            scope,
            status: VerificationStatus::Success,
            errors: Vec::new(),
        }
    }

    pub const fn error(scope: Scope, errors: Vec<ResultError>) -> Self {
        Self {
            scope,
            status: VerificationStatus::Error,
            errors,
        }
    }

    /// Successful if and only if `errors` is empty.
    pub fn from_errors(scope: Scope, errors: Vec<ResultError>) -> Self {
        if errors.is_empty() {
            Self::success(scope)
        } else {
            Self::error(scope, errors)
        }
    }

    pub fn unsupported_component(scope: Scope, component: &str) -> Self {
        Self::error(scope, vec![ResultError::unsupported_component(component)])
    }

    pub fn is_success(&self) -> bool {
        self.status == VerificationStatus::Success
    }
}

/// The JSON body accepted by `POST /verify`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub component: Option<String>,
    pub options: Option<Options>,
    pub scope: Option<Scope>,
    pub gav: Option<String>,
}

/// Header-style view of a request, as consumed by the producers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headers {
    #[serde(rename = "CamelVerifierComponent", skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(rename = "CamelVerifierOptions", skip_serializing_if = "Option::is_none")]
    pub options: Option<Options>,
    #[serde(rename = "CamelVerifierScope", skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    #[serde(
        rename = "CamelGrapeMavenCoordinates",
        skip_serializing_if = "Option::is_none"
    )]
    pub coordinates: Option<String>,
}

impl From<VerifyRequest> for Headers {
    fn from(body: VerifyRequest) -> Self {
        Self {
            component: body.component,
            options: body.options,
            scope: body.scope,
            coordinates: body.gav,
        }
    }
}

/// A mandatory header was absent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing mandatory header: {field}")]
pub struct MissingField {
    pub field: &'static str,
}

/// A request with every mandatory field present.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    pub component_name: String,
    pub options: Options,
    pub scope: Scope,
}

impl TryFrom<&Headers> for VerificationRequest {
    type Error = MissingField;

    fn try_from(headers: &Headers) -> Result<Self, Self::Error> {
        let component_name = headers.component.clone().ok_or(MissingField {
            field: VERIFIER_COMPONENT,
        })?;
        let options = headers.options.clone().ok_or(MissingField {
            field: VERIFIER_OPTIONS,
        })?;
        let scope = headers.scope.ok_or(MissingField {
            field: VERIFIER_SCOPE,
        })?;

        Ok(Self {
            component_name,
            options,
            scope,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_scope_accepts_aliases_and_case() {
        assert_eq!("local".parse::<Scope>().unwrap(), Scope::Local);
        assert_eq!("CONNECTIVITY".parse::<Scope>().unwrap(), Scope::Remote);
        assert!("everything".parse::<Scope>().is_err());

        let scope: Scope = serde_json::from_value(json!("PARAMETERS")).unwrap();
        assert_eq!(scope, Scope::Local);
        assert_eq!(serde_json::to_value(Scope::Context).unwrap(), json!("CONTEXT"));
    }

    #[test]
    fn test_scope_deserializes_like_from_str() {
        for (raw, expected) in [
            ("local", Scope::Local),
            ("Remote", Scope::Remote),
            ("context", Scope::Context),
            ("connectivity", Scope::Remote),
        ] {
            let scope: Scope = serde_json::from_value(json!(raw)).unwrap();
            assert_eq!(scope, expected, "{raw}");
        }

        let request: VerifyRequest =
            serde_json::from_value(json!({"component": "http", "scope": "local"})).unwrap();
        assert_eq!(request.scope, Some(Scope::Local));

        let err = serde_json::from_value::<Scope>(json!("everything")).unwrap_err();
        assert!(err.to_string().contains("unknown verification scope"));
        assert!(serde_json::from_value::<Scope>(json!(1)).is_err());
    }

    #[test]
    fn test_unsupported_result_shape() {
        let result = VerificationResult::unsupported_component(Scope::Local, "twitter");
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["scope"], "LOCAL");
        assert_eq!(value["status"], "error");
        assert_eq!(value["errors"][0]["code"], "unsupported-component");
        assert_eq!(value["errors"][0]["attributes"]["component"], "twitter");
    }

    #[test]
    fn test_success_serializes_empty_errors() {
        let value = serde_json::to_value(VerificationResult::success(Scope::Remote)).unwrap();
        assert_eq!(
            value,
            json!({"scope": "REMOTE", "status": "success", "errors": []})
        );
    }

    #[test]
    fn test_from_errors_picks_status() {
        assert!(VerificationResult::from_errors(Scope::Local, vec![]).is_success());
        let failed = VerificationResult::from_errors(
            Scope::Local,
            vec![ResultError::new(codes::GENERIC, "boom")],
        );
        assert_eq!(failed.status, VerificationStatus::Error);
    }

    #[test]
    fn test_body_maps_to_headers() {
        let body: VerifyRequest = serde_json::from_value(json!({
            "component": "twitter",
            "options": {"consumerKey": "x"},
            "scope": "LOCAL",
            "gav": "org.acme/lib/1.2.3"
        }))
        .unwrap();
        let headers = Headers::from(body);

        let value = serde_json::to_value(&headers).unwrap();
        assert_eq!(value[VERIFIER_COMPONENT], "twitter");
        assert_eq!(value[VERIFIER_OPTIONS]["consumerKey"], "x");
        assert_eq!(value[VERIFIER_SCOPE], "LOCAL");
        assert_eq!(value[GRAPE_MAVEN_COORDINATES], "org.acme/lib/1.2.3");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut headers = Headers::default();
        assert_matches!(
            VerificationRequest::try_from(&headers),
            Err(MissingField { field }) if field == VERIFIER_COMPONENT
        );

        headers.component = Some("http".to_string());
        headers.options = Some(Options::new());
        assert_matches!(
            VerificationRequest::try_from(&headers),
            Err(MissingField { field }) if field == VERIFIER_SCOPE
        );

        headers.scope = Some(Scope::Local);
        let request = VerificationRequest::try_from(&headers).unwrap();
        assert_eq!(request.component_name, "http");
        assert_eq!(request.scope, Scope::Local);
    }
}

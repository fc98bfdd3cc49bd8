use component_verifier_core::MissingField;
use thiserror::Error;

use crate::{
    coordinates::InvalidCoordinates,
    fetcher::FetchError,
};

pub type Result<T, E = DispatchError> = std::result::Result<T, E>;

/// Failures that abort a request. An unsupported component is not one of
/// these; it is reported as a regular verification result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    InvalidCoordinates(#[from] InvalidCoordinates),
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error("failed to fetch {coordinates}: {source}")]
    DependencyFetch {
        coordinates: String,
        #[source]
        source: FetchError,
    },
    #[error("route completed without a verification result")]
    MissingResult,
}

impl DispatchError {
    /// Stable code reported to API clients.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCoordinates(_) => "invalid-coordinates",
            Self::MissingField(_) => "missing-field",
            Self::DependencyFetch { .. } => "dependency-fetch",
            Self::MissingResult => "internal-error",
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::{
    coordinates::Coordinates,
    error::{
        DispatchError,
        Result,
    },
    fetcher::{
        DependencyFetcher,
        FetchContext,
    },
    ledger::InstallLedger,
    producer::{
        Exchange,
        Producer,
    },
};

/// Fetches the library named by `CamelGrapeMavenCoordinates` and records it
/// in the install ledger it owns.
pub struct GrabProducer {
    fetcher: Arc<dyn DependencyFetcher>,
    context: FetchContext,
    ledger: InstallLedger,
}

impl GrabProducer {
    pub fn new(fetcher: Arc<dyn DependencyFetcher>, context: FetchContext) -> Self {
        Self {
            fetcher,
            context,
            ledger: InstallLedger::new(),
        }
    }

    pub const fn ledger(&self) -> &InstallLedger {
        &self.ledger
    }

    /// Absent or empty coordinates are a no-op. The ledger records the raw
    /// string only once the fetch succeeded.
    pub async fn grab(&self, raw: Option<&str>) -> Result<()> {
        let Some(raw) = raw.filter(|raw| !raw.is_empty()) else {
            return Ok(());
        };

        let coordinates = Coordinates::parse(raw)?;
        let artifact = self
            .fetcher
            .fetch(&coordinates, &self.context)
            .await
            .map_err(|source| {
                DispatchError::DependencyFetch {
                    coordinates: raw.to_string(),
                    source,
                }
            })?;
        debug!(target: "grab", coordinates = raw, artifact = %artifact.display(), "Grabbed dependency");

        self.ledger.install(raw);
        Ok(())
    }
}

#[async_trait]
impl Producer for GrabProducer {
    async fn process(&self, exchange: &mut Exchange) -> Result<()> {
        self.grab(exchange.headers.coordinates.as_deref()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coordinates::InvalidCoordinates,
        fetcher::{
            FetchError,
            MockDependencyFetcher,
        },
    };
    use assert_matches::assert_matches;
    use component_verifier_core::Headers;
    use std::path::PathBuf;

    fn producer(fetcher: MockDependencyFetcher) -> GrabProducer {
        GrabProducer::new(Arc::new(fetcher), FetchContext::new("/tmp/grape"))
    }

    #[tokio::test]
    async fn test_grab_fetches_and_records_raw_coordinates() {
        let mut fetcher = MockDependencyFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|coordinates, context| {
                coordinates.group == "org.acme"
                    && coordinates.module == "lib"
                    && coordinates.version == "1.2.3"
                    && coordinates.classifier.is_empty()
                    && context.target_dir == PathBuf::from("/tmp/grape")
            })
            .times(2)
            .returning(|_, _| Ok(PathBuf::from("/tmp/grape/lib.jar")));

        let grab = producer(fetcher);
        grab.grab(Some("org.acme/lib/1.2.3")).await.unwrap();
        grab.grab(Some("org.acme/lib/1.2.3")).await.unwrap();

        assert_eq!(grab.ledger().list(), vec!["org.acme/lib/1.2.3"]);
    }

    #[tokio::test]
    async fn test_empty_coordinates_are_a_noop() {
        let mut fetcher = MockDependencyFetcher::new();
        fetcher.expect_fetch().never();

        let grab = producer(fetcher);
        grab.grab(None).await.unwrap();
        grab.grab(Some("")).await.unwrap();
        assert!(grab.ledger().list().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_coordinates_leave_ledger_untouched() {
        let mut fetcher = MockDependencyFetcher::new();
        fetcher.expect_fetch().never();

        let grab = producer(fetcher);
        let err = grab.grab(Some("bad")).await.unwrap_err();

        assert_matches!(err, DispatchError::InvalidCoordinates(InvalidCoordinates(raw)) if raw == "bad");
        assert!(grab.ledger().list().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_failure_records_nothing() {
        let mut fetcher = MockDependencyFetcher::new();
        fetcher.expect_fetch().times(1).returning(|coordinates, _| {
            Err(FetchError::NotFound {
                artifact: coordinates.repository_path(),
                repositories: 1,
            })
        });

        let grab = producer(fetcher);
        let err = grab.grab(Some("org.acme/missing/0.0.1")).await.unwrap_err();

        assert_matches!(
            err,
            DispatchError::DependencyFetch { ref coordinates, source: FetchError::NotFound { .. } }
                if coordinates == "org.acme/missing/0.0.1"
        );
        assert!(grab.ledger().list().is_empty());
    }

    #[tokio::test]
    async fn test_process_reads_coordinates_header() {
        let mut fetcher = MockDependencyFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|coordinates, _| coordinates.classifier == "tests")
            .times(1)
            .returning(|_, _| Ok(PathBuf::from("lib-tests.jar")));

        let grab = producer(fetcher);
        let mut exchange = Exchange::new(Headers {
            coordinates: Some("org.acme/lib/1.2.3/tests".to_string()),
            ..Headers::default()
        });
        grab.process(&mut exchange).await.unwrap();

        assert_eq!(grab.ledger().list(), vec!["org.acme/lib/1.2.3/tests"]);
        assert!(exchange.body.is_none());
    }
}

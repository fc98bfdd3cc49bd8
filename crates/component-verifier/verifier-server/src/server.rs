use std::net::SocketAddr;

use anyhow::Result;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::ApiState;

pub struct VerifierServer {
    pub listener: TcpListener,
    pub state: ApiState,
}

impl VerifierServer {
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the server until the cancellation token is cancelled.
    pub async fn run(self, cancel_token: CancellationToken) -> Result<()> {
        tracing::info!("Started API server");
        crate::api::serve(self.listener, self.state, cancel_token).await?;
        tracing::info!("Api stopped.");
        Ok(())
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
        route::VerifierRoute,
        verify::VerifyProducer,
    };
    use std::sync::Arc;

    #[tokio::test]
    async fn test_server_cancellation() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let allow_list = Arc::new(AllowList::Any);
        let route = VerifierRoute::new(
            allow_list.clone(),
            GrabProducer::new(
                Arc::new(MockDependencyFetcher::new()),
                FetchContext::new("/tmp/grape"),
            ),
            VerifyProducer::new(Arc::new(StaticRegistry::new()), allow_list),
        );
        let server = VerifierServer {
            listener,
            state: ApiState {
                route: Arc::new(route),
                verify_enabled: true,
            },
        };
        assert!(server.state.route.ledger().list().is_empty());

        let cancel_token = CancellationToken::new();
        let cancel_token_clone = cancel_token.clone();
        let server_handle = tokio::spawn(async move {
            server.run(cancel_token_clone).await.unwrap();
        });

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        cancel_token.cancel();

        // Server should shutdown gracefully
        server_handle.await.unwrap();
    }
}

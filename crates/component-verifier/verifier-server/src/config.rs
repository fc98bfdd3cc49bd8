use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use clap::{
    ArgAction,
    Parser,
};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;

use crate::{
    allow_list::AllowList,
    api::ApiState,
    components::builtin_registry,
    fetcher::{
        FetchContext,
        MavenFetcher,
        Repository,
    },
    grab::GrabProducer,
    route::VerifierRoute,
    server::VerifierServer,
    verify::VerifyProducer,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Api server address
    #[arg(long, env = "VERIFIER_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,
    /// Log level
    #[arg(long, env = "VERIFIER_LOG_LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
    /// Components that may be grabbed for and verified
    #[arg(
        long,
        env = "VERIFIER_COMPONENTS",
        value_delimiter = ',',
        default_value = "http"
    )]
    pub components: Vec<String>,
    /// Accept every registered component, ignoring `--components`
    #[arg(long, env = "VERIFIER_ALLOW_ANY_COMPONENT")]
    pub allow_any_component: bool,
    /// Directory fetched artifacts are cached in, defaults to the platform cache dir
    #[arg(long, env = "VERIFIER_GRAPE_CACHE_DIR")]
    pub grape_cache_dir: Option<PathBuf>,
    /// Additional maven repository as `name=url`, tried after Maven Central
    #[arg(
        long = "grape-repository",
        env = "VERIFIER_GRAPE_REPOSITORIES",
        value_delimiter = ','
    )]
    pub grape_repositories: Vec<Repository>,
    /// Seconds allowed per repository for one artifact download
    #[arg(long, env = "VERIFIER_GRAPE_TIMEOUT_SECS", default_value_t = 60)]
    pub grape_timeout_secs: u64,
    /// Serve `POST /verify`
    #[arg(long, env = "VERIFIER_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub verify_enabled: bool,
}

impl Config {
    pub fn allow_list(&self) -> AllowList {
        if self.allow_any_component {
            AllowList::Any
        } else {
            AllowList::only(
                self.components
                    .iter()
                    .filter(|component| !component.is_empty())
                    .cloned(),
            )
        }
    }

    pub fn cache_dir(&self) -> anyhow::Result<PathBuf> {
        if let Some(cache_dir) = &self.grape_cache_dir {
            return Ok(cache_dir.clone());
        }
        let dirs = directories::ProjectDirs::from("", "", "component-verifier")
            .context("no home directory to place the artifact cache in")?;
        Ok(dirs.cache_dir().join("grapes"))
    }

    /// Build the verifier server
    pub async fn build(self) -> anyhow::Result<VerifierServer> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!(listen_addr = ?self.listen_addr, "Listening on address");

        let cache_dir = self.cache_dir()?;
        tracing::info!(cache_dir = %cache_dir.display(), "Using artifact cache");

        let fetcher = MavenFetcher::new(self.grape_repositories.clone())?
            .with_timeout(Duration::from_secs(self.grape_timeout_secs));
        for repository in fetcher.repositories() {
            tracing::info!(repository = %repository.name, url = %repository.url, "Registered maven repository");
        }

        let registry = builtin_registry()?;
        let allow_list = Arc::new(self.allow_list());
        tracing::info!(?allow_list, "Component allow-list");

        let route = VerifierRoute::new(
            allow_list.clone(),
            GrabProducer::new(Arc::new(fetcher), FetchContext::new(cache_dir)),
            VerifyProducer::new(Arc::new(registry), allow_list),
        );

        Ok(VerifierServer {
            listener,
            state: ApiState {
                route: Arc::new(route),
                verify_enabled: self.verify_enabled,
            },
        })
    }
}

//! `component-verifier-server`
//!
//! Verifies component configuration over HTTP. A `POST /verify` request
//! names a component, its options and a [`Scope`](component_verifier_core::Scope),
//! and may carry `group/module/version[/classifier]` coordinates of a
//! library to fetch first. Fetched coordinates are recorded in an
//! [`InstallLedger`](ledger::InstallLedger); verification itself is
//! delegated to the component's own verifier.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod allow_list;
pub mod api;
pub mod components;
mod config;
pub mod coordinates;
pub mod error;
pub mod fetcher;
pub mod grab;
pub mod ledger;
pub mod producer;
pub mod registry;
pub mod route;
mod server;
pub mod verify;

pub use config::Config;
pub use error::{
    DispatchError,
    Result,
};
pub use server::VerifierServer;

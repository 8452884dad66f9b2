//! Live-reload pipeline for smart-contract projects.
//!
//! When a contract source changes, a [`Pipeline`] pass runs:
//!
//! 1. [`reconcile`] - resolve ledger entries deployed on remote networks,
//!    write their verified sources next to the local contracts and record
//!    their bytecode
//! 2. [`build`] - run the external build/deploy tool
//! 3. [`publish`] - merge the local deployments into the ledger and push a
//!    `new-version` or `compile-failed` message to the connected client
//!
//! The file watcher and the push transport live in `solhmr-cli`.
//!
//! # Example
//!
//! ```rust,no_run
//! use solhmr::{BuildCommand, EtherscanResolver, Pipeline, ProjectLayout, SubscriberSlot};
//! use std::sync::Arc;
//!
//! # async fn run() -> solhmr::Result<()> {
//! let layout = ProjectLayout {
//!     project_dir: "solidity".into(),
//!     contracts_dir: "solidity/contracts".into(),
//!     build_dir: "solidity/build/contracts".into(),
//!     ledger_path: "solidity/deployments.json".into(),
//!     local_network_id: solhmr::LOCAL_NETWORK_ID.to_string(),
//! };
//! let resolver = Arc::new(EtherscanResolver::with_defaults(None)?);
//! let pipeline = Pipeline::new(
//!     layout,
//!     resolver,
//!     Arc::new(BuildCommand::truffle()),
//!     Arc::new(SubscriberSlot::new()),
//! );
//!
//! let message = pipeline.run_pass().await?;
//! println!("{}", message.kind());
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod build;
pub mod error;
pub mod ledger;
pub mod message;
pub mod pipeline;
pub mod publish;
pub mod reconcile;
pub mod resolver;
pub mod subscriber;

pub use artifacts::{BuiltContract, NetworkDeployment};
pub use build::{BuildCommand, BuildOutcome, BuildRunner};
pub use error::{BuildFailure, Error, ResolverError, Result};
pub use ledger::{DeploymentLedger, DeploymentRecord, LOCAL_NETWORK_ID};
pub use message::OutboundMessage;
pub use pipeline::{PassStatus, Pipeline, ProjectLayout};
pub use publish::ResultPublisher;
pub use reconcile::Reconciler;
pub use resolver::{EtherscanResolver, RemoteSource, SourceResolver};
pub use subscriber::SubscriberSlot;

//! End-to-end tests for a pipeline pass against a temporary project.
//!
//! The block explorer and the build tool are replaced by in-process fakes:
//! the resolver answers from a map and the builder writes truffle-style
//! artifacts (or fails) like the real tool would.

use async_trait::async_trait;
use solhmr::{
    BuildFailure, BuildRunner, DeploymentLedger, DeploymentRecord, OutboundMessage, PassStatus,
    Pipeline, ProjectLayout, RemoteSource, ResolverError, SourceResolver, SubscriberSlot,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[derive(Default)]
struct FakeResolver {
    sources: HashMap<(String, String), RemoteSource>,
    calls: AtomicUsize,
}

impl FakeResolver {
    fn with(mut self, address: &str, network_id: &str, source: RemoteSource) -> Self {
        self.sources
            .insert((address.to_string(), network_id.to_string()), source);
        self
    }
}

#[async_trait]
impl SourceResolver for FakeResolver {
    async fn resolve(
        &self,
        address: &str,
        network_id: &str,
    ) -> Result<RemoteSource, ResolverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sources
            .get(&(address.to_string(), network_id.to_string()))
            .cloned()
            .ok_or_else(|| ResolverError::Api {
                address: address.to_string(),
                network_id: network_id.to_string(),
                message: "Contract source code not verified".to_string(),
            })
    }
}

struct FakeBuilder {
    build_dir: PathBuf,
    deployments: Vec<(String, String)>,
    failure: Option<String>,
    runs: AtomicUsize,
}

impl FakeBuilder {
    fn deploying(build_dir: &Path, deployments: &[(&str, &str)]) -> Self {
        Self {
            build_dir: build_dir.to_path_buf(),
            deployments: deployments
                .iter()
                .map(|(name, address)| (name.to_string(), address.to_string()))
                .collect(),
            failure: None,
            runs: AtomicUsize::new(0),
        }
    }

    fn failing(build_dir: &Path, error: &str) -> Self {
        Self {
            failure: Some(error.to_string()),
            ..Self::deploying(build_dir, &[])
        }
    }
}

#[async_trait]
impl BuildRunner for FakeBuilder {
    async fn run(&self, _project_dir: &Path) -> Result<(), BuildFailure> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        if let Some(ref error) = self.failure {
            return Err(BuildFailure::new(error.clone()));
        }

        std::fs::create_dir_all(&self.build_dir).unwrap();
        for (name, address) in &self.deployments {
            let artifact = serde_json::json!({
                "contractName": name,
                "abi": [],
                "bytecode": "0x6080",
                "deployedBytecode": "0x6080",
                "networks": {"1337": {"address": address}}
            });
            std::fs::write(
                self.build_dir.join(format!("{}.json", name)),
                artifact.to_string(),
            )
            .unwrap();
        }
        Ok(())
    }
}

struct Project {
    _temp: TempDir,
    layout: ProjectLayout,
}

impl Project {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_path_buf();
        std::fs::create_dir_all(root.join("contracts")).unwrap();

        let layout = ProjectLayout {
            project_dir: root.clone(),
            contracts_dir: root.join("contracts"),
            build_dir: root.join("build").join("contracts"),
            ledger_path: root.join("deployments.json"),
            local_network_id: "1337".to_string(),
        };
        Self {
            _temp: temp,
            layout,
        }
    }

    fn write_ledger(&self, json: serde_json::Value) {
        std::fs::write(&self.layout.ledger_path, json.to_string()).unwrap();
    }

    fn ledger_bytes(&self) -> Vec<u8> {
        std::fs::read(&self.layout.ledger_path).unwrap()
    }

    async fn ledger(&self) -> DeploymentLedger {
        DeploymentLedger::load(&self.layout.ledger_path).await.unwrap()
    }

    fn pipeline(
        &self,
        resolver: Arc<FakeResolver>,
        builder: Arc<FakeBuilder>,
        slot: Arc<SubscriberSlot>,
    ) -> Pipeline {
        Pipeline::new(self.layout.clone(), resolver, builder, slot)
    }
}

fn bar_source() -> RemoteSource {
    RemoteSource {
        name: "Bar".to_string(),
        source: "contract Bar {}".to_string(),
        bytecode: "6001".to_string(),
    }
}

#[tokio::test]
async fn test_local_redeploy_updates_address_and_pushes_new_version() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Foo": {"networkID": "1337", "address": "0xabc", "code": ""}
    }));

    let slot = Arc::new(SubscriberSlot::new());
    let (_id, mut rx) = slot.attach();
    let builder = Arc::new(FakeBuilder::deploying(
        &project.layout.build_dir,
        &[("Foo", "0xdef")],
    ));
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    let message = pipeline.run_pass().await.unwrap();

    let ledger = project.ledger().await;
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger.get("Foo"), Some(&DeploymentRecord::new("1337", "0xdef")));

    assert_eq!(message.kind(), "new-version");
    let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(sent["type"], "new-version");
    assert_eq!(sent["contracts"][0]["contractName"], "Foo");
    assert_eq!(sent["contracts"][0]["networks"]["1337"]["address"], "0xdef");

    assert!(pipeline.status().is_success());
}

#[tokio::test]
async fn test_remote_entry_is_resolved_before_build() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""}
    }));

    let resolver = Arc::new(FakeResolver::default().with("0x111", "4", bar_source()));
    let builder = Arc::new(FakeBuilder::deploying(&project.layout.build_dir, &[]));
    let pipeline = project.pipeline(
        Arc::clone(&resolver),
        Arc::clone(&builder),
        Arc::new(SubscriberSlot::new()),
    );

    pipeline.run_pass().await.unwrap();

    let source = std::fs::read_to_string(project.layout.contracts_dir.join("Bar.sol")).unwrap();
    assert_eq!(source, "contract Bar {}");

    let ledger = project.ledger().await;
    let bar = ledger.get("Bar").unwrap();
    assert_eq!(bar.code, "0x6001");
    assert_eq!(bar.network_id, "4");
    assert_eq!(bar.address, "0x111");

    assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    assert_eq!(builder.runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_build_failure_pushes_compile_failed_and_keeps_ledger() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Foo": {"networkID": "1337", "address": "0xabc", "code": ""}
    }));

    let slot = Arc::new(SubscriberSlot::new());
    let (_id, mut rx) = slot.attach();
    let builder = Arc::new(FakeBuilder::failing(&project.layout.build_dir, "syntax error"));
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    let original = project.ledger_bytes();

    let message = pipeline.run_pass().await.unwrap();

    assert_eq!(message, OutboundMessage::compile_failed("syntax error"));
    let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(
        sent,
        serde_json::json!({"type": "compile-failed", "error": "syntax error"})
    );

    assert_eq!(project.ledger_bytes(), original);
    assert_eq!(pipeline.status().error(), Some("syntax error"));
}

#[tokio::test]
async fn test_build_failure_without_ledger_creates_no_file() {
    let project = Project::new();
    let builder = Arc::new(FakeBuilder::failing(&project.layout.build_dir, "syntax error"));
    let slot = Arc::new(SubscriberSlot::new());
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    let message = pipeline.run_pass().await.unwrap();

    assert_eq!(message.kind(), "compile-failed");
    assert!(!project.layout.ledger_path.exists());
}

#[tokio::test]
async fn test_ledger_save_failure_fails_the_pass() {
    let project = Project::new();
    // The temp sibling used for the atomic save cannot be created.
    std::fs::create_dir_all(project.layout.project_dir.join("deployments.json.tmp")).unwrap();

    let slot = Arc::new(SubscriberSlot::new());
    let (_id, mut rx) = slot.attach();
    let builder = Arc::new(FakeBuilder::deploying(
        &project.layout.build_dir,
        &[("Foo", "0xdef")],
    ));
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    assert!(pipeline.run_pass().await.is_err());

    let status = pipeline.status();
    assert!(!status.is_success());
    assert!(status.error().unwrap().contains("deployment ledger"));

    let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(sent["type"], "compile-failed");
    assert!(!project.layout.ledger_path.exists());
}

#[tokio::test]
async fn test_resolver_failure_aborts_without_mutation_or_build() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""},
        "Baz": {"networkID": "5", "address": "0x222", "code": ""}
    }));
    let original = project.ledger_bytes();

    // Bar resolves, Baz does not: nothing may be written for either.
    let resolver = Arc::new(FakeResolver::default().with("0x111", "4", bar_source()));
    let builder = Arc::new(FakeBuilder::deploying(&project.layout.build_dir, &[]));
    let slot = Arc::new(SubscriberSlot::new());
    let (_id, mut rx) = slot.attach();
    let pipeline = project.pipeline(resolver, Arc::clone(&builder), slot);

    let message = pipeline.run_pass().await.unwrap();

    assert_eq!(message.kind(), "compile-failed");
    let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(sent["type"], "compile-failed");
    assert!(sent["error"].as_str().unwrap().contains("0x222"));

    assert_eq!(project.ledger_bytes(), original);
    assert!(!project.layout.contracts_dir.join("Bar.sol").exists());
    assert_eq!(builder.runs.load(Ordering::SeqCst), 0);
    assert!(matches!(pipeline.status(), PassStatus::Failed { .. }));
}

#[tokio::test]
async fn test_reconciliation_is_idempotent() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""},
        "Foo": {"networkID": "1337", "address": "0xabc", "code": ""}
    }));

    let resolver = Arc::new(FakeResolver::default().with("0x111", "4", bar_source()));
    let reconciler = solhmr::Reconciler::new(
        &project.layout.contracts_dir,
        &project.layout.ledger_path,
        "1337",
    );

    let first = reconciler
        .reconcile(project.ledger().await, resolver.as_ref())
        .await
        .unwrap();
    let first_bytes = project.ledger_bytes();

    let second = reconciler
        .reconcile(project.ledger().await, resolver.as_ref())
        .await
        .unwrap();
    let second_bytes = project.ledger_bytes();

    assert_eq!(first, second);
    assert_eq!(first_bytes, second_bytes);

    // Local entries are never touched by the resolver step.
    assert_eq!(
        second.get("Foo"),
        Some(&DeploymentRecord::new("1337", "0xabc"))
    );
    assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_pass_without_client_still_persists() {
    let project = Project::new();
    let builder = Arc::new(FakeBuilder::deploying(
        &project.layout.build_dir,
        &[("Foo", "0xdef"), ("Token", "0x777")],
    ));
    let slot = Arc::new(SubscriberSlot::new());
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    let message = pipeline.run_pass().await.unwrap();
    assert_eq!(message.kind(), "new-version");

    let ledger = project.ledger().await;
    assert_eq!(ledger.get("Foo").unwrap().address, "0xdef");
    assert_eq!(ledger.get("Token").unwrap().address, "0x777");
    assert!(ledger.get("Foo").unwrap().code.is_empty());
    assert!(ledger.get("Token").unwrap().code.is_empty());
}

#[tokio::test]
async fn test_remote_contract_redeployed_locally_becomes_local() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""}
    }));

    let resolver = Arc::new(FakeResolver::default().with("0x111", "4", bar_source()));
    let builder = Arc::new(FakeBuilder::deploying(
        &project.layout.build_dir,
        &[("Bar", "0xb4r")],
    ));
    let pipeline = project.pipeline(resolver, builder, Arc::new(SubscriberSlot::new()));

    pipeline.run_pass().await.unwrap();

    let ledger = project.ledger().await;
    assert_eq!(ledger.get("Bar"), Some(&DeploymentRecord::new("1337", "0xb4r")));
}

#[tokio::test]
async fn test_unchanged_source_file_is_not_rewritten() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""}
    }));
    let path = project.layout.contracts_dir.join("Bar.sol");
    std::fs::write(&path, "contract Bar {}").unwrap();
    let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));

    let resolver = Arc::new(FakeResolver::default().with("0x111", "4", bar_source()));
    let reconciler = solhmr::Reconciler::new(
        &project.layout.contracts_dir,
        &project.layout.ledger_path,
        "1337",
    );
    reconciler
        .reconcile(project.ledger().await, resolver.as_ref())
        .await
        .unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);
}

#[tokio::test]
async fn test_interrupted_source_write_is_completed_next_pass() {
    let project = Project::new();
    project.write_ledger(serde_json::json!({
        "Bar": {"networkID": "4", "address": "0x111", "code": ""},
        "Baz": {"networkID": "5", "address": "0x222", "code": ""}
    }));
    let original = project.ledger_bytes();

    let baz = RemoteSource {
        name: "Baz".to_string(),
        source: "contract Baz {}".to_string(),
        bytecode: "6002".to_string(),
    };
    let resolver = Arc::new(
        FakeResolver::default()
            .with("0x111", "4", bar_source())
            .with("0x222", "5", baz),
    );
    let reconciler = solhmr::Reconciler::new(
        &project.layout.contracts_dir,
        &project.layout.ledger_path,
        "1337",
    );

    // A directory in the way makes the second source write fail.
    let blocked = project.layout.contracts_dir.join("Baz.sol");
    std::fs::create_dir(&blocked).unwrap();

    let result = reconciler
        .reconcile(project.ledger().await, resolver.as_ref())
        .await;
    assert!(result.is_err());
    assert!(project.layout.contracts_dir.join("Bar.sol").exists());
    assert_eq!(project.ledger_bytes(), original);

    std::fs::remove_dir(&blocked).unwrap();
    let ledger = reconciler
        .reconcile(project.ledger().await, resolver.as_ref())
        .await
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(&blocked).unwrap(),
        "contract Baz {}"
    );
    assert_eq!(ledger.get("Bar").unwrap().code, "0x6001");
    assert_eq!(ledger.get("Baz").unwrap().code, "0x6002");
    assert_eq!(project.ledger().await, ledger);
}

#[tokio::test]
async fn test_watcher_fault_is_reported() {
    let project = Project::new();
    let slot = Arc::new(SubscriberSlot::new());
    let (_id, mut rx) = slot.attach();
    let builder = Arc::new(FakeBuilder::deploying(&project.layout.build_dir, &[]));
    let pipeline = project.pipeline(Arc::new(FakeResolver::default()), builder, slot);

    let message = pipeline.report_watcher_fault("inotify queue overflow").unwrap();

    assert_eq!(message, OutboundMessage::server_error("inotify queue overflow"));
    let sent: serde_json::Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(
        sent,
        serde_json::json!({"type": "server-error", "error": "inotify queue overflow"})
    );
}

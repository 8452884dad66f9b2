//! External build tool invocation.
//!
//! The build tool is a black box: it runs in the project directory with no
//! stdin, and the only facts taken from it are whether it exited cleanly and,
//! if not, the diagnostic text it printed.

use crate::artifacts::BuiltContract;
use crate::error::BuildFailure;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Default time a build may run before it is killed.
pub const DEFAULT_BUILD_TIMEOUT_SECS: u64 = 300;

/// What a build produced.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    /// Contracts deployed on the local network by this build
    Success { contracts: Vec<BuiltContract> },
    Failure { error: String },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success { .. })
    }
}

/// Compiles and deploys the project.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    async fn run(&self, project_dir: &Path) -> Result<(), BuildFailure>;
}

/// Runs a build command as a child process.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl BuildCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: Duration::from_secs(DEFAULT_BUILD_TIMEOUT_SECS),
        }
    }

    /// `truffle migrate --reset`
    pub fn truffle() -> Self {
        Self::new("truffle", vec!["migrate".to_string(), "--reset".to_string()])
    }

    /// Build from a full command line such as `["truffle", "migrate", "--reset"]`.
    ///
    /// Returns `None` for an empty command line.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Human readable command line, for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl BuildRunner for BuildCommand {
    async fn run(&self, project_dir: &Path) -> Result<(), BuildFailure> {
        tracing::info!("running `{}` in {}", self.display(), project_dir.display());

        let child = Command::new(&self.program)
            .args(&self.args)
            .current_dir(project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                BuildFailure::new(format!("failed to launch {}: {}", self.program, e))
            })?;

        // Dropping the child future on timeout kills the process.
        let output = timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                BuildFailure::new(format!(
                    "{} timed out after {}s",
                    self.program,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                BuildFailure::new(format!("failed to wait for {}: {}", self.program, e))
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let message = [stderr.trim(), stdout.trim()]
            .into_iter()
            .find(|text| !text.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                let code = output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string());
                format!("{} exited with status {}", self.program, code)
            });

        Err(BuildFailure::new(message))
    }
}

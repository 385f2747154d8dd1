//! Scan orchestration.
//!
//! Fans out one process per tool, waits for every one of them to finish,
//! then extracts and merges entities from their output.

use crate::analysis::{merge, EntityExtractor};
use crate::config::Config;
use crate::error::ScanError;
use crate::models::{Domain, ExtractedEntities, ScanOutcome, ToolInvocationResult};
use crate::scanner::runner::ProcessRunner;
use crate::scanner::tools::{default_tools, ToolDescriptor};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, info_span, warn, Instrument};

/// Runs scans against a fixed set of tools.
///
/// Cloning is cheap and clones share the same admission limit.
#[derive(Debug, Clone)]
pub struct ScanOrchestrator {
    tools: Arc<Vec<ToolDescriptor>>,
    runner: ProcessRunner,
    permits: Arc<Semaphore>,
}

impl ScanOrchestrator {
    /// Create an orchestrator allowing at most `max_concurrent_scans` scans
    /// in flight. Further scans wait for a slot.
    pub fn new(tools: Vec<ToolDescriptor>, runner: ProcessRunner, max_concurrent_scans: usize) -> Self {
        Self {
            tools: Arc::new(tools),
            runner,
            permits: Arc::new(Semaphore::new(max_concurrent_scans.max(1))),
        }
    }

    /// Build the default theHarvester + amass orchestrator from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            default_tools(&config.tools),
            ProcessRunner::new(Duration::from_secs(config.scanner.timeout_seconds)),
            config.scanner.max_concurrent_scans,
        )
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Stop admitting scans. Waiting and future calls fail with `Unavailable`.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Run every tool against `domain` and merge what they found.
    ///
    /// Tool failures of any kind degrade to empty entity sets for that tool.
    /// Raw results are returned in tool order, regardless of which process
    /// finished first.
    pub async fn run_scan(&self, domain: &Domain) -> Result<ScanOutcome, ScanError> {
        let extractor = EntityExtractor::for_domain(domain)?;

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| ScanError::Unavailable)?;

        info!("Running {} tools against {}", self.tools.len(), domain);

        let raw: Vec<ToolInvocationResult> =
            join_all(self.tools.iter().map(|tool| self.invoke(tool, domain))).await;

        let entities: Vec<ExtractedEntities> = raw
            .iter()
            .map(|result| extractor.extract(&result.stdout))
            .collect();
        for (result, found) in raw.iter().zip(&entities) {
            if found.is_empty() {
                debug!(tool = %result.tool, outcome = %result.outcome, "No entities in output");
            }
        }
        let artifact = merge(&entities);

        let failed = raw.iter().filter(|r| !r.succeeded()).count();
        info!(
            subdomains = artifact.subdomains.len(),
            emails = artifact.emails.len(),
            failed_tools = failed,
            "Scan of {} finished",
            domain
        );

        Ok(ScanOutcome { artifact, raw })
    }

    /// Run one tool, turning a launch failure into a placeholder result.
    async fn invoke(&self, tool: &ToolDescriptor, domain: &Domain) -> ToolInvocationResult {
        let args = tool.arguments(domain);
        let span = info_span!("tool", name = %tool.name);

        match self
            .runner
            .run(&tool.name, &tool.executable, &args)
            .instrument(span)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = %tool.name, "{}", e);
                ToolInvocationResult::launch_failure(&tool.name, e.to_string())
            }
        }
    }
}

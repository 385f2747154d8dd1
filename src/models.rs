//! Data models for the scan pipeline.
//!
//! This module contains the core data structures passed between the
//! scanner, the extractor, storage and the HTTP layer.

use crate::error::ScanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A validated, lowercase domain name to scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// Normalize and validate user input.
    ///
    /// The input is trimmed and lowercased. It must be non-empty and contain
    /// at least one `.`. Inner whitespace and a leading `-` are rejected so
    /// the value can never be mistaken for a tool flag.
    pub fn parse(input: &str) -> Result<Self, ScanError> {
        let domain = input.trim().to_lowercase();

        if domain.is_empty() || !domain.contains('.') {
            return Err(ScanError::InvalidInput(input.trim().to_string()));
        }

        if domain.starts_with('-') || domain.chars().any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(ScanError::InvalidInput(input.trim().to_string()));
        }

        Ok(Self(domain))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Domain {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

/// How a tool invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// The process ran to completion (any exit code).
    Exited,
    /// The executable could not be started.
    LaunchFailure,
    /// The process was killed after exceeding the timeout.
    Timeout,
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Exited => write!(f, "exited"),
            InvocationOutcome::LaunchFailure => write!(f, "launch failure"),
            InvocationOutcome::Timeout => write!(f, "timeout"),
        }
    }
}

/// Raw output of one external tool run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationResult {
    /// Tool name, e.g. `theHarvester`.
    pub tool: String,
    /// Standard output, lossily decoded as UTF-8.
    pub stdout: String,
    /// Standard error, or the launch/timeout message.
    pub stderr: String,
    /// Process exit code. `None` when the process never exited on its own.
    pub returncode: Option<i32>,
    pub outcome: InvocationOutcome,
    /// Wall-clock time spent on the invocation.
    #[serde(default)]
    pub duration_ms: u64,
}

impl ToolInvocationResult {
    /// Placeholder result for a tool whose executable could not be started.
    pub fn launch_failure(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            stdout: String::new(),
            stderr: message.into(),
            returncode: None,
            outcome: InvocationOutcome::LaunchFailure,
            duration_ms: 0,
        }
    }

    /// True when the process exited with status 0.
    pub fn succeeded(&self) -> bool {
        self.outcome == InvocationOutcome::Exited && self.returncode == Some(0)
    }
}

/// Entities pulled out of a single tool's output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedEntities {
    pub subdomains: BTreeSet<String>,
    pub emails: BTreeSet<String>,
}

impl ExtractedEntities {
    pub fn is_empty(&self) -> bool {
        self.subdomains.is_empty() && self.emails.is_empty()
    }
}

/// Merged, sorted and deduplicated entities for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanArtifact {
    pub subdomains: Vec<String>,
    pub emails: Vec<String>,
}

/// Entity counts reported alongside an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub subdomain_count: usize,
    pub email_count: usize,
}

impl ScanSummary {
    pub fn from_artifact(artifact: &ScanArtifact) -> Self {
        Self {
            subdomain_count: artifact.subdomains.len(),
            email_count: artifact.emails.len(),
        }
    }
}

/// What the orchestrator hands back for one scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub artifact: ScanArtifact,
    /// Per-tool results in invocation order.
    pub raw: Vec<ToolInvocationResult>,
}

/// A scan ready to be persisted (no id yet).
#[derive(Debug, Clone)]
pub struct NewScan {
    pub domain: Domain,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: ScanOutcome,
}

/// A persisted scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: u64,
    pub domain: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub summary: ScanSummary,
    pub artifacts: ScanArtifact,
    pub raw: Vec<ToolInvocationResult>,
}

impl ScanRecord {
    /// Build a record from a finished scan and an allocated id.
    pub fn new(id: u64, scan: NewScan) -> Self {
        Self {
            id,
            domain: scan.domain.to_string(),
            started_at: scan.started_at,
            finished_at: scan.finished_at,
            summary: ScanSummary::from_artifact(&scan.outcome.artifact),
            artifacts: scan.outcome.artifact,
            raw: scan.outcome.raw,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_normalization() {
        let domain = Domain::parse("  Example.COM \n").unwrap();
        assert_eq!(domain.as_str(), "example.com");
    }

    #[test]
    fn test_domain_rejects_bad_shapes() {
        assert!(Domain::parse("").is_err());
        assert!(Domain::parse("   ").is_err());
        assert!(Domain::parse("localhost").is_err());
        assert!(Domain::parse("-d.example.com").is_err());
        assert!(Domain::parse("example.com evil.org").is_err());
    }

    #[test]
    fn test_domain_deserialize_validates() {
        let ok: Result<Domain, _> = serde_json::from_str("\"API.Example.org\"");
        assert_eq!(ok.unwrap().as_str(), "api.example.org");

        let bad: Result<Domain, _> = serde_json::from_str("\"nodot\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_launch_failure_placeholder() {
        let result = ToolInvocationResult::launch_failure("amass", "No such file or directory");
        assert_eq!(result.outcome, InvocationOutcome::LaunchFailure);
        assert_eq!(result.returncode, None);
        assert!(result.stdout.is_empty());
        assert!(!result.succeeded());
    }

    #[test]
    fn test_record_summary_counts() {
        let scan = NewScan {
            domain: Domain::parse("example.com").unwrap(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome: ScanOutcome {
                artifact: ScanArtifact {
                    subdomains: vec!["a.example.com".into(), "b.example.com".into()],
                    emails: vec!["x@example.com".into()],
                },
                raw: Vec::new(),
            },
        };

        let record = ScanRecord::new(7, scan);
        assert_eq!(record.id, 7);
        assert_eq!(record.domain, "example.com");
        assert_eq!(record.summary.subdomain_count, 2);
        assert_eq!(record.summary.email_count, 1);
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&InvocationOutcome::LaunchFailure).unwrap();
        assert_eq!(json, "\"launch_failure\"");
    }
}

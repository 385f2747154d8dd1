//! Descriptors for the external reconnaissance tools.

use crate::config::ToolsConfig;
use crate::models::Domain;

/// Placeholder replaced by the target domain in argument templates.
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Sources passed to theHarvester.
pub const HARVESTER_SOURCES: &str = "crtsh,anubis";

/// One external tool: its name, executable and argument template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub executable: String,
    /// Arguments, each passed as a discrete argv entry.
    pub args: Vec<String>,
}

impl ToolDescriptor {
    pub fn new(name: &str, executable: &str, args: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            executable: executable.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// theHarvester: `-d <domain> -b crtsh,anubis`.
    pub fn harvester(executable: &str) -> Self {
        Self::new(
            "theHarvester",
            executable,
            &["-d", DOMAIN_PLACEHOLDER, "-b", HARVESTER_SOURCES],
        )
    }

    /// amass: `enum -passive -d <domain>`.
    pub fn amass(executable: &str) -> Self {
        Self::new(
            "amass",
            executable,
            &["enum", "-passive", "-d", DOMAIN_PLACEHOLDER],
        )
    }

    /// Argument list with the domain substituted.
    pub fn arguments(&self, domain: &Domain) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(DOMAIN_PLACEHOLDER, domain.as_str()))
            .collect()
    }
}

/// The fixed tool set, in invocation order.
pub fn default_tools(config: &ToolsConfig) -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::harvester(&config.harvester),
        ToolDescriptor::amass(&config.amass),
    ]
}

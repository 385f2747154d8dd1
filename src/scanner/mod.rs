//! External tool execution and scan orchestration.

pub mod orchestrator;
pub mod runner;
pub mod tools;

pub use orchestrator::ScanOrchestrator;
pub use runner::ProcessRunner;

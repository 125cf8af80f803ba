//! PPG Core - Backend logic for Phylo Pipeline GUI
//!
//! This crate contains all business logic with zero UI dependencies:
//! dataset assembly from the sequence databases, the multi-stage
//! pipeline orchestrator, and the job backend client. It can be used
//! by the GUI application or a headless tool.

pub mod backend;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod models;
pub mod orchestrator;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}

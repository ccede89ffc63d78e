// src/core/mod.rs

/// Data structures shared by every probe: the validated `ScanTarget`, one
/// finding type per probe and the aggregated `ScanReport`.
pub mod models;

/// The probes and the orchestrator that runs them concurrently.
pub mod scanner;

/// Health score computation.
pub mod scoring;

/// Remediation advice for breach findings.
pub mod knowledge_base;

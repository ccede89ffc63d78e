// src/lib.rs

//! Website health scanner: certificate, availability, security headers, DNS
//! and page-content checks, reduced to a single 0..=100 health score.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;

pub use crate::config::ScannerConfig;
pub use crate::core::models::{
    AvailabilityFinding, BreachFinding, BreachKind, BreachSeverity, CheckResult, DnsFinding, DomainFinding, Grade,
    HeaderCheck, Importance, PerformanceRating, ScanReport, ScanTarget, SecurityHeaderFinding, SiteStatus, TlsFinding,
    TlsStatus,
};
pub use crate::core::scanner::breach_scanner::{BreachRules, MalwarePattern};
pub use crate::core::scanner::{run_full_scan, Scanner};
pub use crate::core::scoring::{average_health_score, score_health};
pub use crate::error::{ConfigError, ScanError};

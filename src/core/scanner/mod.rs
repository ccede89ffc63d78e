// src/core/scanner/mod.rs

// This file acts as the public interface for the `scanner` module.
// It declares every probe module and the orchestrator that runs them together.
pub mod availability_scanner;
pub mod breach_scanner;
pub mod dns_scanner;
pub mod domain_scanner;
pub mod headers_scanner;
pub mod ssl_scanner;

use crate::config::ScannerConfig;
use crate::core::models::{CheckResult, ScanReport, ScanTarget};
use crate::core::scoring::score_health;
use crate::error::ScanError;
use self::availability_scanner::run_availability_scan;
use self::breach_scanner::{run_breach_scan, BreachRules};
use self::dns_scanner::run_dns_scan;
use self::domain_scanner::run_domain_scan;
use self::headers_scanner::run_headers_scan;
use self::ssl_scanner::run_ssl_scan;
use chrono::Utc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runs every probe against a target and assembles the report.
///
/// A `Scanner` holds no per-scan state and can be shared; scans of different
/// sites may run at the same time.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: Arc<ScannerConfig>,
    rules: Arc<BreachRules>,
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config: Arc::new(config),
            rules: Arc::new(BreachRules::default()),
        }
    }

    /// Replaces the breach rule tables used by the content probe.
    pub fn with_rules(mut self, rules: BreachRules) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn rules(&self) -> &BreachRules {
        &self.rules
    }

    /// Validates `url` and scans it.
    ///
    /// An invalid URL is the only error; once the probes are launched the call
    /// always returns a complete report.
    pub async fn scan(&self, url: &str) -> Result<ScanReport, ScanError> {
        let target = ScanTarget::parse(url)?;
        Ok(self.scan_target(target).await)
    }

    /// Executes all probes in parallel and aggregates the results into a single report.
    ///
    /// Each probe runs as its own task. The join waits for every task to
    /// settle; a task that panics becomes a `"<category> check failed: ..."`
    /// marker for its slot and never affects its siblings.
    pub async fn scan_target(&self, target: ScanTarget) -> ScanReport {
        info!(target = %target.as_str(), "Starting complete scan.");

        let tls_task = {
            let target = target.clone();
            let timeout = self.config.tls_timeout();
            tokio::spawn(async move { run_ssl_scan(&target, timeout).await })
        };
        let availability_task = {
            let (target, config) = (target.clone(), Arc::clone(&self.config));
            tokio::spawn(async move { run_availability_scan(&target, &config).await })
        };
        let headers_task = {
            let (target, config) = (target.clone(), Arc::clone(&self.config));
            tokio::spawn(async move { run_headers_scan(&target, &config).await })
        };
        let dns_task = {
            let target = target.clone();
            tokio::spawn(async move { run_dns_scan(&target).await })
        };
        let domain_task = {
            let target = target.clone();
            tokio::spawn(async move { run_domain_scan(&target).await })
        };
        let breach_task = {
            let (target, config, rules) = (target.clone(), Arc::clone(&self.config), Arc::clone(&self.rules));
            tokio::spawn(async move { run_breach_scan(&target, &config, &rules).await })
        };

        let (tls, availability, security_headers, dns, domain, breaches) = tokio::join!(
            settle("SSL", tls_task),
            settle("Status", availability_task),
            settle("Security", headers_task),
            settle("DNS", dns_task),
            settle("Domain", domain_task),
            settle("Breach", breach_task),
        );

        let health_score = score_health(
            tls.as_ref().ok(),
            availability.as_ref().ok(),
            security_headers.as_ref().ok(),
        );

        info!(target = %target.as_str(), health_score, "Scan complete.");
        ScanReport {
            target,
            scanned_at: Utc::now(),
            tls,
            availability,
            security_headers,
            dns,
            domain,
            breaches,
            health_score,
        }
    }
}

/// Scans `url` with the default configuration and rule tables.
pub async fn run_full_scan(url: &str) -> Result<ScanReport, ScanError> {
    Scanner::default().scan(url).await
}

/// Waits for one probe task and turns a crashed task into a failure marker.
async fn settle<T>(category: &'static str, handle: JoinHandle<T>) -> CheckResult<T> {
    handle.await.map_err(|e| {
        error!(category, error = %e, "Probe task failed.");
        format!("{} check failed: {}", category, e)
    })
}

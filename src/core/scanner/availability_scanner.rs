// src/core/scanner/availability_scanner.rs

use tracing::{debug, error, info, warn};

use crate::config::ScannerConfig;
use crate::core::models::{AvailabilityFinding, PerformanceRating, ScanTarget};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use reqwest::redirect::Policy;
use std::time::Instant;

/// Latency above which a response counts as slow.
pub const SLOW_RESPONSE_MILLIS: u64 = 5_000;

/// Fetches the target once and reports reachability, status tier, latency and page size.
///
/// Non-2xx statuses are inspected rather than treated as errors; only a
/// transport failure (refused, DNS, timeout, too many redirects) marks the
/// site as offline.
pub async fn run_availability_scan(target: &ScanTarget, config: &ScannerConfig) -> AvailabilityFinding {
    info!(target = %target.as_str(), "Starting availability scan.");

    let client = match reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.availability_timeout())
        .redirect(Policy::limited(config.max_redirects))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for availability scan.");
            return AvailabilityFinding::offline(&describe_error(&e), 0);
        }
    };

    let started = Instant::now();
    let response = match client.get(target.url().clone()).send().await {
        Ok(res) => res,
        Err(e) => {
            let latency = elapsed_millis(started);
            warn!(error = %e, latency, "Target unreachable.");
            return AvailabilityFinding::offline(&describe_error(&e), latency);
        }
    };

    let status = response.status();
    let headers = response.headers().clone();
    debug!(status = %status, "Received HTTP response, reading body.");

    let body_len = match response.bytes().await {
        Ok(body) => body.len() as u64,
        Err(e) => {
            let latency = elapsed_millis(started);
            warn!(error = %e, latency, "Failed to read response body.");
            return AvailabilityFinding::offline(&describe_error(&e), latency);
        }
    };
    let latency = elapsed_millis(started);

    let size_bytes = header_str(&headers, CONTENT_LENGTH.as_str())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(body_len);

    let finding = AvailabilityFinding {
        reachable: is_reachable(status.as_u16()),
        status_code: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        latency_millis: latency,
        issues: classify_issues(status.as_u16(), latency),
        size_kb: bytes_to_kb(size_bytes),
        performance_rating: PerformanceRating::from_latency(latency),
        server: header_str(&headers, SERVER.as_str()).map(str::to_string),
        powered_by: header_str(&headers, "x-powered-by").map(str::to_string),
        content_type: header_str(&headers, CONTENT_TYPE.as_str()).map(str::to_string),
    };

    info!(
        status = finding.status_code,
        latency,
        rating = %finding.performance_rating,
        issues = finding.issues.len(),
        "Availability scan finished."
    );
    finding
}

pub fn is_reachable(status_code: u16) -> bool {
    (100..=399).contains(&status_code)
}

/// Issues for a completed response. Only the final status is judged, so a
/// redirect chain that ends in 2xx yields no redirect issue.
pub fn classify_issues(status_code: u16, latency_millis: u64) -> Vec<String> {
    let mut issues = Vec::new();
    match status_code {
        500.. => issues.push(format!("Server error ({})", status_code)),
        400..=499 => issues.push(format!("Client error ({})", status_code)),
        300..=399 => issues.push("Multiple redirects detected".to_string()),
        _ => {}
    }
    if latency_millis > SLOW_RESPONSE_MILLIS {
        issues.push("Slow response time (>5 seconds)".to_string());
    }
    issues
}

/// Kilobytes rounded to the nearest integer, halves rounding up.
pub fn bytes_to_kb(bytes: u64) -> u64 {
    (bytes + 512) / 1024
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Flattens a reqwest error and its sources into one line, so the low-level cause
/// (e.g. "Connection refused") survives into the issue text.
pub(crate) fn describe_error(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

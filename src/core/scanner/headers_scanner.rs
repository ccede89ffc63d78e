// src/core/scanner/headers_scanner.rs

use tracing::{debug, error, info, warn};
use crate::config::ScannerConfig;
use crate::core::models::{Grade, HeaderCheck, Importance, ScanTarget, SecurityHeaderFinding};
use reqwest::header::HeaderMap;

/// Longest header value kept in a finding, in characters.
const MAX_VALUE_CHARS: usize = 100;

/// One entry of the security-header checklist.
pub struct HeaderRule {
    pub name: &'static str,
    pub importance: Importance,
    pub points: u32,
    pub description: &'static str,
}

/// The fixed checklist. Points add up to 100.
pub static HEADER_RULES: &[HeaderRule] = &[
    HeaderRule { name: "Strict-Transport-Security", importance: Importance::Critical, points: 20, description: "Forces HTTPS connections" },
    HeaderRule { name: "X-Frame-Options", importance: Importance::High, points: 15, description: "Prevents clickjacking attacks" },
    HeaderRule { name: "X-Content-Type-Options", importance: Importance::High, points: 15, description: "Prevents MIME sniffing" },
    HeaderRule { name: "X-XSS-Protection", importance: Importance::Medium, points: 10, description: "Basic XSS protection" },
    HeaderRule { name: "Content-Security-Policy", importance: Importance::Critical, points: 25, description: "Controls resource loading" },
    HeaderRule { name: "Referrer-Policy", importance: Importance::Medium, points: 10, description: "Controls referrer information" },
    HeaderRule { name: "Permissions-Policy", importance: Importance::Low, points: 5, description: "Controls browser features" },
];

/// Runs a scan for the security headers in the checklist.
///
/// Sends a GET to the target and grades whichever response comes back,
/// whatever its status. If the request itself fails the finding carries
/// score 0, grade `Unknown` and the error text.
pub async fn run_headers_scan(target: &ScanTarget, config: &ScannerConfig) -> SecurityHeaderFinding {
    info!(target = %target.as_str(), "Starting headers scan.");

    let client = match reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.headers_timeout())
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to build HTTP client for headers scan.");
            return SecurityHeaderFinding::failed(format!("Could not check security headers: {}", e));
        }
    };

    match client.get(target.url().clone()).send().await {
        Ok(response) => {
            info!(status = %response.status(), "Received HTTP response for headers scan.");
            let finding = evaluate_headers(response.headers());
            info!(score = finding.score_percent, grade = %finding.grade, "Headers scan finished.");
            finding
        }
        Err(e) => {
            warn!(url = %target.as_str(), error = %e, "HTTP request failed for headers scan.");
            SecurityHeaderFinding::failed(format!("Could not check security headers: {}", e))
        }
    }
}

/// Grades a response's headers against the checklist.
///
/// Lookup is case-insensitive. A header with an empty value counts as missing.
pub fn evaluate_headers(headers: &HeaderMap) -> SecurityHeaderFinding {
    let mut awarded = 0u32;
    let mut max = 0u32;
    let mut checks = Vec::with_capacity(HEADER_RULES.len());

    for rule in HEADER_RULES {
        max += rule.points;
        match header_value(headers, rule.name) {
            Some(value) => {
                debug!(header_name = rule.name, "Header found.");
                awarded += rule.points;
                checks.push(HeaderCheck {
                    name: rule.name.to_string(),
                    present: true,
                    importance: rule.importance,
                    description: rule.description.to_string(),
                    points_awarded: rule.points,
                    max_points: rule.points,
                    value: Some(value.chars().take(MAX_VALUE_CHARS).collect()),
                    recommendation: None,
                });
            }
            None => {
                debug!(header_name = rule.name, "Header not found.");
                checks.push(HeaderCheck {
                    name: rule.name.to_string(),
                    present: false,
                    importance: rule.importance,
                    description: rule.description.to_string(),
                    points_awarded: 0,
                    max_points: rule.points,
                    value: None,
                    recommendation: Some(format!("Add {} header for better security", rule.name)),
                });
            }
        }
    }

    let score_percent = percentage(awarded, max);
    SecurityHeaderFinding {
        score_percent,
        grade: Grade::from_score(score_percent),
        headers: checks,
        error: None,
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let value = headers.get(name)?;
    let text = match value.to_str() {
        Ok(s) => s.to_string(),
        Err(_) => {
            warn!(header_name = name, "Header found but contained invalid UTF-8.");
            String::from_utf8_lossy(value.as_bytes()).into_owned()
        }
    };
    (!text.trim().is_empty()).then_some(text)
}

fn percentage(awarded: u32, max: u32) -> u8 {
    if max == 0 {
        return 0;
    }
    let pct = (f64::from(awarded) * 100.0 / f64::from(max)).round();
    pct.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers_with(names: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for name in names {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_static("enabled"),
            );
        }
        map
    }

    #[test]
    fn checklist_totals_one_hundred() {
        assert_eq!(HEADER_RULES.iter().map(|r| r.points).sum::<u32>(), 100);
    }

    #[test]
    fn all_headers_present_scores_a() {
        let names: Vec<&str> = HEADER_RULES.iter().map(|r| r.name).collect();
        let finding = evaluate_headers(&headers_with(&names));
        assert_eq!(finding.score_percent, 100);
        assert_eq!(finding.grade, Grade::A);
        assert_eq!(finding.present_count(), 7);
        assert!(finding.headers.iter().all(|h| h.recommendation.is_none()));
    }

    #[test]
    fn no_headers_scores_f_with_recommendations() {
        let finding = evaluate_headers(&HeaderMap::new());
        assert_eq!(finding.score_percent, 0);
        assert_eq!(finding.grade, Grade::F);
        assert_eq!(finding.missing_count(), 7);
        assert_eq!(finding.missing_critical_count(), 2);
        assert_eq!(
            finding.headers[0].recommendation.as_deref(),
            Some("Add Strict-Transport-Security header for better security")
        );
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let finding = evaluate_headers(&headers_with(&["content-security-policy", "STRICT-TRANSPORT-SECURITY"]));
        assert_eq!(finding.score_percent, 45);
        assert_eq!(finding.grade, Grade::F);
    }

    #[test]
    fn points_sum_matches_score() {
        let finding = evaluate_headers(&headers_with(&["x-frame-options", "referrer-policy", "permissions-policy"]));
        let awarded: u32 = finding.headers.iter().map(|h| h.points_awarded).sum();
        let max: u32 = finding.headers.iter().map(|h| h.max_points).sum();
        assert_eq!(finding.score_percent as u32, awarded * 100 / max);
        assert_eq!(finding.score_percent, 30);
    }

    #[test]
    fn score_never_drops_as_headers_are_added() {
        let mut present: Vec<&str> = Vec::new();
        let mut last = evaluate_headers(&headers_with(&present)).score_percent;
        for rule in HEADER_RULES {
            present.push(rule.name);
            let score = evaluate_headers(&headers_with(&present)).score_percent;
            assert!(score >= last);
            last = score;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn long_values_are_truncated() {
        let mut map = HeaderMap::new();
        map.insert("content-security-policy", HeaderValue::from_str(&"a".repeat(250)).unwrap());
        let finding = evaluate_headers(&map);
        let csp = finding.headers.iter().find(|h| h.name == "Content-Security-Policy").unwrap();
        assert_eq!(csp.value.as_ref().map(String::len), Some(100));
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut map = HeaderMap::new();
        map.insert("x-frame-options", HeaderValue::from_static(""));
        let finding = evaluate_headers(&map);
        assert_eq!(finding.score_percent, 0);
    }

    #[test]
    fn grade_follows_bands() {
        // HSTS + CSP + XFO + XCTO + Referrer-Policy = 85
        let finding = evaluate_headers(&headers_with(&[
            "strict-transport-security",
            "content-security-policy",
            "x-frame-options",
            "x-content-type-options",
            "referrer-policy",
        ]));
        assert_eq!(finding.score_percent, 85);
        assert_eq!(finding.grade, Grade::B);
    }
}

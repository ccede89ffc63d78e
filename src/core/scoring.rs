//! Reduces the TLS, availability and security-header findings to one 0..=100 score.
//!
//! Exposed on its own so stored findings can be re-scored without a new scan.

use crate::core::models::{AvailabilityFinding, SecurityHeaderFinding, TlsFinding};

pub const TLS_PENALTY: i32 = 30;
pub const TLS_EXPIRING_PENALTY: i32 = 10;
pub const TLS_EXPIRING_DAYS: i64 = 30;
pub const AVAILABILITY_PENALTY: i32 = 30;
pub const HEADERS_MAX_PENALTY: f64 = 20.0;
pub const SLOW_LATENCY_MILLIS: u64 = 3_000;
pub const VERY_SLOW_LATENCY_MILLIS: u64 = 5_000;

/// Computes the health score.
///
/// A missing finding counts as the worst case for its term: no TLS data is an
/// invalid certificate, no availability data is an unreachable site (without
/// a performance penalty, there being no latency), no header data is a score
/// of 0. Slow responses are penalised twice, once under availability and
/// again under performance.
pub fn score_health(
    tls: Option<&TlsFinding>,
    availability: Option<&AvailabilityFinding>,
    security_headers: Option<&SecurityHeaderFinding>,
) -> u8 {
    let mut score: i32 = 100;

    match tls {
        Some(t) if t.valid => {
            if t.days_remaining < TLS_EXPIRING_DAYS {
                score -= TLS_EXPIRING_PENALTY;
            }
        }
        _ => score -= TLS_PENALTY,
    }

    match availability {
        Some(a) if a.reachable => {
            if a.latency_millis > SLOW_LATENCY_MILLIS {
                score -= 10;
            }
        }
        _ => score -= AVAILABILITY_PENALTY,
    }

    let header_score = security_headers.map(|h| h.score_percent.min(100)).unwrap_or(0);
    score -= (HEADERS_MAX_PENALTY * (1.0 - f64::from(header_score) / 100.0)).round() as i32;

    if let Some(a) = availability {
        if a.latency_millis > VERY_SLOW_LATENCY_MILLIS {
            score -= 20;
        } else if a.latency_millis > SLOW_LATENCY_MILLIS {
            score -= 10;
        }
    }

    score.clamp(0, 100) as u8
}

/// Rounded mean of several health scores, e.g. across every site an account
/// monitors. An empty set scores 100.
pub fn average_health_score(scores: &[u8]) -> u8 {
    if scores.is_empty() {
        return 100;
    }
    let total: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    (f64::from(total) / scores.len() as f64).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Grade, PerformanceRating};

    fn tls(valid: bool, days_remaining: i64) -> TlsFinding {
        TlsFinding {
            has_tls: true,
            valid,
            valid_for_domain: true,
            days_remaining,
            ..Default::default()
        }
    }

    fn up(latency_millis: u64) -> AvailabilityFinding {
        AvailabilityFinding {
            reachable: true,
            status_code: 200,
            status_text: "OK".to_string(),
            latency_millis,
            issues: Vec::new(),
            size_kb: 12,
            performance_rating: PerformanceRating::from_latency(latency_millis),
            server: None,
            powered_by: None,
            content_type: None,
        }
    }

    fn headers(score_percent: u8) -> SecurityHeaderFinding {
        SecurityHeaderFinding {
            score_percent,
            grade: Grade::from_score(score_percent),
            headers: Vec::new(),
            error: None,
        }
    }

    #[test]
    fn perfect_site_scores_100() {
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(500)), Some(&headers(100))), 100);
    }

    #[test]
    fn invalid_tls_costs_thirty() {
        assert_eq!(score_health(Some(&tls(false, -5)), Some(&up(500)), Some(&headers(100))), 70);
    }

    #[test]
    fn expiring_tls_costs_ten() {
        assert_eq!(score_health(Some(&tls(true, 29)), Some(&up(500)), Some(&headers(100))), 90);
        assert_eq!(score_health(Some(&tls(true, 30)), Some(&up(500)), Some(&headers(100))), 100);
    }

    #[test]
    fn slow_responses_are_penalised_twice() {
        // 3.5s: -10 availability, -10 performance
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(3_500)), Some(&headers(100))), 80);
        // 6s: -10 availability, -20 performance
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(6_000)), Some(&headers(100))), 70);
    }

    #[test]
    fn header_term_is_scaled_and_rounded() {
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(100)), Some(&headers(45))), 89);
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(100)), Some(&headers(0))), 80);
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(100)), None), 80);
    }

    #[test]
    fn failed_header_check_counts_as_zero() {
        let failed = SecurityHeaderFinding::failed("timeout");
        assert_eq!(score_health(Some(&tls(true, 200)), Some(&up(100)), Some(&failed)), 80);
    }

    #[test]
    fn unreachable_site_scores_at_most_seventy() {
        let down = AvailabilityFinding::offline("connection refused", 3);
        let score = score_health(Some(&tls(true, 200)), Some(&down), None);
        assert_eq!(score, 50);
        assert!(score <= 70);
    }

    #[test]
    fn everything_failing_clamps_to_zero() {
        let down = AvailabilityFinding::offline("timed out", 30_000);
        let no_tls = TlsFinding::unavailable("SSL check timeout");
        let failed = SecurityHeaderFinding::failed("timed out");
        assert_eq!(score_health(Some(&no_tls), Some(&down), Some(&failed)), 0);
        assert_eq!(score_health(None, None, None), 20);
    }

    #[test]
    fn score_stays_in_bounds_for_any_combination() {
        let tls_cases = [None, Some(tls(false, -400)), Some(tls(true, 1)), Some(tls(true, 365))];
        let avail_cases = [
            None,
            Some(AvailabilityFinding::offline("x", 0)),
            Some(AvailabilityFinding::offline("x", 60_000)),
            Some(up(0)),
            Some(up(3_001)),
            Some(up(u64::MAX)),
        ];
        let header_cases = [None, Some(headers(0)), Some(headers(50)), Some(headers(100)), Some(headers(255))];

        for t in &tls_cases {
            for a in &avail_cases {
                for h in &header_cases {
                    let score = score_health(t.as_ref(), a.as_ref(), h.as_ref());
                    assert!(score <= 100);
                }
            }
        }
    }

    #[test]
    fn average_rounds_and_defaults() {
        assert_eq!(average_health_score(&[]), 100);
        assert_eq!(average_health_score(&[100, 50]), 75);
        assert_eq!(average_health_score(&[80, 81]), 81);
        assert_eq!(average_health_score(&[0, 0, 1]), 0);
    }
}

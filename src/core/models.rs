// src/core/models.rs

use crate::core::knowledge_base::{self, Remediation};
use crate::error::ScanError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::Display;
use url::Url;

// --- Tipi di Risultato Riutilizzabili ---
// Reusable Result Types
// Outcome of one probe task: the finding, or a "<category> check failed: ..." marker
// when the task itself died before producing one.
pub type CheckResult<T> = Result<T, String>;

// --- Target ---

/// A validated absolute `http`/`https` URL with a non-empty host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScanTarget {
    url: Url,
}

impl ScanTarget {
    /// Parses and validates a raw URL string. This is the only place a scan can be rejected.
    pub fn parse(raw: &str) -> Result<Self, ScanError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ScanError::EmptyUrl);
        }

        let url = Url::parse(trimmed).map_err(|e| ScanError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ScanError::UnsupportedScheme { scheme: other.to_string() });
            }
        }

        match url.host_str() {
            Some(host) if !host.is_empty() => Ok(Self { url }),
            _ => Err(ScanError::MissingHost(trimmed.to_string())),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Host name as it appears in the URL (lower-cased by the URL parser for domains).
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn is_https(&self) -> bool {
        self.url.scheme() == "https"
    }
}

impl TryFrom<String> for ScanTarget {
    type Error = ScanError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ScanTarget::parse(&value)
    }
}

impl From<ScanTarget> for String {
    fn from(target: ScanTarget) -> Self {
        target.url.into()
    }
}

// --- Modelli Scanner SSL/TLS ---
// SSL/TLS Scanner Models

/// Outcome of inspecting the certificate presented on port 443.
///
/// When `has_tls` is false every other field keeps its default value and
/// `message` explains why no certificate could be inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsFinding {
    pub has_tls: bool,
    pub valid: bool,
    pub valid_for_domain: bool,
    pub days_remaining: i64,
    pub expiry_time: Option<DateTime<Utc>>,
    pub issuer_name: Option<String>,
    pub subject_cn: Option<String>,
    pub subject_alt_names: Vec<String>,
    pub warning: Option<String>,
    pub message: Option<String>,
}

impl TlsFinding {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }
}

// --- Modelli Disponibilità ---
// Availability Models

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum PerformanceRating {
    Excellent,
    Good,
    Fair,
    Poor,
    Offline,
}

impl PerformanceRating {
    /// Rating for a completed request, by total latency.
    pub fn from_latency(latency_millis: u64) -> Self {
        match latency_millis {
            0..1_000 => PerformanceRating::Excellent,
            1_000..3_000 => PerformanceRating::Good,
            3_000..5_000 => PerformanceRating::Fair,
            _ => PerformanceRating::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityFinding {
    pub reachable: bool,
    pub status_code: u16,
    pub status_text: String,
    pub latency_millis: u64,
    pub issues: Vec<String>,
    pub size_kb: u64,
    pub performance_rating: PerformanceRating,
    pub server: Option<String>,
    pub powered_by: Option<String>,
    pub content_type: Option<String>,
}

impl AvailabilityFinding {
    /// Finding for a target that could not be fetched at all.
    pub fn offline(reason: &str, latency_millis: u64) -> Self {
        Self {
            reachable: false,
            status_code: 0,
            status_text: reason.to_string(),
            latency_millis,
            issues: vec![format!("Site unreachable: {}", reason)],
            size_kb: 0,
            performance_rating: PerformanceRating::Offline,
            server: None,
            powered_by: None,
            content_type: None,
        }
    }
}

// --- Modelli Scanner Header HTTP ---
// HTTP Header Scanner Models

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Importance {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
    Unknown,
}

impl Grade {
    pub fn from_score(score_percent: u8) -> Self {
        match score_percent {
            90.. => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

/// Result for a single checklist header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCheck {
    pub name: String,
    pub present: bool,
    pub importance: Importance,
    pub description: String,
    pub points_awarded: u32,
    pub max_points: u32,
    pub value: Option<String>,
    pub recommendation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityHeaderFinding {
    pub score_percent: u8,
    pub grade: Grade,
    pub headers: Vec<HeaderCheck>,
    pub error: Option<String>,
}

impl SecurityHeaderFinding {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            score_percent: 0,
            grade: Grade::Unknown,
            headers: Vec::new(),
            error: Some(reason.into()),
        }
    }

    pub fn present_count(&self) -> usize {
        self.headers.iter().filter(|h| h.present).count()
    }

    pub fn missing_count(&self) -> usize {
        self.headers.iter().filter(|h| !h.present).count()
    }

    pub fn missing_critical_count(&self) -> usize {
        self.headers
            .iter()
            .filter(|h| !h.present && h.importance == Importance::Critical)
            .count()
    }
}

// --- Modelli Scanner DNS ---
// DNS Scanner Models

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsFinding {
    pub healthy: bool,
    pub addresses: BTreeSet<String>,
    pub has_txt: bool,
    pub load_balanced: bool,
    pub error: Option<String>,
}

impl DnsFinding {
    /// Builds a finding from the independently settled A and TXT lookups.
    /// Only the A lookup decides `healthy`.
    pub fn from_lookups(a_lookup: Result<Vec<String>, String>, txt_lookup: Result<usize, String>) -> Self {
        let has_txt = txt_lookup.is_ok();
        match a_lookup {
            Ok(addresses) => {
                let addresses: BTreeSet<String> = addresses.into_iter().collect();
                Self {
                    healthy: true,
                    load_balanced: addresses.len() > 1,
                    addresses,
                    has_txt,
                    error: None,
                }
            }
            Err(e) => Self {
                healthy: false,
                addresses: BTreeSet::new(),
                has_txt,
                load_balanced: false,
                error: Some(e),
            },
        }
    }
}

// --- Modelli Dominio ---
// Domain Models

/// Registration record for the target domain. Registry data is not queried;
/// the values are fixed placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainFinding {
    pub domain: String,
    pub status: String,
    pub expires_in_days: u32,
    pub registrar: String,
    pub needs_renewal: bool,
}

// --- Modelli Violazioni ---
// Breach Models

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum BreachKind {
    Malware,
    SpamInjection,
    Defacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum BreachSeverity {
    Critical,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachFinding {
    pub kind: BreachKind,
    pub severity: BreachSeverity,
    pub description: String,
    pub detected_at: DateTime<Utc>,
}

impl BreachFinding {
    /// Fix instructions for this kind of compromise.
    pub fn remediation(&self) -> &'static Remediation {
        knowledge_base::remediation_for(self.kind)
    }
}

// --- Report Principale ---
// Main Report

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum SiteStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum TlsStatus {
    Secure,
    Insecure,
    Unknown,
}

/// Health score below which a site is flagged as having issues.
pub const ISSUE_SCORE_THRESHOLD: u8 = 80;

/// Everything one scan produced. The caller owns it; nothing else keeps a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub target: ScanTarget,
    pub scanned_at: DateTime<Utc>,
    pub tls: CheckResult<TlsFinding>,
    pub availability: CheckResult<AvailabilityFinding>,
    pub security_headers: CheckResult<SecurityHeaderFinding>,
    pub dns: CheckResult<DnsFinding>,
    pub domain: CheckResult<DomainFinding>,
    pub breaches: CheckResult<Vec<BreachFinding>>,
    pub health_score: u8,
}

impl ScanReport {
    pub fn site_status(&self) -> SiteStatus {
        match &self.availability {
            Ok(a) if a.reachable => SiteStatus::Online,
            _ => SiteStatus::Offline,
        }
    }

    pub fn tls_status(&self) -> TlsStatus {
        match &self.tls {
            Ok(t) if t.valid => TlsStatus::Secure,
            Ok(_) => TlsStatus::Insecure,
            Err(_) => TlsStatus::Unknown,
        }
    }

    /// True when the site is offline, its certificate is not valid, or the score is below 80.
    pub fn has_issues(&self) -> bool {
        self.site_status() == SiteStatus::Offline
            || self.tls_status() != TlsStatus::Secure
            || self.health_score < ISSUE_SCORE_THRESHOLD
    }

    pub fn breach_count(&self) -> usize {
        self.breaches.as_ref().map(Vec::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_accepts_http_and_https() {
        let t = ScanTarget::parse("https://Example.com/path").unwrap();
        assert_eq!(t.host(), "example.com");
        assert!(t.is_https());

        let t = ScanTarget::parse("  http://127.0.0.1:8080/ ").unwrap();
        assert_eq!(t.host(), "127.0.0.1");
        assert!(!t.is_https());
    }

    #[test]
    fn target_rejects_bad_input() {
        assert_eq!(ScanTarget::parse("   "), Err(ScanError::EmptyUrl));
        assert!(matches!(ScanTarget::parse("not a url"), Err(ScanError::InvalidUrl { .. })));
        assert_eq!(
            ScanTarget::parse("ftp://example.com"),
            Err(ScanError::UnsupportedScheme { scheme: "ftp".to_string() })
        );
        assert!(ScanTarget::parse("http://").is_err());
    }

    #[test]
    fn target_serializes_as_plain_string() {
        let t = ScanTarget::parse("https://example.com/").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"https://example.com/\"");
        let back: ScanTarget = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn grade_bands_are_exact() {
        let cases = [
            (100, Grade::A),
            (90, Grade::A),
            (89, Grade::B),
            (80, Grade::B),
            (79, Grade::C),
            (70, Grade::C),
            (69, Grade::D),
            (60, Grade::D),
            (59, Grade::F),
            (0, Grade::F),
        ];
        for (score, grade) in cases {
            assert_eq!(Grade::from_score(score), grade, "score {score}");
        }
    }

    #[test]
    fn performance_rating_thresholds() {
        assert_eq!(PerformanceRating::from_latency(0), PerformanceRating::Excellent);
        assert_eq!(PerformanceRating::from_latency(999), PerformanceRating::Excellent);
        assert_eq!(PerformanceRating::from_latency(1_000), PerformanceRating::Good);
        assert_eq!(PerformanceRating::from_latency(2_999), PerformanceRating::Good);
        assert_eq!(PerformanceRating::from_latency(3_000), PerformanceRating::Fair);
        assert_eq!(PerformanceRating::from_latency(4_999), PerformanceRating::Fair);
        assert_eq!(PerformanceRating::from_latency(5_000), PerformanceRating::Poor);
    }

    #[test]
    fn dns_load_balancing_requires_healthy_multi_address() {
        let failed = DnsFinding::from_lookups(Err("NXDOMAIN".into()), Ok(1));
        assert!(!failed.healthy);
        assert!(!failed.load_balanced);
        assert!(failed.has_txt);

        let single = DnsFinding::from_lookups(Ok(vec!["93.184.216.34".into()]), Err("no TXT".into()));
        assert!(single.healthy);
        assert!(!single.load_balanced);
        assert!(!single.has_txt);

        let double = DnsFinding::from_lookups(Ok(vec!["10.0.0.1".into(), "10.0.0.2".into()]), Ok(2));
        assert!(double.load_balanced);
        assert_eq!(double.addresses.len(), 2);
    }

    #[test]
    fn duplicate_addresses_do_not_count_as_load_balanced() {
        let dup = DnsFinding::from_lookups(Ok(vec!["10.0.0.1".into(), "10.0.0.1".into()]), Ok(0));
        assert!(!dup.load_balanced);
    }

    #[test]
    fn offline_availability_keeps_invariant() {
        let a = AvailabilityFinding::offline("connection refused", 12);
        assert!(!a.reachable);
        assert_eq!(a.status_code, 0);
        assert_eq!(a.performance_rating, PerformanceRating::Offline);
        assert_eq!(a.issues, vec!["Site unreachable: connection refused".to_string()]);
    }
}

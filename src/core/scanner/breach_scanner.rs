// src/core/scanner/breach_scanner.rs

use tracing::{debug, info, warn};
use crate::config::ScannerConfig;
use crate::core::models::{BreachFinding, BreachKind, BreachSeverity, ScanTarget};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

/// A named regular expression that indicates injected or obfuscated code.
#[derive(Debug, Clone)]
pub struct MalwarePattern {
    pub name: String,
    pub pattern: Regex,
}

impl MalwarePattern {
    /// Compiles `pattern` case-insensitively, since page content is lower-cased before matching.
    pub fn new(name: &str, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { name: name.to_string(), pattern })
    }
}

static BUILTIN_MALWARE: Lazy<Vec<MalwarePattern>> = Lazy::new(|| {
    [
        ("Base64 encoded eval", r"eval\s*\(\s*atob\s*\("),
        ("Obfuscated code", r"document\.write\s*\(\s*unescape"),
        ("Hidden iframe", r"<iframe[^>]*display\s*:\s*none"),
        ("Suspicious domain", r#"\.src\s*=\s*['"][^'"]*\.(ru|cn|tk|ml|ga|cf)['"]"#),
    ]
    .into_iter()
    .map(|(name, pattern)| MalwarePattern::new(name, pattern).unwrap())
    .collect()
});

const BUILTIN_SPAM_KEYWORDS: &[&str] = &[
    "viagra",
    "cialis",
    "casino",
    "poker",
    "payday loan",
    "essay writing",
    "diet pills",
    "work from home",
];

const BUILTIN_DEFACEMENT_PHRASES: &[&str] = &["hacked by", "pwned by", "owned by"];

/// Distinct spam keywords needed before content counts as spam-injected.
pub const SPAM_KEYWORD_THRESHOLD: usize = 2;

/// The rule tables used by the content breach probe.
///
/// `Default` carries the built-in tables; callers can extend them with the
/// `with_*` builders without touching the scan itself. Keywords and phrases
/// match case-insensitively however they were added, and a keyword listed
/// twice still counts once.
#[derive(Debug, Clone)]
pub struct BreachRules {
    pub malware_patterns: Vec<MalwarePattern>,
    pub spam_keywords: Vec<String>,
    pub defacement_phrases: Vec<String>,
}

impl Default for BreachRules {
    fn default() -> Self {
        Self {
            malware_patterns: BUILTIN_MALWARE.clone(),
            spam_keywords: BUILTIN_SPAM_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            defacement_phrases: BUILTIN_DEFACEMENT_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl BreachRules {
    pub fn with_malware_pattern(mut self, name: &str, pattern: &str) -> Result<Self, regex::Error> {
        self.malware_patterns.push(MalwarePattern::new(name, pattern)?);
        Ok(self)
    }

    pub fn with_spam_keyword(mut self, keyword: &str) -> Self {
        self.spam_keywords.push(keyword.to_lowercase());
        self
    }

    pub fn with_defacement_phrase(mut self, phrase: &str) -> Self {
        self.defacement_phrases.push(phrase.to_lowercase());
        self
    }

    /// Scans page content and returns at most one finding per detector, in
    /// the order malware, spam injection, defacement.
    pub fn detect(&self, content: &str, now: DateTime<Utc>) -> Vec<BreachFinding> {
        let content = content.to_lowercase();
        let mut findings = Vec::new();

        // One malware hit is enough; the rest are not enumerated.
        if let Some(hit) = self.malware_patterns.iter().find(|m| m.pattern.is_match(&content)) {
            debug!(pattern = %hit.name, "Malware pattern matched.");
            findings.push(BreachFinding {
                kind: BreachKind::Malware,
                severity: BreachSeverity::Critical,
                description: format!("Malware pattern found: {}", hit.name),
                detected_at: now,
            });
        }

        let matched_keywords: BTreeSet<String> = self
            .spam_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty() && content.contains(k.as_str()))
            .collect();
        let spam_count = matched_keywords.len();
        if spam_count >= SPAM_KEYWORD_THRESHOLD {
            debug!(spam_count, "Spam keywords matched.");
            findings.push(BreachFinding {
                kind: BreachKind::SpamInjection,
                severity: BreachSeverity::High,
                description: format!("Multiple spam keywords detected ({} found)", spam_count),
                detected_at: now,
            });
        }

        if self
            .defacement_phrases
            .iter()
            .map(|p| p.to_lowercase())
            .any(|p| !p.is_empty() && content.contains(p.as_str()))
        {
            debug!("Defacement phrase matched.");
            findings.push(BreachFinding {
                kind: BreachKind::Defacement,
                severity: BreachSeverity::Critical,
                description: "Website has been defaced by attackers".to_string(),
                detected_at: now,
            });
        }

        findings
    }
}

/// Fetches the page and runs the breach detectors over its body.
///
/// Any fetch failure, including a non-success status, yields no findings.
pub async fn run_breach_scan(target: &ScanTarget, config: &ScannerConfig, rules: &BreachRules) -> Vec<BreachFinding> {
    info!(target = %target.as_str(), "Starting content breach scan.");

    match fetch_content(target, config).await {
        Ok(body) => {
            let findings = rules.detect(&body, Utc::now());
            info!(findings = findings.len(), "Content breach scan finished.");
            findings
        }
        Err(e) => {
            warn!(url = %target.as_str(), error = %e, "Breach check failed.");
            Vec::new()
        }
    }
}

async fn fetch_content(target: &ScanTarget, config: &ScannerConfig) -> Result<String, reqwest::Error> {
    let client = reqwest::Client::builder()
        .user_agent(config.security_user_agent.as_str())
        .timeout(config.content_timeout())
        .build()?;
    let response = client.get(target.url().clone()).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(bytes = body.len(), "Successfully read response body.");
    Ok(body)
}

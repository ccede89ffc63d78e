// src/core/scanner/domain_scanner.rs

use tracing::debug;
use crate::core::models::{DomainFinding, ScanTarget};

const PLACEHOLDER_EXPIRY_DAYS: u32 = 365;

/// Domain registration check.
///
/// No registry (WHOIS) lookup is performed: the record is a fixed placeholder
/// for the target's registrable name, kept so reports have a stable shape.
pub async fn run_domain_scan(target: &ScanTarget) -> DomainFinding {
    let host = target.host();
    let domain = host.strip_prefix("www.").unwrap_or(host).to_string();
    debug!(domain = %domain, "Domain expiration lookup is not performed, returning placeholder.");

    DomainFinding {
        domain,
        status: "Active".to_string(),
        expires_in_days: PLACEHOLDER_EXPIRY_DAYS,
        registrar: "Unknown".to_string(),
        needs_renewal: false,
    }
}

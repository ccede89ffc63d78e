// src/core/scanner/dns_scanner.rs

use tracing::{debug, info, warn};

use crate::core::models::{DnsFinding, ScanTarget};
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::TokioAsyncResolver;
use std::net::Ipv4Addr;

/// Resolves the target host's A and TXT records.
///
/// Both lookups run concurrently and each outcome is kept on its own, so a
/// failing TXT query never hides a working A record (or the reverse). Only the
/// A lookup decides whether DNS is healthy.
pub async fn run_dns_scan(target: &ScanTarget) -> DnsFinding {
    let host = target.host();
    info!(host, "Starting DNS scan.");

    // An IPv4 literal needs no query; it resolves to itself.
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        debug!(%ip, "Target host is an IPv4 literal.");
        return DnsFinding::from_lookups(Ok(vec![ip.to_string()]), Err("IP literal has no TXT records".to_string()));
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());

    let (a_result, txt_result) = tokio::join!(
        lookup_a(&resolver, host),
        lookup_txt(&resolver, host)
    );

    let finding = DnsFinding::from_lookups(a_result, txt_result);
    info!(
        healthy = finding.healthy,
        addresses = finding.addresses.len(),
        load_balanced = finding.load_balanced,
        "DNS scan finished."
    );
    finding
}

async fn lookup_a(resolver: &TokioAsyncResolver, host: &str) -> Result<Vec<String>, String> {
    debug!(host, "Looking up A records.");
    match resolver.ipv4_lookup(host).await {
        Ok(records) => {
            let addresses: Vec<String> = records.iter().map(|a| a.to_string()).collect();
            debug!(count = addresses.len(), "A records found.");
            Ok(addresses)
        }
        Err(e) => {
            warn!(host, error = %e, "A lookup failed.");
            Err(format!("DNS issues: {}", e))
        }
    }
}

async fn lookup_txt(resolver: &TokioAsyncResolver, host: &str) -> Result<usize, String> {
    debug!(host, "Looking up TXT records.");
    match resolver.txt_lookup(host).await {
        Ok(records) => {
            let count = records.iter().count();
            debug!(count, "TXT records found.");
            Ok(count)
        }
        Err(e) => {
            debug!(host, error = %e, "TXT lookup failed.");
            Err(format!("DNS Error: {}", e))
        }
    }
}

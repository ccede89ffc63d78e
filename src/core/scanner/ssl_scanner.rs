// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info, warn};

use crate::core::models::{ScanTarget, TlsFinding};
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use x509_parser::prelude::{parse_x509_certificate, AttributeTypeAndValue, GeneralName, X509Certificate};

const HTTPS_PORT: u16 = 443;
const SECONDS_PER_DAY: i64 = 86_400;
const EXPIRY_WARNING_DAYS: i64 = 30;

/// The leaf-certificate fields the probe judges.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateMetadata {
    pub not_after: DateTime<Utc>,
    pub issuer_organization: Option<String>,
    pub issuer_country: Option<String>,
    pub subject_cn: Option<String>,
    pub subject_alt_names: Vec<String>,
}

/// Inspects whatever certificate the target presents on port 443.
///
/// Trust is not enforced: self-signed, expired and mismatched certificates are
/// still read so they can be reported on. Every failure resolves to a finding
/// with `has_tls = false`.
pub async fn run_ssl_scan(target: &ScanTarget, timeout: Duration) -> TlsFinding {
    if !target.is_https() {
        debug!(target = %target.as_str(), "Target is not HTTPS, skipping certificate inspection.");
        return TlsFinding::unavailable("no TLS");
    }

    let host = target.host().trim_start_matches('[').trim_end_matches(']').to_string();
    info!(host = %host, "Starting SSL/TLS scan.");

    let finding = inspect_endpoint(&host, HTTPS_PORT, timeout).await;
    info!(
        valid = finding.valid,
        days_remaining = finding.days_remaining,
        "SSL/TLS scan finished."
    );
    finding
}

/// Reads and judges the certificate served at `host:port`.
async fn inspect_endpoint(host: &str, port: u16, timeout: Duration) -> TlsFinding {
    let task_host = host.to_string();
    debug!("Spawning blocking task for TLS connection.");
    let task = spawn_blocking(move || fetch_certificate(&task_host, port, timeout));

    let metadata = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(Ok(metadata))) => metadata,
        Ok(Ok(Err(reason))) => {
            warn!(host, reason = %reason, "SSL/TLS scan failed.");
            return TlsFinding::unavailable(reason);
        }
        Ok(Err(e)) => {
            error!(panic = %e, "Blocking SSL scan task panicked!");
            return TlsFinding::unavailable(format!("SSL check failed: {}", e));
        }
        Err(_) => {
            warn!(host, timeout_secs = timeout.as_secs(), "SSL/TLS scan timed out.");
            return TlsFinding::unavailable("SSL check timeout");
        }
    };

    judge_certificate(host, &metadata, Utc::now())
}

/// Turns certificate metadata into a finding, relative to `now`.
pub fn judge_certificate(host: &str, metadata: &CertificateMetadata, now: DateTime<Utc>) -> TlsFinding {
    let days_remaining = (metadata.not_after - now)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY);
    let valid_for_domain = host_matches(
        host,
        metadata.subject_cn.as_deref(),
        &metadata.subject_alt_names,
    );

    let warning = (days_remaining > 0 && days_remaining <= EXPIRY_WARNING_DAYS)
        .then(|| format!("Certificate expires in {} days!", days_remaining));
    if warning.is_some() {
        debug!(days_remaining, "Certificate is expiring soon.");
    }

    let issuer_name = format!(
        "{} ({})",
        metadata.issuer_organization.as_deref().unwrap_or("Unknown"),
        metadata.issuer_country.as_deref().unwrap_or("Unknown"),
    );

    TlsFinding {
        has_tls: true,
        valid: days_remaining > 0 && valid_for_domain,
        valid_for_domain,
        days_remaining,
        expiry_time: Some(metadata.not_after),
        issuer_name: Some(issuer_name),
        subject_cn: metadata.subject_cn.clone(),
        subject_alt_names: metadata.subject_alt_names.clone(),
        warning,
        message: None,
    }
}

/// True when the subject CN or any SAN names `host`.
///
/// Comparison is ASCII case-insensitive and ignores a trailing dot. A
/// `*.suffix` pattern covers exactly one extra left-most label, never the bare
/// suffix and never a single-label suffix.
pub fn host_matches(host: &str, subject_cn: Option<&str>, subject_alt_names: &[String]) -> bool {
    let host = normalize_name(host);
    subject_cn
        .into_iter()
        .chain(subject_alt_names.iter().map(String::as_str))
        .any(|pattern| name_matches(&host, &normalize_name(pattern)))
}

fn normalize_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn name_matches(host: &str, pattern: &str) -> bool {
    if host == pattern {
        return true;
    }
    match pattern.strip_prefix("*.") {
        Some(suffix) if suffix.contains('.') => match host.split_once('.') {
            Some((label, rest)) => !label.is_empty() && rest == suffix,
            None => false,
        },
        _ => false,
    }
}

fn fetch_certificate(host: &str, port: u16, timeout: Duration) -> Result<CertificateMetadata, String> {
    let connector = TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
        .map_err(|e| {
            error!(error = %e, "Failed to create TlsConnector");
            format!("SSL check failed: {}", e)
        })?;

    debug!(host, port, "Connecting TCP stream.");
    let stream = connect_with_timeout(host, port, timeout)?;
    stream
        .set_read_timeout(Some(timeout))
        .and_then(|_| stream.set_write_timeout(Some(timeout)))
        .map_err(|e| format!("SSL check failed: {}", e))?;

    debug!(host, "Performing TLS handshake.");
    let stream = connector.connect(host, stream).map_err(|e| {
        warn!(error = %e, "TLS handshake failed");
        format!("SSL check failed: {}", e)
    })?;

    let cert = match stream.peer_certificate() {
        Ok(Some(c)) => c,
        Ok(None) => {
            debug!("TLS connection successful, but no peer certificate provided.");
            return Err("Could not retrieve certificate".to_string());
        }
        Err(e) => {
            error!(error = %e, "Failed to retrieve peer certificate from stream");
            return Err(format!("Could not retrieve certificate: {}", e));
        }
    };

    let cert_der = cert.to_der().map_err(|e| {
        error!(error = %e, "Failed to convert certificate to DER format");
        format!("Could not convert certificate to DER: {}", e)
    })?;

    let (_, x509) = parse_x509_certificate(&cert_der).map_err(|e| {
        error!(error = %e, "Failed to parse X.509 certificate");
        format!("X.509 Parse Error: {}", e)
    })?;

    info!(subject = %x509.subject(), issuer = %x509.issuer(), "Successfully parsed certificate.");
    Ok(extract_metadata(&x509))
}

fn connect_with_timeout(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, String> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|e| format!("SSL check failed: {}", e))?
        .collect();

    let mut last_error = None;
    for addr in &addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "TCP connection attempt failed.");
                last_error = Some(e);
            }
        }
    }

    Err(match last_error {
        Some(e) => format!("SSL check failed: {}", e),
        None => format!("SSL check failed: no address found for {}", host),
    })
}

fn extract_metadata(x509: &X509Certificate<'_>) -> CertificateMetadata {
    let subject_alt_names = match x509.subject_alternative_name() {
        Ok(Some(san)) => san
            .value
            .general_names
            .iter()
            .filter_map(|name| match name {
                GeneralName::DNSName(dns) => Some(dns.to_string()),
                GeneralName::IPAddress(bytes) => ip_from_bytes(bytes).map(|ip| ip.to_string()),
                _ => None,
            })
            .collect(),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(error = %e, "Could not decode subjectAltName extension.");
            Vec::new()
        }
    };

    CertificateMetadata {
        not_after: DateTime::from_timestamp(x509.validity().not_after.timestamp(), 0).unwrap_or_default(),
        issuer_organization: first_value(x509.issuer().iter_organization()),
        issuer_country: first_value(x509.issuer().iter_country()),
        subject_cn: first_value(x509.subject().iter_common_name()),
        subject_alt_names,
    }
}

fn first_value<'a, 'b: 'a, I>(mut values: I) -> Option<String>
where
    I: Iterator<Item = &'a AttributeTypeAndValue<'b>>,
{
    values
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

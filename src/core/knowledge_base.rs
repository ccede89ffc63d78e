//! Static, read-only remediation data for breach findings.
//! Each breach kind maps to an immediate action and an ordered list of
//! recovery steps, so reports can tell the site owner what to do next.

use crate::core::models::BreachKind;

/// Fix instructions attached to one kind of compromise.
#[derive(Debug, PartialEq, Eq)]
pub struct Remediation {
    /// The breach kind these instructions apply to.
    pub kind: BreachKind,
    /// What the owner should do right now.
    pub immediate: &'static str,
    /// Recovery steps, in the order they should be carried out.
    pub steps: &'static [&'static str],
}

static REMEDIATIONS: &[Remediation] = &[
    Remediation {
        kind: BreachKind::Malware,
        immediate: "Take the site offline immediately",
        steps: &[
            "Put the site in maintenance mode",
            "Contact your hosting provider",
            "Change all passwords (hosting, FTP, database, admin)",
            "Restore from a clean backup taken before the infection",
            "Scan all files with security software",
            "Update all plugins, themes and the CMS",
            "Install a web application firewall",
        ],
    },
    Remediation {
        kind: BreachKind::SpamInjection,
        immediate: "Spam content detected",
        steps: &[
            "Check whether the site has been compromised",
            "Remove all spam content",
            "Check for unauthorized admin users",
            "Review recent file changes",
            "Update and secure your CMS",
        ],
    },
    Remediation {
        kind: BreachKind::Defacement,
        immediate: "Website defaced",
        steps: &[
            "Take a screenshot for evidence",
            "Restore from backup immediately",
            "Check server logs for the time of the breach",
            "Change all credentials",
            "File a report if needed",
        ],
    },
];

/// Returns the fix instructions for a breach kind.
pub fn remediation_for(kind: BreachKind) -> &'static Remediation {
    REMEDIATIONS
        .iter()
        .find(|r| r.kind == kind)
        .unwrap_or(&REMEDIATIONS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_breach_kind_has_its_own_instructions() {
        for kind in [BreachKind::Malware, BreachKind::SpamInjection, BreachKind::Defacement] {
            let r = remediation_for(kind);
            assert_eq!(r.kind, kind);
            assert!(!r.steps.is_empty());
        }
    }
}

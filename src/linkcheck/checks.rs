use axum::http::Uri;

use crate::error::ApiError;

const SUSPICIOUS_WORDS: [&str; 5] = ["login", "verify", "secure", "update", "account"];
const WELL_KNOWN_SITES: [&str; 4] = ["facebook", "paypal", "instagram", "google"];
const LOOKALIKES: [&str; 11] = [
    "faceb00k", "f@cebook", "f@ceb00k", "g00gle", "g0ogle", "p@ypal", "p@yp@l", "paypa1",
    "1nstagram", "inst@gram", "instgr@m",
];
const UNCOMMON_TLDS: [&str; 9] = [".tk", ".ml", ".ga", ".cf", ".gq", ".xyz", ".top", ".site", ".win"];
const MAX_LABELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    SuspiciousWord(&'static str),
    Lookalike(&'static str),
    UncommonTld(String),
    TooManySubdomains,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::SuspiciousWord(w) => write!(f, "Contains suspicious word: \"{w}\"."),
            Finding::Lookalike(d) => write!(f, "Domain resembles popular site: \"{d}\"."),
            Finding::UncommonTld(t) => write!(f, "Uses uncommon domain: \"{t}\"."),
            Finding::TooManySubdomains => f.write_str("Contains too many subdomains."),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct Assessment {
    pub host: String,
    pub findings: Vec<Finding>,
}

impl Assessment {
    pub fn is_suspicious(&self) -> bool {
        !self.findings.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_suspicious() {
            return "URL appears safe.".into();
        }
        let reasons: Vec<String> = self.findings.iter().map(ToString::to_string).collect();
        format!("Potential phishing link! {}", reasons.join(" "))
    }
}

/// Lexical phishing heuristics over a lowercased `http(s)` URL. No network
/// access.
pub fn assess(raw: &str) -> Result<Assessment, ApiError> {
    let url = raw.trim().to_lowercase();
    let invalid = || ApiError::Validation("Please enter a valid URL.".into());
    if !url.starts_with("http") {
        return Err(invalid());
    }
    let uri: Uri = url.parse().map_err(|_| invalid())?;
    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(invalid)?
        .to_string();

    let mut findings = Vec::new();

    if !WELL_KNOWN_SITES.iter().any(|site| host.contains(*site)) {
        findings.extend(
            SUSPICIOUS_WORDS
                .iter()
                .copied()
                .filter(|w| url.contains(w))
                .map(Finding::SuspiciousWord),
        );
    }

    if let Some(d) = LOOKALIKES.iter().copied().find(|d| host.contains(d)) {
        findings.push(Finding::Lookalike(d));
    }

    if UNCOMMON_TLDS.iter().any(|tld| host.ends_with(*tld)) {
        let tld = host.rsplit('.').next().unwrap_or_default();
        findings.push(Finding::UncommonTld(tld.to_string()));
    }

    if host.split('.').count() > MAX_LABELS {
        findings.push(Finding::TooManySubdomains);
    }

    Ok(Assessment { host, findings })
}

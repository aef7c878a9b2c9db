use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

lazy_static! {
    static ref TARGET_RE: Regex = Regex::new(r"^[A-Za-z0-9:\[][A-Za-z0-9.:/_\[\]-]{0,252}$").unwrap();
    // nmap -p grammar: numbers, ranges (open-ended too), T:/U:/S:/P: prefixes,
    // service names with * and ? wildcards, [..] for nmap-services ports.
    // A leading `-` is only allowed as a range opener.
    static ref PORTS_RE: Regex =
        Regex::new(r"^(-|-[0-9][A-Za-z0-9*?:,\[\]_.-]*|[A-Za-z0-9*?\[][A-Za-z0-9*?:,\[\]_.-]*)$")
            .unwrap();
}

/// Scan techniques the service exposes, each mapped to one nmap flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanType {
    Tcp,
    Syn,
    Fin,
    Null,
    Xmas,
    Ack,
    Udp,
    Version,
}

impl ScanType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "tcp" => Some(ScanType::Tcp),
            "syn" => Some(ScanType::Syn),
            "fin" => Some(ScanType::Fin),
            "null" => Some(ScanType::Null),
            "xmas" => Some(ScanType::Xmas),
            "ack" => Some(ScanType::Ack),
            "udp" => Some(ScanType::Udp),
            "version" => Some(ScanType::Version),
            _ => None,
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            ScanType::Tcp => "-sT",
            ScanType::Syn => "-sS",
            ScanType::Fin => "-sF",
            ScanType::Null => "-sN",
            ScanType::Xmas => "-sX",
            ScanType::Ack => "-sA",
            ScanType::Udp => "-sU",
            ScanType::Version => "-sV",
        }
    }
}

/// `ports` may arrive as `"22,80"` or as a bare number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PortsField {
    Text(String),
    Number(u64),
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    pub target: Option<String>,
    #[serde(rename = "type", default = "default_scan_type")]
    pub scan_type: String,
    pub ports: Option<PortsField>,
}

fn default_scan_type() -> String {
    "tcp".into()
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub output: String,
}

/// Validated scan: the target plus the flags that precede it.
#[derive(Debug, PartialEq, Eq)]
pub struct ScanPlan {
    pub target: String,
    pub scan_type: ScanType,
    pub flags: Vec<String>,
}

impl ScanRequest {
    pub fn into_plan(self) -> Result<ScanPlan, ApiError> {
        let target = self
            .target
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Validation("target required".into()))?;
        let scan_type = ScanType::from_name(&self.scan_type)
            .ok_or_else(|| ApiError::Validation("unsupported scan type".into()))?;
        if !TARGET_RE.is_match(&target) {
            return Err(ApiError::Validation("invalid target".into()));
        }

        let ports = match self.ports {
            None => None,
            Some(PortsField::Number(n)) => Some(n.to_string()),
            Some(PortsField::Text(s)) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        };
        if let Some(p) = &ports {
            if !PORTS_RE.is_match(p) {
                return Err(ApiError::Validation("invalid ports".into()));
            }
        }

        Ok(ScanPlan {
            flags: scan_flags(scan_type, ports.as_deref()),
            target,
            scan_type,
        })
    }
}

/// `[type flag, -p <ports>?, -Pn, -T4]`
pub fn scan_flags(scan_type: ScanType, ports: Option<&str>) -> Vec<String> {
    let mut flags = vec![scan_type.flag().to_string()];
    if let Some(p) = ports {
        flags.push("-p".into());
        flags.push(p.to_string());
    }
    flags.push("-Pn".into());
    flags.push("-T4".into());
    flags
}

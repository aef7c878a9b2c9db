use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum ScanFailure {
    #[error("scanner binary not found: {0}")]
    ToolMissing(String),
    #[error("scan timed out after {0:?}")]
    TimedOut(Duration),
    #[error("failed to run scanner: {0}")]
    Io(#[from] io::Error),
}

impl From<ScanFailure> for ApiError {
    fn from(e: ScanFailure) -> Self {
        match e {
            ScanFailure::ToolMissing(_) => {
                ApiError::ToolMissing("nmap not found on server. Install nmap.".into())
            }
            ScanFailure::TimedOut(_) => ApiError::Timeout("scan timed out".into()),
            other => ApiError::Internal(other.into()),
        }
    }
}

/// Runs an external port scan and returns its text output.
#[async_trait]
pub trait PortScanner: Send + Sync {
    async fn run(
        &self,
        target: &str,
        flags: &[String],
        timeout: Duration,
    ) -> Result<String, ScanFailure>;
}

/// Invokes the `nmap` executable directly with an argument vector; no shell
/// is involved.
#[derive(Debug, Clone)]
pub struct NmapScanner {
    program: PathBuf,
}

impl NmapScanner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl PortScanner for NmapScanner {
    async fn run(
        &self,
        target: &str,
        flags: &[String],
        timeout: Duration,
    ) -> Result<String, ScanFailure> {
        let mut cmd = Command::new(&self.program);
        cmd.args(flags)
            .arg(target)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        debug!(program = %self.program.display(), ?flags, scan_target = %target, "spawning scanner");

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Err(_) => return Err(ScanFailure::TimedOut(timeout)),
            Ok(Err(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ScanFailure::ToolMissing(self.program.display().to_string()))
            }
            Ok(res) => res?,
        };

        debug!(status = %output.status, "scanner exited");
        Ok(relay_output(&output.stdout, &output.stderr))
    }
}

/// Trimmed stdout, falling back to trimmed stderr, then to "".
pub fn relay_output(stdout: &[u8], stderr: &[u8]) -> String {
    let out = String::from_utf8_lossy(stdout);
    let out = out.trim();
    if !out.is_empty() {
        return out.to_string();
    }
    String::from_utf8_lossy(stderr).trim().to_string()
}

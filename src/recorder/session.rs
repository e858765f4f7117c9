use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sysinfo::System;
use uuid::Uuid;

/// Who and where a session is recorded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub hostname: String,
    pub username: String,
    pub os: String,
}

impl HostIdentity {
    pub fn detect() -> Self {
        let hostname = System::host_name()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        let username = ["USER", "USERNAME", "LOGNAME"]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
            .unwrap_or_else(|| "unknown".to_string());
        let os = match (
            System::name().filter(|n| !n.is_empty()),
            System::kernel_version(),
        ) {
            (Some(name), Some(kernel)) => format!("{name} {kernel}"),
            (Some(name), None) => name,
            _ => std::env::consts::OS.to_string(),
        };

        Self {
            hostname,
            username,
            os,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub session_id: String,
    pub start_time_utc: String,
    pub hostname: String,
    pub username: String,
    pub os: String,
    /// Segment currently receiving writes; moved forward by rotation
    pub output_file: PathBuf,
}

impl SessionMetadata {
    pub fn new(logs_dir: &Path, identity: HostIdentity) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let output_file = segment_path(logs_dir, &session_id);

        Self {
            session_id,
            start_time_utc: Utc::now().to_rfc3339(),
            hostname: identity.hostname,
            username: identity.username,
            os: identity.os,
            output_file,
        }
    }
}

/// `session_<id>.jsonl` inside the logs directory
pub fn segment_path(logs_dir: &Path, id: &str) -> PathBuf {
    logs_dir.join(format!("session_{id}.jsonl"))
}

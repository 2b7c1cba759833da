use std::process::Command;

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub version: String,
    pub git: GitStatus,
}

#[derive(Debug, Serialize)]
pub struct GitStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Run the doctor check: verify git is on PATH and report its version.
pub fn run_doctor() -> DoctorReport {
    let git = match Command::new("git").arg("--version").output() {
        Ok(output) if output.status.success() => {
            let raw = String::from_utf8_lossy(&output.stdout);
            GitStatus {
                available: true,
                version: Some(parse_git_version(&raw)),
            }
        }
        _ => GitStatus {
            available: false,
            version: None,
        },
    };

    DoctorReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git,
    }
}

/// Extract the bare version number from "git version 2.43.0" style output.
fn parse_git_version(raw: &str) -> String {
    raw.trim()
        .strip_prefix("git version ")
        .unwrap_or(raw.trim())
        .to_string()
}

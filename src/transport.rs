use crate::snapshot::{OsInfo, RamUsage, Snapshot, StorageEntry};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Serialize)]
struct Payload {
    employee_id: String,
    email: String,
    department: String,
    system_details: SystemDetails,
}

#[derive(Debug, Serialize)]
struct SystemDetails {
    username: String,
    hostname: String,
    system_manufacturer: String,
    system_model: String,
    ip_address: String,
    serial_number: String,
    os_info: OsInfo,
    storage: Vec<StorageEntry>,
    ram: RamUsage,
    collected_at: String,
}

impl Payload {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            employee_id: snapshot.employee_id.clone(),
            email: snapshot.email.clone(),
            department: snapshot.department.clone(),
            system_details: SystemDetails {
                username: snapshot.username.clone(),
                hostname: snapshot.hostname.clone(),
                system_manufacturer: snapshot.system_manufacturer.clone(),
                system_model: snapshot.system_model.clone(),
                ip_address: snapshot.ip_address.clone(),
                serial_number: snapshot.serial_number.clone(),
                os_info: snapshot.os_info.clone(),
                storage: snapshot.storage.clone(),
                ram: snapshot.ram.clone(),
                collected_at: snapshot.collected_at.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ServerResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub details: Option<Value>,
    #[serde(default)]
    pub formatted_text: Option<String>,
    #[serde(default)]
    pub meta: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("server rejected submission: {0}")]
    Application(String),
}

/// One synchronous POST of the snapshot; no retries. The caller decides
/// what to do with a failure.
pub fn send(
    base_url: &str,
    snapshot: &Snapshot,
    timeout: Duration,
) -> Result<ServerResponse, TransportError> {
    let client = Client::builder()
        .user_agent(concat!("sysdetails/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?;

    let url = format!("{}/api/system-details", base_url.trim_end_matches('/'));
    debug!(%url, "submitting system details");

    let response = client
        .post(&url)
        .json(&Payload::from_snapshot(snapshot))
        .send()?;
    let status = response.status().as_u16();
    let body = response.text()?;
    interpret_response(status, &body)
}

fn interpret_response(status: u16, body: &str) -> Result<ServerResponse, TransportError> {
    if status != 200 {
        return Err(TransportError::Http {
            status,
            body: body.to_string(),
        });
    }

    let parsed: ServerResponse = serde_json::from_str(body)
        .map_err(|err| TransportError::Application(format!("malformed server response: {err}")))?;
    if !parsed.success {
        let message = parsed
            .error
            .unwrap_or_else(|| "server reported failure without a message".to_string());
        return Err(TransportError::Application(message));
    }
    Ok(parsed)
}

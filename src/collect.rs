use crate::config::Config;
use crate::probes::{hardware, identity, system};
use crate::snapshot::{ExternalData, RamUsage, Snapshot, UNKNOWN};
use chrono::Local;
use std::time::Duration;
use sysinfo::{System, SystemExt};
use thiserror::Error;
use tracing::{info, warn};

/// Caller-supplied submission identity, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub employee_id: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

/// Validated before any collection work begins.
pub fn validate_identity(
    employee_id: &str,
    email: &str,
    department: &str,
) -> Result<Identity, ValidationError> {
    let employee_id = employee_id.trim();
    if employee_id.is_empty() {
        return Err(ValidationError::MissingField("employee_id"));
    }
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    let department = department.trim();
    if department.is_empty() {
        return Err(ValidationError::MissingField("department"));
    }
    Ok(Identity {
        employee_id: employee_id.to_string(),
        email: email.to_string(),
        department: department.to_string(),
    })
}

/// Builds one snapshot. With external data the probe layer is skipped
/// entirely and the supplied facts are trusted verbatim; without it
/// every probe runs against this host.
pub fn collect(identity: &Identity, external: Option<ExternalData>, cfg: &Config) -> Snapshot {
    match external {
        Some(data) => from_external(identity, data),
        None => self_probe(identity, cfg),
    }
}

fn from_external(identity: &Identity, data: ExternalData) -> Snapshot {
    Snapshot {
        employee_id: identity.employee_id.clone(),
        email: identity.email.clone(),
        department: identity.department.clone(),
        collected_at: data.collected_at.unwrap_or_else(now_iso),
        username: data.username.unwrap_or_else(unknown),
        hostname: data.hostname.unwrap_or_else(unknown),
        system_manufacturer: data.system_manufacturer.unwrap_or_else(unknown),
        system_model: data.system_model.unwrap_or_else(unknown),
        ip_address: data.ip_address.unwrap_or_else(unknown),
        serial_number: data.serial_number.unwrap_or_else(unknown),
        os_info: data.os_info.unwrap_or_default(),
        storage: data.storage.unwrap_or_default(),
        ram: data.ram.unwrap_or_default(),
        collection_warning: None,
    }
}

fn self_probe(identity: &Identity, cfg: &Config) -> Snapshot {
    let command_timeout = Duration::from_secs(cfg.command_timeout_secs);
    if cfg.hosted {
        warn!("probing in a hosted environment describes the relay host, not the subject machine");
    }

    let mut sys = System::new_all();
    sys.refresh_memory();

    let snapshot = Snapshot {
        employee_id: identity.employee_id.clone(),
        email: identity.email.clone(),
        department: identity.department.clone(),
        collected_at: now_iso(),
        username: identity::username(command_timeout),
        hostname: identity::hostname(command_timeout),
        system_manufacturer: hardware::manufacturer(command_timeout),
        system_model: hardware::model(command_timeout),
        ip_address: identity::ip_address(command_timeout),
        serial_number: hardware::serial_number(command_timeout),
        os_info: system::os_info(&sys),
        storage: system::storage(&mut sys, command_timeout),
        ram: system::ram(&sys),
        collection_warning: cfg.hosted.then(|| {
            "server-side collection used in a hosted environment; \
             data reflects the relay host, not the subject machine"
                .to_string()
        }),
    };

    info!(
        hostname = %snapshot.hostname,
        volumes = snapshot.storage.len(),
        ram_error = matches!(snapshot.ram, RamUsage::Error { .. }),
        "collection finished"
    );
    snapshot
}

fn unknown() -> String {
    UNKNOWN.to_string()
}

fn now_iso() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

//! Fixed-layout text rendering of a snapshot.
//!
//! Probed-but-unresolvable facts carry the "Unknown" sentinel inside the
//! snapshot; fields that are simply absent (external data gaps) render
//! as "N/A" here.

use crate::snapshot::{RamUsage, Snapshot, StorageEntry};
use chrono::Local;
use std::fs;
use std::io;
use std::path::PathBuf;

const BANNER_WIDTH: usize = 60;

pub fn format_report(snapshot: &Snapshot) -> String {
    let heavy = "=".repeat(BANNER_WIDTH);
    let light = "-".repeat(BANNER_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    lines.push(heavy.clone());
    lines.push("SYSTEM DETAILS".to_string());
    lines.push(heavy.clone());
    lines.push(String::new());
    lines.push(format!("Collected At: {}", snapshot.collected_at));
    lines.push(format!("Employee ID: {}", snapshot.employee_id));
    lines.push(format!("Email: {}", snapshot.email));
    lines.push(format!("Department: {}", snapshot.department));
    lines.push(String::new());
    lines.push(format!("Username: {}", snapshot.username));
    lines.push(format!("Hostname: {}", snapshot.hostname));
    lines.push(format!(
        "System Manufacturer: {}",
        snapshot.system_manufacturer
    ));
    lines.push(format!("System Model: {}", snapshot.system_model));
    lines.push(format!("IP Address: {}", snapshot.ip_address));
    lines.push(format!("Serial Number: {}", snapshot.serial_number));
    lines.push(String::new());

    lines.push(light.clone());
    lines.push("OS INFORMATION".to_string());
    lines.push(light.clone());
    lines.push(format!("System: {}", text_or_na(&snapshot.os_info.system)));
    lines.push(format!("Release: {}", text_or_na(&snapshot.os_info.release)));
    lines.push(format!("Version: {}", text_or_na(&snapshot.os_info.version)));
    lines.push(format!(
        "Platform: {}",
        text_or_na(&snapshot.os_info.platform)
    ));
    lines.push(format!(
        "Processor: {}",
        text_or_na(&snapshot.os_info.processor)
    ));
    lines.push(String::new());

    lines.push(light.clone());
    lines.push("STORAGE DETAILS".to_string());
    lines.push(light.clone());
    if snapshot.storage.is_empty() {
        lines.push("No storage information available".to_string());
    } else {
        for entry in &snapshot.storage {
            match entry {
                StorageEntry::Error { error } => lines.push(format!("Error: {error}")),
                StorageEntry::Volume(volume) => {
                    lines.push(format!("Drive: {}", volume.drive));
                    lines.push(format!("  Total: {} GB", volume.total_gb));
                    lines.push(format!(
                        "  Used: {} GB ({}%)",
                        volume.used_gb, volume.used_percent
                    ));
                    lines.push(format!("  Free: {} GB", volume.free_gb));
                    lines.push(String::new());
                }
            }
        }
    }

    lines.push(light.clone());
    lines.push("RAM DETAILS".to_string());
    lines.push(light);
    match &snapshot.ram {
        RamUsage::Error { error } => lines.push(format!("Error: {error}")),
        RamUsage::Stats(stats) => {
            lines.push(format!("Total RAM: {} GB", num_or_na(stats.total_gb)));
            lines.push(format!(
                "Used RAM: {} GB ({}%)",
                num_or_na(stats.used_gb),
                num_or_na(stats.used_percent)
            ));
            lines.push(format!(
                "Available RAM: {} GB",
                num_or_na(stats.available_gb)
            ));
            lines.push(format!("Free RAM: {} GB", num_or_na(stats.free_gb)));
        }
    }
    lines.push(String::new());

    lines.push(heavy.clone());
    lines.push("End of System Details".to_string());
    lines.push(heavy);

    lines.join("\n")
}

/// Writes the report next to the working directory and returns the path.
pub fn save_report(text: &str, employee_id: &str) -> io::Result<PathBuf> {
    let safe_id = employee_id.trim().replace(' ', "_");
    let safe_id = if safe_id.is_empty() {
        "unknown".to_string()
    } else {
        safe_id
    };
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = PathBuf::from(format!("system_details_{safe_id}_{timestamp}.txt"));
    fs::write(&path, text)?;
    Ok(path)
}

fn text_or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn num_or_na(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{OsInfo, RamStats, VolumeUsage, UNKNOWN};

    fn base_snapshot() -> Snapshot {
        Snapshot {
            employee_id: "E100".to_string(),
            email: "e@x.com".to_string(),
            department: "IT".to_string(),
            collected_at: "2026-08-30T10:00:00".to_string(),
            username: "bob".to_string(),
            hostname: UNKNOWN.to_string(),
            system_manufacturer: UNKNOWN.to_string(),
            system_model: UNKNOWN.to_string(),
            ip_address: UNKNOWN.to_string(),
            serial_number: UNKNOWN.to_string(),
            os_info: OsInfo::default(),
            storage: Vec::new(),
            ram: RamUsage::Stats(RamStats::default()),
            collection_warning: None,
        }
    }

    #[test]
    fn report_is_deterministic() {
        let snapshot = base_snapshot();
        assert_eq!(format_report(&snapshot), format_report(&snapshot));
    }

    #[test]
    fn sparse_snapshot_renders_na_and_empty_storage_notice() {
        let text = format_report(&base_snapshot());
        assert!(text.contains("Username: bob"));
        assert!(text.contains("Hostname: Unknown"));
        assert!(text.contains("System: N/A"));
        assert!(text.contains("Processor: N/A"));
        assert!(text.contains("No storage information available"));
        assert!(text.contains("Total RAM: N/A GB"));
    }

    #[test]
    fn ram_error_renders_single_error_line() {
        let mut snapshot = base_snapshot();
        snapshot.ram = RamUsage::Error {
            error: "memory statistics unavailable".to_string(),
        };
        let text = format_report(&snapshot);

        let ram_section: Vec<&str> = text
            .lines()
            .skip_while(|line| *line != "RAM DETAILS")
            .take_while(|line| !line.starts_with('='))
            .collect();
        assert!(ram_section.contains(&"Error: memory statistics unavailable"));
        assert!(!ram_section.iter().any(|line| line.contains("Total RAM")));
    }

    #[test]
    fn storage_volume_renders_four_line_block() {
        let mut snapshot = base_snapshot();
        snapshot.storage = vec![
            StorageEntry::Volume(VolumeUsage {
                drive: "C:\\".to_string(),
                total_gb: 476.94,
                used_gb: 200.5,
                free_gb: 276.44,
                used_percent: 42.04,
            }),
            StorageEntry::Error {
                error: "permission denied".to_string(),
            },
        ];
        let text = format_report(&snapshot);
        assert!(text.contains("Drive: C:\\"));
        assert!(text.contains("  Total: 476.94 GB"));
        assert!(text.contains("  Used: 200.5 GB (42.04%)"));
        assert!(text.contains("  Free: 276.44 GB"));
        assert!(text.contains("Error: permission denied"));
    }

    #[test]
    fn external_values_appear_verbatim() {
        let mut snapshot = base_snapshot();
        snapshot.hostname = "LAPTOP-42".to_string();
        snapshot.os_info = OsInfo {
            system: Some("Windows".to_string()),
            release: Some("11".to_string()),
            version: Some("10.0.22631".to_string()),
            platform: Some("Windows-11-10.0.22631-SP0".to_string()),
            processor: Some("Intel64 Family 6".to_string()),
        };
        let text = format_report(&snapshot);
        assert!(text.contains("Hostname: LAPTOP-42"));
        assert!(text.contains("System: Windows"));
        assert!(text.contains("Release: 11"));
        assert!(text.contains("Platform: Windows-11-10.0.22631-SP0"));
    }

    #[test]
    fn banners_frame_the_report() {
        let text = format_report(&base_snapshot());
        let banner = "=".repeat(60);
        assert!(text.starts_with(&banner));
        assert!(text.ends_with(&banner));
        assert!(text.contains("SYSTEM DETAILS"));
        assert!(text.contains("End of System Details"));
    }
}

//! OS version, storage and RAM probes backed by sysinfo.

use crate::snapshot::{bytes_to_gb, round2, OsInfo, RamStats, RamUsage, StorageEntry, VolumeUsage};
use std::collections::HashSet;
use std::time::Duration;
use sysinfo::{CpuExt, DiskExt, System, SystemExt};
use tracing::{debug, warn};

pub fn os_info(system: &System) -> OsInfo {
    let processor = system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| std::env::consts::ARCH.to_string());

    OsInfo {
        system: system.name(),
        release: system.os_version(),
        version: system.kernel_version(),
        platform: system.long_os_version(),
        processor: Some(processor),
    }
}

pub fn storage(system: &mut System, timeout: Duration) -> Vec<StorageEntry> {
    system.refresh_disks_list();
    system.refresh_disks();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for disk in system.disks() {
        let total = disk.total_space();
        if total == 0 {
            continue;
        }
        let mount = disk.mount_point().to_string_lossy().to_string();
        // Overlay and bind mounts can surface the same volume twice.
        if !seen.insert(mount.clone()) {
            continue;
        }
        let free = disk.available_space();
        let used = total.saturating_sub(free);
        entries.push(StorageEntry::Volume(volume_usage(mount, total, used, free)));
    }

    if entries.is_empty() {
        warn!("disk enumeration yielded nothing, probing well-known mount points");
        entries = fallback_mounts(timeout);
    }

    entries
}

pub fn ram(system: &System) -> RamUsage {
    let total = system.total_memory();
    if total == 0 {
        return RamUsage::Error {
            error: "memory statistics unavailable".to_string(),
        };
    }

    let used = system.used_memory();
    RamUsage::Stats(RamStats {
        total_gb: Some(bytes_to_gb(total)),
        available_gb: Some(bytes_to_gb(system.available_memory())),
        used_gb: Some(bytes_to_gb(used)),
        free_gb: Some(bytes_to_gb(system.free_memory())),
        used_percent: Some(round2(used as f64 / total as f64 * 100.0)),
    })
}

fn volume_usage(drive: String, total: u64, used: u64, free: u64) -> VolumeUsage {
    VolumeUsage {
        drive,
        total_gb: bytes_to_gb(total),
        used_gb: bytes_to_gb(used),
        free_gb: bytes_to_gb(free),
        used_percent: round2(used as f64 / total as f64 * 100.0),
    }
}

#[cfg(not(windows))]
fn fallback_mounts(timeout: Duration) -> Vec<StorageEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for path in ["/", "/home"] {
        let Some(output) = super::run_command("df", &["-kP", path], timeout) else {
            debug!(path, "df probe failed");
            continue;
        };
        if let Some(volume) = parse_df_output(&output) {
            if seen.insert(volume.drive.clone()) {
                entries.push(StorageEntry::Volume(volume));
            }
        }
    }
    entries
}

#[cfg(windows)]
fn fallback_mounts(timeout: Duration) -> Vec<StorageEntry> {
    let Some(output) = super::run_command(
        "wmic",
        &["logicaldisk", "get", "caption,freespace,size", "/format:csv"],
        timeout,
    ) else {
        debug!("wmic logicaldisk probe failed");
        return Vec::new();
    };
    parse_logicaldisk_csv(&output)
}

/// Parses `df -kP` output: one header line, then
/// `filesystem blocks used available capacity mounted-on`.
#[cfg(not(windows))]
fn parse_df_output(output: &str) -> Option<VolumeUsage> {
    let line = output.lines().nth(1)?;
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }
    let total = fields[1].parse::<u64>().ok()?.saturating_mul(1024);
    let used = fields[2].parse::<u64>().ok()?.saturating_mul(1024);
    let free = fields[3].parse::<u64>().ok()?.saturating_mul(1024);
    if total == 0 {
        return None;
    }
    // The mount point may contain spaces; it is everything past field 5.
    let mount = fields[5..].join(" ");
    Some(volume_usage(mount, total, used, free))
}

/// Parses `wmic logicaldisk /format:csv`: `Node,Caption,FreeSpace,Size`.
#[cfg(windows)]
fn parse_logicaldisk_csv(output: &str) -> Vec<StorageEntry> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 4 {
                return None;
            }
            let caption = fields[1];
            let free = fields[2].parse::<u64>().ok()?;
            let total = fields[3].parse::<u64>().ok()?;
            if caption.is_empty() || total == 0 {
                return None;
            }
            let used = total.saturating_sub(free);
            Some(StorageEntry::Volume(volume_usage(
                format!("{caption}\\"),
                total,
                used,
                free,
            )))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_probe_yields_stats_or_error_never_both() {
        let mut system = System::new();
        system.refresh_memory();
        match ram(&system) {
            RamUsage::Stats(stats) => {
                let total = stats.total_gb.expect("probed stats carry totals");
                let used = stats.used_gb.expect("probed stats carry usage");
                assert!(total > 0.0);
                assert!(used <= total);
                let percent = stats.used_percent.unwrap();
                assert!((0.0..=100.0).contains(&percent));
            }
            RamUsage::Error { error } => assert!(!error.is_empty()),
        }
    }

    #[test]
    fn storage_probe_excludes_zero_total_volumes() {
        let mut system = System::new();
        for entry in storage(&mut system, Duration::from_secs(2)) {
            if let StorageEntry::Volume(volume) = entry {
                assert!(volume.total_gb > 0.0);
                assert!((0.0..=100.0).contains(&volume.used_percent));
            }
        }
    }

    #[test]
    fn os_info_always_has_a_processor_string() {
        let system = System::new_all();
        let info = os_info(&system);
        assert!(!info.processor.unwrap().is_empty());
    }

    #[test]
    fn volume_usage_percent_is_rounded_ratio() {
        let volume = volume_usage("/".to_string(), 100, 33, 67);
        assert_eq!(volume.used_percent, 33.0);

        let gib = 1024 * 1024 * 1024;
        let volume = volume_usage("/".to_string(), 3 * gib, gib, 2 * gib);
        assert_eq!(volume.total_gb, 3.0);
        assert_eq!(volume.used_gb, 1.0);
        assert_eq!(volume.free_gb, 2.0);
        assert_eq!(volume.used_percent, 33.33);
    }

    #[cfg(not(windows))]
    #[test]
    fn df_output_parses_into_a_volume() {
        let output = "Filesystem 1024-blocks Used Available Capacity Mounted on\n\
                      /dev/sda1 102400000 51200000 51200000 50% /\n";
        let volume = parse_df_output(output).unwrap();
        assert_eq!(volume.drive, "/");
        assert_eq!(volume.total_gb, 97.66);
        assert_eq!(volume.used_percent, 50.0);
    }

    #[cfg(not(windows))]
    #[test]
    fn df_garbage_is_none() {
        assert!(parse_df_output("").is_none());
        assert!(parse_df_output("whatever\nnot numbers at all\n").is_none());
    }
}

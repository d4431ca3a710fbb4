use serde::{Deserialize, Serialize};

/// Fallback value substituted when a probe cannot determine a fact.
pub const UNKNOWN: &str = "Unknown";

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn bytes_to_gb(bytes: u64) -> f64 {
    round2(bytes as f64 / (1024.0 * 1024.0 * 1024.0))
}

/// One complete inventory record for one machine and one submission.
/// Built once by the aggregator and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub employee_id: String,
    pub email: String,
    pub department: String,
    pub collected_at: String,
    pub username: String,
    pub hostname: String,
    pub system_manufacturer: String,
    pub system_model: String,
    pub ip_address: String,
    pub serial_number: String,
    pub os_info: OsInfo,
    pub storage: Vec<StorageEntry>,
    pub ram: RamUsage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_warning: Option<String>,
}

/// OS identification strings. Any field may be absent; absent fields
/// render as "N/A" in the report and are dropped from the wire payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OsInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor: Option<String>,
}

/// A storage report entry: either usage numbers for one volume or an
/// enumeration-level error. Volumes that cannot be statted are omitted
/// entirely rather than zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StorageEntry {
    Error { error: String },
    Volume(VolumeUsage),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeUsage {
    pub drive: String,
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub used_percent: f64,
}

/// RAM usage is either numbers or an error marker, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RamUsage {
    Error { error: String },
    Stats(RamStats),
}

impl Default for RamUsage {
    fn default() -> Self {
        RamUsage::Stats(RamStats::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RamStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_gb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_percent: Option<f64>,
}

/// Facts collected on the subject machine and handed to the aggregator
/// instead of probing locally. Everything is optional; missing strings
/// become "Unknown" and missing containers stay empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalData {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub system_manufacturer: Option<String>,
    #[serde(default)]
    pub system_model: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub os_info: Option<OsInfo>,
    #[serde(default)]
    pub storage: Option<Vec<StorageEntry>>,
    #[serde(default)]
    pub ram: Option<RamUsage>,
    #[serde(default)]
    pub collected_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_keeps_two_decimals() {
        assert_eq!(round2(123.456), 123.46);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
    }

    #[test]
    fn bytes_to_gb_rounds() {
        assert_eq!(bytes_to_gb(1024 * 1024 * 1024), 1.0);
        assert_eq!(bytes_to_gb(1_500_000_000), 1.4);
        assert_eq!(bytes_to_gb(0), 0.0);
    }

    #[test]
    fn ram_error_shape_deserializes_as_error() {
        let ram: RamUsage = serde_json::from_str(r#"{"error":"psutil not available"}"#).unwrap();
        assert_eq!(
            ram,
            RamUsage::Error {
                error: "psutil not available".to_string()
            }
        );
    }

    #[test]
    fn empty_ram_object_deserializes_as_blank_stats() {
        let ram: RamUsage = serde_json::from_str("{}").unwrap();
        assert_eq!(ram, RamUsage::Stats(RamStats::default()));
    }

    #[test]
    fn ram_stats_round_trip() {
        let ram: RamUsage = serde_json::from_str(
            r#"{"total_gb":16.0,"available_gb":8.5,"used_gb":7.5,"free_gb":6.0,"used_percent":46.88}"#,
        )
        .unwrap();
        let RamUsage::Stats(stats) = ram else {
            panic!("expected stats shape");
        };
        assert_eq!(stats.total_gb, Some(16.0));
        assert_eq!(stats.used_percent, Some(46.88));
    }

    #[test]
    fn storage_entry_distinguishes_error_from_volume() {
        let entry: StorageEntry = serde_json::from_str(r#"{"error":"permission denied"}"#).unwrap();
        assert!(matches!(entry, StorageEntry::Error { .. }));

        let entry: StorageEntry = serde_json::from_str(
            r#"{"drive":"C:\\","total_gb":476.94,"used_gb":200.5,"free_gb":276.44,"used_percent":42.04}"#,
        )
        .unwrap();
        let StorageEntry::Volume(volume) = entry else {
            panic!("expected volume shape");
        };
        assert_eq!(volume.drive, "C:\\");
        assert_eq!(volume.used_percent, 42.04);
    }

    #[test]
    fn external_data_tolerates_sparse_input() {
        let data: ExternalData = serde_json::from_str(r#"{"username":"bob"}"#).unwrap();
        assert_eq!(data.username.as_deref(), Some("bob"));
        assert!(data.hostname.is_none());
        assert!(data.storage.is_none());
        assert!(data.ram.is_none());
    }

    #[test]
    fn os_info_skips_absent_fields_on_the_wire() {
        let info = OsInfo {
            system: Some("Linux".to_string()),
            ..OsInfo::default()
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"system":"Linux"}"#);
    }
}

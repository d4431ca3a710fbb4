//! Hardware identity probes: manufacturer, model, serial number.
//!
//! Each fact has an ordered chain of strategies per platform. The first
//! strategy that yields a non-empty, non-placeholder value wins; an
//! exhausted chain degrades to the "Unknown" sentinel.

use super::{read_trimmed, run_command};
use crate::snapshot::UNKNOWN;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy)]
pub enum Fact {
    Manufacturer,
    Model,
    SerialNumber,
}

impl Fact {
    fn name(self) -> &'static str {
        match self {
            Fact::Manufacturer => "system_manufacturer",
            Fact::Model => "system_model",
            Fact::SerialNumber => "serial_number",
        }
    }
}

pub fn manufacturer(timeout: Duration) -> String {
    probe_fact(Fact::Manufacturer, timeout)
}

pub fn model(timeout: Duration) -> String {
    probe_fact(Fact::Model, timeout)
}

pub fn serial_number(timeout: Duration) -> String {
    probe_fact(Fact::SerialNumber, timeout)
}

pub fn probe_fact(fact: Fact, timeout: Duration) -> String {
    for strategy in strategy_chain(fact) {
        let Some(candidate) = strategy.run(timeout) else {
            debug!(fact = fact.name(), strategy = strategy.label, "strategy yielded nothing");
            continue;
        };
        if let Some(value) = accept_value(&candidate) {
            debug!(fact = fact.name(), strategy = strategy.label, "fact resolved");
            return value;
        }
        debug!(
            fact = fact.name(),
            strategy = strategy.label,
            "strategy returned a placeholder, trying next"
        );
    }
    warn!(fact = fact.name(), "fact unavailable, using sentinel");
    UNKNOWN.to_string()
}

struct Strategy {
    label: &'static str,
    kind: StrategyKind,
}

enum StrategyKind {
    /// External command; `header` strips WMIC's field-name echo line.
    Command {
        program: &'static str,
        args: &'static [&'static str],
        header: Option<&'static str>,
    },
    /// Plain virtual-filesystem read (DMI sysfs on Linux).
    File { path: &'static str },
}

impl Strategy {
    fn run(&self, timeout: Duration) -> Option<String> {
        match &self.kind {
            StrategyKind::Command {
                program,
                args,
                header,
            } => {
                let output = run_command(program, args, timeout)?;
                first_data_line(&output, *header)
            }
            StrategyKind::File { path } => read_trimmed(path),
        }
    }
}

#[cfg(target_os = "windows")]
fn strategy_chain(fact: Fact) -> &'static [Strategy] {
    match fact {
        Fact::Manufacturer => &[
            Strategy {
                label: "wmic",
                kind: StrategyKind::Command {
                    program: "wmic",
                    args: &["computersystem", "get", "manufacturer"],
                    header: Some("Manufacturer"),
                },
            },
            Strategy {
                label: "powershell-cim",
                kind: StrategyKind::Command {
                    program: "powershell",
                    args: &[
                        "-NoProfile",
                        "-Command",
                        "(Get-CimInstance Win32_ComputerSystem).Manufacturer",
                    ],
                    header: None,
                },
            },
        ],
        Fact::Model => &[
            Strategy {
                label: "wmic",
                kind: StrategyKind::Command {
                    program: "wmic",
                    args: &["computersystem", "get", "model"],
                    header: Some("Model"),
                },
            },
            Strategy {
                label: "powershell-cim",
                kind: StrategyKind::Command {
                    program: "powershell",
                    args: &[
                        "-NoProfile",
                        "-Command",
                        "(Get-CimInstance Win32_ComputerSystem).Model",
                    ],
                    header: None,
                },
            },
        ],
        Fact::SerialNumber => &[
            Strategy {
                label: "wmic",
                kind: StrategyKind::Command {
                    program: "wmic",
                    args: &["bios", "get", "serialnumber"],
                    header: Some("SerialNumber"),
                },
            },
            Strategy {
                label: "powershell-cim",
                kind: StrategyKind::Command {
                    program: "powershell",
                    args: &[
                        "-NoProfile",
                        "-Command",
                        "(Get-CimInstance Win32_BIOS).SerialNumber",
                    ],
                    header: None,
                },
            },
        ],
    }
}

#[cfg(target_os = "linux")]
fn strategy_chain(fact: Fact) -> &'static [Strategy] {
    match fact {
        Fact::Manufacturer => &[
            Strategy {
                label: "dmi-sysfs",
                kind: StrategyKind::File {
                    path: "/sys/class/dmi/id/sys_vendor",
                },
            },
            Strategy {
                label: "dmidecode",
                kind: StrategyKind::Command {
                    program: "dmidecode",
                    args: &["-s", "system-manufacturer"],
                    header: None,
                },
            },
        ],
        Fact::Model => &[
            Strategy {
                label: "dmi-sysfs",
                kind: StrategyKind::File {
                    path: "/sys/class/dmi/id/product_name",
                },
            },
            Strategy {
                label: "dmidecode",
                kind: StrategyKind::Command {
                    program: "dmidecode",
                    args: &["-s", "system-product-name"],
                    header: None,
                },
            },
        ],
        Fact::SerialNumber => &[
            Strategy {
                label: "dmi-sysfs",
                kind: StrategyKind::File {
                    path: "/sys/class/dmi/id/product_serial",
                },
            },
            Strategy {
                label: "dmidecode",
                kind: StrategyKind::Command {
                    program: "dmidecode",
                    args: &["-s", "system-serial-number"],
                    header: None,
                },
            },
        ],
    }
}

#[cfg(not(any(target_os = "windows", target_os = "linux")))]
fn strategy_chain(_fact: Fact) -> &'static [Strategy] {
    &[]
}

/// First non-empty line of line-oriented command output, skipping
/// dmidecode comment lines and the WMIC header echo when present.
fn first_data_line(output: &str, header: Option<&str>) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with('#'))
        .find(|line| header.map_or(true, |h| !line.contains(h)))
        .map(str::to_string)
}

const PLACEHOLDERS: &[&str] = &[
    "not specified",
    "unknown",
    "to be filled by o.e.m.",
    "none",
    "default string",
];

fn accept_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    let lowered = value.to_lowercase();
    if PLACEHOLDERS.contains(&lowered.as_str()) {
        return None;
    }
    Some(value.to_string())
}

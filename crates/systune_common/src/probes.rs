//! Diagnostic probe battery.
//!
//! A fixed, ordered list of probes. The order is load-bearing: the
//! advisory context keeps only a prefix of the battery, so the most
//! diagnostically valuable probes come first.

/// One diagnostic probe.
pub struct Probe {
    /// Human-readable field label shown to the operator and the
    /// advisory backend.
    pub label: &'static str,
    /// Command executed via the runner.
    pub command: &'static str,
    /// Tool that must resolve on PATH before the probe runs. A probe
    /// whose tool is missing degrades to an install hint instead of an
    /// error string.
    pub requires: Option<&'static str>,
}

/// The fixed diagnostic battery, in collection order.
pub const BATTERY: &[Probe] = &[
    Probe {
        label: "CPU Info",
        command: "lscpu",
        requires: None,
    },
    Probe {
        label: "Memory Info",
        command: "free -h",
        requires: None,
    },
    Probe {
        label: "Disk Info",
        command: "lsblk",
        requires: None,
    },
    Probe {
        label: "Kernel Version",
        command: "uname -a",
        requires: None,
    },
    Probe {
        label: "Distro Info",
        command: "cat /etc/os-release",
        requires: None,
    },
    Probe {
        label: "PCI Devices",
        command: "lspci",
        requires: None,
    },
    Probe {
        label: "USB Devices",
        command: "lsusb",
        requires: None,
    },
    Probe {
        label: "Hardware Details",
        command: "dmidecode -t system",
        requires: Some("dmidecode"),
    },
    Probe {
        label: "System Summary",
        command: "inxi -Fxz",
        requires: Some("inxi"),
    },
    Probe {
        label: "Sensors",
        command: "sensors",
        requires: Some("sensors"),
    },
];

/// DMI attribute reads backing the system model label. Kept out of the
/// battery: they feed the model string, not the advisory field set.
pub const VENDOR_PROBE: &str = "cat /sys/class/dmi/id/sys_vendor";
pub const PRODUCT_PROBE: &str = "cat /sys/class/dmi/id/product_name";
pub const VERSION_PROBE: &str = "cat /sys/class/dmi/id/product_version";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_labels_are_unique() {
        let mut labels: Vec<_> = BATTERY.iter().map(|p| p.label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), BATTERY.len());
    }

    #[test]
    fn core_probes_lead_the_battery() {
        // The truncator keeps a prefix; the always-available probes
        // must come before the optional-tool ones.
        let first_optional = BATTERY
            .iter()
            .position(|p| p.requires.is_some())
            .unwrap_or(BATTERY.len());
        assert!(BATTERY[..first_optional].len() >= 7);
        assert!(BATTERY[first_optional..]
            .iter()
            .all(|p| p.requires.is_some()));
    }
}

//! Diagnostic snapshot collection.
//!
//! Runs the fixed probe battery and derives the system model facts.
//! Each probe is isolated: one failing command degrades its own field
//! and nothing else.

use crate::command::{tool_available, CommandRunner};
use crate::probes::{self, Probe};
use serde::Serialize;
use tracing::{debug, warn};

/// One labeled diagnostic field, immutable once collected.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticField {
    pub label: &'static str,
    pub value: String,
}

/// Ordered diagnostic fields plus the derived hardware facts.
///
/// Collected once per run and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticSnapshot {
    fields: Vec<DiagnosticField>,
    system_model: String,
    apple_hardware: bool,
}

impl DiagnosticSnapshot {
    /// Fields in collection order.
    pub fn fields(&self) -> &[DiagnosticField] {
        &self.fields
    }

    /// Vendor, product, and version concatenated from the DMI probes.
    pub fn system_model(&self) -> &str {
        &self.system_model
    }

    /// Best-effort Apple hardware heuristic. Substring match on the
    /// DMI vendor/product strings; may false-negative on rebranded
    /// OEM firmware. Only ever used as an advisory hint.
    pub fn is_apple_hardware(&self) -> bool {
        self.apple_hardware
    }
}

/// Run the full battery and derive the model facts.
pub fn collect(runner: &dyn CommandRunner) -> DiagnosticSnapshot {
    let mut fields = Vec::with_capacity(probes::BATTERY.len());
    for probe in probes::BATTERY {
        fields.push(DiagnosticField {
            label: probe.label,
            value: run_probe(runner, probe),
        });
    }

    let vendor = read_dmi(runner, probes::VENDOR_PROBE);
    let product = read_dmi(runner, probes::PRODUCT_PROBE);
    let version = read_dmi(runner, probes::VERSION_PROBE);

    let system_model = [vendor.as_str(), product.as_str(), version.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let apple_hardware = vendor.contains("Apple") || product.contains("Mac");

    debug!(
        fields = fields.len(),
        model = %system_model,
        apple = apple_hardware,
        "diagnostic snapshot collected"
    );

    DiagnosticSnapshot {
        fields,
        system_model,
        apple_hardware,
    }
}

fn run_probe(runner: &dyn CommandRunner, probe: &Probe) -> String {
    if let Some(tool) = probe.requires {
        if !tool_available(runner, tool) {
            debug!(tool, label = probe.label, "optional probe tool missing");
            return format!("not available (install {})", tool);
        }
    }

    let result = runner.run(probe.command);
    if !result.succeeded {
        warn!(command = probe.command, "probe failed");
    }
    result.output
}

fn read_dmi(runner: &dyn CommandRunner, command: &str) -> String {
    let result = runner.run(command);
    if result.succeeded {
        result.output.trim().to_string()
    } else {
        String::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandResult;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted runner: exact-match responses, everything else
    /// succeeds with a canned line.
    struct FakeRunner {
        responses: HashMap<String, (String, bool)>,
        commands: RefCell<Vec<String>>,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                responses: HashMap::new(),
                commands: RefCell::new(Vec::new()),
            }
        }

        fn respond(mut self, command: &str, output: &str, succeeded: bool) -> Self {
            self.responses
                .insert(command.to_string(), (output.to_string(), succeeded));
            self
        }
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, command: &str) -> CommandResult {
            self.commands.borrow_mut().push(command.to_string());
            let (output, succeeded) = self
                .responses
                .get(command)
                .cloned()
                .unwrap_or_else(|| ("probe output".to_string(), true));
            CommandResult {
                command: command.to_string(),
                output,
                succeeded,
            }
        }
    }

    #[test]
    fn collects_every_battery_field_in_order() {
        let runner = FakeRunner::new();
        let snapshot = collect(&runner);

        let labels: Vec<_> = snapshot.fields().iter().map(|f| f.label).collect();
        let expected: Vec<_> = probes::BATTERY.iter().map(|p| p.label).collect();
        assert_eq!(labels, expected);
    }

    #[test]
    fn one_failing_probe_degrades_only_its_field() {
        let runner = FakeRunner::new().respond(
            "lscpu",
            "Error running command 'lscpu': boom",
            false,
        );
        let snapshot = collect(&runner);

        assert!(snapshot.fields()[0].value.contains("boom"));
        assert_eq!(snapshot.fields()[1].value, "probe output");
    }

    #[test]
    fn missing_optional_tool_yields_install_hint() {
        let runner = FakeRunner::new().respond("command -v inxi", "", false);
        let snapshot = collect(&runner);

        let summary = snapshot
            .fields()
            .iter()
            .find(|f| f.label == "System Summary")
            .unwrap();
        assert_eq!(summary.value, "not available (install inxi)");
        // The probe itself must not have been run.
        assert!(!runner.commands.borrow().iter().any(|c| c == "inxi -Fxz"));
    }

    #[test]
    fn system_model_concatenates_dmi_parts() {
        let runner = FakeRunner::new()
            .respond(probes::VENDOR_PROBE, "Apple Inc.", true)
            .respond(probes::PRODUCT_PROBE, "MacBookPro11,1", true)
            .respond(probes::VERSION_PROBE, "1.0", true);
        let snapshot = collect(&runner);

        assert_eq!(snapshot.system_model(), "Apple Inc. MacBookPro11,1 1.0");
        assert!(snapshot.is_apple_hardware());
    }

    #[test]
    fn apple_heuristic_matches_mac_product_without_apple_vendor() {
        let runner = FakeRunner::new()
            .respond(probes::VENDOR_PROBE, "SomeOEM", true)
            .respond(probes::PRODUCT_PROBE, "Macmini7,1", true)
            .respond(probes::VERSION_PROBE, "", false);
        let snapshot = collect(&runner);

        assert!(snapshot.is_apple_hardware());
        assert_eq!(snapshot.system_model(), "SomeOEM Macmini7,1");
    }

    #[test]
    fn non_apple_hardware_is_not_flagged() {
        let runner = FakeRunner::new()
            .respond(probes::VENDOR_PROBE, "LENOVO", true)
            .respond(probes::PRODUCT_PROBE, "20QV", true)
            .respond(probes::VERSION_PROBE, "ThinkPad X1", true);
        let snapshot = collect(&runner);

        assert!(!snapshot.is_apple_hardware());
    }

    #[test]
    fn collection_is_idempotent_in_field_set_and_order() {
        let runner = FakeRunner::new();
        let first = collect(&runner);
        let second = collect(&runner);

        let labels = |s: &DiagnosticSnapshot| {
            s.fields().iter().map(|f| f.label).collect::<Vec<_>>()
        };
        assert_eq!(labels(&first), labels(&second));
    }
}

//! Fix action catalog and execution.
//!
//! A closed set of operator-triggered actions. Each action is a
//! precondition check plus a sequence of steps; the first failing step
//! stops the rest of that action and the session moves on. Partially
//! applied actions are not rolled back - every step outcome is
//! reported so the operator can finish or undo by hand.

use crate::command::{tool_available, CommandRunner};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Closed set of remediation actions. New actions mean a new variant;
/// there is no runtime extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    AddSwap,
    NetworkFirmware,
    AppleFixes,
}

/// One entry of the fix catalog.
#[derive(Debug, Clone)]
pub struct FixAction {
    /// Stable key the operator types to select this action.
    pub key: &'static str,
    pub title: &'static str,
    pub summary: &'static str,
    kind: ActionKind,
}

/// Report for one executed step.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub detail: String,
    pub ok: bool,
}

impl StepReport {
    fn ok(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            ok: true,
        }
    }

    fn failed(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            ok: false,
        }
    }
}

/// Outcome of attempting one catalog action.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Required utility absent; no step was executed.
    PreconditionFailed { missing_tool: &'static str },
    /// Steps ran, stopping at the first failure.
    Executed {
        steps: Vec<StepReport>,
        completed: bool,
    },
}

/// The fix catalog with the persisted-config paths it may touch.
///
/// Paths default to the live system files; tests point them at a
/// scratch directory.
pub struct Catalog {
    actions: Vec<FixAction>,
    swapfile: PathBuf,
    fstab: PathBuf,
    modprobe_conf: PathBuf,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_paths(
            PathBuf::from("/swapfile"),
            PathBuf::from("/etc/fstab"),
            PathBuf::from("/etc/modprobe.d/hid_apple.conf"),
        )
    }

    pub fn with_paths(swapfile: PathBuf, fstab: PathBuf, modprobe_conf: PathBuf) -> Self {
        Self {
            actions: vec![
                FixAction {
                    key: "1",
                    title: "Add swap space",
                    summary: "create, format and enable a 2G swap file",
                    kind: ActionKind::AddSwap,
                },
                FixAction {
                    key: "2",
                    title: "Install missing network firmware",
                    summary: "detect the network chipset and install Broadcom firmware",
                    kind: ActionKind::NetworkFirmware,
                },
                FixAction {
                    key: "3",
                    title: "Apply Apple hardware fixes",
                    summary: "install mbpfan and tune the Apple keyboard module",
                    kind: ActionKind::AppleFixes,
                },
            ],
            swapfile,
            fstab,
            modprobe_conf,
        }
    }

    /// Catalog entries in presentation order.
    pub fn actions(&self) -> &[FixAction] {
        &self.actions
    }

    /// Closed key lookup; unknown keys are rejected, never guessed at.
    pub fn lookup(&self, key: &str) -> Option<&FixAction> {
        self.actions.iter().find(|a| a.key == key)
    }

    /// Attempt one action.
    pub fn execute(&self, action: &FixAction, runner: &dyn CommandRunner) -> ActionOutcome {
        info!(key = action.key, title = action.title, "executing fix action");
        match action.kind {
            ActionKind::AddSwap => self.execute_add_swap(runner),
            ActionKind::NetworkFirmware => self.execute_network_firmware(runner),
            ActionKind::AppleFixes => self.execute_apple_fixes(runner),
        }
    }

    fn execute_add_swap(&self, runner: &dyn CommandRunner) -> ActionOutcome {
        if !tool_available(runner, "swapon") {
            return ActionOutcome::PreconditionFailed {
                missing_tool: "swapon",
            };
        }

        let swapfile = self.swapfile.display();
        let commands = [
            format!("fallocate -l 2G {}", swapfile),
            format!("chmod 600 {}", swapfile),
            format!("mkswap {}", swapfile),
            format!("swapon {}", swapfile),
        ];

        let mut steps = Vec::new();
        for command in &commands {
            let report = run_command_step(runner, command);
            let ok = report.ok;
            steps.push(report);
            if !ok {
                return ActionOutcome::Executed {
                    steps,
                    completed: false,
                };
            }
        }

        // Persist across reboots. The mount table is only ever
        // appended to, never rewritten.
        let entry = format!("{} none swap sw 0 0", swapfile);
        let report = append_line(&self.fstab, &entry);
        let completed = report.ok;
        steps.push(report);

        ActionOutcome::Executed { steps, completed }
    }

    fn execute_network_firmware(&self, runner: &dyn CommandRunner) -> ActionOutcome {
        let mut steps = Vec::new();

        let chipset = runner.run("lspci | grep -i network");
        if !chipset.succeeded {
            steps.push(StepReport::failed(format!(
                "no network controller detected: {}",
                chipset.output
            )));
            return ActionOutcome::Executed {
                steps,
                completed: false,
            };
        }
        steps.push(StepReport::ok(format!(
            "detected network hardware: {}",
            chipset.output.lines().next().unwrap_or_default()
        )));

        let distro = match read_distro_id(runner, &mut steps) {
            Some(id) => id,
            None => {
                return ActionOutcome::Executed {
                    steps,
                    completed: false,
                }
            }
        };

        let install = match distro.as_str() {
            "ubuntu" | "debian" => "apt install -y firmware-b43-installer",
            "fedora" => "dnf install -y broadcom-wl",
            "arch" => "pacman -S --noconfirm broadcom-wl",
            other => {
                warn!(distro = other, "no firmware recipe for this distribution");
                steps.push(StepReport::failed(format!(
                    "unsupported distribution '{}', apply manually",
                    other
                )));
                return ActionOutcome::Executed {
                    steps,
                    completed: false,
                };
            }
        };

        let report = run_command_step(runner, install);
        let completed = report.ok;
        steps.push(report);

        ActionOutcome::Executed { steps, completed }
    }

    fn execute_apple_fixes(&self, runner: &dyn CommandRunner) -> ActionOutcome {
        let mut steps = Vec::new();

        let distro = match read_distro_id(runner, &mut steps) {
            Some(id) => id,
            None => {
                return ActionOutcome::Executed {
                    steps,
                    completed: false,
                }
            }
        };

        let install = match distro.as_str() {
            "ubuntu" | "debian" => "apt install -y mbpfan",
            "fedora" => "dnf install -y mbpfan",
            "arch" => "pacman -S --noconfirm mbpfan",
            other => {
                warn!(distro = other, "no Apple fix bundle for this distribution");
                steps.push(StepReport::failed(format!(
                    "unsupported distribution '{}', apply manually",
                    other
                )));
                return ActionOutcome::Executed {
                    steps,
                    completed: false,
                };
            }
        };

        let report = run_command_step(runner, install);
        if !report.ok {
            steps.push(report);
            return ActionOutcome::Executed {
                steps,
                completed: false,
            };
        }
        steps.push(report);

        // Function keys act as F-keys first; media keys need Fn held.
        let report = overwrite_file(&self.modprobe_conf, "options hid_apple fnmode=2\n");
        let completed = report.ok;
        steps.push(report);

        ActionOutcome::Executed { steps, completed }
    }
}

fn run_command_step(runner: &dyn CommandRunner, command: &str) -> StepReport {
    let result = runner.run(command);
    if result.succeeded {
        StepReport::ok(format!("ran: {}", command))
    } else {
        warn!(command, "fix step failed");
        StepReport::failed(result.output)
    }
}

/// Read the distribution identity, recording the step.
fn read_distro_id(runner: &dyn CommandRunner, steps: &mut Vec<StepReport>) -> Option<String> {
    let result = runner.run(". /etc/os-release && echo \"$ID\"");
    if !result.succeeded {
        steps.push(StepReport::failed(format!(
            "cannot determine distribution: {}",
            result.output
        )));
        return None;
    }
    let id = result.output.trim().to_string();
    steps.push(StepReport::ok(format!("distribution: {}", id)));
    Some(id)
}

fn append_line(path: &Path, line: &str) -> StepReport {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", line));

    match result {
        Ok(()) => StepReport::ok(format!("appended '{}' to {}", line, path.display())),
        Err(e) => StepReport::failed(format!("cannot update {}: {}", path.display(), e)),
    }
}

fn overwrite_file(path: &Path, contents: &str) -> StepReport {
    match std::fs::write(path, contents) {
        Ok(()) => StepReport::ok(format!("wrote {}", path.display())),
        Err(e) => StepReport::failed(format!("cannot write {}: {}", path.display(), e)),
    }
}

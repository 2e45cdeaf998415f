//! Shared library for systune: diagnostic collection, advisory
//! context assembly, the advisory client, and the interactive
//! remediation machinery.

pub mod advisory;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod logs;
pub mod probes;
pub mod remediation;
pub mod session;
pub mod snapshot;

pub use advisory::{AdvisoryClient, AdvisoryConfig};
pub use command::{CommandResult, CommandRunner, ShellRunner};
pub use config::SystuneConfig;
pub use context::AdvisoryContext;
pub use error::SystuneError;
pub use remediation::Catalog;
pub use session::{RemediationSession, SessionState};
pub use snapshot::DiagnosticSnapshot;

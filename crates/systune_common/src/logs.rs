//! System log probe.

use crate::command::CommandRunner;
use tracing::warn;

/// Error-priority journal entries for the current boot.
const JOURNAL_ERRORS: &str = "journalctl -p 3 -xb --no-pager";

/// Collect recent error logs.
///
/// A failed probe yields its error text as the log body; the run
/// continues with whatever the journal gave us.
pub fn collect_logs(runner: &dyn CommandRunner) -> String {
    let result = runner.run(JOURNAL_ERRORS);
    if !result.succeeded {
        warn!("journal probe failed");
    }
    result.output
}

//! Advisory context assembly.
//!
//! Projects a diagnostic snapshot plus raw journal text into a payload
//! whose size is bounded no matter what the probes returned. A runaway
//! probe cannot blow up the advisory request.

use crate::snapshot::DiagnosticSnapshot;

/// Fields kept from the snapshot, in collection order.
pub const MAX_FIELDS: usize = 9;
/// Per-field value cap before the truncation marker is appended.
pub const MAX_FIELD_CHARS: usize = 500;
/// Hard cap on the rendered field block.
pub const MAX_CONTEXT_CHARS: usize = 6000;
/// Journal lines kept (from the end).
pub const MAX_LOG_LINES: usize = 80;
/// Hard cap on the journal excerpt.
pub const MAX_LOG_CHARS: usize = 3000;

/// Marker appended where a field value was cut.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Bounded projection of a snapshot and its logs. Derived
/// deterministically, never persisted.
#[derive(Debug, Clone)]
pub struct AdvisoryContext {
    /// Rendered field sections, at most [`MAX_CONTEXT_CHARS`] chars.
    pub rendered: String,
    /// Journal tail, at most [`MAX_LOG_LINES`] lines and
    /// [`MAX_LOG_CHARS`] chars.
    pub log_excerpt: String,
}

impl AdvisoryContext {
    /// Build the bounded context.
    ///
    /// Fields beyond position [`MAX_FIELDS`] are dropped entirely;
    /// oversized values are prefix-kept with a marker; the rendered
    /// block gets one final hard cap that may cut a field mid-value.
    pub fn build(snapshot: &DiagnosticSnapshot, log_text: &str) -> Self {
        let mut rendered = String::new();
        for field in snapshot.fields().iter().take(MAX_FIELDS) {
            rendered.push_str("### ");
            rendered.push_str(field.label);
            rendered.push('\n');
            push_clipped(&mut rendered, &field.value);
            rendered.push_str("\n\n");
        }
        let rendered = clip_chars(&rendered, MAX_CONTEXT_CHARS);

        let log_excerpt = tail(log_text, MAX_LOG_LINES, MAX_LOG_CHARS);

        Self {
            rendered,
            log_excerpt,
        }
    }
}

/// Append `value` to `out`, keeping at most [`MAX_FIELD_CHARS`] chars
/// plus the marker.
fn push_clipped(out: &mut String, value: &str) {
    match value.char_indices().nth(MAX_FIELD_CHARS) {
        None => out.push_str(value),
        Some((byte_idx, _)) => {
            out.push_str(&value[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
        }
    }
}

/// First `max_chars` chars of `text`, char-boundary safe.
fn clip_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
    }
}

/// Last `max_lines` lines of `text`, then the last `max_chars` chars
/// of that. The newest journal entries sit at the end, so the suffix
/// wins on both cuts.
fn tail(text: &str, max_lines: usize, max_chars: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    let joined = lines[start..].join("\n");

    let char_count = joined.chars().count();
    if char_count <= max_chars {
        return joined;
    }
    let skip = char_count - max_chars;
    match joined.char_indices().nth(skip) {
        Some((byte_idx, _)) => joined[byte_idx..].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandResult, CommandRunner};
    use crate::snapshot;

    /// Runner returning a fixed value for every battery probe, with
    /// per-command overrides.
    struct ValueRunner {
        overrides: Vec<(String, String)>,
    }

    impl ValueRunner {
        fn uniform() -> Self {
            Self { overrides: vec![] }
        }

        fn with(mut self, command: &str, output: &str) -> Self {
            self.overrides
                .push((command.to_string(), output.to_string()));
            self
        }
    }

    impl CommandRunner for ValueRunner {
        fn run(&self, command: &str) -> CommandResult {
            let output = self
                .overrides
                .iter()
                .find(|(c, _)| c == command)
                .map(|(_, o)| o.clone())
                .unwrap_or_else(|| "value".to_string());
            CommandResult {
                command: command.to_string(),
                output,
                succeeded: true,
            }
        }
    }

    #[test]
    fn keeps_at_most_nine_fields_in_order() {
        let snapshot = snapshot::collect(&ValueRunner::uniform());
        let context = AdvisoryContext::build(&snapshot, "");

        for field in snapshot.fields().iter().take(MAX_FIELDS) {
            assert!(context.rendered.contains(field.label));
        }
        for field in snapshot.fields().iter().skip(MAX_FIELDS) {
            assert!(!context.rendered.contains(field.label));
        }
    }

    #[test]
    fn oversized_field_keeps_prefix_plus_marker() {
        let long_value = "x".repeat(2000);
        let snapshot =
            snapshot::collect(&ValueRunner::uniform().with("lscpu", &long_value));
        let context = AdvisoryContext::build(&snapshot, "");

        let expected = format!("{}{}", "x".repeat(MAX_FIELD_CHARS), TRUNCATION_MARKER);
        assert!(context.rendered.contains(&expected));
        assert!(!context.rendered.contains(&"x".repeat(MAX_FIELD_CHARS + 1)));
    }

    #[test]
    fn middle_field_is_clipped_while_neighbors_survive() {
        // Field 5 of the battery oversized; the fields around it pass
        // through intact.
        let long_value = "z".repeat(2000);
        let snapshot = snapshot::collect(
            &ValueRunner::uniform().with("cat /etc/os-release", &long_value),
        );
        let context = AdvisoryContext::build(&snapshot, "");

        let expected = format!("{}{}", "z".repeat(MAX_FIELD_CHARS), TRUNCATION_MARKER);
        assert!(context.rendered.contains(&expected));
        assert!(context.rendered.contains("### Kernel Version\nvalue"));
        assert!(context.rendered.contains("### PCI Devices\nvalue"));
    }

    #[test]
    fn bounded_under_adversarial_input() {
        // A 10 MB single field must not leak past the caps.
        let huge = "y".repeat(10 * 1024 * 1024);
        let snapshot =
            snapshot::collect(&ValueRunner::uniform().with("free -h", &huge));
        let huge_logs = "log line\n".repeat(500_000);
        let context = AdvisoryContext::build(&snapshot, &huge_logs);

        assert!(context.rendered.chars().count() <= MAX_CONTEXT_CHARS);
        assert!(context.log_excerpt.chars().count() <= MAX_LOG_CHARS);
        assert!(context.log_excerpt.lines().count() <= MAX_LOG_LINES);
    }

    #[test]
    fn log_tail_keeps_last_lines() {
        let logs: Vec<String> = (0..200).map(|i| format!("entry {}", i)).collect();
        let snapshot = snapshot::collect(&ValueRunner::uniform());
        let context = AdvisoryContext::build(&snapshot, &logs.join("\n"));

        assert!(context.log_excerpt.ends_with("entry 199"));
        assert!(!context.log_excerpt.contains("entry 100\n"));
        assert_eq!(context.log_excerpt.lines().count(), MAX_LOG_LINES);
    }

    #[test]
    fn rendered_block_hard_cap_may_cut_mid_field() {
        let text = "abc".repeat(4000);
        let clipped = clip_chars(&text, MAX_CONTEXT_CHARS);
        assert_eq!(clipped.chars().count(), MAX_CONTEXT_CHARS);
        assert!(text.starts_with(&clipped));
    }

    #[test]
    fn selection_is_prefix_stable() {
        // Mutating a field past the cut never changes the output.
        let base = snapshot::collect(&ValueRunner::uniform());
        let mutated = snapshot::collect(
            &ValueRunner::uniform().with("sensors", "completely different reading"),
        );

        let a = AdvisoryContext::build(&base, "");
        let b = AdvisoryContext::build(&mutated, "");
        assert_eq!(a.rendered, b.rendered);
    }

    #[test]
    fn short_input_passes_through_unchanged() {
        let snapshot = snapshot::collect(&ValueRunner::uniform());
        let context = AdvisoryContext::build(&snapshot, "one\ntwo");

        assert_eq!(context.log_excerpt, "one\ntwo");
        assert!(context.rendered.contains("### CPU Info\nvalue"));
    }
}
